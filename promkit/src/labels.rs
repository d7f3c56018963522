//! Label resolution.
//!
//! A [`LabelBinding`] assigns values to some, or all, of a metric's required labels. Bindings are
//! built incrementally: every call to `labels` resolves the newly supplied values on top of the
//! existing binding, which itself starts out holding the metric's default values. Explicitly
//! supplied values always win over earlier values, and earlier values win over defaults.
use crate::{Error, MetricDescriptor};

/// A (possibly partial) assignment of values to a metric's required labels.
///
/// Values are kept in the declaration order of the required labels, which makes that order the
/// canonical form of a binding: two bindings are equal if and only if they resolve every required
/// label to the same value, regardless of the order in which the values were supplied.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabelBinding {
    values: Vec<Option<String>>,
}

impl LabelBinding {
    /// Creates the binding a metric starts out with: only its default values are bound.
    pub fn from_defaults(descriptor: &MetricDescriptor) -> Self {
        Self { values: descriptor.default_values().to_vec() }
    }

    /// Resolves `labels` on top of this binding.
    ///
    /// Supplied values override values already bound, including defaults. Labels left unbound
    /// simply keep the result partial. Resolving an empty set of labels returns an equal binding.
    ///
    /// # Errors
    ///
    /// If any supplied label is not one of the metric's required labels,
    /// [`Error::UnexpectedLabel`] is returned and nothing is resolved.
    pub fn resolve(
        &self,
        descriptor: &MetricDescriptor,
        labels: &[(&str, &str)],
    ) -> Result<Self, Error> {
        let required = descriptor.required_labels();

        // Validate everything up front so a bad label never yields a half-applied binding.
        let positions = labels
            .iter()
            .map(|(key, _)| {
                required.iter().position(|label| label == key).ok_or_else(|| {
                    Error::UnexpectedLabel {
                        metric: descriptor.name().to_string(),
                        label: key.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut resolved = self.clone();
        for (index, (_, value)) in positions.into_iter().zip(labels) {
            resolved.values[index] = Some(value.to_string());
        }
        Ok(resolved)
    }

    /// Whether every required label has a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Gets the value bound to the required label at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|value| value.as_deref())
    }

    /// Iterates over the bound labels as `(name, value)` pairs, in declaration order.
    pub fn iter<'a>(
        &'a self,
        descriptor: &'a MetricDescriptor,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        descriptor
            .required_labels()
            .iter()
            .zip(self.values.iter())
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }

    /// Gets the canonical key of this binding, if it is complete.
    pub(crate) fn canonical_key(&self) -> Option<Vec<String>> {
        self.values.iter().cloned().collect()
    }
}
