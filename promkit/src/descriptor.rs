use crate::{Error, MetricKind};

/// Default histogram bucket upper bounds, in seconds.
///
/// Suited to timing typical network requests; the implicit `+Inf` bucket is always added.
pub const DEFAULT_BUCKETS: &[f64] =
    &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// The immutable identity of a metric.
///
/// Holds everything that defines a metric apart from its recorded values: its name, kind,
/// description, the labels it requires in declaration order, the defaults for any of those
/// labels, and, for histograms, the bucket upper bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricDescriptor {
    name: String,
    kind: MetricKind,
    description: String,
    required_labels: Vec<String>,
    // Aligned with `required_labels`.
    default_labels: Vec<Option<String>>,
    buckets: Vec<f64>,
}

impl MetricDescriptor {
    pub(crate) fn new(
        name: String,
        kind: MetricKind,
        description: String,
        required_labels: Vec<String>,
        default_labels: Vec<(String, String)>,
        buckets: Option<Vec<f64>>,
    ) -> Result<Self, Error> {
        if !is_valid_metric_name(&name) {
            return Err(Error::invalid(format!("`{}` is not a valid metric name", name)));
        }

        for (i, label) in required_labels.iter().enumerate() {
            if !is_valid_label_name(label) {
                return Err(Error::invalid(format!(
                    "`{}` is not a valid label name for metric `{}`",
                    label, name
                )));
            }
            if kind.reserved_labels().contains(&label.as_str()) {
                return Err(Error::invalid(format!(
                    "label `{}` is reserved for {} metrics",
                    label, kind
                )));
            }
            if required_labels[..i].contains(label) {
                return Err(Error::invalid(format!(
                    "label `{}` is declared more than once for metric `{}`",
                    label, name
                )));
            }
        }

        let mut defaults = vec![None; required_labels.len()];
        for (key, value) in default_labels {
            match required_labels.iter().position(|label| *label == key) {
                Some(index) => defaults[index] = Some(value),
                None => return Err(Error::UnexpectedLabel { metric: name, label: key }),
            }
        }

        let buckets = match kind {
            MetricKind::Histogram => {
                validate_buckets(buckets.unwrap_or_else(|| DEFAULT_BUCKETS.to_vec()))?
            }
            _ if buckets.is_some() => {
                return Err(Error::invalid(format!(
                    "buckets are only valid for histograms, not {}",
                    kind
                )));
            }
            _ => Vec::new(),
        };

        Ok(Self {
            name,
            kind,
            description,
            required_labels,
            default_labels: defaults,
            buckets,
        })
    }

    /// Name of the metric.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the metric.
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Description of the metric.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Required label names, in declaration order.
    pub fn required_labels(&self) -> &[String] {
        &self.required_labels
    }

    /// Default label values, in declaration order of their labels.
    pub fn default_labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required_labels
            .iter()
            .zip(self.default_labels.iter())
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }

    /// Histogram bucket upper bounds, excluding the implicit `+Inf` bucket.
    ///
    /// Empty for every kind other than histograms.
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    pub(crate) fn default_values(&self) -> &[Option<String>] {
        &self.default_labels
    }
}

fn validate_buckets(mut buckets: Vec<f64>) -> Result<Vec<f64>, Error> {
    if buckets.last() == Some(&f64::INFINITY) {
        buckets.pop();
    }

    if buckets.iter().any(|bound| !bound.is_finite()) {
        return Err(Error::invalid("histogram buckets must be finite, apart from a trailing +Inf"));
    }

    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(Error::invalid("histogram buckets must be in strictly increasing order"));
    }

    Ok(buckets)
}

/// Checks whether `name` is a valid metric name under the Prometheus [data model].
///
/// [data model]: https://prometheus.io/docs/concepts/data_model/#metric-names-and-labels
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if valid_metric_name_start_character(c) => chars.all(valid_metric_name_character),
        _ => false,
    }
}

/// Checks whether `name` is a valid label name under the Prometheus [data model].
///
/// Names beginning with `__` are reserved for internal use and are rejected.
///
/// [data model]: https://prometheus.io/docs/concepts/data_model/#metric-names-and-labels
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if valid_label_name_start_character(c) => chars.all(valid_label_name_character),
        _ => false,
    }
}

#[inline]
fn valid_metric_name_start_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z_:].
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

#[inline]
fn valid_metric_name_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z0-9_:].
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

#[inline]
fn valid_label_name_start_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z_].
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn valid_label_name_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z0-9_].
    c.is_ascii_alphanumeric() || c == '_'
}
