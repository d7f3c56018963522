use std::{fmt, sync::Arc};

use crate::{
    backend::ValueStore,
    collector::{Child, MetricCollector},
    Error, LabelBinding,
};

/// A collector seen through a (possibly partial) label binding.
///
/// Complete views hold on to their child, so observing never touches the collector's cache.
#[derive(Clone)]
pub(crate) struct View {
    collector: Arc<MetricCollector>,
    binding: LabelBinding,
    child: Option<Arc<Child>>,
}

impl View {
    /// Creates the view a metric starts out with: only its default labels are bound.
    pub fn root(collector: Arc<MetricCollector>) -> Result<Self, Error> {
        let binding = LabelBinding::from_defaults(collector.descriptor());
        let child = collector.get_or_create_child(&binding)?;
        Ok(Self { collector, binding, child })
    }

    pub fn labels(&self, labels: &[(&str, &str)]) -> Result<Self, Error> {
        if labels.is_empty() {
            return Ok(self.clone());
        }

        let binding = self.binding.resolve(self.collector.descriptor(), labels)?;
        let child = self.collector.get_or_create_child(&binding)?;
        Ok(Self { collector: Arc::clone(&self.collector), binding, child })
    }

    pub fn collector(&self) -> &Arc<MetricCollector> {
        &self.collector
    }

    pub fn name(&self) -> &str {
        self.collector.name()
    }

    pub fn bound_labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.binding.iter(self.collector.descriptor())
    }

    pub fn is_observable(&self) -> bool {
        self.child.is_some()
    }

    pub fn child(&self) -> Result<&Child, Error> {
        self.child
            .as_deref()
            .ok_or_else(|| Error::UnobservableMetric { metric: self.name().to_string() })
    }

    /// The single value store of a counter or gauge view.
    pub fn store(&self) -> Result<&dyn ValueStore, Error> {
        self.child()?
            .value_store()
            .ok_or_else(|| Error::UnobservableMetric { metric: self.name().to_string() })
    }

    pub fn record(&self, value: f64) -> Result<(), Error> {
        let child = self.child()?;
        child.record(self.collector.descriptor().buckets(), value)?;
        Ok(())
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.collector, &other.collector) && self.binding == other.binding
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("metric", &self.name())
            .field("labels", &self.bound_labels().collect::<Vec<_>>())
            .field("observable", &self.is_observable())
            .finish()
    }
}
