//! Per-metric storage of label bindings.
use std::{fmt, iter::once, sync::Arc};

use indexmap::IndexMap;
use parking_lot::RwLock;
use quanta::Clock;

use crate::{
    backend::{Backend, StoreKey, ValueStore},
    BackendError, Error, LabelBinding, MetricDescriptor, MetricFamily, MetricKind, Sample,
};

/// The value stores backing one complete label binding of a metric.
pub(crate) enum Child {
    /// Counters and gauges.
    Value(Arc<dyn ValueStore>),
    /// One store per bucket, `+Inf` last, and the running sum.
    Histogram { buckets: Vec<Arc<dyn ValueStore>>, sum: Arc<dyn ValueStore> },
    Summary { count: Arc<dyn ValueStore>, sum: Arc<dyn ValueStore> },
}

impl Child {
    fn create(
        descriptor: &MetricDescriptor,
        backend: &dyn Backend,
        label_values: &[String],
    ) -> Result<Self, BackendError> {
        let store = |discriminator: Option<&str>| {
            backend.create_store(&StoreKey::new(descriptor, label_values, discriminator))
        };

        let child = match descriptor.kind() {
            MetricKind::Counter | MetricKind::Gauge => Child::Value(store(None)?),
            MetricKind::Histogram => {
                let buckets = bucket_bounds(descriptor)
                    .map(|bound| store(Some(format_bound(bound).as_str())))
                    .collect::<Result<Vec<_>, _>>()?;
                Child::Histogram { buckets, sum: store(Some("sum"))? }
            }
            MetricKind::Summary => {
                Child::Summary { count: store(Some("count"))?, sum: store(Some("sum"))? }
            }
        };
        Ok(child)
    }

    /// The single store of a counter or gauge.
    pub(crate) fn value_store(&self) -> Option<&dyn ValueStore> {
        match self {
            Child::Value(store) => Some(store.as_ref()),
            _ => None,
        }
    }

    /// Records a single observation.
    ///
    /// Gauges take `value` as their new value; histograms and summaries count it and add it to
    /// their sum.
    pub(crate) fn record(&self, bounds: &[f64], value: f64) -> Result<(), BackendError> {
        match self {
            Child::Value(store) => store.set(value),
            Child::Histogram { buckets, sum } => {
                // Buckets are cumulative: every bucket whose bound is at least `value` counts it.
                // NaN compares false against every bound, so it only lands in `+Inf`.
                let first = if value.is_nan() {
                    bounds.len()
                } else {
                    bounds.partition_point(|bound| *bound < value)
                };
                for bucket in &buckets[first..] {
                    bucket.inc(1.0)?;
                }
                sum.inc(value)
            }
            Child::Summary { count, sum } => {
                count.inc(1.0)?;
                sum.inc(value)
            }
        }
    }

    fn samples(
        &self,
        descriptor: &MetricDescriptor,
        label_values: &[String],
        samples: &mut Vec<Sample>,
    ) -> Result<(), BackendError> {
        let labels = descriptor
            .required_labels()
            .iter()
            .cloned()
            .zip(label_values.iter().cloned())
            .collect::<Vec<_>>();

        match self {
            Child::Value(store) => samples.push(Sample::new("", labels, store.get()?)),
            Child::Histogram { buckets, sum } => {
                let mut count = 0.0;
                for (bound, bucket) in bucket_bounds(descriptor).zip(buckets) {
                    count = bucket.get()?;
                    let mut bucket_labels = labels.clone();
                    bucket_labels.push(("le".to_string(), format_bound(bound)));
                    samples.push(Sample::new("_bucket", bucket_labels, count));
                }
                samples.push(Sample::new("_sum", labels.clone(), sum.get()?));
                samples.push(Sample::new("_count", labels, count));
            }
            Child::Summary { count, sum } => {
                samples.push(Sample::new("_sum", labels.clone(), sum.get()?));
                samples.push(Sample::new("_count", labels, count.get()?));
            }
        }
        Ok(())
    }
}

fn bucket_bounds(descriptor: &MetricDescriptor) -> impl Iterator<Item = f64> + '_ {
    descriptor.buckets().iter().copied().chain(once(f64::INFINITY))
}

/// Formats a bucket upper bound the way it appears in the `le` label.
pub(crate) fn format_bound(bound: f64) -> String {
    if bound == f64::INFINITY {
        "+Inf".to_string()
    } else {
        bound.to_string()
    }
}

/// The authority over a single metric.
///
/// Owns the metric's descriptor and maps every complete label binding seen so far to its child,
/// the value stores created for that binding. Bindings are kept in the order they were first
/// seen, which is also the order of [`collect`](MetricCollector::collect).
pub struct MetricCollector {
    descriptor: MetricDescriptor,
    backend: Arc<dyn Backend>,
    clock: Clock,
    children: RwLock<IndexMap<Vec<String>, Arc<Child>>>,
}

impl MetricCollector {
    pub(crate) fn new(
        descriptor: MetricDescriptor,
        backend: Arc<dyn Backend>,
        clock: Clock,
    ) -> Self {
        Self { descriptor, backend, clock, children: RwLock::new(IndexMap::new()) }
    }

    /// Gets the descriptor of the metric.
    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    /// Gets the name of the metric.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Gets the number of label bindings with their own values.
    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    pub(crate) fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Gets the child backing `binding`, creating it if this is the first time it is seen.
    ///
    /// Partial bindings have no child and yield `None`. If the backend fails to create a store,
    /// nothing is cached and the error is returned.
    pub(crate) fn get_or_create_child(
        &self,
        binding: &LabelBinding,
    ) -> Result<Option<Arc<Child>>, Error> {
        let key = match binding.canonical_key() {
            Some(key) => key,
            None => return Ok(None),
        };

        // Try and get the child if it exists.
        if let Some(child) = self.children.read().get(&key) {
            return Ok(Some(Arc::clone(child)));
        }

        // Switch to a write guard and check again, since someone else may have created the child
        // while we were waiting for the lock.
        let mut children = self.children.write();
        if let Some(child) = children.get(&key) {
            return Ok(Some(Arc::clone(child)));
        }

        let child = Arc::new(Child::create(&self.descriptor, self.backend.as_ref(), &key)?);
        children.insert(key, Arc::clone(&child));
        Ok(Some(child))
    }

    /// Collects the samples of every label binding, in the order bindings were first seen.
    ///
    /// # Errors
    ///
    /// Fails with the first error the backend returns while reading a value.
    pub fn collect(&self) -> Result<Vec<Sample>, Error> {
        // Values are read outside the lock, so slow backends don't hold up new bindings.
        let children = self
            .children
            .read()
            .iter()
            .map(|(key, child)| (key.clone(), Arc::clone(child)))
            .collect::<Vec<_>>();

        let mut samples = Vec::with_capacity(children.len());
        for (label_values, child) in &children {
            child.samples(&self.descriptor, label_values, &mut samples)?;
        }
        Ok(samples)
    }

    /// Collects the metric as a [`MetricFamily`].
    ///
    /// Useful for custom collectors that expose metrics they own rather than register.
    pub fn family(&self) -> Result<MetricFamily, Error> {
        Ok(MetricFamily::new(
            self.descriptor.name(),
            self.descriptor.kind(),
            self.descriptor.description(),
            self.collect()?,
        ))
    }
}

impl fmt::Debug for MetricCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricCollector")
            .field("descriptor", &self.descriptor)
            .field("children", &self.child_count())
            .finish_non_exhaustive()
    }
}
