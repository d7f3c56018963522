use std::{marker::PhantomData, sync::Arc};

use quanta::Clock;

use super::{Counter, Gauge, Histogram, Summary};
use crate::{
    backend::{active_backend, Backend},
    registry,
    view::View,
    Error, MetricCollector, MetricDescriptor, MetricKind, Registry,
};

/// Where a newly built metric registers itself.
enum Registration {
    Default,
    Explicit(Arc<Registry>),
    Unregistered,
}

/// Builder for a metric of type `M`.
///
/// Created through `Counter::builder`, `Gauge::builder` and so on. Unless configured otherwise,
/// the metric has no labels, stores its values in the
/// [active backend](crate::backend::active_backend) and registers itself in the
/// [default registry](crate::default_registry).
#[must_use = "a metric builder does nothing until `build` is called"]
pub struct MetricBuilder<M> {
    name: String,
    description: String,
    required_labels: Vec<String>,
    default_labels: Vec<(String, String)>,
    buckets: Option<Vec<f64>>,
    registration: Registration,
    backend: Option<Arc<dyn Backend>>,
    clock: Option<Clock>,
    _metric: PhantomData<fn() -> M>,
}

/// Builder for a [`Counter`].
pub type CounterBuilder = MetricBuilder<Counter>;
/// Builder for a [`Gauge`].
pub type GaugeBuilder = MetricBuilder<Gauge>;
/// Builder for a [`Histogram`].
pub type HistogramBuilder = MetricBuilder<Histogram>;
/// Builder for a [`Summary`].
pub type SummaryBuilder = MetricBuilder<Summary>;

impl<M> MetricBuilder<M> {
    pub(crate) fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required_labels: Vec::new(),
            default_labels: Vec::new(),
            buckets: None,
            registration: Registration::Default,
            backend: None,
            clock: None,
            _metric: PhantomData,
        }
    }

    /// Sets the labels every observation must carry, in the order they will be exposed.
    ///
    /// Defaults to no labels.
    pub fn with_required_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets default values for some of the required labels.
    ///
    /// Every key must be one of the required labels. Values supplied through `labels` always
    /// take precedence over defaults.
    pub fn with_default_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_labels = labels.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Registers the metric in `registry` instead of the default registry.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registration = Registration::Explicit(registry);
        self
    }

    /// Does not register the metric anywhere.
    ///
    /// The metric can still be observed, and its collector can be registered by hand or exposed
    /// through a custom collector.
    pub fn unregistered(mut self) -> Self {
        self.registration = Registration::Unregistered;
        self
    }

    /// Stores the metric's values in `backend` instead of the active backend.
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the clock used by timers.
    ///
    /// Mostly useful with [`Clock::mock`] in tests. Defaults to [`Clock::new`].
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    fn build_view(self, kind: MetricKind) -> Result<View, Error> {
        let descriptor = MetricDescriptor::new(
            self.name,
            kind,
            self.description,
            self.required_labels,
            self.default_labels,
            self.buckets,
        )?;
        let backend = self.backend.unwrap_or_else(active_backend);
        let clock = self.clock.unwrap_or_else(Clock::new);

        let collector = Arc::new(MetricCollector::new(descriptor, backend, clock));
        let view = View::root(Arc::clone(&collector))?;

        match self.registration {
            Registration::Default => registry::register_default(collector)?,
            Registration::Explicit(registry) => registry.register(collector)?,
            Registration::Unregistered => {}
        }

        Ok(view)
    }
}

impl MetricBuilder<Counter> {
    /// Builds the counter.
    ///
    /// # Errors
    ///
    /// Fails if the name or labels are invalid, if the name is already registered in the target
    /// registry, or if the backend cannot create the values of the default binding.
    pub fn build(self) -> Result<Counter, Error> {
        self.build_view(MetricKind::Counter).map(Counter::from_view)
    }
}

impl MetricBuilder<Gauge> {
    /// Builds the gauge.
    ///
    /// # Errors
    ///
    /// See [`CounterBuilder::build`].
    pub fn build(self) -> Result<Gauge, Error> {
        self.build_view(MetricKind::Gauge).map(Gauge::from_view)
    }
}

impl MetricBuilder<Histogram> {
    /// Sets the bucket upper bounds.
    ///
    /// Bounds must be finite and strictly increasing; a trailing `+Inf` is accepted and ignored,
    /// since the `+Inf` bucket is always present. Defaults to
    /// [`DEFAULT_BUCKETS`](crate::DEFAULT_BUCKETS).
    pub fn with_buckets<I>(mut self, buckets: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.buckets = Some(buckets.into_iter().collect());
        self
    }

    /// Builds the histogram.
    ///
    /// # Errors
    ///
    /// Fails if the buckets are invalid, and otherwise as [`CounterBuilder::build`].
    pub fn build(self) -> Result<Histogram, Error> {
        self.build_view(MetricKind::Histogram).map(Histogram::from_view)
    }
}

impl MetricBuilder<Summary> {
    /// Builds the summary.
    ///
    /// # Errors
    ///
    /// See [`CounterBuilder::build`].
    pub fn build(self) -> Result<Summary, Error> {
        self.build_view(MetricKind::Summary).map(Summary::from_view)
    }
}
