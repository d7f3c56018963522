//! Typed metric handles.
//!
//! Every handle is a view over a [`MetricCollector`](crate::MetricCollector) and a label binding.
//! A handle is *observable* once every required label of its metric has a value, either supplied
//! through `labels` or taken from the metric's defaults; observing through a handle that is not
//! fails with [`Error::UnobservableMetric`](crate::Error::UnobservableMetric) and changes nothing.
//!
//! Handles are cheap to clone, and two handles compare equal when they belong to the same metric
//! and resolve to the same labels, in which case they also share the same values.

mod builder;
pub use self::builder::{
    CounterBuilder, GaugeBuilder, HistogramBuilder, MetricBuilder, SummaryBuilder,
};

mod counter;
pub use self::counter::Counter;

mod gauge;
pub use self::gauge::Gauge;

mod histogram;
pub use self::histogram::Histogram;

mod summary;
pub use self::summary::Summary;

macro_rules! impl_view_methods {
    ($ty:ident, $builder:ident) => {
        impl $ty {
            /// Starts building a new metric.
            pub fn builder(
                name: impl Into<String>,
                description: impl Into<String>,
            ) -> $builder {
                $builder::new(name, description)
            }

            pub(crate) fn from_view(view: crate::view::View) -> Self {
                Self { view }
            }

            /// Binds additional label values, returning a handle to the resulting binding.
            ///
            /// Values supplied here take precedence over values bound earlier and over defaults.
            /// An empty slice returns a handle equal to this one.
            ///
            /// # Errors
            ///
            /// Fails with [`Error::UnexpectedLabel`](crate::Error::UnexpectedLabel) if a label is
            /// not declared by the metric, or with a backend error if the values of a new complete
            /// binding cannot be created.
            pub fn labels(&self, labels: &[(&str, &str)]) -> Result<Self, crate::Error> {
                self.view.labels(labels).map(Self::from_view)
            }

            /// Gets the name of the metric.
            pub fn name(&self) -> &str {
                self.view.name()
            }

            /// Gets the labels bound so far, as `(name, value)` pairs in declaration order.
            pub fn bound_labels(&self) -> Vec<(&str, &str)> {
                self.view.bound_labels().collect()
            }

            /// Whether every required label is bound.
            pub fn is_observable(&self) -> bool {
                self.view.is_observable()
            }

            /// Gets the collector of the metric.
            pub fn collector(&self) -> &std::sync::Arc<crate::MetricCollector> {
                self.view.collector()
            }
        }
    };
}

impl_view_methods!(Counter, CounterBuilder);
impl_view_methods!(Gauge, GaugeBuilder);
impl_view_methods!(Histogram, HistogramBuilder);
impl_view_methods!(Summary, SummaryBuilder);
