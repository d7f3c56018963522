//! Prometheus instrumentation with labelled metrics and pluggable value storage.
//!
//! Metrics are defined once, through a builder, and observed through cheap, cloneable handles:
//! [`Counter`], [`Gauge`], [`Histogram`] and [`Summary`]. A metric may declare required labels,
//! some of which can have default values; every distinct set of label values gets its own
//! values, created on first use and shared by every handle bound to the same labels.
//!
//! Values live in a [`Backend`](backend::Backend). The default
//! [`MemoryBackend`](backend::MemoryBackend) keeps them in process memory, while other backends
//! can share them between processes; see [`backend::load_backend`].
//!
//! Metrics register themselves in a [`Registry`], the [default one](default_registry) unless
//! told otherwise, which collects them into [`MetricFamily`]s ready for exposition.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use promkit::{Counter, Histogram, Registry};
//!
//! # fn main() -> Result<(), promkit::Error> {
//! let registry = Arc::new(Registry::new());
//!
//! let requests = Counter::builder("http_requests_total", "HTTP requests served.")
//!     .with_required_labels(["method", "status"])
//!     .with_default_labels([("status", "200")])
//!     .with_registry(registry.clone())
//!     .build()?;
//! requests.labels(&[("method", "GET")])?.inc()?;
//! requests.labels(&[("method", "POST"), ("status", "500")])?.inc()?;
//!
//! let latency = Histogram::builder("http_request_duration_seconds", "Request latency.")
//!     .with_buckets([0.1, 0.5, 1.0])
//!     .with_registry(registry.clone())
//!     .build()?;
//! latency.time(|| {
//!     // Handle the request.
//! })?;
//!
//! let families = registry.collect()?;
//! assert_eq!(families.len(), 2);
//! assert_eq!(families[0].samples.len(), 2);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

pub mod backend;

mod collector;
pub use self::collector::MetricCollector;

mod descriptor;
pub use self::descriptor::{
    is_valid_label_name, is_valid_metric_name, MetricDescriptor, DEFAULT_BUCKETS,
};

mod error;
pub use self::error::{BackendError, Error};

mod kind;
pub use self::kind::MetricKind;

mod labels;
pub use self::labels::LabelBinding;

mod metrics;
pub use self::metrics::{
    Counter, CounterBuilder, Gauge, GaugeBuilder, Histogram, HistogramBuilder, MetricBuilder,
    Summary, SummaryBuilder,
};

mod registry;
pub use self::registry::{default_registry, set_default_registry, CustomCollector, Registry};

mod sample;
pub use self::sample::{MetricFamily, Sample};

mod timer;
pub use self::timer::{InProgress, Timer};

mod view;

#[cfg(test)]
mod test_util;
