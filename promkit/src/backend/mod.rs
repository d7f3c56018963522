//! Value storage.
//!
//! Every metric's values live in a [`Backend`]: for each resolved label binding, the backend
//! hands out one or more [`ValueStore`]s, each of which owns a single `f64`. Whether that value
//! sits in process memory or in a store shared between processes is entirely up to the backend;
//! the rest of the crate only ever talks to these two traits.
//!
//! Backends are selected by identifier through a [`BackendCatalog`], optionally driven by the
//! `PROMKIT_BACKEND` and `PROMKIT_BACKEND_CONFIG` environment variables. See [`load_backend`].
use std::sync::Arc;

use crate::{BackendError, MetricDescriptor};

mod loader;
pub use self::loader::{
    active_backend, active_backend_settings, load_backend, register_backend, BackendCatalog,
    BackendConstructor, BackendSettings, BACKEND_CONFIG_ENV_VAR, BACKEND_ENV_VAR, DEFAULT_BACKEND,
};

mod memory;
pub use self::memory::{AtomicValue, MemoryBackend};

/// Backend configuration: an arbitrary JSON object whose meaning is up to the backend.
pub type BackendConfig = serde_json::Map<String, serde_json::Value>;

/// A single numeric value owned by a backend.
///
/// All operations must be linearizable with respect to each other. Backends that share values
/// between processes must provide the same guarantee across processes, typically by relying on
/// an atomic increment primitive of the shared store.
pub trait ValueStore: Send + Sync {
    /// Adds `value` to the stored value.
    fn inc(&self, value: f64) -> Result<(), BackendError>;

    /// Subtracts `value` from the stored value.
    fn dec(&self, value: f64) -> Result<(), BackendError>;

    /// Replaces the stored value.
    fn set(&self, value: f64) -> Result<(), BackendError>;

    /// Gets the stored value.
    fn get(&self) -> Result<f64, BackendError>;
}

/// Identifies the value store being created.
#[derive(Clone, Copy, Debug)]
pub struct StoreKey<'a> {
    metric: &'a MetricDescriptor,
    label_values: &'a [String],
    discriminator: Option<&'a str>,
}

impl<'a> StoreKey<'a> {
    pub(crate) fn new(
        metric: &'a MetricDescriptor,
        label_values: &'a [String],
        discriminator: Option<&'a str>,
    ) -> Self {
        Self { metric, label_values, discriminator }
    }

    /// The metric that owns the store.
    pub fn metric(&self) -> &'a MetricDescriptor {
        self.metric
    }

    /// The resolved labels of the store, as `(name, value)` pairs in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.metric
            .required_labels()
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
    }

    /// Distinguishes the stores of a metric that needs more than one per label binding.
    ///
    /// Histograms pass the formatted bucket upper bound (`"0.5"`, `"+Inf"`) for each bucket and
    /// `"sum"` for the running sum; summaries pass `"count"` and `"sum"`. Counters and gauges
    /// pass nothing.
    pub fn discriminator(&self) -> Option<&'a str> {
        self.discriminator
    }
}

/// Creates value stores.
///
/// A backend is constructed once from its [`BackendConfig`], which serves as its one-time
/// initialization hook, and is then asked for a new store each time a metric sees a label binding
/// for the first time. The caller guarantees at most one request per metric, label binding and
/// discriminator for the lifetime of the metric.
pub trait Backend: Send + Sync {
    /// Creates the value store identified by `key`.
    fn create_store(&self, key: &StoreKey<'_>) -> Result<Arc<dyn ValueStore>, BackendError>;
}
