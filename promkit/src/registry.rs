//! Registries of metrics.
use std::{collections::HashSet, fmt, sync::Arc};

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::{const_mutex, Mutex, RwLock};
use tracing::{debug, warn};

use crate::{is_valid_label_name, is_valid_metric_name, Error, MetricCollector, MetricFamily};

static DEFAULT_REGISTRY: Lazy<ArcSwap<Registry>> =
    Lazy::new(|| ArcSwap::from_pointee(Registry::new()));

// Set once a metric registers itself in the default registry, after which it can't be replaced.
static DEFAULT_REGISTRY_IN_USE: Mutex<bool> = const_mutex(false);

/// Produces metric families on demand.
///
/// Custom collectors expose values that live elsewhere, such as process statistics or the state
/// of a connection pool, and are invoked on every collection pass of the registry they are
/// registered with.
pub trait CustomCollector: Send + Sync {
    /// Name the collector is registered under.
    fn name(&self) -> &str;

    /// Produces the current metric families.
    fn collect(&self) -> Result<Vec<MetricFamily>, Error>;
}

#[derive(Clone)]
enum Entry {
    Metric(Arc<MetricCollector>),
    Custom(Arc<dyn CustomCollector>),
}

/// An ordered set of collectors, keyed by name.
///
/// Collection yields one [`MetricFamily`] per registered metric and whatever custom collectors
/// produce, in registration order. If the registry has a prefix, every family name is exposed as
/// `<prefix>_<name>`.
pub struct Registry {
    prefix: Option<String>,
    collectors: RwLock<IndexMap<String, Entry>>,
}

impl Registry {
    /// Creates a new, empty `Registry`.
    pub fn new() -> Self {
        Self { prefix: None, collectors: RwLock::new(IndexMap::new()) }
    }

    /// Creates a new, empty `Registry` that prefixes every family name with `prefix`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] if `prefix` is not a valid metric name.
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self, Error> {
        let prefix = prefix.into();
        if !is_valid_metric_name(&prefix) {
            return Err(Error::invalid(format!("`{}` is not a valid metric name prefix", prefix)));
        }

        Ok(Self { prefix: Some(prefix), collectors: RwLock::new(IndexMap::new()) })
    }

    /// Gets the prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Registers a metric.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::DuplicateName`] if a collector with the same name is already
    /// registered, leaving the registry unchanged.
    pub fn register(&self, collector: Arc<MetricCollector>) -> Result<(), Error> {
        self.insert(collector.name().to_string(), Entry::Metric(collector))
    }

    /// Registers a custom collector.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::DuplicateName`] if a collector with the same name is already
    /// registered, leaving the registry unchanged.
    pub fn register_custom(&self, collector: Arc<dyn CustomCollector>) -> Result<(), Error> {
        self.insert(collector.name().to_string(), Entry::Custom(collector))
    }

    fn insert(&self, name: String, entry: Entry) -> Result<(), Error> {
        let mut collectors = self.collectors.write();
        if collectors.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }

        debug!(collector = %name, "registered collector");
        collectors.insert(name, entry);
        Ok(())
    }

    /// Removes the collector registered under `name`, returning whether there was one.
    ///
    /// The collector's values are untouched; it simply stops being collected here.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.collectors.write().shift_remove(name).is_some();
        if !removed {
            debug!(collector = name, "no collector to unregister");
        }
        removed
    }

    /// Whether a collector is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.collectors.read().contains_key(name)
    }

    /// Gets the number of registered collectors.
    pub fn len(&self) -> usize {
        self.collectors.read().len()
    }

    /// Whether no collector is registered.
    pub fn is_empty(&self) -> bool {
        self.collectors.read().is_empty()
    }

    /// Gets the names of the registered collectors, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.collectors.read().keys().cloned().collect()
    }

    /// Collects every registered collector, in registration order.
    ///
    /// A family produced by a custom collector is skipped, with a warning, if its name or one of
    /// its label names is invalid, or if its name is already taken by a registered metric or by a
    /// family produced earlier in the same pass.
    ///
    /// # Errors
    ///
    /// Fails with the first error raised by a metric's backend or by a custom collector.
    pub fn collect(&self) -> Result<Vec<MetricFamily>, Error> {
        let entries = self.collectors.read().values().cloned().collect::<Vec<_>>();

        let mut seen = entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Metric(collector) => Some(collector.name().to_string()),
                Entry::Custom(_) => None,
            })
            .collect::<HashSet<_>>();

        let mut families = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Entry::Metric(collector) => families.push(collector.family()?),
                Entry::Custom(custom) => {
                    for family in custom.collect()? {
                        if !is_well_formed(&family) {
                            warn!(
                                collector = custom.name(),
                                metric = %family.name,
                                "skipping metric family with an invalid metric or label name"
                            );
                            continue;
                        }
                        if !seen.insert(family.name.clone()) {
                            warn!(
                                collector = custom.name(),
                                metric = %family.name,
                                "skipping metric family whose name is already in use"
                            );
                            continue;
                        }
                        families.push(family);
                    }
                }
            }
        }

        if let Some(prefix) = &self.prefix {
            for family in &mut families {
                family.name = format!("{}_{}", prefix, family.name);
            }
        }

        Ok(families)
    }
}

fn is_well_formed(family: &MetricFamily) -> bool {
    is_valid_metric_name(&family.name)
        && family
            .samples
            .iter()
            .flat_map(|sample| sample.labels.iter())
            .all(|(key, _)| is_valid_label_name(key))
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.prefix)
            .field("collectors", &self.names())
            .finish()
    }
}

/// Gets the default registry.
///
/// Metrics register themselves here unless their builder says otherwise.
pub fn default_registry() -> Arc<Registry> {
    DEFAULT_REGISTRY.load_full()
}

/// Replaces the default registry.
///
/// # Errors
///
/// Fails with [`Error::DefaultRegistryInUse`] once any metric has registered itself in the
/// default registry.
pub fn set_default_registry(registry: impl Into<Arc<Registry>>) -> Result<(), Error> {
    let in_use = DEFAULT_REGISTRY_IN_USE.lock();
    if *in_use {
        return Err(Error::DefaultRegistryInUse);
    }

    DEFAULT_REGISTRY.store(registry.into());
    Ok(())
}

pub(crate) fn register_default(collector: Arc<MetricCollector>) -> Result<(), Error> {
    let registry = {
        let mut in_use = DEFAULT_REGISTRY_IN_USE.lock();
        *in_use = true;
        default_registry()
    };
    registry.register(collector)
}
