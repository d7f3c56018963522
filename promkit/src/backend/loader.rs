use std::{collections::HashMap, env, fmt, fs, sync::Arc};

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{Backend, BackendConfig, MemoryBackend};
use crate::{BackendError, Error};

/// Environment variable naming the backend to load when none is given explicitly.
pub const BACKEND_ENV_VAR: &str = "PROMKIT_BACKEND";

/// Environment variable holding the path of a JSON file with the backend configuration, used
/// when no configuration is given explicitly.
pub const BACKEND_CONFIG_ENV_VAR: &str = "PROMKIT_BACKEND_CONFIG";

/// Identifier of the backend used when neither an explicit argument nor the environment names
/// one.
pub const DEFAULT_BACKEND: &str = "memory";

/// Constructs a backend from its configuration.
pub type BackendConstructor =
    Arc<dyn Fn(&BackendConfig) -> Result<Arc<dyn Backend>, BackendError> + Send + Sync>;

static CATALOG: Lazy<BackendCatalog> = Lazy::new(BackendCatalog::new);

static ACTIVE: Lazy<ArcSwap<ActiveBackend>> = Lazy::new(|| {
    ArcSwap::from_pointee(ActiveBackend {
        settings: BackendSettings::new(DEFAULT_BACKEND, BackendConfig::new()),
        backend: Arc::new(MemoryBackend),
    })
});

struct ActiveBackend {
    settings: BackendSettings,
    backend: Arc<dyn Backend>,
}

/// A set of known backend constructors, keyed by identifier.
///
/// Always knows about [`MemoryBackend`] under [`DEFAULT_BACKEND`]; further backends are added with
/// [`BackendCatalog::register`], typically once at startup.
pub struct BackendCatalog {
    constructors: RwLock<HashMap<String, BackendConstructor>>,
}

impl BackendCatalog {
    /// Creates a new `BackendCatalog` holding only the memory backend.
    pub fn new() -> Self {
        let catalog = Self { constructors: RwLock::new(HashMap::new()) };
        catalog.register(DEFAULT_BACKEND, MemoryBackend::from_config);
        catalog
    }

    /// Registers a backend constructor under `id`, replacing any previous constructor.
    pub fn register<F>(&self, id: impl Into<String>, constructor: F)
    where
        F: Fn(&BackendConfig) -> Result<Arc<dyn Backend>, BackendError> + Send + Sync + 'static,
    {
        let id = id.into();
        debug!(backend = %id, "registering backend constructor");
        self.constructors.write().insert(id, Arc::new(constructor));
    }

    /// Whether a constructor is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.constructors.read().contains_key(id)
    }

    /// Constructs the backend described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBackend`] if no constructor is registered under the identifier, or
    /// [`Error::InvalidBackendConfig`], carrying the constructor's message, if it rejects the
    /// configuration.
    pub fn construct(&self, settings: &BackendSettings) -> Result<Arc<dyn Backend>, Error> {
        let constructor = self
            .constructors
            .read()
            .get(settings.id())
            .cloned()
            .ok_or_else(|| Error::UnknownBackend(settings.id().to_string()))?;

        constructor(settings.config()).map_err(|e| {
            Error::InvalidBackendConfig(format!(
                "backend `{}` rejected its configuration: {}",
                settings.id(),
                e
            ))
        })
    }
}

impl Default for BackendCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackendCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructors = self.constructors.read();
        f.debug_struct("BackendCatalog").field("backends", &constructors.keys()).finish()
    }
}

/// Which backend to load, and with what configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendSettings {
    id: String,
    config: BackendConfig,
}

impl BackendSettings {
    /// Creates settings for the backend registered under `id`.
    pub fn new(id: impl Into<String>, config: BackendConfig) -> Self {
        Self { id: id.into(), config }
    }

    /// Resolves the settings from explicit arguments and the process environment.
    ///
    /// Explicit arguments take precedence over the environment: `id` over [`BACKEND_ENV_VAR`],
    /// and `config` over the JSON file named by [`BACKEND_CONFIG_ENV_VAR`]. When neither is
    /// present, the memory backend with an empty configuration is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBackendConfig`] if the configuration file cannot be read or does not
    /// hold a JSON object.
    pub fn from_env(id: Option<&str>, config: Option<BackendConfig>) -> Result<Self, Error> {
        Self::resolve_with(id, config, |var| env::var(var).ok())
    }

    pub(crate) fn resolve_with<F>(
        id: Option<&str>,
        config: Option<BackendConfig>,
        lookup: F,
    ) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let id = match id {
            Some(id) => id.to_string(),
            None => lookup(BACKEND_ENV_VAR).unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
        };

        let config = match config {
            Some(config) => config,
            None => match lookup(BACKEND_CONFIG_ENV_VAR) {
                Some(path) => read_config_file(&path)?,
                None => BackendConfig::new(),
            },
        };

        Ok(Self { id, config })
    }

    /// Identifier of the backend.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configuration passed to the backend constructor.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

fn read_config_file(path: &str) -> Result<BackendConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::InvalidBackendConfig(format!("failed to read `{}`: {}", path, e))
    })?;

    match serde_json::from_str(&contents) {
        Ok(serde_json::Value::Object(config)) => Ok(config),
        Ok(_) => {
            Err(Error::InvalidBackendConfig(format!("`{}` does not hold a JSON object", path)))
        }
        Err(e) => Err(Error::InvalidBackendConfig(format!("failed to parse `{}`: {}", path, e))),
    }
}

/// Registers a backend constructor in the process-wide catalog used by [`load_backend`].
pub fn register_backend<F>(id: impl Into<String>, constructor: F)
where
    F: Fn(&BackendConfig) -> Result<Arc<dyn Backend>, BackendError> + Send + Sync + 'static,
{
    CATALOG.register(id, constructor);
}

/// Selects the backend used by metrics built from now on.
///
/// Settings are resolved as described in [`BackendSettings::from_env`] and the backend is
/// constructed once, from the process-wide catalog. Metrics that were already built keep the
/// backend they were built with, so this should be called early during startup.
///
/// # Errors
///
/// Fails with [`Error::UnknownBackend`] if the backend is unknown, and with
/// [`Error::InvalidBackendConfig`] if the configuration cannot be loaded or the constructor rejects
/// it. The previously active backend stays in place.
pub fn load_backend(id: Option<&str>, config: Option<BackendConfig>) -> Result<(), Error> {
    let settings = BackendSettings::from_env(id, config)?;
    let backend = CATALOG.construct(&settings)?;

    info!(backend = settings.id(), "loaded metrics backend");
    ACTIVE.store(Arc::new(ActiveBackend { settings, backend }));
    Ok(())
}

/// Gets the backend that newly built metrics will use.
pub fn active_backend() -> Arc<dyn Backend> {
    Arc::clone(&ACTIVE.load().backend)
}

/// Gets the settings the active backend was loaded with.
pub fn active_backend_settings() -> BackendSettings {
    ACTIVE.load().settings.clone()
}
