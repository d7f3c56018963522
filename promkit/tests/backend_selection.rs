use std::{
    env, fs,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use promkit::{
    backend::{
        active_backend_settings, load_backend, register_backend, AtomicValue, Backend,
        BackendConfig, StoreKey, ValueStore, BACKEND_CONFIG_ENV_VAR, BACKEND_ENV_VAR,
    },
    BackendError, Counter, Error,
};

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
static STORES: AtomicUsize = AtomicUsize::new(0);

struct TrackingBackend;

impl Backend for TrackingBackend {
    fn create_store(&self, _key: &StoreKey<'_>) -> Result<Arc<dyn ValueStore>, BackendError> {
        STORES.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(AtomicValue::new(0.0)))
    }
}

#[test]
fn backend_is_selected_from_arguments_then_environment() {
    register_backend("tracking", |config| {
        if config.get("namespace").and_then(|v| v.as_str()).is_none() {
            return Err(BackendError::new("`namespace` is required"));
        }
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(TrackingBackend) as Arc<dyn Backend>)
    });

    assert_eq!(active_backend_settings().id(), "memory");

    let err = load_backend(Some("nope"), None).unwrap_err();
    assert!(matches!(err, Error::UnknownBackend(id) if id == "nope"));
    let err = load_backend(Some("tracking"), Some(BackendConfig::new())).unwrap_err();
    assert!(matches!(err, Error::InvalidBackendConfig(_)));
    assert_eq!(active_backend_settings().id(), "memory");

    let path = env::temp_dir().join(format!("promkit-backend-{}.json", std::process::id()));
    fs::write(&path, r#"{"namespace": "test"}"#).unwrap();
    env::set_var(BACKEND_ENV_VAR, "tracking");
    env::set_var(BACKEND_CONFIG_ENV_VAR, &path);

    load_backend(None, None).unwrap();
    let settings = active_backend_settings();
    assert_eq!(settings.id(), "tracking");
    assert_eq!(settings.config().get("namespace").and_then(|v| v.as_str()), Some("test"));
    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);

    // Metrics built from now on store their values in the loaded backend.
    let counter = Counter::builder("loaded_total", "Loaded.").unregistered().build().unwrap();
    counter.inc().unwrap();
    assert_eq!(STORES.load(Ordering::SeqCst), 1);

    // Explicit arguments win over the environment.
    load_backend(Some("memory"), Some(BackendConfig::new())).unwrap();
    assert_eq!(active_backend_settings().id(), "memory");
    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);

    Counter::builder("memory_total", "In memory.").unregistered().build().unwrap();
    assert_eq!(STORES.load(Ordering::SeqCst), 1);

    fs::write(&path, "[]").unwrap();
    let err = load_backend(None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidBackendConfig(_)));
    assert_eq!(active_backend_settings().id(), "memory");

    env::remove_var(BACKEND_ENV_VAR);
    env::remove_var(BACKEND_CONFIG_ENV_VAR);
    let _ = fs::remove_file(&path);
}
