use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;

use crate::{
    backend::{AtomicValue, Backend, StoreKey, ValueStore},
    BackendError,
};

/// A memory backend that keeps track of every store it creates.
#[derive(Default)]
pub(crate) struct CountingBackend {
    created: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl CountingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Store keys rendered as `metric{label=value,...}:discriminator`.
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().clone()
    }
}

impl Backend for CountingBackend {
    fn create_store(&self, key: &StoreKey<'_>) -> Result<Arc<dyn ValueStore>, BackendError> {
        self.created.fetch_add(1, Ordering::SeqCst);

        let labels =
            key.labels().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join(",");
        let mut rendered = format!("{}{{{}}}", key.metric().name(), labels);
        if let Some(discriminator) = key.discriminator() {
            rendered.push(':');
            rendered.push_str(discriminator);
        }
        self.keys.lock().push(rendered);

        Ok(Arc::new(AtomicValue::new(0.0)))
    }
}

/// A backend whose stores start failing once `fail` is flipped, like a remote store going away.
#[derive(Default)]
pub(crate) struct UnreliableBackend {
    fail: Arc<AtomicBool>,
}

impl UnreliableBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Backend for UnreliableBackend {
    fn create_store(&self, _key: &StoreKey<'_>) -> Result<Arc<dyn ValueStore>, BackendError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        Ok(Arc::new(UnreliableStore { fail: Arc::clone(&self.fail), inner: AtomicValue::new(0.0) }))
    }
}

struct UnreliableStore {
    fail: Arc<AtomicBool>,
    inner: AtomicValue,
}

impl UnreliableStore {
    fn check(&self) -> Result<(), BackendError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(unreachable_store())
        } else {
            Ok(())
        }
    }
}

impl ValueStore for UnreliableStore {
    fn inc(&self, value: f64) -> Result<(), BackendError> {
        self.check()?;
        self.inner.inc(value)
    }

    fn dec(&self, value: f64) -> Result<(), BackendError> {
        self.check()?;
        self.inner.dec(value)
    }

    fn set(&self, value: f64) -> Result<(), BackendError> {
        self.check()?;
        self.inner.set(value)
    }

    fn get(&self) -> Result<f64, BackendError> {
        self.check()?;
        self.inner.get()
    }
}

fn unreachable_store() -> BackendError {
    BackendError::new(io::Error::new(io::ErrorKind::ConnectionRefused, "store unreachable"))
}
