use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use super::{Backend, BackendConfig, StoreKey, ValueStore};
use crate::BackendError;

/// Process-local storage.
///
/// Every store is an [`AtomicValue`], so all observations are lock-free and visible to every
/// thread of the process. Accepts, and ignores, any configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryBackend;

impl MemoryBackend {
    /// Creates a new `MemoryBackend`.
    pub fn new() -> Self {
        Self
    }

    /// Constructs the backend from its configuration, for use in a
    /// [`BackendCatalog`](super::BackendCatalog).
    pub fn from_config(_config: &BackendConfig) -> Result<Arc<dyn Backend>, BackendError> {
        Ok(Arc::new(Self))
    }
}

impl Backend for MemoryBackend {
    fn create_store(&self, _key: &StoreKey<'_>) -> Result<Arc<dyn ValueStore>, BackendError> {
        Ok(Arc::new(AtomicValue::new(0.0)))
    }
}

/// An `f64` stored as its bit pattern in an `AtomicU64`.
#[derive(Debug, Default)]
pub struct AtomicValue(AtomicU64);

impl AtomicValue {
    /// Creates a new `AtomicValue` holding `value`.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Loads the current value.
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn add(&self, value: f64) {
        // The closure never declines, so `fetch_update` retries until the exchange succeeds.
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Relaxed, |curr| {
            let input = f64::from_bits(curr);
            let output = input + value;
            Some(output.to_bits())
        });
    }
}

impl ValueStore for AtomicValue {
    fn inc(&self, value: f64) -> Result<(), BackendError> {
        self.add(value);
        Ok(())
    }

    fn dec(&self, value: f64) -> Result<(), BackendError> {
        self.add(-value);
        Ok(())
    }

    fn set(&self, value: f64) -> Result<(), BackendError> {
        let _ = self.0.swap(value.to_bits(), Ordering::AcqRel);
        Ok(())
    }

    fn get(&self) -> Result<f64, BackendError> {
        Ok(self.load())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::AtomicValue;
    use crate::backend::ValueStore;

    #[test]
    fn basic_operations() {
        let value = AtomicValue::new(0.0);
        value.inc(2.5).unwrap();
        value.dec(1.0).unwrap();
        assert_eq!(value.get().unwrap(), 1.5);

        value.dec(-0.5).unwrap();
        assert_eq!(value.get().unwrap(), 2.0);

        value.set(-7.25).unwrap();
        assert_eq!(value.load(), -7.25);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let value = Arc::new(AtomicValue::default());

        let handles = (0..8)
            .map(|_| {
                let value = Arc::clone(&value);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        value.inc(1.0).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().expect("incrementing thread panicked");
        }

        assert_eq!(value.load(), 80_000.0);
    }
}
