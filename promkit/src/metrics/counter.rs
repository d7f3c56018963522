use tracing::warn;

use crate::{view::View, Error};

/// A value that only ever goes up.
///
/// Counters track things like the number of requests served or errors raised. They start at
/// zero and can only be incremented by positive amounts.
#[derive(Clone, Debug, PartialEq)]
pub struct Counter {
    pub(super) view: View,
}

impl Counter {
    /// Increments the counter by one.
    pub fn inc(&self) -> Result<(), Error> {
        self.inc_by(1.0)
    }

    /// Increments the counter by `amount`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] if `amount` is not strictly positive, with
    /// [`Error::UnobservableMetric`] if required labels are unbound, or with the backend's error.
    /// The counter is left unchanged in every case.
    pub fn inc_by(&self, amount: f64) -> Result<(), Error> {
        let store = self.view.store()?;
        if amount.is_nan() || amount <= 0.0 {
            return Err(Error::invalid(format!(
                "counter `{}` can only be incremented by a positive amount, not {}",
                self.name(),
                amount
            )));
        }

        store.inc(amount)?;
        Ok(())
    }

    /// Gets the current value.
    pub fn get(&self) -> Result<f64, Error> {
        Ok(self.view.store()?.get()?)
    }

    /// Runs `f`, incrementing the counter by one if it returns an error.
    ///
    /// The result of `f` is handed back unchanged. The outer `Result` only fails if the counter
    /// is not observable, in which case `f` is not run at all.
    pub fn count_exceptions<T, E, F>(&self, f: F) -> Result<Result<T, E>, Error>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.count_exceptions_if(|_| true, f)
    }

    /// Runs `f`, incrementing the counter by one if it returns an error matching `filter`.
    ///
    /// See [`count_exceptions`](Counter::count_exceptions).
    pub fn count_exceptions_if<T, E, P, F>(&self, filter: P, f: F) -> Result<Result<T, E>, Error>
    where
        P: FnOnce(&E) -> bool,
        F: FnOnce() -> Result<T, E>,
    {
        let store = self.view.store()?;

        let result = f();
        if let Err(e) = &result {
            if filter(e) {
                if let Err(err) = store.inc(1.0) {
                    warn!(metric = self.name(), error = %err, "failed to count exception");
                }
            }
        }
        Ok(result)
    }
}
