use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    timer::{InProgress, Timer},
    view::View,
    Error,
};

/// A value that can go up and down.
///
/// Gauges track things like queue depths, memory in use, or the number of requests in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Gauge {
    pub(super) view: View,
}

impl Gauge {
    /// Increments the gauge by one.
    pub fn inc(&self) -> Result<(), Error> {
        self.inc_by(1.0)
    }

    /// Increments the gauge by `amount`, which may be negative.
    pub fn inc_by(&self, amount: f64) -> Result<(), Error> {
        self.view.store()?.inc(amount)?;
        Ok(())
    }

    /// Decrements the gauge by one.
    pub fn dec(&self) -> Result<(), Error> {
        self.dec_by(1.0)
    }

    /// Decrements the gauge by `amount`, which may be negative.
    pub fn dec_by(&self, amount: f64) -> Result<(), Error> {
        self.view.store()?.dec(amount)?;
        Ok(())
    }

    /// Sets the gauge to `value`.
    pub fn set(&self, value: f64) -> Result<(), Error> {
        self.view.store()?.set(value)?;
        Ok(())
    }

    /// Sets the gauge to the current Unix time, in seconds.
    pub fn set_to_current_time(&self) -> Result<(), Error> {
        let store = self.view.store()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Error::invalid("system time is before the Unix epoch"))?;
        store.set(now.as_secs_f64())?;
        Ok(())
    }

    /// Gets the current value.
    pub fn get(&self) -> Result<f64, Error> {
        Ok(self.view.store()?.get()?)
    }

    /// Increments the gauge, returning a guard that decrements it again when dropped.
    ///
    /// # Errors
    ///
    /// Fails if the gauge is not observable or the increment fails, in which case no guard is
    /// created and the gauge is unchanged.
    pub fn track_inprogress(&self) -> Result<InProgress, Error> {
        InProgress::enter(&self.view)
    }

    /// Starts a timer that sets the gauge to the elapsed time, in seconds, once stopped or dropped.
    pub fn start_timer(&self) -> Result<Timer, Error> {
        Timer::start(&self.view)
    }

    /// Runs `f`, then sets the gauge to the time it took, in seconds.
    ///
    /// Fails without running `f` if the gauge is not observable. A failure to record the
    /// duration afterwards is logged rather than returned.
    pub fn time<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> T,
    {
        let _timer = Timer::start(&self.view)?;
        Ok(f())
    }
}
