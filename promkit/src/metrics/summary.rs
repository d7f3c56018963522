use crate::{timer::Timer, view::View, Error};

/// Tracks the count and sum of observations.
///
/// Quantiles are not computed.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub(super) view: View,
}

impl Summary {
    /// Observes `value`.
    pub fn observe(&self, value: f64) -> Result<(), Error> {
        self.view.record(value)
    }

    /// Starts a timer that observes the elapsed time, in seconds, once stopped or dropped.
    pub fn start_timer(&self) -> Result<Timer, Error> {
        Timer::start(&self.view)
    }

    /// Runs `f` and observes the time it took, in seconds.
    ///
    /// Fails without running `f` if the summary is not observable.
    pub fn time<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> T,
    {
        let _timer = Timer::start(&self.view)?;
        Ok(f())
    }
}
