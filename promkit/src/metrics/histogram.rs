use crate::{timer::Timer, view::View, Error};

/// Counts observations into cumulative buckets.
///
/// Every observation is counted in each bucket whose upper bound is greater than or equal to it,
/// as well as in the implicit `+Inf` bucket, and added to a running sum.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub(super) view: View,
}

impl Histogram {
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
    /// Fails without running `f` if the histogram is not observable.
    pub fn time<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> T,
    {
        let _timer = Timer::start(&self.view)?;
        Ok(f())
    }

    /// Gets the bucket upper bounds, excluding `+Inf`.
    pub fn buckets(&self) -> &[f64] {
        self.view.collector().descriptor().buckets()
    }
}
