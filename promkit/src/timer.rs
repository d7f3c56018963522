//! Scoped measurement guards.
use std::time::Duration;

use quanta::Instant;
use tracing::warn;

use crate::{view::View, Error};

/// Measures the time elapsed since its creation, in seconds, and records it exactly once.
///
/// Created by `start_timer` on gauges, histograms and summaries. The duration is recorded when
/// the timer is [stopped](Timer::stop) or, failing that, when it is dropped, including while
/// unwinding. Gauges are set to the duration; histograms and summaries observe it.
#[must_use = "dropping a timer immediately records a near-zero duration"]
#[derive(Debug)]
pub struct Timer {
    view: View,
    start: Instant,
    done: bool,
}

impl Timer {
    pub(crate) fn start(view: &View) -> Result<Self, Error> {
        // Fail now rather than at the end of the measured section.
        view.child()?;
        let start = view.collector().clock().now();
        Ok(Self { view: view.clone(), start, done: false })
    }

    /// Gets the time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.view.collector().clock().now().duration_since(self.start)
    }

    /// Records the elapsed time, returning it in seconds.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the duration could not be recorded. The timer is consumed
    /// either way.
    pub fn stop(mut self) -> Result<f64, Error> {
        self.done = true;
        let elapsed = self.elapsed().as_secs_f64();
        self.view.record(elapsed)?;
        Ok(elapsed)
    }

    /// Consumes the timer without recording anything.
    pub fn discard(mut self) {
        self.done = true;
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.done {
            return;
        }

        let elapsed = self.elapsed().as_secs_f64();
        if let Err(e) = self.view.record(elapsed) {
            warn!(metric = self.view.name(), error = %e, "failed to record timer duration");
        }
    }
}

/// Tracks an in-progress operation on a gauge.
///
/// The gauge was incremented when the guard was created, and is decremented when the guard is
/// dropped, including while unwinding.
#[must_use = "dropping the guard immediately ends the tracked operation"]
#[derive(Debug)]
pub struct InProgress {
    view: View,
}

impl InProgress {
    pub(crate) fn enter(view: &View) -> Result<Self, Error> {
        view.store()?.inc(1.0)?;
        Ok(Self { view: view.clone() })
    }
}

impl Drop for InProgress {
    fn drop(&mut self) {
        let result = self.view.store().and_then(|store| store.dec(1.0).map_err(Error::from));
        if let Err(e) = result {
            warn!(metric = self.view.name(), error = %e, "failed to end in-progress tracking");
        }
    }
}
