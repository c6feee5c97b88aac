use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::samples::InertialSample;

/// Anything the estimator can pull inertial samples from.
#[async_trait(?Send)]
pub trait InertialSource {
    /// Waits at most `timeout` for a fresh sample. `None` is the normal
    /// "nothing newer yet" case, not an error.
    async fn poll_inertial(&mut self, timeout: Duration) -> Option<InertialSample>;
}

pub trait Clock {
    /// Monotonic time in seconds.
    fn now(&self) -> f64;
}

/// Seconds elapsed since the clock was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
