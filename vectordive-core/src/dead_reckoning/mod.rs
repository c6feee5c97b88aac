mod dead_reckoner;

use std::time::Duration;

use log::{debug, error, trace};
use nalgebra::Vector3;
use thiserror::Error;

use crate::{
    dead_reckoning::dead_reckoner::DeadReckoner,
    history::HistoryBuffer,
    mock,
    samples::InertialSample,
    source::{Clock, InertialSource, MonotonicClock},
};

pub const HISTORY_CAPACITY: usize = 100;
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

pub type HistoryEntry = (Vector3<f64>, f64);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("sample acceleration is not finite: {0:?}")]
    NonFiniteSample(Vector3<f64>),
    #[error("clock reading is not finite: {0}")]
    NonFiniteTime(f64),
    #[error("integration interval must be positive, got {0}")]
    InvalidInterval(f64),
    #[error("integration produced a non-finite state")]
    NonFiniteState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrigin {
    Live,
    Mock,
}

/// Previous sample and the time it was consumed. Both are set together or
/// not at all.
#[derive(Debug, Clone)]
struct Reference {
    sample: InertialSample,
    time: f64,
}

enum Step {
    Primed,
    Skipped { dt: f64 },
    Integrated,
}

/// Turns a stream of inertial samples into a running position/velocity
/// estimate. Every `update()` pulls one sample from `source`, substituting
/// the mock generator when nothing fresh is available, so the estimate keeps
/// moving even without a vehicle.
pub struct DeadReckoningEstimator<S: InertialSource, C: Clock = MonotonicClock> {
    source: S,
    clock: C,
    poll_timeout: Duration,

    reckoner: DeadReckoner,
    reference: Option<Reference>,
    last_origin: Option<SampleOrigin>,

    position_history: HistoryBuffer<Vector3<f64>, HISTORY_CAPACITY>,
    velocity_history: HistoryBuffer<Vector3<f64>, HISTORY_CAPACITY>,
}

impl<S: InertialSource> DeadReckoningEstimator<S, MonotonicClock> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, MonotonicClock::new())
    }
}

impl<S: InertialSource, C: Clock> DeadReckoningEstimator<S, C> {
    pub fn with_clock(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            reckoner: DeadReckoner::new(),
            reference: None,
            last_origin: None,
            position_history: HistoryBuffer::new(),
            velocity_history: HistoryBuffer::new(),
        }
    }

    /// How long `update()` waits for a live sample before using mock data.
    pub fn set_poll_timeout(&mut self, timeout: Duration) {
        self.poll_timeout = timeout;
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// One estimator tick. Never fails: a step that cannot be integrated is
    /// logged and leaves the state as it was.
    ///
    /// Returns the position history; each entry carries the time it was
    /// recorded at.
    pub async fn update(&mut self) -> &HistoryBuffer<Vector3<f64>, HISTORY_CAPACITY> {
        let polled = self.source.poll_inertial(self.poll_timeout).await;
        let now = self.clock.now();

        let (sample, origin) = match polled {
            Some(sample) => (sample, SampleOrigin::Live),
            None => (mock::generate(now), SampleOrigin::Mock),
        };
        self.last_origin = Some(origin);

        match self.integrate(sample, now) {
            Ok(Step::Primed) => debug!("reference sample recorded at {:.3}s", now),
            Ok(Step::Skipped { dt }) => trace!("skipping non-positive interval {}", dt),
            Ok(Step::Integrated) => trace!(
                "[{:.3}] {:?} p={:?} v={:?}",
                now,
                origin,
                self.reckoner.position,
                self.reckoner.velocity
            ),
            Err(e) => error!("dead reckoning step failed: {}", e),
        }

        &self.position_history
    }

    fn integrate(&mut self, sample: InertialSample, now: f64) -> Result<Step, EstimatorError> {
        if !now.is_finite() {
            return Err(EstimatorError::NonFiniteTime(now));
        }
        if !sample.is_finite() {
            return Err(EstimatorError::NonFiniteSample(sample.accel));
        }

        let Some(reference) = &self.reference else {
            self.reference = Some(Reference { sample, time: now });
            return Ok(Step::Primed);
        };

        let dt = now - reference.time;
        if dt <= 0.0 {
            return Ok(Step::Skipped { dt });
        }

        let next = self
            .reckoner
            .step(&reference.sample.accel, &sample.accel, dt)?;
        debug_assert!(next.is_consistent());

        self.reckoner = next;
        self.position_history.push(self.reckoner.position, now);
        self.velocity_history.push(self.reckoner.velocity, now);
        self.reference = Some(Reference { sample, time: now });

        Ok(Step::Integrated)
    }

    pub fn get_current_position(&self) -> Vector3<f64> {
        self.reckoner.position
    }

    pub fn get_current_velocity(&self) -> Vector3<f64> {
        self.reckoner.velocity
    }

    pub fn position_history(&self) -> &HistoryBuffer<Vector3<f64>, HISTORY_CAPACITY> {
        &self.position_history
    }

    pub fn velocity_history(&self) -> &HistoryBuffer<Vector3<f64>, HISTORY_CAPACITY> {
        &self.velocity_history
    }

    /// Where the sample consumed by the most recent `update()` came from.
    pub fn last_sample_origin(&self) -> Option<SampleOrigin> {
        self.last_origin
    }

    /// Time of the reference sample the next update integrates against.
    pub fn last_time(&self) -> Option<f64> {
        self.reference.as_ref().map(|r| r.time)
    }

    pub fn last_sample(&self) -> Option<&InertialSample> {
        self.reference.as_ref().map(|r| &r.sample)
    }

    /// Zeroes the estimate and forgets the reference sample. The next
    /// `update()` behaves like the first one.
    pub fn reset_integration(&mut self) {
        self.reckoner = DeadReckoner::new();
        self.position_history.clear();
        self.velocity_history.clear();
        self.reference = None;
        debug!("integration reset");
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
