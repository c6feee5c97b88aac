use std::{cell::Cell, collections::VecDeque, rc::Rc, time::Duration};

use async_trait::async_trait;
use log::LevelFilter;
use nalgebra::Vector3;

use crate::{Clock, InertialSample, InertialSource};

pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter(Some("vectordive_core"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

pub fn accel_sample(x: f64, y: f64, z: f64) -> InertialSample {
    InertialSample::new(Vector3::new(x, y, z), Vector3::zeros(), Vector3::zeros(), 0.0)
}

/// Replays a fixed script; `None` entries and an exhausted script both
/// report "no fresh sample".
#[derive(Default)]
pub struct ScriptedSource {
    script: VecDeque<Option<InertialSample>>,
    pub polls: usize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Option<InertialSample>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            polls: 0,
        }
    }

    pub fn repeat(sample: InertialSample, n: usize) -> Self {
        Self::new(std::iter::repeat_n(Some(sample), n))
    }
}

#[async_trait(?Send)]
impl InertialSource for ScriptedSource {
    async fn poll_inertial(&mut self, _timeout: Duration) -> Option<InertialSample> {
        self.polls += 1;
        self.script.pop_front().flatten()
    }
}

/// Clock whose reading is set by the test.
#[derive(Clone, Default)]
pub struct SteppedClock(Rc<Cell<f64>>);

impl SteppedClock {
    pub fn set(&self, t: f64) {
        self.0.set(t);
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}
