mod dead_reckoning;
mod history;
mod mock;
mod samples;
mod source;

pub use dead_reckoning::{
    DeadReckoningEstimator, EstimatorError, HISTORY_CAPACITY, HistoryEntry, SampleOrigin,
};
pub use history::HistoryBuffer;
pub use mock::generate as generate_mock_sample;
pub use samples::{ACTUATOR_CHANNELS, ActuatorSample, InertialSample, MILLI_G_TO_MS2};
pub use source::{Clock, InertialSource, MonotonicClock};

#[cfg(test)]
mod tests;
