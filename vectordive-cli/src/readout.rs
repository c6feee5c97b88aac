use std::{array, fmt::Display};

use vectordive_core::{ACTUATOR_CHANNELS, ActuatorSample};

pub const THRUSTER_MIN_PULSE_US: u16 = 1100;
pub const THRUSTER_MAX_PULSE_US: u16 = 1900;
pub const THRUSTER_NEUTRAL_PULSE_US: u16 = 1500;

/// Display value of one thruster channel. A raw value of 0 means the
/// autopilot is not driving the output at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrusterReadout {
    pub channel: usize,
    pub pulse_us: u16,
    /// -100% full reverse, +100% full forward
    pub throttle_percent: f64,
}

impl ThrusterReadout {
    pub fn from_pulse(channel: usize, raw: u16) -> Self {
        if raw == 0 {
            return Self {
                channel,
                pulse_us: 0,
                throttle_percent: 0.0,
            };
        }

        let pulse_us = raw.clamp(THRUSTER_MIN_PULSE_US, THRUSTER_MAX_PULSE_US);
        let half_range = (THRUSTER_MAX_PULSE_US - THRUSTER_NEUTRAL_PULSE_US) as f64;
        let throttle_percent =
            (pulse_us as f64 - THRUSTER_NEUTRAL_PULSE_US as f64) / half_range * 100.0;

        Self {
            channel,
            pulse_us,
            throttle_percent,
        }
    }

    pub fn all(sample: &ActuatorSample) -> [Self; ACTUATOR_CHANNELS] {
        array::from_fn(|i| Self::from_pulse(i, sample.channel(i)))
    }

    pub fn is_active(&self) -> bool {
        self.pulse_us != 0
    }
}

impl Display for ThrusterReadout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_active() {
            write!(f, "T{} {:+.0}%", self.channel + 1, self.throttle_percent)
        } else {
            write!(f, "T{} off", self.channel + 1)
        }
    }
}
