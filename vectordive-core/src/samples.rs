use nalgebra::Vector3;

/// m/s^2 per milli-g, the unit RAW_IMU reports acceleration in
pub const MILLI_G_TO_MS2: f64 = 0.00981;

pub const ACTUATOR_CHANNELS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct InertialSample {
    /// m/s^2
    pub accel: Vector3<f64>,
    /// mrad/s, as reported on the wire
    pub gyro: Vector3<f64>,
    /// milligauss, as reported on the wire
    pub mag: Vector3<f64>,
    /// s
    pub timestamp: f64,
}

impl InertialSample {
    pub fn new(accel: Vector3<f64>, gyro: Vector3<f64>, mag: Vector3<f64>, timestamp: f64) -> Self {
        Self {
            accel,
            gyro,
            mag,
            timestamp,
        }
    }

    /// Builds a sample from raw RAW_IMU fields. Acceleration is converted from
    /// milli-g to m/s^2, `time_usec` to seconds.
    pub fn from_raw(acc: [i16; 3], gyro: [i16; 3], mag: [i16; 3], time_usec: u64) -> Self {
        let to_vector = |v: [i16; 3]| Vector3::new(v[0] as f64, v[1] as f64, v[2] as f64);

        Self {
            accel: to_vector(acc) * MILLI_G_TO_MS2,
            gyro: to_vector(gyro),
            mag: to_vector(mag),
            timestamp: time_usec as f64 / 1_000_000.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.accel.iter().all(|a| a.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorSample {
    /// raw servo output per channel, usually a pulse width in us
    pub outputs: [u16; ACTUATOR_CHANNELS],
}

impl ActuatorSample {
    pub fn new(outputs: [u16; ACTUATOR_CHANNELS]) -> Self {
        Self { outputs }
    }

    pub fn channel(&self, index: usize) -> u16 {
        self.outputs.get(index).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn raw_acceleration_is_converted_to_si() {
        let sample = InertialSample::from_raw([1000, -500, 0], [1, 2, 3], [4, 5, 6], 2_500_000);

        assert_relative_eq!(sample.accel, Vector3::new(9.81, -4.905, 0.0), epsilon = 1e-9);
        assert_eq!(sample.gyro, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.mag, Vector3::new(4.0, 5.0, 6.0));
        assert_relative_eq!(sample.timestamp, 2.5);
    }

    #[test]
    fn out_of_range_channel_reads_zero() {
        let sample = ActuatorSample::new([1100, 1200, 1300, 1400, 1500, 1600]);
        assert_eq!(sample.channel(5), 1600);
        assert_eq!(sample.channel(6), 0);
        assert_eq!(ActuatorSample::default().outputs, [0; ACTUATOR_CHANNELS]);
    }

    #[test]
    fn nan_acceleration_is_not_finite() {
        let mut sample = InertialSample::from_raw([0; 3], [0; 3], [0; 3], 0);
        assert!(sample.is_finite());
        sample.accel.y = f64::NAN;
        assert!(!sample.is_finite());
    }
}
