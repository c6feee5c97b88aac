use nalgebra::Vector3;

use crate::samples::InertialSample;

/// Synthetic inertial sample used whenever no live telemetry is available.
/// Each axis is a fixed sum of a sine and a cosine of `elapsed` (s).
pub fn generate(elapsed: f64) -> InertialSample {
    let t = elapsed;
    let accel = Vector3::new(
        0.5 * (t * 0.5).sin() + 0.2 * (t * 0.3).cos(),
        0.3 * (t * 0.4).sin() + 0.1 * (t * 0.6).cos(),
        0.1 * (t * 0.2).sin() + 0.05 * (t * 0.8).cos(),
    );

    InertialSample::new(accel, Vector3::zeros(), Vector3::zeros(), t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deterministic() {
        assert_eq!(generate(12.34), generate(12.34));
    }

    #[test]
    fn values_at_zero() {
        let sample = generate(0.0);
        assert_relative_eq!(sample.accel, Vector3::new(0.2, 0.1, 0.05), epsilon = 1e-12);
        assert_eq!(sample.gyro, Vector3::zeros());
        assert_eq!(sample.mag, Vector3::zeros());
        assert_eq!(sample.timestamp, 0.0);
    }

    #[test]
    fn axes_differ() {
        let sample = generate(3.0);
        assert!(sample.accel.x != sample.accel.y);
        assert!(sample.accel.y != sample.accel.z);
        assert_eq!(sample.timestamp, 3.0);
    }
}
