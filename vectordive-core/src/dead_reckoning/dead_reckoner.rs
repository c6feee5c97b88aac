use nalgebra::Vector3;

use super::EstimatorError;

/// Velocity and position obtained by trapezoidal double integration of
/// acceleration. No orientation is tracked; acceleration is integrated in the
/// frame it is reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadReckoner {
    /// Velocity published to callers (m/s)
    pub velocity: Vector3<f64>,
    /// Position published to callers (m)
    pub position: Vector3<f64>,

    velocity_integral: Vector3<f64>,
    position_integral: Vector3<f64>,
}

impl DeadReckoner {
    pub fn new() -> Self {
        Self {
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            velocity_integral: Vector3::zeros(),
            position_integral: Vector3::zeros(),
        }
    }

    /// Integrates one interval of length `dt` whose end points have
    /// accelerations `last_accel` and `accel`. Returns the next state and
    /// leaves `self` untouched, so a rejected step never corrupts it.
    ///
    /// The position average uses the velocity published before this step,
    /// not the integral before this step. Both are equal whenever the
    /// invariant `velocity == velocity_integral` holds.
    pub fn step(
        &self,
        last_accel: &Vector3<f64>,
        accel: &Vector3<f64>,
        dt: f64,
    ) -> Result<Self, EstimatorError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(EstimatorError::InvalidInterval(dt));
        }

        let avg_acc = (accel + last_accel) / 2.0;
        let velocity_integral = self.velocity_integral + avg_acc * dt;

        let avg_velocity = (velocity_integral + self.velocity) / 2.0;
        let position_integral = self.position_integral + avg_velocity * dt;

        let finite = |v: &Vector3<f64>| v.iter().all(|c| c.is_finite());
        if !finite(&velocity_integral) || !finite(&position_integral) {
            return Err(EstimatorError::NonFiniteState);
        }

        Ok(Self {
            velocity: velocity_integral,
            position: position_integral,
            velocity_integral,
            position_integral,
        })
    }

    pub fn is_consistent(&self) -> bool {
        self.velocity == self.velocity_integral && self.position == self.position_integral
    }
}

impl Default for DeadReckoner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_step() {
        let reckoner = DeadReckoner::new();

        let next = reckoner
            .step(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(3.0, 0.0, -2.0), 0.5)
            .unwrap();

        // avg acc (2, 0, -1), v = (1, 0, -0.5), p = v / 2 * 0.5
        assert_relative_eq!(next.velocity, Vector3::new(1.0, 0.0, -0.5), epsilon = 1e-12);
        assert_relative_eq!(next.position, Vector3::new(0.25, 0.0, -0.125), epsilon = 1e-12);
        assert!(next.is_consistent());
        assert_eq!(reckoner, DeadReckoner::new());
    }

    #[test]
    fn rejects_bad_interval() {
        let reckoner = DeadReckoner::new();
        let a = Vector3::new(1.0, 1.0, 1.0);

        assert_eq!(reckoner.step(&a, &a, 0.0), Err(EstimatorError::InvalidInterval(0.0)));
        assert!(reckoner.step(&a, &a, -0.1).is_err());
        assert!(reckoner.step(&a, &a, f64::NAN).is_err());
    }

    #[test]
    fn rejects_overflow() {
        let reckoner = DeadReckoner::new();
        let huge = Vector3::new(f64::MAX, 0.0, 0.0);

        assert_eq!(
            reckoner.step(&huge, &huge, 10.0),
            Err(EstimatorError::NonFiniteState)
        );
    }
}
