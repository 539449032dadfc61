use nalgebra::Vector2;

use crate::holonomic::pose::{DriveCommand, Velocity2d};

/// Per-wheel quantities, named in drive order.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WheelVelocities<T> {
    pub front_left: T,
    pub back_left: T,
    pub back_right: T,
    pub front_right: T,
}

impl<T> WheelVelocities<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> WheelVelocities<U> {
        WheelVelocities {
            front_left: f(self.front_left),
            back_left: f(self.back_left),
            back_right: f(self.back_right),
            front_right: f(self.front_right),
        }
    }
}

/// Velocity and acceleration of one wheel's contact surface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WheelMotion {
    pub velocity: f64,
    pub acceleration: f64,
}

/// Mecanum drive geometry: effective track width (the combined wheelbase
/// term that scales turning) and the lateral multiplier compensating roller
/// slip when strafing. Pure functions of geometry, no state.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MecanumKinematics {
    pub track_width: f64,
    pub lateral_multiplier: f64,
}

impl MecanumKinematics {
    pub fn new(track_width: f64, lateral_multiplier: f64) -> Self {
        Self {
            track_width,
            lateral_multiplier,
        }
    }

    /// Projects a robot-frame velocity onto the four wheel surface speeds.
    pub fn inverse(&self, vel: Velocity2d) -> WheelVelocities<f64> {
        let x = vel.linear.x;
        let y = vel.linear.y * self.lateral_multiplier;
        let turn = vel.angular * self.track_width;
        WheelVelocities {
            front_left: x - y - turn,
            back_left: x + y - turn,
            back_right: x - y + turn,
            front_right: x + y + turn,
        }
    }

    /// The inverse projection applied to velocity and acceleration together.
    pub fn inverse_dual(&self, command: DriveCommand) -> WheelVelocities<WheelMotion> {
        let vel = self.inverse(command.velocity);
        let accel = self.inverse(command.acceleration);
        WheelVelocities {
            front_left: WheelMotion {
                velocity: vel.front_left,
                acceleration: accel.front_left,
            },
            back_left: WheelMotion {
                velocity: vel.back_left,
                acceleration: accel.back_left,
            },
            back_right: WheelMotion {
                velocity: vel.back_right,
                acceleration: accel.back_right,
            },
            front_right: WheelMotion {
                velocity: vel.front_right,
                acceleration: accel.front_right,
            },
        }
    }

    /// Recovers the robot-frame velocity from four wheel speeds.
    ///
    /// Least-squares pseudo-inverse of [`Self::inverse`]: exact on wheel
    /// speeds that are kinematically consistent, the best fit otherwise.
    pub fn forward(&self, wheels: WheelVelocities<f64>) -> Velocity2d {
        let WheelVelocities {
            front_left,
            back_left,
            back_right,
            front_right,
        } = wheels;
        Velocity2d {
            linear: Vector2::new(
                0.25 * (front_left + back_left + back_right + front_right),
                0.25 * (-front_left + back_left - back_right + front_right)
                    / self.lateral_multiplier,
            ),
            angular: 0.25 * (-front_left - back_left + back_right + front_right)
                / self.track_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::Rng;

    use super::*;

    #[test]
    fn strafe_sign_pattern() {
        let kinematics = MecanumKinematics::new(1.0, 1.0);
        let wheels = kinematics.inverse(Velocity2d::new(0, 1, 0));
        assert_relative_eq!(wheels.front_left, -1.0);
        assert_relative_eq!(wheels.back_left, 1.0);
        assert_relative_eq!(wheels.back_right, -1.0);
        assert_relative_eq!(wheels.front_right, 1.0);
    }

    #[test]
    fn turn_sign_pattern() {
        let kinematics = MecanumKinematics::new(8.0, 1.0);
        let wheels = kinematics.inverse(Velocity2d::new(0, 0, 0.5));
        assert_relative_eq!(wheels.front_left, -4.0);
        assert_relative_eq!(wheels.back_left, -4.0);
        assert_relative_eq!(wheels.back_right, 4.0);
        assert_relative_eq!(wheels.front_right, 4.0);
    }

    #[test]
    fn forward_undoes_inverse() {
        let kinematics = MecanumKinematics::new(13.8, 1.08);
        let mut rng = rand::rng();
        for _ in 0..200 {
            let vel = Velocity2d::new(
                rng.random_range(-60.0..60.0),
                rng.random_range(-60.0..60.0),
                rng.random_range(-4.0..4.0),
            );
            let back = kinematics.forward(kinematics.inverse(vel));
            assert_relative_eq!(back.linear.x, vel.linear.x, epsilon = 1e-9);
            assert_relative_eq!(back.linear.y, vel.linear.y, epsilon = 1e-9);
            assert_relative_eq!(back.angular, vel.angular, epsilon = 1e-9);
        }
    }

    #[test]
    fn inverse_undoes_forward_on_consistent_wheels() {
        let kinematics = MecanumKinematics::new(10.0, 1.2);
        let wheels = kinematics.inverse(Velocity2d::new(20, -12, 1.5));
        let back = kinematics.inverse(kinematics.forward(wheels));
        assert_relative_eq!(back.front_left, wheels.front_left, epsilon = 1e-9);
        assert_relative_eq!(back.back_left, wheels.back_left, epsilon = 1e-9);
        assert_relative_eq!(back.back_right, wheels.back_right, epsilon = 1e-9);
        assert_relative_eq!(back.front_right, wheels.front_right, epsilon = 1e-9);
    }

    #[test]
    fn dual_projection_maps_both_derivatives() {
        let kinematics = MecanumKinematics::new(6.0, 1.0);
        let command = DriveCommand {
            velocity: Velocity2d::new(10, 0, 0),
            acceleration: Velocity2d::new(0, 0, 1),
        };
        let wheels = kinematics.inverse_dual(command);
        assert_relative_eq!(wheels.front_left.velocity, 10.0);
        assert_relative_eq!(wheels.front_left.acceleration, -6.0);
        assert_relative_eq!(wheels.front_right.velocity, 10.0);
        assert_relative_eq!(wheels.front_right.acceleration, 6.0);
    }
}
