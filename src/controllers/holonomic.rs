use nalgebra::{Rotation2, Vector2};

use crate::holonomic::pose::{DriveCommand, Pose2d, Pose2dDual, Velocity2d};
use crate::utils::math::angle_error;

/// Proportional gains on pose error and velocity error, split per axis of
/// the target frame.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HolonomicGains {
    pub axial: f64,
    pub lateral: f64,
    pub heading: f64,
    pub axial_vel: f64,
    pub lateral_vel: f64,
    pub heading_vel: f64,
}

impl Default for HolonomicGains {
    fn default() -> Self {
        // Tuned on the reference drivetrain; override per robot.
        Self {
            axial: 7.25,
            lateral: 18.25,
            heading: 9.75,
            axial_vel: 0.525,
            lateral_vel: 0.25,
            heading_vel: 0.05,
        }
    }
}

/// Stateless pose-stabilizing feedback for a holonomic drive.
///
/// Errors are expressed in the target frame so the axial and lateral gains
/// act along and across the profile's direction of travel rather than along
/// the field axes. Under tracking the target frame coincides with the robot
/// frame the command is applied in.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct HolonomicController {
    pub gains: HolonomicGains,
}

impl HolonomicController {
    pub fn new(gains: HolonomicGains) -> Self {
        Self { gains }
    }

    /// One feedback step. `velocity` is the robot-frame velocity reported by
    /// the latest fusion step. Pure function of its arguments; no state is
    /// carried between cycles.
    pub fn compute(
        &self,
        target: &Pose2dDual,
        pose: Pose2d,
        velocity: Velocity2d,
    ) -> DriveCommand {
        let target_pose = target.value;
        let to_target_frame = Rotation2::new(-target_pose.orientation);

        let position_error = to_target_frame * (target_pose.position - pose.position);
        let heading_error = angle_error(target_pose.orientation, pose.orientation);

        let velocity_world = velocity.rotated(pose.orientation);
        let velocity_error = to_target_frame * (target.velocity.linear - velocity_world.linear);

        let target_vel = target.velocity.rotated(-target_pose.orientation);
        let target_accel = target.acceleration.rotated(-target_pose.orientation);

        DriveCommand {
            velocity: Velocity2d {
                linear: Vector2::new(
                    target_vel.linear.x
                        + self.gains.axial * position_error.x
                        + self.gains.axial_vel * velocity_error.x,
                    target_vel.linear.y
                        + self.gains.lateral * position_error.y
                        + self.gains.lateral_vel * velocity_error.y,
                ),
                angular: target.velocity.angular
                    + self.gains.heading * heading_error
                    + self.gains.heading_vel * (target.velocity.angular - velocity.angular),
            },
            acceleration: target_accel,
        }
    }
}
