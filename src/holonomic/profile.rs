use nalgebra::Vector2;

use crate::holonomic::pose::{Pose2d, Pose2dDual, Velocity2d};
use crate::utils::math::{angle_error, wrap_angle};

/// A time-parameterized motion target, supplied by a planning collaborator.
///
/// `sample` must be total over `[0, duration]`; callers clamp their queries
/// into that range. A profile is immutable once handed over.
pub trait TimeProfile {
    /// Total run time in seconds.
    fn duration(&self) -> f64;
    /// Target pose with world-frame velocity and acceleration at `t`.
    fn sample(&self, t: f64) -> Pose2dDual;
}

/// Constant-velocity straight line at a fixed heading.
///
/// A bring-up and test fixture, not a planner: velocity steps at the
/// endpoints instead of ramping.
pub struct LineProfile {
    begin: Pose2d,
    direction: Vector2<f64>,
    velocity: f64,
    duration: f64,
}

impl LineProfile {
    pub fn new(begin: Pose2d, end: Vector2<f64>, velocity: f64) -> Self {
        let offset = end - begin.position;
        let direction = offset.try_normalize(1e-12).unwrap_or_else(Vector2::zeros);
        let duration = if velocity > 0.0 {
            offset.norm() / velocity
        } else {
            0.0
        };
        Self {
            begin,
            direction,
            velocity,
            duration,
        }
    }

    pub fn begin(&self) -> Pose2d {
        self.begin
    }

    pub fn end_position(&self) -> Vector2<f64> {
        self.begin.position + self.direction * (self.velocity * self.duration)
    }
}

impl TimeProfile for LineProfile {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn sample(&self, t: f64) -> Pose2dDual {
        let t = t.clamp(0.0, self.duration);
        Pose2dDual {
            value: Pose2d {
                position: self.begin.position + self.direction * (self.velocity * t),
                orientation: self.begin.orientation,
            },
            velocity: Velocity2d {
                linear: self.direction * self.velocity,
                angular: 0.0,
            },
            acceleration: Velocity2d::zero(),
        }
    }
}

/// Constant-rate turn in place toward a target heading, along the shortest
/// signed path. The same fixture caveats as [`LineProfile`] apply.
pub struct TurnProfile {
    begin: Pose2d,
    sweep: f64,
    rate: f64,
    duration: f64,
}

impl TurnProfile {
    pub fn new(begin: Pose2d, target_heading: f64, rate: f64) -> Self {
        let sweep = angle_error(target_heading, begin.orientation);
        let duration = if rate > 0.0 { sweep.abs() / rate } else { 0.0 };
        Self {
            begin,
            sweep,
            rate,
            duration,
        }
    }

    pub fn begin(&self) -> Pose2d {
        self.begin
    }
}

impl TimeProfile for TurnProfile {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn sample(&self, t: f64) -> Pose2dDual {
        let t = t.clamp(0.0, self.duration);
        let angular = if self.sweep == 0.0 {
            0.0 // f64::signum reports 1 at 0
        } else {
            self.sweep.signum() * self.rate
        };
        Pose2dDual {
            value: Pose2d {
                position: self.begin.position,
                orientation: wrap_angle(self.begin.orientation + angular * t),
            },
            velocity: Velocity2d {
                linear: Vector2::zeros(),
                angular,
            },
            acceleration: Velocity2d::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn line_runs_at_constant_velocity() {
        let profile = LineProfile::new(Pose2d::new(0, 0, 0), Vector2::new(30.0, 0.0), 15.0);
        assert_relative_eq!(profile.duration(), 2.0);

        let midpoint = profile.sample(1.0);
        assert_relative_eq!(midpoint.value.position.x, 15.0, epsilon = 1e-12);
        assert_relative_eq!(midpoint.velocity.linear.x, 15.0, epsilon = 1e-12);
        assert_relative_eq!(midpoint.acceleration.linear.x, 0.0);

        let end = profile.sample(5.0);
        assert_relative_eq!(end.value.position.x, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_line_has_zero_duration() {
        let begin = Pose2d::new(4, 4, 1.0);
        let profile = LineProfile::new(begin, begin.position, 20.0);
        assert_relative_eq!(profile.duration(), 0.0);
        let sample = profile.sample(0.0);
        assert_eq!(sample.value, begin);
    }

    #[test]
    fn line_ends_where_it_was_aimed() {
        let profile = LineProfile::new(Pose2d::new(2, -3, 0.5), Vector2::new(14.0, 2.0), 10.0);
        let end = profile.end_position();
        assert_relative_eq!(end.x, 14.0, epsilon = 1e-9);
        assert_relative_eq!(end.y, 2.0, epsilon = 1e-9);

        let terminal = profile.sample(profile.duration()).value.position;
        assert_relative_eq!(end.x, terminal.x);
        assert_relative_eq!(end.y, terminal.y);
    }

    #[test]
    fn turn_takes_the_shortest_path_across_the_seam() {
        let begin = Pose2d::new(0, 0, 170.0f64.to_radians());
        let profile = TurnProfile::new(begin, (-170.0f64).to_radians(), 1.0);
        assert_relative_eq!(
            profile.duration(),
            20.0f64.to_radians(),
            epsilon = 1e-12
        );

        // Counterclockwise through the seam, not the long way around.
        let sample = profile.sample(profile.duration());
        assert_relative_eq!(
            sample.value.orientation,
            (-170.0f64).to_radians(),
            epsilon = 1e-9
        );
        assert_relative_eq!(sample.velocity.angular, 1.0);
    }

    #[test]
    fn settled_turn_has_zero_duration() {
        let begin = Pose2d::new(0, 0, 0.5);
        let profile = TurnProfile::new(begin, 0.5, 2.0);
        assert_relative_eq!(profile.duration(), 0.0);
    }

    #[test]
    fn settled_turn_commands_no_spin() {
        let profile = TurnProfile::new(Pose2d::new(0, 0, 0.5), 0.5, 2.0);
        let sample = profile.sample(0.0);
        assert_relative_eq!(sample.velocity.angular, 0.0);
        assert_relative_eq!(sample.value.orientation, 0.5);
    }
}
