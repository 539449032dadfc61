use core::fmt;
use core::ops::{Add, Sub};

use nalgebra::{Rotation2, Vector2};
use num_traits::AsPrimitive;

use crate::utils::math::{angle_error, wrap_angle};

/// Field-frame position and heading. Heading stays normalized to `(-π, π]`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pose2d {
    pub position: Vector2<f64>,
    pub orientation: f64,
}

impl Pose2d {
    pub fn new<T: AsPrimitive<f64>, U: AsPrimitive<f64>, V: AsPrimitive<f64>>(
        x: T,
        y: U,
        orientation: V,
    ) -> Self {
        Self {
            position: Vector2::<f64>::new(x.as_(), y.as_()),
            orientation: orientation.as_(),
        }
    }

    pub fn distance_to(&self, pose: &Self) -> f64 {
        self.position.metric_distance(&pose.position)
    }

    /// Integrates a body-frame displacement over one cycle.
    ///
    /// Treats the twist as a constant-curvature arc, so the chord the robot
    /// actually traveled is recovered before rotating it into the field
    /// frame. Small rotations fall back to the series expansion of the
    /// arc-chord factors.
    pub fn plus(self, twist: Twist2d) -> Self {
        let theta = twist.angular;
        let (s, c) = if theta.abs() < 1e-6 {
            (1.0 - theta * theta / 6.0, theta / 2.0)
        } else {
            (theta.sin() / theta, (1.0 - theta.cos()) / theta)
        };
        let chord = Vector2::new(
            s * twist.linear.x - c * twist.linear.y,
            c * twist.linear.x + s * twist.linear.y,
        );
        Self {
            position: self.position + Rotation2::new(self.orientation) * chord,
            orientation: wrap_angle(self.orientation + theta),
        }
    }

    /// Expresses this pose in `other`'s frame: the translational offset is
    /// rotated into `other`'s heading and the heading offset is wrapped to
    /// the shortest signed angle.
    pub fn relative_to(self, other: Pose2d) -> Pose2d {
        Pose2d {
            position: Rotation2::new(-other.orientation) * (self.position - other.position),
            orientation: angle_error(self.orientation, other.orientation),
        }
    }
}

impl fmt::Display for Pose2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.1}°)",
            self.position.x,
            self.position.y,
            self.orientation.to_degrees()
        )
    }
}

/// Body-frame displacement integrated over one cycle.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Twist2d {
    pub linear: Vector2<f64>,
    pub angular: f64,
}

impl Twist2d {
    pub fn zero() -> Self {
        Self {
            linear: Vector2::zeros(),
            angular: 0.0,
        }
    }
}

/// Instantaneous rate: linear velocity plus angular velocity. The frame it
/// is expressed in depends on the producer and is documented at each use.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Velocity2d {
    pub linear: Vector2<f64>,
    pub angular: f64,
}

impl Velocity2d {
    pub fn new<T: AsPrimitive<f64>, U: AsPrimitive<f64>, V: AsPrimitive<f64>>(
        x: T,
        y: U,
        angular: V,
    ) -> Self {
        Self {
            linear: Vector2::<f64>::new(x.as_(), y.as_()),
            angular: angular.as_(),
        }
    }

    pub fn zero() -> Self {
        Self {
            linear: Vector2::zeros(),
            angular: 0.0,
        }
    }

    /// The same rate with the linear part rotated by `angle`.
    pub fn rotated(self, angle: f64) -> Self {
        Self {
            linear: Rotation2::new(angle) * self.linear,
            angular: self.angular,
        }
    }
}

impl Add for Velocity2d {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            linear: self.linear + rhs.linear,
            angular: self.angular + rhs.angular,
        }
    }
}

impl Sub for Velocity2d {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            linear: self.linear - rhs.linear,
            angular: self.angular - rhs.angular,
        }
    }
}

/// A localizer report: the displacement since the previous cycle paired with
/// the instantaneous body-frame velocity.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Twist2dDual {
    pub value: Twist2d,
    pub velocity: Velocity2d,
}

impl Twist2dDual {
    pub fn zero() -> Self {
        Self {
            value: Twist2d::zero(),
            velocity: Velocity2d::zero(),
        }
    }
}

/// A profile sample: target pose with its field-frame velocity and
/// acceleration.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pose2dDual {
    pub value: Pose2d,
    pub velocity: Velocity2d,
    pub acceleration: Velocity2d,
}

impl Pose2dDual {
    /// A stationary target: hold `pose` with zero velocity and acceleration.
    pub fn constant(pose: Pose2d) -> Self {
        Self {
            value: pose,
            velocity: Velocity2d::zero(),
            acceleration: Velocity2d::zero(),
        }
    }
}

/// A feedback command in the robot frame, ready for wheel-space projection.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DriveCommand {
    pub velocity: Velocity2d,
    pub acceleration: Velocity2d,
}

impl DriveCommand {
    pub fn zero() -> Self {
        Self {
            velocity: Velocity2d::zero(),
            acceleration: Velocity2d::zero(),
        }
    }
}
