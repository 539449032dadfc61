pub mod drive_wheels;
pub mod three_wheel;
pub mod two_wheel;

pub use drive_wheels::DriveWheelLocalizer;
pub use three_wheel::{ThreeDeadWheelLocalizer, ThreeDeadWheelParams};
pub use two_wheel::{TwoDeadWheelLocalizer, TwoDeadWheelParams};

use crate::holonomic::pose::Twist2dDual;

/// An incremental odometry source.
///
/// A single owner calls [`update`](Localizer::update) exactly once per
/// control cycle; the report covers the displacement since the previous
/// call plus the instantaneous body-frame velocity. The first call only
/// establishes the sensor baseline and reports a zero twist.
pub trait Localizer {
    fn update(&mut self) -> Twist2dDual;
}
