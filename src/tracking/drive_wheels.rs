use super::Localizer;
use crate::devices::{SharedEncoder, SharedImu};
use crate::holonomic::kinematics::{MecanumKinematics, WheelVelocities};
use crate::holonomic::pose::{Twist2d, Twist2dDual};
use crate::utils::math::angle_error;

/// Odometry from the four drive-wheel encoders.
///
/// The fallback when no dead wheels are fitted: wheel increments run through
/// the forward kinematics for the linear components, while the inertial
/// sensor overrides the integrated rotation (wheel slip makes the
/// encoder-derived value drift far faster than the gyro). The angular rate
/// stays wheel-derived.
pub struct DriveWheelLocalizer {
    wheels: WheelVelocities<SharedEncoder>,
    imu: SharedImu,
    kinematics: MecanumKinematics,
    in_per_tick: f64,

    last_positions: WheelVelocities<i32>,
    last_heading: f64,
    initialized: bool,
}

impl DriveWheelLocalizer {
    pub fn new(
        wheels: WheelVelocities<SharedEncoder>,
        imu: SharedImu,
        kinematics: MecanumKinematics,
        in_per_tick: f64,
    ) -> Self {
        Self {
            wheels,
            imu,
            kinematics,
            in_per_tick,
            last_positions: WheelVelocities {
                front_left: 0,
                back_left: 0,
                back_right: 0,
                front_right: 0,
            },
            last_heading: 0.0,
            initialized: false,
        }
    }
}

impl Localizer for DriveWheelLocalizer {
    fn update(&mut self) -> Twist2dDual {
        let front_left = self.wheels.front_left.borrow().position_and_velocity();
        let back_left = self.wheels.back_left.borrow().position_and_velocity();
        let back_right = self.wheels.back_right.borrow().position_and_velocity();
        let front_right = self.wheels.front_right.borrow().position_and_velocity();
        let heading = self.imu.borrow().heading();

        let positions = WheelVelocities {
            front_left: front_left.position,
            back_left: back_left.position,
            back_right: back_right.position,
            front_right: front_right.position,
        };

        if !self.initialized {
            self.initialized = true;
            self.last_positions = positions;
            self.last_heading = heading;
            return Twist2dDual::zero();
        }

        let increments = WheelVelocities {
            front_left: (positions.front_left - self.last_positions.front_left) as f64
                * self.in_per_tick,
            back_left: (positions.back_left - self.last_positions.back_left) as f64
                * self.in_per_tick,
            back_right: (positions.back_right - self.last_positions.back_right) as f64
                * self.in_per_tick,
            front_right: (positions.front_right - self.last_positions.front_right) as f64
                * self.in_per_tick,
        };
        let rates = WheelVelocities {
            front_left: front_left.velocity * self.in_per_tick,
            back_left: back_left.velocity * self.in_per_tick,
            back_right: back_right.velocity * self.in_per_tick,
            front_right: front_right.velocity * self.in_per_tick,
        };

        let displacement = self.kinematics.forward(increments);
        let velocity = self.kinematics.forward(rates);
        let heading_delta = angle_error(heading, self.last_heading);

        self.last_positions = positions;
        self.last_heading = heading;

        Twist2dDual {
            value: Twist2d {
                linear: displacement.linear,
                angular: heading_delta,
            },
            velocity,
        }
    }
}
