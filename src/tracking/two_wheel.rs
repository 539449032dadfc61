use core::f64::consts::{PI, TAU};

use log::trace;
use nalgebra::Vector2;

use super::Localizer;
use crate::devices::{SharedEncoder, SharedImu};
use crate::holonomic::pose::{Twist2d, Twist2dDual, Velocity2d};
use crate::utils::math::angle_error;

/// Mounting offsets of the two dead wheels, in encoder ticks.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct TwoDeadWheelParams {
    /// Y offset of the parallel wheel from the rotation center.
    pub par_y_ticks: f64,
    /// X offset of the perpendicular wheel from the rotation center.
    pub perp_x_ticks: f64,
}

/// Odometry from one parallel wheel, one perpendicular wheel and an
/// inertial sensor.
///
/// The inertial sensor is authoritative for the angular component; the
/// encoders supply the linear components after the mounting-offset
/// contribution of the rotation is subtracted out.
pub struct TwoDeadWheelLocalizer {
    par: SharedEncoder,
    perp: SharedEncoder,
    imu: SharedImu,
    params: TwoDeadWheelParams,
    in_per_tick: f64,

    last_par_pos: i32,
    last_perp_pos: i32,
    last_heading: f64,
    last_raw_heading_vel: f64,
    heading_vel_offset: f64,
    initialized: bool,
}

impl TwoDeadWheelLocalizer {
    pub fn new(
        par: SharedEncoder,
        perp: SharedEncoder,
        imu: SharedImu,
        params: TwoDeadWheelParams,
        in_per_tick: f64,
    ) -> Self {
        Self {
            par,
            perp,
            imu,
            params,
            in_per_tick,
            last_par_pos: 0,
            last_perp_pos: 0,
            last_heading: 0.0,
            last_raw_heading_vel: 0.0,
            heading_vel_offset: 0.0,
            initialized: false,
        }
    }
}

impl Localizer for TwoDeadWheelLocalizer {
    fn update(&mut self) -> Twist2dDual {
        let par = self.par.borrow().position_and_velocity();
        let perp = self.perp.borrow().position_and_velocity();
        let heading = self.imu.borrow().heading();

        // The sensor reports a wrapped angular rate; accumulate the full
        // turns it drops so the velocity stays continuous.
        let raw_heading_vel = self.imu.borrow().heading_velocity();
        if (raw_heading_vel - self.last_raw_heading_vel).abs() > PI {
            self.heading_vel_offset -= raw_heading_vel.signum() * TAU;
        }
        self.last_raw_heading_vel = raw_heading_vel;
        let heading_vel = self.heading_vel_offset + raw_heading_vel;

        trace!(
            "dead wheel inputs: par={} perp={} heading={:.4}",
            par.position,
            perp.position,
            heading
        );

        if !self.initialized {
            self.initialized = true;
            self.last_par_pos = par.position;
            self.last_perp_pos = perp.position;
            self.last_heading = heading;
            return Twist2dDual::zero();
        }

        let par_delta = (par.position - self.last_par_pos) as f64;
        let perp_delta = (perp.position - self.last_perp_pos) as f64;
        let heading_delta = angle_error(heading, self.last_heading);

        let twist = Twist2dDual {
            value: Twist2d {
                linear: Vector2::new(
                    (par_delta - self.params.par_y_ticks * heading_delta) * self.in_per_tick,
                    (perp_delta - self.params.perp_x_ticks * heading_delta) * self.in_per_tick,
                ),
                angular: heading_delta,
            },
            velocity: Velocity2d {
                linear: Vector2::new(
                    (par.velocity - self.params.par_y_ticks * heading_vel) * self.in_per_tick,
                    (perp.velocity - self.params.perp_x_ticks * heading_vel) * self.in_per_tick,
                ),
                angular: heading_vel,
            },
        };

        self.last_par_pos = par.position;
        self.last_perp_pos = perp.position;
        self.last_heading = heading;

        twist
    }
}
