use core::f64::consts::{PI, TAU};

use nalgebra::Vector2;

use super::Localizer;
use crate::devices::{SharedEncoder, SharedImu};
use crate::holonomic::pose::{Twist2d, Twist2dDual, Velocity2d};
use crate::utils::math::angle_error;

/// Mounting offsets of the three dead wheels, in encoder ticks.
///
/// The parallel pair must sit at distinct y offsets; their divergence is
/// what encodes rotation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ThreeDeadWheelParams {
    /// Y offset of the first parallel wheel from the rotation center.
    pub par0_y_ticks: f64,
    /// Y offset of the second parallel wheel from the rotation center.
    pub par1_y_ticks: f64,
    /// X offset of the perpendicular wheel from the rotation center.
    pub perp_x_ticks: f64,
}

impl Default for ThreeDeadWheelParams {
    fn default() -> Self {
        Self {
            par0_y_ticks: 0.0,
            par1_y_ticks: 1.0,
            perp_x_ticks: 0.0,
        }
    }
}

/// Odometry from two parallel wheels and one perpendicular wheel.
///
/// Self-contained by default: rotation comes from the parallel pair. When
/// an inertial sensor is attached it becomes authoritative for the angular
/// component and the encoders are kept for the linear components only.
pub struct ThreeDeadWheelLocalizer {
    par0: SharedEncoder,
    par1: SharedEncoder,
    perp: SharedEncoder,
    imu: Option<SharedImu>,
    params: ThreeDeadWheelParams,
    in_per_tick: f64,

    last_par0_pos: i32,
    last_par1_pos: i32,
    last_perp_pos: i32,
    last_heading: f64,
    last_raw_heading_vel: f64,
    heading_vel_offset: f64,
    initialized: bool,
}

impl ThreeDeadWheelLocalizer {
    pub fn new(
        par0: SharedEncoder,
        par1: SharedEncoder,
        perp: SharedEncoder,
        params: ThreeDeadWheelParams,
        in_per_tick: f64,
    ) -> Self {
        Self {
            par0,
            par1,
            perp,
            imu: None,
            params,
            in_per_tick,
            last_par0_pos: 0,
            last_par1_pos: 0,
            last_perp_pos: 0,
            last_heading: 0.0,
            last_raw_heading_vel: 0.0,
            heading_vel_offset: 0.0,
            initialized: false,
        }
    }

    /// Attaches an inertial sensor that overrides the encoder-derived
    /// rotation.
    pub fn with_imu(mut self, imu: SharedImu) -> Self {
        self.imu = Some(imu);
        self
    }

    fn inertial_rates(&mut self) -> Option<(f64, f64)> {
        let imu = self.imu.as_ref()?;
        let heading = imu.borrow().heading();
        let raw_heading_vel = imu.borrow().heading_velocity();
        if (raw_heading_vel - self.last_raw_heading_vel).abs() > PI {
            self.heading_vel_offset -= raw_heading_vel.signum() * TAU;
        }
        self.last_raw_heading_vel = raw_heading_vel;
        Some((heading, self.heading_vel_offset + raw_heading_vel))
    }
}

impl Localizer for ThreeDeadWheelLocalizer {
    fn update(&mut self) -> Twist2dDual {
        let par0 = self.par0.borrow().position_and_velocity();
        let par1 = self.par1.borrow().position_and_velocity();
        let perp = self.perp.borrow().position_and_velocity();
        let inertial = self.inertial_rates();

        if !self.initialized {
            self.initialized = true;
            self.last_par0_pos = par0.position;
            self.last_par1_pos = par1.position;
            self.last_perp_pos = perp.position;
            if let Some((heading, _)) = inertial {
                self.last_heading = heading;
            }
            return Twist2dDual::zero();
        }

        let par0_delta = (par0.position - self.last_par0_pos) as f64;
        let par1_delta = (par1.position - self.last_par1_pos) as f64;
        let perp_delta = (perp.position - self.last_perp_pos) as f64;
        let par_y_span = self.params.par0_y_ticks - self.params.par1_y_ticks;

        let (heading_delta, heading_vel) = match inertial {
            Some((heading, heading_vel)) => {
                let delta = angle_error(heading, self.last_heading);
                self.last_heading = heading;
                (delta, heading_vel)
            }
            None => (
                (par0_delta - par1_delta) / par_y_span,
                (par0.velocity - par1.velocity) / par_y_span,
            ),
        };

        // Each parallel wheel sees the translation plus its offset times the
        // rotation; compensating and averaging recovers the translation.
        let x_delta = 0.5
            * ((par0_delta - self.params.par0_y_ticks * heading_delta)
                + (par1_delta - self.params.par1_y_ticks * heading_delta));
        let x_vel = 0.5
            * ((par0.velocity - self.params.par0_y_ticks * heading_vel)
                + (par1.velocity - self.params.par1_y_ticks * heading_vel));

        let twist = Twist2dDual {
            value: Twist2d {
                linear: Vector2::new(
                    x_delta * self.in_per_tick,
                    (perp_delta - self.params.perp_x_ticks * heading_delta) * self.in_per_tick,
                ),
                angular: heading_delta,
            },
            velocity: Velocity2d {
                linear: Vector2::new(
                    x_vel * self.in_per_tick,
                    (perp.velocity - self.params.perp_x_ticks * heading_vel) * self.in_per_tick,
                ),
                angular: heading_vel,
            },
        };

        self.last_par0_pos = par0.position;
        self.last_par1_pos = par1.position;
        self.last_perp_pos = perp.position;

        twist
    }
}
