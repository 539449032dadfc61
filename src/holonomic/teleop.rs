use bon::Builder;

use super::{
    drive_curve::{power::PowerDriveCurve, DriveCurve},
    pose::Velocity2d,
};

/// One cycle's worth of operator input, already normalized to gamepad
/// conventions: sticks in [-1, 1] with +y pushed away from the driver,
/// triggers in [0, 1].
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct TeleopInput {
    pub left_stick_x: f64,
    pub left_stick_y: f64,
    pub right_stick_x: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
    pub left_bumper: bool,
    pub right_bumper: bool,
}

#[derive(Clone, Copy, PartialEq, Builder)]
pub struct TeleopParams {
    #[builder(default = 1.0)]
    pub drive_speed: f64,

    /// Translation scale when the right stick is fully deflected.
    #[builder(default = 0.3)]
    pub slow_drive_speed: f64,

    #[builder(default = 0.75)]
    pub turn_speed: f64,

    /// Added (left bumper) or subtracted (right bumper) from the turn rate.
    #[builder(default = 0.3)]
    pub slow_turn_speed: f64,
}

#[macro_export]
macro_rules! params_teleop {
    (
        $($key:ident : $value:expr),* $(,)?
    ) => {
        $crate::holonomic::teleop::TeleopParams::builder()
            $(.$key($value))*
            .build()
    };
}
pub use params_teleop;

/// Shapes raw gamepad state into a drive power request.
///
/// The right stick blends between full and slow translation speed, so the
/// driver can feather the robot without a mode toggle.
#[derive(Clone)]
pub struct TeleopDriver {
    params: TeleopParams,
    drive_curve: Box<dyn DriveCurve>,
    turn_curve: Box<dyn DriveCurve>,
}

impl TeleopDriver {
    pub fn new(params: TeleopParams) -> Self {
        Self {
            params,
            drive_curve: Box::new(PowerDriveCurve::cubic()),
            turn_curve: Box::new(PowerDriveCurve::cubic()),
        }
    }

    pub fn with_curves(
        mut self,
        drive_curve: Box<dyn DriveCurve>,
        turn_curve: Box<dyn DriveCurve>,
    ) -> Self {
        self.drive_curve = drive_curve;
        self.turn_curve = turn_curve;
        self
    }

    /// Robot-centric power request for one input snapshot.
    pub fn command(&self, input: &TeleopInput) -> Velocity2d {
        let params = &self.params;
        let speed = (1.0 - input.right_stick_x.abs())
            * (params.drive_speed - params.slow_drive_speed)
            + params.slow_drive_speed;
        let axial = self.drive_curve.update(-input.left_stick_y) * speed;
        let lateral = self.drive_curve.update(-input.left_stick_x) * speed;

        let mut turn =
            self.turn_curve.update(input.left_trigger - input.right_trigger) * params.turn_speed;
        if input.left_bumper {
            turn += params.slow_turn_speed;
        }
        if input.right_bumper {
            turn -= params.slow_turn_speed;
        }

        Velocity2d::new(axial, lateral, turn)
    }

    /// Same request with the translation interpreted in field coordinates:
    /// the linear part is rotated by the robot's current heading.
    pub fn field_centric_command(&self, input: &TeleopInput, heading: f64) -> Velocity2d {
        let robot_centric = self.command(input);
        Velocity2d {
            linear: robot_centric.rotated(heading).linear,
            angular: robot_centric.angular,
        }
    }
}
