use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use bon::Builder;
use log::info;
use nalgebra::Vector2;
use thiserror::Error;

use super::{
    actions::{DrivePoseLoggingAction, FollowTrajectoryAction, PositionCheckAction, TurnAction},
    kinematics::MecanumKinematics,
    pose::{Pose2d, Velocity2d},
    profile::{TimeProfile, TurnProfile},
};
use crate::{
    controllers::{feedforward::MotorFeedforward, holonomic::HolonomicGains},
    devices::{HardwareMap, SharedMotor, SharedVoltageSensor},
    memory::MatchMemory,
    telemetry::{Canvas, DownsampledWriter},
    tracking::{Localizer, TwoDeadWheelLocalizer, TwoDeadWheelParams},
};

/// Fused pose estimates older than this are discarded.
const POSE_HISTORY_CAPACITY: usize = 100;

/// Telemetry channels refuse to write more often than this.
const WRITE_PERIOD: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("drive parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("drive parameter `{name}` must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// Measured drivetrain constants. The defaults are the values tuned on the
/// reference robot; override them per chassis with the builder.
#[derive(Clone, Copy, PartialEq, Builder)]
pub struct DriveParams {
    /// Travel per parallel encoder tick.
    #[builder(default = 0.002948)]
    pub in_per_tick: f64,

    /// Strafe travel per tick. Mecanum rollers give ground sideways, so this
    /// is below `in_per_tick`.
    #[builder(default = 0.00273)]
    pub lateral_in_per_tick: f64,

    /// Effective track width in encoder ticks.
    #[builder(default = 4665.3368763274475)]
    pub track_width_ticks: f64,

    /// Static friction feedforward, volts.
    #[builder(default = 1.407)]
    pub ks: f64,

    /// Velocity feedforward, volts per tick/s.
    #[builder(default = 0.0004003)]
    pub kv: f64,

    /// Acceleration feedforward, volts per tick/s².
    #[builder(default = 0.0000739)]
    pub ka: f64,
}

#[macro_export]
macro_rules! params_drive {
    (
        $($key:ident : $value:expr),* $(,)?
    ) => {
        $crate::holonomic::drive::DriveParams::builder()
            $(.$key($value))*
            .build()
    };
}
pub use params_drive;

impl DriveParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("in_per_tick", self.in_per_tick),
            ("lateral_in_per_tick", self.lateral_in_per_tick),
            ("track_width_ticks", self.track_width_ticks),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (name, value) in [("ks", self.ks), ("kv", self.kv), ("ka", self.ka)] {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        Ok(())
    }
}

/// A mecanum drivetrain with fused odometry.
///
/// Owns the four drive motors, the battery sensor and a localizer, and keeps
/// the current pose estimate plus a short trail of recent estimates for the
/// field overlay. Motions run as [`Action`](crate::actions::Action) nodes
/// built by the factory methods, which share the drive behind an `Rc`.
pub struct MecanumDrive {
    pub(super) front_left: SharedMotor,
    pub(super) back_left: SharedMotor,
    pub(super) back_right: SharedMotor,
    pub(super) front_right: SharedMotor,

    pub(super) voltage_sensor: SharedVoltageSensor,

    pub(super) localizer: RefCell<Box<dyn Localizer>>,
    pub(super) pose: RefCell<Pose2d>,
    pose_history: RefCell<VecDeque<Pose2d>>,

    pub(super) params: DriveParams,
    pub(super) kinematics: MecanumKinematics,
    pub(super) feedforward: MotorFeedforward,
    pub(super) gains: HolonomicGains,

    pub(super) memory: Rc<RefCell<MatchMemory>>,

    estimated_pose_writer: RefCell<DownsampledWriter>,
    pub(super) drive_command_writer: RefCell<DownsampledWriter>,
    pub(super) wheel_command_writer: RefCell<DownsampledWriter>,
}

impl MecanumDrive {
    /// Builds a drive on top of `hardware`, starting the estimate at
    /// `initial_pose`.
    ///
    /// Missing devices are replaced with simulated stand-ins by the hardware
    /// map; bad tuning constants are refused outright.
    pub fn new(
        hardware: &HardwareMap,
        initial_pose: Pose2d,
        params: DriveParams,
        memory: Rc<RefCell<MatchMemory>>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;

        let imu = hardware.imu("imu");
        let localizer: Box<dyn Localizer> = Box::new(TwoDeadWheelLocalizer::new(
            hardware.encoder("par"),
            hardware.encoder("perp"),
            imu,
            TwoDeadWheelParams::default(),
            params.in_per_tick,
        ));

        Ok(Self {
            front_left: hardware.motor("front_left"),
            back_left: hardware.motor("back_left"),
            back_right: hardware.motor("back_right"),
            front_right: hardware.motor("front_right"),
            voltage_sensor: hardware.voltage_sensor("battery"),
            localizer: RefCell::new(localizer),
            pose: RefCell::new(initial_pose),
            pose_history: RefCell::new(VecDeque::with_capacity(POSE_HISTORY_CAPACITY)),
            kinematics: MecanumKinematics::new(
                params.in_per_tick * params.track_width_ticks,
                params.in_per_tick / params.lateral_in_per_tick,
            ),
            feedforward: MotorFeedforward::new(
                params.ks,
                params.kv / params.in_per_tick,
                params.ka / params.in_per_tick,
            ),
            gains: HolonomicGains::default(),
            params,
            memory,
            estimated_pose_writer: RefCell::new(DownsampledWriter::new(
                "estimated_pose",
                WRITE_PERIOD,
            )),
            drive_command_writer: RefCell::new(DownsampledWriter::new(
                "drive_command",
                WRITE_PERIOD,
            )),
            wheel_command_writer: RefCell::new(DownsampledWriter::new(
                "wheel_command",
                WRITE_PERIOD,
            )),
        })
    }

    /// Swaps the localizer, e.g. for a three-wheel layout.
    pub fn with_localizer(self, localizer: Box<dyn Localizer>) -> Self {
        *self.localizer.borrow_mut() = localizer;
        self
    }

    pub fn with_gains(mut self, gains: HolonomicGains) -> Self {
        self.gains = gains;
        self
    }

    /// Open-loop drive powers, the teleop path.
    ///
    /// Runs the request through unit-geometry kinematics and rescales so no
    /// wheel magnitude exceeds 1 while the mix between wheels is preserved.
    pub fn set_drive_powers(&self, powers: Velocity2d) {
        let wheels = MecanumKinematics::new(1.0, 1.0).inverse(powers);

        let mut max_power_mag = 1.0_f64;
        for power in [
            wheels.front_left,
            wheels.back_left,
            wheels.back_right,
            wheels.front_right,
        ] {
            max_power_mag = max_power_mag.max(power.abs());
        }

        self.front_left
            .borrow_mut()
            .set_power(wheels.front_left / max_power_mag);
        self.back_left
            .borrow_mut()
            .set_power(wheels.back_left / max_power_mag);
        self.back_right
            .borrow_mut()
            .set_power(wheels.back_right / max_power_mag);
        self.front_right
            .borrow_mut()
            .set_power(wheels.front_right / max_power_mag);
    }

    pub(super) fn stop_motors(&self) {
        self.front_left.borrow_mut().set_power(0.0);
        self.back_left.borrow_mut().set_power(0.0);
        self.back_right.borrow_mut().set_power(0.0);
        self.front_right.borrow_mut().set_power(0.0);
    }

    /// One fusion step: pulls the localizer's incremental twist, integrates
    /// it onto the pose estimate and records the result.
    ///
    /// Returns the robot-frame velocity from the same sensor sample. Call
    /// exactly once per control cycle.
    pub fn update_pose_estimate(&self) -> Velocity2d {
        let twist = self.localizer.borrow_mut().update();

        let pose = self.pose.borrow().plus(twist.value);
        *self.pose.borrow_mut() = pose;

        let mut history = self.pose_history.borrow_mut();
        history.push_back(pose);
        while history.len() > POSE_HISTORY_CAPACITY {
            history.pop_front();
        }
        drop(history);

        self.estimated_pose_writer.borrow_mut().write(&pose);

        twist.velocity
    }

    /// Overrides the estimate, e.g. after lining up on a field landmark.
    pub fn relocalize(&self, pose: Pose2d) {
        let previous = *self.pose.borrow();
        info!("relocalize {previous} -> {pose}");
        *self.pose.borrow_mut() = pose;
    }

    pub fn pose(&self) -> Pose2d {
        *self.pose.borrow()
    }

    pub fn draw_pose_history(&self, canvas: &mut Canvas) {
        let history = self.pose_history.borrow();
        let xs: Vec<f64> = history.iter().map(|pose| pose.position.x).collect();
        let ys: Vec<f64> = history.iter().map(|pose| pose.position.y).collect();

        canvas
            .set_stroke_width(1.0)
            .set_stroke("#3F51B5")
            .stroke_polyline(xs, ys);
    }

    pub fn draw_robot(canvas: &mut Canvas, pose: Pose2d) {
        const ROBOT_RADIUS: f64 = 9.0;

        canvas
            .set_stroke_width(1.0)
            .stroke_circle(pose.position.x, pose.position.y, ROBOT_RADIUS);

        let half = Vector2::new(pose.orientation.cos(), pose.orientation.sin())
            * (0.5 * ROBOT_RADIUS);
        let line_begin = pose.position + half;
        let line_end = line_begin + half;
        canvas.stroke_line(line_begin.x, line_begin.y, line_end.x, line_end.y);
    }

    pub fn follow_trajectory_action(
        self: Rc<Self>,
        profile: impl TimeProfile + 'static,
    ) -> FollowTrajectoryAction {
        FollowTrajectoryAction::new(self, Box::new(profile))
    }

    pub fn turn_action(self: Rc<Self>, profile: TurnProfile) -> TurnAction {
        TurnAction::new(self, profile)
    }

    pub fn pose_logging_action(self: Rc<Self>, label: impl Into<String>) -> DrivePoseLoggingAction {
        DrivePoseLoggingAction::new(self, label)
    }

    pub fn position_check_action(self: Rc<Self>, target: Pose2d) -> PositionCheckAction {
        PositionCheckAction::new(self, target)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        devices::{sim::SimMotor, DriveMotor},
        holonomic::pose::{Twist2d, Twist2dDual},
    };

    fn drive_on(hardware: &HardwareMap) -> MecanumDrive {
        MecanumDrive::new(
            hardware,
            Pose2d::new(0, 0, 0),
            params_drive!(),
            MatchMemory::shared(),
        )
        .expect("default params are valid")
    }

    struct ConstantTwist(Twist2dDual);

    impl Localizer for ConstantTwist {
        fn update(&mut self) -> Twist2dDual {
            self.0
        }
    }

    #[test]
    fn empty_hardware_map_builds_a_degraded_drive() {
        let hardware = HardwareMap::new();
        assert!(!hardware.is_degraded());

        let drive = drive_on(&hardware);
        assert!(hardware.is_degraded());
        assert_relative_eq!(drive.pose().position.x, 0.0);
    }

    #[test]
    fn zero_scale_params_are_refused() {
        let result = MecanumDrive::new(
            &HardwareMap::new(),
            Pose2d::new(0, 0, 0),
            params_drive!(in_per_tick: 0.0),
            MatchMemory::shared(),
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::NonPositive {
                name: "in_per_tick",
                value: 0.0
            })
        );
    }

    #[test]
    fn drive_powers_are_normalized_to_unit_magnitude() {
        let mut hardware = HardwareMap::new();
        let front_left = Rc::new(RefCell::new(SimMotor::default()));
        let back_right = Rc::new(RefCell::new(SimMotor::default()));
        hardware.insert_motor("front_left", front_left.clone());
        hardware.insert_motor("back_right", back_right.clone());

        let drive = drive_on(&hardware);
        drive.set_drive_powers(Velocity2d::new(1.0, 0.0, 1.0));

        // Unit geometry puts forward+turn at 2.0 on the right side before
        // rescaling.
        assert_relative_eq!(front_left.borrow().power(), 0.0);
        assert_relative_eq!(back_right.borrow().power(), 1.0);
    }

    #[test]
    fn pose_history_is_capped() {
        let drive = drive_on(&HardwareMap::new()).with_localizer(Box::new(ConstantTwist(
            Twist2dDual {
                value: Twist2d {
                    linear: Vector2::new(0.5, 0.0),
                    angular: 0.0,
                },
                velocity: Velocity2d::new(1.0, 0.0, 0.0),
            },
        )));

        for _ in 0..150 {
            let velocity = drive.update_pose_estimate();
            assert_relative_eq!(velocity.linear.x, 1.0);
        }
        assert_relative_eq!(drive.pose().position.x, 75.0, epsilon = 1e-9);

        // Oldest entries are evicted: updates 51 through 150 remain, in order.
        let history = drive.pose_history.borrow();
        assert_eq!(history.len(), POSE_HISTORY_CAPACITY);
        assert_relative_eq!(history.front().unwrap().position.x, 25.5, epsilon = 1e-9);
        assert_relative_eq!(history.back().unwrap().position.x, 75.0, epsilon = 1e-9);
        assert!(history
            .iter()
            .zip(history.iter().skip(1))
            .all(|(older, newer)| newer.position.x > older.position.x));
    }

    #[test]
    fn relocalize_overrides_the_estimate() {
        let drive = drive_on(&HardwareMap::new());
        drive.relocalize(Pose2d::new(12.0, -3.0, 1.0));

        let pose = drive.pose();
        assert_relative_eq!(pose.position.x, 12.0);
        assert_relative_eq!(pose.position.y, -3.0);
        assert_relative_eq!(pose.orientation, 1.0);
    }
}
