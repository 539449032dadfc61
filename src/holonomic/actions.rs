//! Drive motions and observers expressed as polled [`Action`] nodes.
//!
//! Follow and turn actions own the whole control cycle while they run: they
//! advance the pose estimate, feed the tracking controller and write the
//! motor powers, so exactly one of them may be active at a time.

use std::{rc::Rc, time::Duration};

use log::{debug, info};

use super::{
    drive::MecanumDrive,
    profile::{TimeProfile, TurnProfile},
};
use crate::{
    actions::Action,
    controllers::holonomic::HolonomicController,
    holonomic::pose::Pose2d,
    telemetry::{Canvas, TelemetryPacket},
    utils::timer::Timer,
};

/// Spacing of the path-preview samples, in trajectory seconds.
const PATH_SAMPLE_PERIOD: f64 = 0.25;

/// Pose error past which a position check keeps polling, inches per axis.
const DEFAULT_POSITION_TOLERANCE: f64 = 5.0;

fn overlay_sample_points(profile: &dyn TimeProfile) -> (Vec<f64>, Vec<f64>) {
    let duration = profile.duration();
    let count = ((duration / PATH_SAMPLE_PERIOD).ceil() as usize).max(2);

    let mut xs = Vec::with_capacity(count);
    let mut ys = Vec::with_capacity(count);
    for i in 0..count {
        let t = duration * i as f64 / (count - 1) as f64;
        let position = profile.sample(t).value.position;
        xs.push(position.x);
        ys.push(position.y);
    }
    (xs, ys)
}

/// Tracks a time profile until its duration elapses, then stops the motors.
pub struct FollowTrajectoryAction {
    drive: Rc<MecanumDrive>,
    profile: Box<dyn TimeProfile>,
    timer: Option<Timer>, // latched on the first poll

    path_xs: Vec<f64>,
    path_ys: Vec<f64>,
}

impl FollowTrajectoryAction {
    pub(super) fn new(drive: Rc<MecanumDrive>, profile: Box<dyn TimeProfile>) -> Self {
        let (path_xs, path_ys) = overlay_sample_points(profile.as_ref());
        Self {
            drive,
            profile,
            timer: None,
            path_xs,
            path_ys,
        }
    }
}

impl Action for FollowTrajectoryAction {
    fn run(&mut self, packet: &mut TelemetryPacket) -> bool {
        let timer = self.timer.get_or_insert_with(|| {
            Timer::new(Duration::from_secs_f64(self.profile.duration().max(0.0)))
        });

        if timer.is_done() {
            self.drive.stop_motors();
            return false;
        }
        let t = timer.elapsed_time().as_secs_f64();

        let target = self.profile.sample(t);
        let robot_velocity = self.drive.update_pose_estimate();
        let pose = self.drive.pose();

        let command =
            HolonomicController::new(self.drive.gains).compute(&target, pose, robot_velocity);
        self.drive.drive_command_writer.borrow_mut().write(&command);

        let wheels = self.drive.kinematics.inverse_dual(command);
        let voltage = self.drive.voltage_sensor.borrow().voltage();
        let powers = wheels.map(|motion| self.drive.feedforward.power(motion, voltage));
        self.drive
            .wheel_command_writer
            .borrow_mut()
            .write(&(voltage, &powers));

        self.drive.front_left.borrow_mut().set_power(powers.front_left);
        self.drive.back_left.borrow_mut().set_power(powers.back_left);
        self.drive.back_right.borrow_mut().set_power(powers.back_right);
        self.drive
            .front_right
            .borrow_mut()
            .set_power(powers.front_right);

        packet.put("x", pose.position.x);
        packet.put("y", pose.position.y);
        packet.put("heading_deg", pose.orientation.to_degrees());

        let error = target.value.relative_to(pose);
        packet.put("x_error", error.position.x);
        packet.put("y_error", error.position.y);
        packet.put("heading_error_deg", error.orientation.to_degrees());

        // Only draw while active; one drive action runs at a time.
        let canvas = packet.field_overlay();
        self.drive.draw_pose_history(canvas);

        canvas.set_stroke("#4CAF50");
        MecanumDrive::draw_robot(canvas, target.value);

        canvas.set_stroke("#3F51B5");
        MecanumDrive::draw_robot(canvas, pose);

        canvas
            .set_stroke("#4CAF50FF")
            .set_stroke_width(1.0)
            .stroke_polyline(self.path_xs.clone(), self.path_ys.clone());

        true
    }

    fn preview(&self, canvas: &mut Canvas) {
        canvas
            .set_stroke("#4CAF507A")
            .set_stroke_width(1.0)
            .stroke_polyline(self.path_xs.clone(), self.path_ys.clone());
    }
}

/// Turns in place along a heading profile, then stops the motors.
pub struct TurnAction {
    drive: Rc<MecanumDrive>,
    profile: TurnProfile,
    timer: Option<Timer>, // latched on the first poll
}

impl TurnAction {
    pub(super) fn new(drive: Rc<MecanumDrive>, profile: TurnProfile) -> Self {
        Self {
            drive,
            profile,
            timer: None,
        }
    }
}

impl Action for TurnAction {
    fn run(&mut self, packet: &mut TelemetryPacket) -> bool {
        let timer = self.timer.get_or_insert_with(|| {
            Timer::new(Duration::from_secs_f64(self.profile.duration().max(0.0)))
        });

        if timer.is_done() {
            self.drive.stop_motors();
            return false;
        }
        let t = timer.elapsed_time().as_secs_f64();

        let target = self.profile.sample(t);
        let robot_velocity = self.drive.update_pose_estimate();
        let pose = self.drive.pose();

        let command =
            HolonomicController::new(self.drive.gains).compute(&target, pose, robot_velocity);
        self.drive.drive_command_writer.borrow_mut().write(&command);

        let wheels = self.drive.kinematics.inverse_dual(command);
        let voltage = self.drive.voltage_sensor.borrow().voltage();
        let powers = wheels.map(|motion| self.drive.feedforward.power(motion, voltage));
        self.drive
            .wheel_command_writer
            .borrow_mut()
            .write(&(voltage, &powers));

        self.drive.front_left.borrow_mut().set_power(powers.front_left);
        self.drive.back_left.borrow_mut().set_power(powers.back_left);
        self.drive.back_right.borrow_mut().set_power(powers.back_right);
        self.drive
            .front_right
            .borrow_mut()
            .set_power(powers.front_right);

        packet.put("heading_deg", pose.orientation.to_degrees());
        let error = target.value.relative_to(pose);
        packet.put("heading_error_deg", error.orientation.to_degrees());

        let canvas = packet.field_overlay();
        self.drive.draw_pose_history(canvas);

        canvas.set_stroke("#4CAF50");
        MecanumDrive::draw_robot(canvas, target.value);

        canvas.set_stroke("#3F51B5");
        MecanumDrive::draw_robot(canvas, pose);

        let anchor = self.profile.begin().position;
        canvas
            .set_stroke("#7C4DFFFF")
            .fill_circle(anchor.x, anchor.y, 2.0);

        true
    }

    fn preview(&self, canvas: &mut Canvas) {
        let anchor = self.profile.begin().position;
        canvas
            .set_stroke("#7C4DFF7A")
            .fill_circle(anchor.x, anchor.y, 2.0);
    }
}

/// Logs the current pose estimate under a label and completes immediately.
///
/// The elapsed times come from the shared match record, so consecutive
/// logging actions measure the motion that ran between them.
pub struct DrivePoseLoggingAction {
    drive: Rc<MecanumDrive>,
    label: String,
    message: Option<String>,
}

impl DrivePoseLoggingAction {
    pub(super) fn new(drive: Rc<MecanumDrive>, label: impl Into<String>) -> Self {
        Self {
            drive,
            label: label.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Action for DrivePoseLoggingAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        let (since_previous, since_start) = self.drive.memory.borrow_mut().stamp_log();

        let message = match &self.message {
            Some(message) => format!(" {{ {message} }}"),
            None => String::new(),
        };
        info!(
            "estimated pose {} [{}]{} | elapsed: {:.0} ms | phase timer: {:.3} s",
            self.drive.pose(),
            self.label,
            message,
            since_previous * 1000.0,
            since_start,
        );

        false
    }
}

/// Polls until the pose estimate settles within a box around `target`.
///
/// A pure observer: it commands nothing, so it pairs with a concurrent
/// motion or a preceding relocalization.
pub struct PositionCheckAction {
    drive: Rc<MecanumDrive>,
    target: Pose2d,
    tolerance: f64,
    logged: bool,
}

impl PositionCheckAction {
    pub(super) fn new(drive: Rc<MecanumDrive>, target: Pose2d) -> Self {
        Self {
            drive,
            target,
            tolerance: DEFAULT_POSITION_TOLERANCE,
            logged: false,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Action for PositionCheckAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        let pose = self.drive.pose();
        if !self.logged {
            self.logged = true;
            debug!("position check: estimated {} | target {}", pose, self.target);
        }

        (pose.position.x - self.target.position.x).abs() > self.tolerance
            || (pose.position.y - self.target.position.y).abs() > self.tolerance
    }
}
