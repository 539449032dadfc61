//! Drives a whole simulated match: an autonomous routine through the
//! blocking scheduler, the pose handoff, then a few teleop cycles.

use std::{cell::RefCell, f64::consts::FRAC_PI_2, rc::Rc, time::Duration};

use approx::assert_relative_eq;
use nalgebra::Vector2;

use hololib_rs::{
    actions::{
        device::ServoPositionAction,
        scheduler::{ActionScheduler, AutoActionScheduler},
        SleepAction,
    },
    devices::{
        sim::{SimEncoder, SimImu, SimMotor, SimServo, SimVoltageSensor},
        DriveMotor, HardwareMap, ServoDevice,
    },
    holonomic::{
        drive::{params_drive, MecanumDrive},
        pose::Pose2d,
        profile::LineProfile,
        teleop::{params_teleop, TeleopDriver, TeleopInput},
    },
    memory::MatchMemory,
    parallel,
    telemetry::LogDashboard,
};

struct SimRig {
    hardware: HardwareMap,
    front_left: Rc<RefCell<SimMotor>>,
    par: Rc<RefCell<SimEncoder>>,
    imu: Rc<RefCell<SimImu>>,
    dropper: Rc<RefCell<SimServo>>,
}

fn sim_rig() -> SimRig {
    let mut hardware = HardwareMap::new();

    let front_left = Rc::new(RefCell::new(SimMotor::new()));
    hardware.insert_motor("front_left", front_left.clone());
    for name in ["back_left", "back_right", "front_right"] {
        hardware.insert_motor(name, Rc::new(RefCell::new(SimMotor::new())));
    }

    let par = Rc::new(RefCell::new(SimEncoder::new()));
    let imu = Rc::new(RefCell::new(SimImu::new()));
    hardware.insert_encoder("par", par.clone());
    hardware.insert_encoder("perp", Rc::new(RefCell::new(SimEncoder::new())));
    hardware.insert_imu("imu", imu.clone());
    hardware.insert_voltage_sensor("battery", Rc::new(RefCell::new(SimVoltageSensor::new())));

    let dropper = Rc::new(RefCell::new(SimServo::new()));
    hardware.insert_servo("dropper", dropper.clone());

    SimRig {
        hardware,
        front_left,
        par,
        imu,
        dropper,
    }
}

#[test]
fn autonomous_hands_its_pose_to_teleop() {
    let rig = sim_rig();
    let memory = MatchMemory::shared();

    // Autonomous phase.
    let start_pose = Pose2d::new(12.0, -62.0, FRAC_PI_2);
    {
        let mut memory = memory.borrow_mut();
        memory.begin_phase();
        memory.last_pose = start_pose;
        memory.ran_auto = true;
    }

    let drive = Rc::new(
        MecanumDrive::new(&rig.hardware, start_pose, params_drive!(), memory.clone())
            .expect("default params are valid"),
    );

    let mut scheduler = AutoActionScheduler::new(Rc::new(RefCell::new(LogDashboard::new())))
        .with_loop_period(Duration::from_millis(5));
    scheduler.add_action(drive.clone().pose_logging_action("auto_start"));
    scheduler.add_action(drive.clone().follow_trajectory_action(LineProfile::new(
        start_pose,
        Vector2::new(12.0, -60.0),
        25.0,
    )));
    scheduler.add_action(parallel!(
        SleepAction::seconds(0.03),
        ServoPositionAction::new(rig.dropper.clone(), 0.7, "dropper")
    ));
    scheduler.add_action(drive.clone().pose_logging_action("auto_end"));

    scheduler.run();
    assert!(scheduler.is_empty());
    assert_relative_eq!(rig.dropper.borrow().position(), 0.7);

    let handoff = drive.pose();
    memory.borrow_mut().finish_auto(handoff);
    assert!(memory.borrow().ran_auto);

    // Teleop phase resumes from the recorded pose.
    memory.borrow_mut().begin_phase();
    let resume_pose = memory.borrow().last_pose;
    assert_relative_eq!(resume_pose.position.x, handoff.position.x);
    assert_relative_eq!(resume_pose.orientation, handoff.orientation);

    let drive = Rc::new(
        MecanumDrive::new(&rig.hardware, resume_pose, params_drive!(), memory.clone())
            .expect("default params are valid"),
    );
    let driver = TeleopDriver::new(params_teleop!());

    let mut scheduler = ActionScheduler::new(Rc::new(RefCell::new(LogDashboard::new())));
    scheduler.queue_action(ServoPositionAction::new(
        rig.hardware.servo("dropper"),
        0.0,
        "dropper",
    ));

    let forward = TeleopInput {
        left_stick_y: -1.0,
        ..Default::default()
    };
    for _ in 0..3 {
        drive.set_drive_powers(driver.command(&forward));
        drive.update_pose_estimate();
        scheduler.update();
    }

    assert!(scheduler.is_empty());
    assert_relative_eq!(rig.dropper.borrow().position(), 0.0);
    assert_relative_eq!(rig.front_left.borrow().power(), 1.0);

    // Sensor motion shows up in the fused estimate: the robot still faces
    // +y, so parallel-wheel travel lands on the field y axis.
    let before = drive.pose();
    rig.par.borrow_mut().advance(1000);
    drive.update_pose_estimate();
    let after = drive.pose();
    assert!(after.position.y > before.position.y + 2.0);
    assert_relative_eq!(after.position.x, before.position.x, epsilon = 1e-9);

    // The gyro owns heading: its delta lands on the estimate as-is.
    rig.imu.borrow_mut().set_heading(0.25);
    drive.update_pose_estimate();
    assert_relative_eq!(drive.pose().orientation, FRAC_PI_2 + 0.25, epsilon = 1e-9);
}

#[test]
fn missing_devices_degrade_without_failing() {
    let hardware = HardwareMap::new();
    let memory = MatchMemory::shared();

    let drive = MecanumDrive::new(&hardware, Pose2d::new(0, 0, 0), params_drive!(), memory)
        .expect("an empty map still builds a drive");
    assert!(hardware.is_degraded());

    // The substituted devices behave like idle hardware.
    let velocity = drive.update_pose_estimate();
    assert_relative_eq!(velocity.linear.x, 0.0);
    assert_relative_eq!(drive.pose().position.x, 0.0);
}
