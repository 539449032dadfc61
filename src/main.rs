use std::{cell::RefCell, f64::consts::FRAC_PI_2, rc::Rc, thread::sleep, time::Duration};

use hololib_rs::{
    actions::{
        device::ServoPositionAction,
        scheduler::{ActionScheduler, AutoActionScheduler},
        SleepAction,
    },
    devices::{
        sim::{SimEncoder, SimImu, SimMotor, SimVoltageSensor},
        HardwareMap,
    },
    holonomic::{
        drive::{params_drive, ConfigError, MecanumDrive},
        pose::Pose2d,
        profile::{LineProfile, TurnProfile},
        teleop::{params_teleop, TeleopDriver, TeleopInput},
    },
    logger::ConsoleLogger,
    memory::MatchMemory,
    parallel,
    telemetry::LogDashboard,
};
use log::{error, info, LevelFilter};
use nalgebra::Vector2;

/// A bench configuration: every drive device is simulated. Anything the
/// routines ask for beyond these registrations comes back as a simulated
/// stand-in with a warning, exercising the degraded path.
fn sim_hardware() -> HardwareMap {
    let mut hardware = HardwareMap::new();
    for name in ["front_left", "back_left", "back_right", "front_right"] {
        hardware.insert_motor(name, Rc::new(RefCell::new(SimMotor::new())));
    }
    hardware.insert_encoder("par", Rc::new(RefCell::new(SimEncoder::new())));
    hardware.insert_encoder("perp", Rc::new(RefCell::new(SimEncoder::new())));
    hardware.insert_imu("imu", Rc::new(RefCell::new(SimImu::new())));
    hardware.insert_voltage_sensor("battery", Rc::new(RefCell::new(SimVoltageSensor::new())));
    hardware
}

fn autonomous(
    hardware: &HardwareMap,
    memory: &Rc<RefCell<MatchMemory>>,
) -> Result<Pose2d, ConfigError> {
    let start_pose = Pose2d::new(12.0, -62.0, FRAC_PI_2);
    {
        let mut memory = memory.borrow_mut();
        memory.begin_phase();
        memory.last_pose = start_pose;
        memory.ran_auto = true;
    }

    let drive = Rc::new(MecanumDrive::new(
        hardware,
        start_pose,
        params_drive!(),
        memory.clone(),
    )?);
    let dropper = hardware.servo("dropper");

    let mut scheduler = AutoActionScheduler::new(Rc::new(RefCell::new(LogDashboard::new())))
        .with_loop_period(Duration::from_millis(10));

    let line = LineProfile::new(start_pose, Vector2::new(12.0, -34.0), 20.0);
    let line_end = line.end_position();

    scheduler.add_action(drive.clone().pose_logging_action("auto_start"));
    scheduler.add_action(drive.clone().follow_trajectory_action(line));
    scheduler.add_action(parallel!(
        SleepAction::seconds(0.25),
        ServoPositionAction::new(dropper, 0.7, "dropper")
    ));
    scheduler.add_action(drive.clone().turn_action(TurnProfile::new(
        Pose2d::new(line_end.x, line_end.y, start_pose.orientation),
        std::f64::consts::PI,
        std::f64::consts::PI,
    )));
    scheduler.add_action(drive.clone().pose_logging_action("auto_end"));
    scheduler.run();

    let final_pose = drive.pose();
    memory.borrow_mut().finish_auto(final_pose);
    info!("autonomous finished at {final_pose}");
    Ok(final_pose)
}

fn teleop(hardware: &HardwareMap, memory: &Rc<RefCell<MatchMemory>>) -> Result<(), ConfigError> {
    let resume_pose = memory.borrow().last_pose;
    memory.borrow_mut().begin_phase();

    let drive = Rc::new(MecanumDrive::new(
        hardware,
        resume_pose,
        params_drive!(),
        memory.clone(),
    )?);
    let driver = TeleopDriver::new(params_teleop!(drive_speed: 0.9));

    let mut scheduler = ActionScheduler::new(Rc::new(RefCell::new(LogDashboard::new())));
    scheduler.queue_action(ServoPositionAction::new(
        hardware.servo("dropper"),
        0.0,
        "dropper",
    ));

    // A short canned stick recording stands in for the operator.
    let inputs = [
        TeleopInput {
            left_stick_y: -1.0,
            ..Default::default()
        },
        TeleopInput {
            left_stick_y: -1.0,
            left_stick_x: -0.5,
            ..Default::default()
        },
        TeleopInput {
            left_trigger: 0.8,
            ..Default::default()
        },
        TeleopInput {
            left_stick_y: -1.0,
            right_stick_x: 1.0,
            ..Default::default()
        },
        TeleopInput::default(),
    ];

    for input in inputs {
        drive.set_drive_powers(driver.command(&input));
        drive.update_pose_estimate();
        scheduler.update();
        sleep(Duration::from_millis(20));
    }

    info!("teleop finished at {}", drive.pose());
    Ok(())
}

fn main() {
    if let Err(error) = ConsoleLogger::init(LevelFilter::Debug) {
        eprintln!("logger unavailable: {error}");
    }

    let hardware = sim_hardware();
    let memory = MatchMemory::shared();

    let result = autonomous(&hardware, &memory).and_then(|_| teleop(&hardware, &memory));
    if let Err(error) = result {
        error!("drive configuration rejected: {error}");
    }
}
