//! One-shot device actions: set a target and complete on the same poll.
//! The building blocks routines mix in alongside drive motions.

use log::debug;

use super::Action;
use crate::devices::{SharedMotor, SharedServo};
use crate::telemetry::TelemetryPacket;

/// Commands a motor power once.
pub struct MotorPowerAction {
    motor: SharedMotor,
    power: f64,
}

impl MotorPowerAction {
    pub fn new(motor: SharedMotor, power: f64) -> Self {
        Self { motor, power }
    }
}

impl Action for MotorPowerAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        self.motor.borrow_mut().set_power(self.power);
        false
    }
}

/// Commands a servo position once.
pub struct ServoPositionAction {
    servo: SharedServo,
    position: f64,
    label: &'static str,
}

impl ServoPositionAction {
    pub fn new(servo: SharedServo, position: f64, label: &'static str) -> Self {
        Self {
            servo,
            position,
            label,
        }
    }
}

impl Action for ServoPositionAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        debug!("servo {} -> {:.3}", self.label, self.position);
        self.servo.borrow_mut().set_position(self.position);
        false
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::devices::sim::{SimMotor, SimServo};
    use crate::devices::{DriveMotor, ServoDevice};

    #[test]
    fn motor_power_sets_and_completes() {
        let motor = Rc::new(RefCell::new(SimMotor::new()));
        let mut action = MotorPowerAction::new(motor.clone(), 0.75);
        assert!(!action.run(&mut TelemetryPacket::new()));
        assert_eq!(motor.borrow().power(), 0.75);
    }

    #[test]
    fn servo_position_clamps_to_travel() {
        let servo = Rc::new(RefCell::new(SimServo::new()));
        let mut action = ServoPositionAction::new(servo.clone(), 1.4, "claw");
        assert!(!action.run(&mut TelemetryPacket::new()));
        assert_eq!(servo.borrow().position(), 1.0);
    }
}
