//! Simulated devices: the substitutes handed out on acquisition failure and
//! the doubles the tests and the demo binary drive.

use super::{
    DigitalInput, DriveMotor, Encoder, Imu, PositionVelocity, ServoDevice, VoltageSensor,
};

#[derive(Default, Clone, Copy, Debug)]
pub struct SimMotor {
    power: f64,
}

impl SimMotor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DriveMotor for SimMotor {
    fn set_power(&mut self, power: f64) {
        self.power = power.clamp(-1.0, 1.0);
    }

    fn power(&self) -> f64 {
        self.power
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct SimServo {
    position: f64,
}

impl SimServo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServoDevice for SimServo {
    fn set_position(&mut self, position: f64) {
        self.position = position.clamp(0.0, 1.0);
    }

    fn position(&self) -> f64 {
        self.position
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct SimEncoder {
    position: i32,
    velocity: f64,
}

impl SimEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, position: i32, velocity: f64) {
        self.position = position;
        self.velocity = velocity;
    }

    pub fn advance(&mut self, ticks: i32) {
        self.position += ticks;
    }
}

impl Encoder for SimEncoder {
    fn position_and_velocity(&self) -> PositionVelocity {
        PositionVelocity {
            position: self.position,
            velocity: self.velocity,
        }
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct SimImu {
    heading: f64,
    heading_velocity: f64,
}

impl SimImu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
    }

    pub fn set_heading_velocity(&mut self, heading_velocity: f64) {
        self.heading_velocity = heading_velocity;
    }
}

impl Imu for SimImu {
    fn heading(&self) -> f64 {
        self.heading
    }

    fn heading_velocity(&self) -> f64 {
        self.heading_velocity
    }

    fn reset_heading(&mut self) {
        self.heading = 0.0;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimVoltageSensor {
    voltage: f64,
}

impl SimVoltageSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_voltage(&mut self, voltage: f64) {
        self.voltage = voltage;
    }
}

impl Default for SimVoltageSensor {
    fn default() -> Self {
        // Nominal full battery.
        Self { voltage: 12.0 }
    }
}

impl VoltageSensor for SimVoltageSensor {
    fn voltage(&self) -> f64 {
        self.voltage
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct SimDigitalInput {
    state: bool,
}

impl SimDigitalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, state: bool) {
        self.state = state;
    }
}

impl DigitalInput for SimDigitalInput {
    fn state(&self) -> bool {
        self.state
    }
}
