pub mod sim;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use thiserror::Error;

use sim::{SimDigitalInput, SimEncoder, SimImu, SimMotor, SimServo, SimVoltageSensor};

/// Lookup failure from the strict hardware accessors.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("no device named `{name}` is configured")]
    NotFound { name: String },
}

/// A coupled encoder read: tick count and tick rate from the same sample.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PositionVelocity {
    pub position: i32,
    pub velocity: f64,
}

/// An open-loop drive motor. Writes are idempotent and the last power wins.
pub trait DriveMotor {
    /// Commands a duty-cycle power, clamped to `[-1, 1]`.
    fn set_power(&mut self, power: f64);
    fn power(&self) -> f64;
}

/// A positional servo commanded in `[0, 1]` of its travel.
pub trait ServoDevice {
    fn set_position(&mut self, position: f64);
    fn position(&self) -> f64;
}

/// A quadrature encoder channel.
pub trait Encoder {
    /// Tick position and tick rate sampled together.
    fn position_and_velocity(&self) -> PositionVelocity;
}

/// An inertial sensor with an absolute, resettable heading.
pub trait Imu {
    /// Heading in radians.
    fn heading(&self) -> f64;
    /// Angular rate in radians per second, as reported by the sensor.
    fn heading_velocity(&self) -> f64;
    fn reset_heading(&mut self);
}

/// A battery voltage tap.
pub trait VoltageSensor {
    fn voltage(&self) -> f64;
}

/// A debounced digital channel (beam breaks, limit switches).
pub trait DigitalInput {
    fn state(&self) -> bool;
}

pub type SharedMotor = Rc<RefCell<dyn DriveMotor>>;
pub type SharedServo = Rc<RefCell<dyn ServoDevice>>;
pub type SharedEncoder = Rc<RefCell<dyn Encoder>>;
pub type SharedImu = Rc<RefCell<dyn Imu>>;
pub type SharedVoltageSensor = Rc<RefCell<dyn VoltageSensor>>;
pub type SharedDigitalInput = Rc<RefCell<dyn DigitalInput>>;

/// Named device registry.
///
/// The permissive accessors never fail: a missing name is logged and
/// replaced with a simulated stand-in, so a robot with a broken or absent
/// device keeps driving in a degraded state instead of aborting
/// initialization. Callers that want the failure use the `try_` accessors.
/// An empty map is therefore a fully simulated robot.
#[derive(Default)]
pub struct HardwareMap {
    motors: HashMap<String, SharedMotor>,
    servos: HashMap<String, SharedServo>,
    encoders: HashMap<String, SharedEncoder>,
    imus: HashMap<String, SharedImu>,
    voltage_sensors: HashMap<String, SharedVoltageSensor>,
    digital_inputs: HashMap<String, SharedDigitalInput>,
    degraded: Cell<bool>,
}

impl HardwareMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once any permissive lookup has had to substitute a simulated
    /// device.
    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    pub fn insert_motor(&mut self, name: impl Into<String>, motor: SharedMotor) {
        self.motors.insert(name.into(), motor);
    }

    pub fn insert_servo(&mut self, name: impl Into<String>, servo: SharedServo) {
        self.servos.insert(name.into(), servo);
    }

    pub fn insert_encoder(&mut self, name: impl Into<String>, encoder: SharedEncoder) {
        self.encoders.insert(name.into(), encoder);
    }

    pub fn insert_imu(&mut self, name: impl Into<String>, imu: SharedImu) {
        self.imus.insert(name.into(), imu);
    }

    pub fn insert_voltage_sensor(&mut self, name: impl Into<String>, sensor: SharedVoltageSensor) {
        self.voltage_sensors.insert(name.into(), sensor);
    }

    pub fn insert_digital_input(&mut self, name: impl Into<String>, input: SharedDigitalInput) {
        self.digital_inputs.insert(name.into(), input);
    }

    pub fn try_motor(&self, name: &str) -> Result<SharedMotor, HardwareError> {
        self.motors.get(name).cloned().ok_or_else(|| HardwareError::NotFound {
            name: name.to_owned(),
        })
    }

    pub fn try_servo(&self, name: &str) -> Result<SharedServo, HardwareError> {
        self.servos.get(name).cloned().ok_or_else(|| HardwareError::NotFound {
            name: name.to_owned(),
        })
    }

    pub fn try_encoder(&self, name: &str) -> Result<SharedEncoder, HardwareError> {
        self.encoders.get(name).cloned().ok_or_else(|| HardwareError::NotFound {
            name: name.to_owned(),
        })
    }

    pub fn try_imu(&self, name: &str) -> Result<SharedImu, HardwareError> {
        self.imus.get(name).cloned().ok_or_else(|| HardwareError::NotFound {
            name: name.to_owned(),
        })
    }

    pub fn try_voltage_sensor(&self, name: &str) -> Result<SharedVoltageSensor, HardwareError> {
        self.voltage_sensors
            .get(name)
            .cloned()
            .ok_or_else(|| HardwareError::NotFound {
                name: name.to_owned(),
            })
    }

    pub fn try_digital_input(&self, name: &str) -> Result<SharedDigitalInput, HardwareError> {
        self.digital_inputs
            .get(name)
            .cloned()
            .ok_or_else(|| HardwareError::NotFound {
                name: name.to_owned(),
            })
    }

    pub fn motor(&self, name: &str) -> SharedMotor {
        self.try_motor(name).unwrap_or_else(|_| {
            self.note_substitution("motor", name);
            Rc::new(RefCell::new(SimMotor::new()))
        })
    }

    pub fn servo(&self, name: &str) -> SharedServo {
        self.try_servo(name).unwrap_or_else(|_| {
            self.note_substitution("servo", name);
            Rc::new(RefCell::new(SimServo::new()))
        })
    }

    pub fn encoder(&self, name: &str) -> SharedEncoder {
        self.try_encoder(name).unwrap_or_else(|_| {
            self.note_substitution("encoder", name);
            Rc::new(RefCell::new(SimEncoder::new()))
        })
    }

    pub fn imu(&self, name: &str) -> SharedImu {
        self.try_imu(name).unwrap_or_else(|_| {
            self.note_substitution("imu", name);
            Rc::new(RefCell::new(SimImu::new()))
        })
    }

    pub fn voltage_sensor(&self, name: &str) -> SharedVoltageSensor {
        self.try_voltage_sensor(name).unwrap_or_else(|_| {
            self.note_substitution("voltage sensor", name);
            Rc::new(RefCell::new(SimVoltageSensor::new()))
        })
    }

    pub fn digital_input(&self, name: &str) -> SharedDigitalInput {
        self.try_digital_input(name).unwrap_or_else(|_| {
            self.note_substitution("digital input", name);
            Rc::new(RefCell::new(SimDigitalInput::new()))
        })
    }

    fn note_substitution(&self, kind: &str, name: &str) {
        warn!("{kind} `{name}` not found, substituting a simulated device");
        self.degraded.set(true);
    }
}
