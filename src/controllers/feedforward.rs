use crate::holonomic::kinematics::WheelMotion;

/// Voltage-domain motor model with static, velocity and acceleration terms.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MotorFeedforward {
    pub ks: f64, // Static friction breakaway, volts
    pub kv: f64, // Volts per unit of wheel velocity
    pub ka: f64, // Volts per unit of wheel acceleration
}

impl MotorFeedforward {
    pub fn new(ks: f64, kv: f64, ka: f64) -> Self {
        Self { ks, kv, ka }
    }

    /// Model voltage for the requested wheel motion.
    ///
    /// A wheel at rest gets no static term. `f64::signum` reports 1 at 0,
    /// so the rest case is pinned to 0 explicitly.
    pub fn compute(&self, motion: WheelMotion) -> f64 {
        let static_term = if motion.velocity == 0.0 {
            0.0
        } else {
            self.ks * motion.velocity.signum()
        };
        static_term + self.kv * motion.velocity + self.ka * motion.acceleration
    }

    /// Normalized motor power: model voltage over the live battery voltage,
    /// so commanded velocity holds up as the battery sags.
    pub fn power(&self, motion: WheelMotion, voltage: f64) -> f64 {
        self.compute(motion) / voltage
    }
}
