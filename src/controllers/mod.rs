pub mod feedforward;
pub mod holonomic;
