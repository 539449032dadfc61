pub mod actions;
pub mod controllers;
pub mod devices;

#[macro_use]
pub mod holonomic;
pub mod logger;
pub mod memory;
pub mod telemetry;
pub mod tracking;

#[macro_use]
pub mod utils;
