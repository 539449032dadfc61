pub mod actions;
pub mod drive_curve;
pub mod kinematics;
pub mod pose;
pub mod profile;

#[macro_use]
pub mod drive;
#[macro_use]
pub mod teleop;
