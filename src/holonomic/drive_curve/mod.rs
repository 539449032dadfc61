pub mod exponential;
pub mod power;

dyn_clone::clone_trait_object!(DriveCurve);

/// Maps a raw stick deflection in `[-1, 1]` to a shaped output in the same
/// range.
pub trait DriveCurve: dyn_clone::DynClone {
    fn update(&self, input: f64) -> f64;
}
