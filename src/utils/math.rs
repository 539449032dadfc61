use num_traits::{Float, FromPrimitive};

#[macro_export]
macro_rules! signed_mod {
    ($dividend:expr, $divisor:expr) => {
        (($dividend % $divisor) + $divisor) % $divisor
    };
}

#[macro_export]
macro_rules! lerp {
    ($value1:expr, $value2:expr, $t:expr) => {
        $value1 + ($value2 - $value1) * $t
    };
}

#[macro_export]
macro_rules! ilerp {
    ($value1:expr, $value2:expr, $inter:expr) => {
        ($inter - $value1) / ($value2 - $value1)
    };
}

pub use ilerp;
pub use lerp;
pub use signed_mod;

/// Normalizes an angle in radians to `[0, 2π)`.
pub fn sanitize_angle<T: Float + FromPrimitive>(angle: T) -> T {
    let tau = T::from_f64(core::f64::consts::TAU).unwrap_or_else(T::zero);
    signed_mod!(angle, tau)
}

/// Normalizes an angle in radians to `(-π, π]`.
///
/// Exactly half a turn maps to `+π`, never `-π`.
pub fn wrap_angle<T: Float + FromPrimitive>(angle: T) -> T {
    let pi = T::from_f64(core::f64::consts::PI).unwrap_or_else(T::zero);
    pi - sanitize_angle(pi - angle)
}

/// Shortest signed rotation taking `current` onto `target`, in `(-π, π]`.
pub fn angle_error<T: Float + FromPrimitive>(target: T, current: T) -> T {
    wrap_angle(target - current)
}
