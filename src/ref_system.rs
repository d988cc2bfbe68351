use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Degree, Radian, FULL_TURN_DEG};

/// Principal axes of a right-handed reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn principal_angle_deg(angle: Degree) -> Degree {
    let normalized = angle.rem_euclid(FULL_TURN_DEG);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= FULL_TURN_DEG {
        0.0
    } else {
        normalized
    }
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// The matrix represents an **active rotation** of a vector by `alpha` in the direct
/// (counter-clockwise) sense when looking down the axis toward the origin, so the rotated
/// vector is `x' = R · x`.
///
/// For the Z axis this is
///
/// ```text
/// | cos α  -sin α  0 |
/// | sin α   cos α  0 |
/// |   0       0    1 |
/// ```
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**.
/// * `axis` - Axis of rotation.
///
/// # Remarks
///
/// * Built with [`nalgebra::Rotation3::from_axis_angle`], so the result is orthonormal and
///   `R.transpose() == R.inverse()`.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotation from the perifocal frame of an orbit to the inertial reference frame.
///
/// Composes `Q = Rz(Ω) · Rx(i) · Rz(ω)`: applied to a column vector, the argument of
/// periapsis rotation acts first, then the inclination, then the node longitude.
///
/// Arguments
/// ---------
/// * `inclination` – `i` in radians.
/// * `ascending_node_longitude` – `Ω` in radians.
/// * `periapsis_argument` – `ω` in radians.
///
/// Return
/// ------
/// * The 3×3 matrix `Q` such that `r_inertial = Q · r_perifocal`.
pub fn perifocal_to_inertial(
    inclination: Radian,
    ascending_node_longitude: Radian,
    periapsis_argument: Radian,
) -> Matrix3<f64> {
    let r_node = rotmt(ascending_node_longitude, Axis::Z);
    let r_incl = rotmt(inclination, Axis::X);
    let r_peri = rotmt(periapsis_argument, Axis::Z);

    r_node * r_incl * r_peri
}
