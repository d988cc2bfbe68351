//! # Orbit geometry
//!
//! Deterministic conversion of classical orbital elements into a renderable orbit:
//!
//! * [`compute_orbit_samples`] – a closed 3D point cloud, one full revolution sampled uniformly
//!   in true anomaly and rotated from the perifocal frame into the inertial frame.
//! * [`compute_ellipse_descriptor`] – a planar `EllipseCurve`-style descriptor derived from the
//!   XY projection of the same point cloud.
//!
//! ## Algorithm
//!
//! For each true anomaly `ν_k = 2π·k/(n−1)`:
//!
//! ```text
//! r        = a(1 − e²) / (1 + e·cos ν)
//! r_pf     = (r cos ν, r sin ν, 0)
//! r_inert  = Rz(Ω) · Rx(i) · Rz(ω) · r_pf
//! ```
//!
//! The first and last samples both sit at periapsis, so the curve is closed. The sample order
//! is the draw order of the curve.
//!
//! ## Approximation of the ellipse descriptor
//!
//! The descriptor's semi-axes are **half the bounding-box extents** of the projected points and
//! its center is their **centroid**, not the true projected ellipse. It is a visual approximation
//! that is good enough to draw the orbit in a 2D scene; callers that need exact geometry must
//! work from [`OrbitSample`] instead.

use std::{f64::consts::PI, io};

use itertools::Itertools;
use nalgebra::{Matrix2, Vector2, Vector3};
use serde::Serialize;
use tracing::debug;

use crate::{
    astroscope_errors::AstroScopeError,
    constants::{Radian, DEFAULT_SAMPLE_COUNT, DPI},
    orbital_elements::OrbitalElements,
    ref_system::perifocal_to_inertial,
};

/// One revolution of an orbit sampled in the inertial frame (AU).
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSample {
    points: Vec<Vector3<f64>>,
}

#[derive(Serialize)]
struct CsvPoint {
    x: f64,
    y: f64,
    z: f64,
}

impl OrbitSample {
    /// Sampled points, in draw order.
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flatten the points into `[x0, y0, z0, x1, y1, z1, ...]`, the layout expected by
    /// buffer-geometry based renderers.
    pub fn flatten(&self) -> Vec<f64> {
        self.points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }

    /// Write the points as CSV with an `x,y,z` header.
    ///
    /// Arguments
    /// ---------
    /// * `writer`: any byte sink (file, buffer, stdout)
    ///
    /// Return
    /// ------
    /// * [`AstroScopeError::CsvError`] if serialization or the underlying writer fails
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), AstroScopeError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for p in &self.points {
            csv_writer.serialize(CsvPoint {
                x: p.x,
                y: p.y,
                z: p.z,
            })?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Planar ellipse descriptor, field names follow the Three.js `EllipseCurve` arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EllipseDescriptor {
    #[serde(rename = "aX")]
    pub center_x: f64,
    #[serde(rename = "aY")]
    pub center_y: f64,
    #[serde(rename = "xRadius")]
    pub x_radius: f64,
    #[serde(rename = "yRadius")]
    pub y_radius: f64,
    #[serde(rename = "aStartAngle")]
    pub start_angle: Radian,
    #[serde(rename = "aEndAngle")]
    pub end_angle: Radian,
    #[serde(rename = "aClockwise")]
    pub clockwise: bool,
    #[serde(rename = "aRotation")]
    pub rotation: Radian,
}

/// Sample one revolution of the orbit described by `elements`.
///
/// Arguments
/// ---------
/// * `elements`: orbital elements, `a > 0` and `0 ≤ e < 1`
/// * `sample_count`: number of true-anomaly samples over `[0, 2π]`, at least 2
///
/// Return
/// ------
/// * Exactly `sample_count` inertial-frame points, first and last at periapsis
/// * [`AstroScopeError::InvalidOrbitalElements`] or [`AstroScopeError::InvalidSampleCount`]
///   when the inputs are out of domain; nothing is computed in that case
pub fn compute_orbit_samples(
    elements: &OrbitalElements,
    sample_count: usize,
) -> Result<OrbitSample, AstroScopeError> {
    elements.validate()?;
    if sample_count < 2 {
        return Err(AstroScopeError::InvalidSampleCount(sample_count));
    }

    let (inclination, node, periapsis) = elements.angles_rad();
    let q = perifocal_to_inertial(inclination, node, periapsis);

    let e = elements.eccentricity;
    let p = elements.semi_latus_rectum();
    let last = (sample_count - 1) as f64;

    let points = (0..sample_count)
        .map(|k| {
            let nu = DPI * (k as f64 / last);
            let (sin_nu, cos_nu) = nu.sin_cos();
            let r = p / (1.0 + e * cos_nu);
            q * Vector3::new(r * cos_nu, r * sin_nu, 0.0)
        })
        .collect();

    debug!(
        a = elements.semi_major_axis,
        e,
        sample_count,
        "sampled orbit"
    );

    Ok(OrbitSample { points })
}

/// Sample the orbit with the default resolution and flatten it (see [`OrbitSample::flatten`]).
pub fn compute_orbit_points(elements: &OrbitalElements) -> Result<Vec<f64>, AstroScopeError> {
    Ok(compute_orbit_samples(elements, DEFAULT_SAMPLE_COUNT)?.flatten())
}

/// Ellipse descriptor of the orbit projected on the XY plane, centered on the frame origin.
///
/// See [`compute_ellipse_descriptor_from`].
pub fn compute_ellipse_descriptor(
    elements: &OrbitalElements,
) -> Result<EllipseDescriptor, AstroScopeError> {
    compute_ellipse_descriptor_from(elements, Vector2::zeros())
}

/// Ellipse descriptor of the orbit projected on the XY plane, relative to `origin`.
///
/// The orbit is sampled with the default resolution, projected on XY and shifted by `-origin`.
/// Then:
///
/// * center = centroid of the projected points,
/// * semi-axes = half of the bounding-box extents along X and Y,
/// * rotation = `atan2(v_y, v_x)` of the eigenvector `v` of the largest eigenvalue of the
///   2×2 sample covariance of the projected points. The eigenvector is taken with `v_x ≥ 0`,
///   so the rotation lies in `(-π/2, π/2]`.
///
/// The semi-axes are a bounding-box approximation, not the axes of the true ellipse.
///
/// Arguments
/// ---------
/// * `elements`: orbital elements
/// * `origin`: position subtracted from every projected point (e.g. the Earth in the scene)
///
/// Return
/// ------
/// * The descriptor, or the validation error of [`compute_orbit_samples`]
pub fn compute_ellipse_descriptor_from(
    elements: &OrbitalElements,
    origin: Vector2<f64>,
) -> Result<EllipseDescriptor, AstroScopeError> {
    let sample = compute_orbit_samples(elements, DEFAULT_SAMPLE_COUNT)?;
    let projected: Vec<Vector2<f64>> = sample
        .points()
        .iter()
        .map(|p| Vector2::new(p.x - origin.x, p.y - origin.y))
        .collect();

    let (x_min, x_max) = projected
        .iter()
        .map(|p| p.x)
        .minmax_by(f64::total_cmp)
        .into_option()
        .unwrap_or((0.0, 0.0));
    let (y_min, y_max) = projected
        .iter()
        .map(|p| p.y)
        .minmax_by(f64::total_cmp)
        .into_option()
        .unwrap_or((0.0, 0.0));

    let n = projected.len() as f64;
    let center = projected.iter().sum::<Vector2<f64>>() / n;

    let covariance = projected
        .iter()
        .map(|p| {
            let d = p - center;
            d * d.transpose()
        })
        .sum::<Matrix2<f64>>()
        / (n - 1.0);

    Ok(EllipseDescriptor {
        center_x: center.x,
        center_y: center.y,
        x_radius: (x_max - x_min) / 2.0,
        y_radius: (y_max - y_min) / 2.0,
        start_angle: 0.0,
        end_angle: DPI,
        clockwise: false,
        rotation: major_axis_angle(&covariance),
    })
}

/// Angle of the dominant principal axis of a symmetric 2×2 covariance matrix.
fn major_axis_angle(covariance: &Matrix2<f64>) -> Radian {
    let eigen = covariance.symmetric_eigen();
    let major = eigen.eigenvectors.column(eigen.eigenvalues.imax());

    let (mut vx, mut vy) = (major[0], major[1]);
    if vx < 0.0 || (vx == 0.0 && vy < 0.0) {
        vx = -vx;
        vy = -vy;
    }

    let angle = vy.atan2(vx);
    // keep the half-open interval (-π/2, π/2]
    if angle <= -PI / 2.0 {
        angle + PI
    } else {
        angle
    }
}
