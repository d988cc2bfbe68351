//! # Classical orbital elements
//!
//! This module defines [`OrbitalElements`](crate::orbital_elements::OrbitalElements), the
//! **classical orbital element set** consumed by the orbit geometry engine.
//!
//! ## What is stored
//!
//! 1. **a** – Semi-major axis (AU)
//! 2. **e** – Eccentricity (unitless, `0 ≤ e < 1`)
//! 3. **i** – Inclination (degrees)
//! 4. **Ω** – Longitude of ascending node (degrees)
//! 5. **ω** – Argument of periapsis (degrees)
//! 6. **tp** – Time of periapsis (optional, JD TDB)
//!
//! Angles are kept in **degrees**, the unit used by the JPL Small-Body Database. They may hold
//! any real value; [`OrbitalElements::angles_rad`](crate::orbital_elements::OrbitalElements::angles_rad)
//! normalizes them to `[0, 360)` before converting to radians.
//!
//! The time of periapsis is carried for display only: resolving the body position at a date
//! is outside the scope of this crate, so the geometry never reads it.
//!
//! ## Building from the SBDB feed
//!
//! The SBDB API returns a list of `{name, value}` records. Once reduced to a map
//! `short-name → value` (see [`crate::risk_feed::sbdb`]), the elements are built with
//! [`OrbitalElements::from_element_map`](crate::orbital_elements::OrbitalElements::from_element_map):
//!
//! ```rust
//! use std::collections::HashMap;
//! use astroscope::orbital_elements::OrbitalElements;
//!
//! let map: HashMap<String, f64> = [
//!     ("a", 1.458), ("e", 0.2228), ("i", 10.83), ("om", 304.3), ("w", 178.9),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v))
//! .collect();
//!
//! let eros = OrbitalElements::from_element_map(&map).unwrap();
//! assert_eq!(eros.semi_major_axis, 1.458);
//! ```

use std::{collections::HashMap, fmt};

use hifitime::Epoch;
use serde::Serialize;

use crate::{
    astroscope_errors::AstroScopeError,
    constants::{AstronomicalUnit, Degree, Radian, RADEG},
    ref_system::principal_angle_deg,
};

/// Short names of the elements read from the SBDB feed.
pub const ELEMENT_NAMES: [&str; 6] = ["e", "a", "i", "om", "w", "tp"];

/// Classical orbital elements of a small body, angles in degrees.
///
/// Units
/// -----
/// * `semi_major_axis`: AU.
/// * `eccentricity`: unitless.
/// * `inclination`: degrees.
/// * `ascending_node_longitude`: degrees (Ω).
/// * `periapsis_argument`: degrees (ω).
/// * `time_of_periapsis`: optional epoch (tp), informative only.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct OrbitalElements {
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub ascending_node_longitude: Degree,
    pub periapsis_argument: Degree,
    #[serde(skip)]
    pub time_of_periapsis: Option<Epoch>,
}

impl OrbitalElements {
    /// Build and validate an element set.
    ///
    /// Arguments
    /// ---------
    /// * `semi_major_axis` – `a` in AU, strictly positive.
    /// * `eccentricity` – `e`, in `[0, 1)`.
    /// * `inclination` – `i` in degrees.
    /// * `ascending_node_longitude` – `Ω` in degrees.
    /// * `periapsis_argument` – `ω` in degrees.
    ///
    /// Return
    /// ------
    /// * The element set, or [`AstroScopeError::InvalidOrbitalElements`] when out of domain.
    pub fn new(
        semi_major_axis: AstronomicalUnit,
        eccentricity: f64,
        inclination: Degree,
        ascending_node_longitude: Degree,
        periapsis_argument: Degree,
    ) -> Result<Self, AstroScopeError> {
        let elements = OrbitalElements {
            semi_major_axis,
            eccentricity,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
            time_of_periapsis: None,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Attach a time of periapsis given as a Julian Date in the TDB scale.
    pub fn with_time_of_periapsis_jd(mut self, tp_jd_tdb: f64) -> Self {
        self.time_of_periapsis = Some(Epoch::from_jde_tdb(tp_jd_tdb));
        self
    }

    /// Build the elements from the SBDB short-name map `{e, a, i, om, w, tp}`.
    ///
    /// `a, e, i, om, w` are required; `tp` is optional and only attached when finite.
    ///
    /// Arguments
    /// ---------
    /// * `map` – element short name → numeric value.
    ///
    /// Return
    /// ------
    /// * The validated element set, or [`AstroScopeError::InvalidOrbitalElements`] naming the
    ///   first missing element or the violated constraint.
    pub fn from_element_map(map: &HashMap<String, f64>) -> Result<Self, AstroScopeError> {
        let get = |name: &str| {
            map.get(name).copied().ok_or_else(|| {
                AstroScopeError::InvalidOrbitalElements(format!("missing element '{name}'"))
            })
        };

        let elements = OrbitalElements::new(get("a")?, get("e")?, get("i")?, get("om")?, get("w")?)?;

        Ok(match map.get("tp") {
            Some(tp) if tp.is_finite() => elements.with_time_of_periapsis_jd(*tp),
            _ => elements,
        })
    }

    /// Check the domain of the elements: `a > 0`, `0 ≤ e < 1` and finite angles.
    pub fn validate(&self) -> Result<(), AstroScopeError> {
        let a = self.semi_major_axis;
        let e = self.eccentricity;

        if !a.is_finite() || a <= 0.0 {
            return Err(AstroScopeError::InvalidOrbitalElements(format!(
                "semi-major axis must be positive, got {a}"
            )));
        }
        if !e.is_finite() || !(0.0..1.0).contains(&e) {
            return Err(AstroScopeError::InvalidOrbitalElements(format!(
                "eccentricity must lie in [0, 1), got {e}"
            )));
        }

        let angles = [
            ("inclination", self.inclination),
            ("ascending node longitude", self.ascending_node_longitude),
            ("argument of periapsis", self.periapsis_argument),
        ];
        if let Some((name, value)) = angles.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AstroScopeError::InvalidOrbitalElements(format!(
                "{name} must be finite, got {value}"
            )));
        }
        Ok(())
    }

    /// Semi-latus rectum `p = a(1 − e²)` in AU.
    pub fn semi_latus_rectum(&self) -> AstronomicalUnit {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Semi-minor axis `b = a·sqrt(1 − e²)` in AU.
    pub fn semi_minor_axis(&self) -> AstronomicalUnit {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    /// Angular elements `(i, Ω, ω)` normalized to `[0, 360)` and converted to radians.
    pub fn angles_rad(&self) -> (Radian, Radian, Radian) {
        (
            principal_angle_deg(self.inclination) * RADEG,
            principal_angle_deg(self.ascending_node_longitude) * RADEG,
            principal_angle_deg(self.periapsis_argument) * RADEG,
        )
    }
}

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orbital Elements")?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.6} AU",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6}°",
            self.inclination
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6}°",
            self.ascending_node_longitude
        )?;
        write!(
            f,
            "  ω   (argument of periapsis) = {:.6}°",
            self.periapsis_argument
        )?;
        match self.time_of_periapsis {
            Some(tp) => write!(f, "\n  tp  (time of periapsis)     = {tp}"),
            None => Ok(()),
        }
    }
}
