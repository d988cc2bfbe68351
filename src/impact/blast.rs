//! Overpressure blast simulator.
//!
//! Given an impact energy in megatons, three concentric overpressure rings are derived from the
//! cube-root scaling of the yield in kilotons:
//!
//! | ring    | overpressure | coefficient | fatality |
//! |---------|--------------|-------------|----------|
//! | severe  | 10 psi       | 0.40        | 0.90     |
//! | moderate| 5 psi        | 0.75        | 0.40     |
//! | light   | 1 psi        | 2.10        | 0.10     |
//!
//! Unlike the parametric model, the areas here are **annuli**: the moderate ring excludes the
//! severe disk and the light ring excludes the moderate disk.

use std::f64::consts::PI;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    astroscope_errors::AstroScopeError,
    constants::{
        Degree, Kilometer, Megaton, PeoplePerKm2, SquareKilometer, DEFAULT_BLAST_POPULATION_DENSITY,
        DEFAULT_IMPACT_ANGLE, KILOTONS_PER_MEGATON, RADEG,
    },
    conversion::{json_to_f64, parse_embedded_number},
};

const R10_COEFF: f64 = 0.40;
const R5_COEFF: f64 = 0.75;
const R1_COEFF: f64 = 2.10;

const R10_FATALITY: f64 = 0.90;
const R5_FATALITY: f64 = 0.40;
const R1_FATALITY: f64 = 0.10;

/// Bounds of the angle coupling factor.
const MIN_COUPLING: f64 = 0.4;
const MAX_COUPLING: f64 = 1.0;

/// A blast request as posted by the impact simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct BlastRequest {
    pub lat: Degree,
    pub lng: Degree,
    pub energy_mt: Megaton,
    pub angle_deg: Degree,
    pub pop_density_km2: PeoplePerKm2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: Degree,
    pub lng: Degree,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlastRadii {
    pub r10psi: Kilometer,
    pub r5psi: Kilometer,
    pub r1psi: Kilometer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlastAreas {
    pub a10psi_km2: SquareKilometer,
    pub a5psi_km2: SquareKilometer,
    pub a1psi_km2: SquareKilometer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlastCasualties {
    pub severe: u64,
    pub moderate: u64,
    pub light: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlastAssessment {
    pub center: GeoPoint,
    pub radii_km: BlastRadii,
    pub areas_km2: BlastAreas,
    pub casualties_est: BlastCasualties,
}

impl BlastRequest {
    /// Request with the default angle (45°) and population density (3000 /km²).
    pub fn new(lat: Degree, lng: Degree, energy_mt: Megaton) -> Self {
        BlastRequest {
            lat,
            lng,
            energy_mt,
            angle_deg: DEFAULT_IMPACT_ANGLE,
            pop_density_km2: DEFAULT_BLAST_POPULATION_DENSITY,
        }
    }

    pub fn with_angle(mut self, angle_deg: Degree) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    pub fn with_population_density(mut self, pop_density_km2: PeoplePerKm2) -> Self {
        self.pop_density_km2 = pop_density_km2;
        self
    }

    /// Build a request from the JSON body posted by the simulator.
    ///
    /// `lat`, `lng` and `energy_mt` are required; `angle_deg` and `pop_density_km2` fall back to
    /// their defaults when absent. Every field may be a JSON number or a numeric string, and
    /// `energy_mt` may additionally carry a unit (`"123.4 Mt"`).
    ///
    /// Return
    /// ------
    /// * The validated request, or [`AstroScopeError::InvalidImpactRequest`] naming the offending
    ///   field
    pub fn from_json(payload: &Value) -> Result<Self, AstroScopeError> {
        if !payload.is_object() {
            return Err(AstroScopeError::InvalidImpactRequest(
                "payload must be a JSON object".into(),
            ));
        }

        let request = BlastRequest {
            lat: required_number(payload, "lat")?,
            lng: required_number(payload, "lng")?,
            energy_mt: energy_field(payload)?,
            angle_deg: optional_number(payload, "angle_deg", DEFAULT_IMPACT_ANGLE)?,
            pop_density_km2: optional_number(
                payload,
                "pop_density_km2",
                DEFAULT_BLAST_POPULATION_DENSITY,
            )?,
        };
        request.validate()?;
        Ok(request)
    }

    /// Reject non-finite values and negative energy or density.
    ///
    /// Coordinates are not range-checked: the location is only echoed back as the center.
    pub fn validate(&self) -> Result<(), AstroScopeError> {
        let fields = [
            ("lat", self.lat),
            ("lng", self.lng),
            ("energy_mt", self.energy_mt),
            ("angle_deg", self.angle_deg),
            ("pop_density_km2", self.pop_density_km2),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AstroScopeError::InvalidImpactRequest(format!(
                "{name} must be a finite number, got {value}"
            )));
        }
        if self.energy_mt < 0.0 {
            return Err(AstroScopeError::InvalidImpactRequest(format!(
                "energy_mt must not be negative, got {}",
                self.energy_mt
            )));
        }
        if self.pop_density_km2 < 0.0 {
            return Err(AstroScopeError::InvalidImpactRequest(format!(
                "pop_density_km2 must not be negative, got {}",
                self.pop_density_km2
            )));
        }
        Ok(())
    }
}

fn required_number(payload: &Value, key: &str) -> Result<f64, AstroScopeError> {
    let value = payload
        .get(key)
        .ok_or_else(|| AstroScopeError::InvalidImpactRequest(format!("missing field '{key}'")))?;
    json_to_f64(value).ok_or_else(|| malformed(key, value))
}

fn optional_number(payload: &Value, key: &str, default: f64) -> Result<f64, AstroScopeError> {
    match payload.get(key) {
        None => Ok(default),
        Some(value) => json_to_f64(value).ok_or_else(|| malformed(key, value)),
    }
}

fn energy_field(payload: &Value) -> Result<Megaton, AstroScopeError> {
    let value = payload.get("energy_mt").ok_or_else(|| {
        AstroScopeError::InvalidImpactRequest("missing field 'energy_mt'".into())
    })?;
    match value {
        Value::String(s) => parse_embedded_number(s),
        other => json_to_f64(other),
    }
    .ok_or_else(|| malformed("energy_mt", value))
}

fn malformed(key: &str, value: &Value) -> AstroScopeError {
    AstroScopeError::InvalidImpactRequest(format!("field '{key}' is not a number: {value}"))
}

/// Angle coupling factor `clamp(sin(angle), 0.4, 1.0)`.
///
/// Grazing and vertical impacts are bounded: anything shallower than ~23.6° couples at 0.4.
pub fn coupling_factor(angle_deg: Degree) -> f64 {
    (angle_deg * RADEG).sin().clamp(MIN_COUPLING, MAX_COUPLING)
}

/// Overpressure rings, annular areas and casualties for an energy already in megatons.
///
/// Casualties are truncated toward zero per ring and the total is the sum of the truncated
/// rings. Inputs are not validated here, see [`simulate_blast`].
pub fn blast_bands(
    energy_mt: Megaton,
    angle_deg: Degree,
    pop_density: PeoplePerKm2,
) -> (BlastRadii, BlastAreas, BlastCasualties) {
    let yield_kt = energy_mt * KILOTONS_PER_MEGATON;
    let w13 = yield_kt.powf(1.0 / 3.0);
    let coupling = coupling_factor(angle_deg);

    let r10 = R10_COEFF * w13 * coupling;
    let r5 = R5_COEFF * w13 * coupling;
    let r1 = R1_COEFF * w13 * coupling;

    let a10 = PI * r10 * r10;
    let a5 = PI * r5 * r5 - a10;
    let a1 = PI * r1 * r1 - PI * r5 * r5;

    let severe = (pop_density * a10 * R10_FATALITY) as u64;
    let moderate = (pop_density * a5 * R5_FATALITY) as u64;
    let light = (pop_density * a1 * R1_FATALITY) as u64;

    (
        BlastRadii {
            r10psi: r10,
            r5psi: r5,
            r1psi: r1,
        },
        BlastAreas {
            a10psi_km2: a10,
            a5psi_km2: a5,
            a1psi_km2: a1,
        },
        BlastCasualties {
            severe,
            moderate,
            light,
            total: severe + moderate + light,
        },
    )
}

/// Run the blast model for a request.
///
/// Arguments
/// ---------
/// * `request`: impact location, energy (Mt), angle (degrees) and population density (/km²)
///
/// Return
/// ------
/// * [`BlastAssessment`] centered on the request location, or
///   [`AstroScopeError::InvalidImpactRequest`] when the request does not validate
pub fn simulate_blast(request: &BlastRequest) -> Result<BlastAssessment, AstroScopeError> {
    request.validate()?;

    let (radii_km, areas_km2, casualties_est) =
        blast_bands(request.energy_mt, request.angle_deg, request.pop_density_km2);

    debug!(
        energy_mt = request.energy_mt,
        r1psi = radii_km.r1psi,
        total = casualties_est.total,
        "simulated blast"
    );

    Ok(BlastAssessment {
        center: GeoPoint {
            lat: request.lat,
            lng: request.lng,
        },
        radii_km,
        areas_km2,
        casualties_est,
    })
}
