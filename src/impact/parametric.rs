//! Parametric impact model: density, speed and diameter → energy, damage radii, crater and
//! casualty estimates.
//!
//! All radii follow the cube-root scaling `R = k·E^(1/3)` with one coefficient per damage band.
//! Casualty areas are **full disks** `π r²` per band; the bands are not subtracted from one
//! another here (the blast simulator in [`crate::impact::blast`] uses annuli instead).

use std::{f64::consts::PI, fmt};

use serde::Serialize;
use tracing::debug;

use crate::{
    astroscope_errors::AstroScopeError,
    constants::{
        Joule, KgPerM3, Kilometer, Megaton, Meter, MeterPerSecond, PeoplePerKm2, SquareKilometer,
        JOULES_PER_MEGATON, METERS_PER_KM,
    },
    conversion::{format_scientific, format_thousands, parse_leading_number},
};

/// Radius coefficient of the severe damage band (m / J^(1/3))
pub const SEVERE_RADIUS_COEFF: f64 = 1.8e-4;
/// Radius coefficient of the moderate damage band (m / J^(1/3))
pub const MODERATE_RADIUS_COEFF: f64 = 4.0e-4;
/// Radius coefficient of the light damage band (m / J^(1/3))
pub const LIGHT_RADIUS_COEFF: f64 = 8.0e-4;

/// Severe radius above which an impact is classified as severe (km)
pub const SEVERE_CLASS_THRESHOLD_KM: Kilometer = 5.0;
/// Moderate radius above which an impact is classified as moderate (km)
pub const MODERATE_CLASS_THRESHOLD_KM: Kilometer = 2.0;

/// Fatality fraction in the severe damage disk
pub const SEVERE_FATALITY: f64 = 0.9;
/// Fatality fraction in the moderate damage disk
pub const MODERATE_FATALITY: f64 = 0.3;
/// Fatality fraction in the light damage disk
pub const LIGHT_FATALITY: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageClassification {
    Severe,
    Moderate,
    Light,
}

impl fmt::Display for DamageClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DamageClassification::Severe => "Severe",
            DamageClassification::Moderate => "Moderate",
            DamageClassification::Light => "Light",
        };
        f.write_str(label)
    }
}

/// Inputs echoed back with an [`ImpactRadius`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalInputs {
    pub density_kg_m3: KgPerM3,
    pub speed_m_s: MeterPerSecond,
    pub diameter_m: Meter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactRadius {
    pub kinetic_energy_joules: Joule,
    pub kinetic_energy_megatons: Megaton,
    pub severe_radius_km: Kilometer,
    pub moderate_radius_km: Kilometer,
    pub light_radius_km: Kilometer,
    pub damage_classification: DamageClassification,
    pub input_parameters: PhysicalInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraterDimensions {
    pub crater_diameter_m: Meter,
    pub crater_diameter_km: Kilometer,
    pub crater_depth_m: Meter,
    pub crater_depth_km: Kilometer,
    pub crater_volume_m3: f64,
    pub kinetic_energy_joules: Joule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffectedAreas {
    pub severe_area_km2: SquareKilometer,
    pub moderate_area_km2: SquareKilometer,
    pub light_area_km2: SquareKilometer,
    pub total_area_km2: SquareKilometer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CasualtyEstimate {
    pub severe_casualties: u64,
    pub moderate_casualties: u64,
    pub light_casualties: u64,
    pub total_casualties: u64,
    pub affected_areas: AffectedAreas,
}

/// Kinetic energy of the impactor, `E = (π/12)·ρ·d³·v²` in joules.
///
/// The `π/12` factor is kept as calibrated for this model: it is half of the mass of a
/// sphere of diameter `d` times `v²`, i.e. twice the textbook `½mv²` of that sphere.
/// Reference outputs of the damage tables depend on this exact constant.
pub fn kinetic_energy(density: KgPerM3, speed: MeterPerSecond, diameter: Meter) -> Joule {
    (PI / 12.0) * density * diameter.powi(3) * speed.powi(2)
}

fn require_positive(name: &str, value: f64) -> Result<f64, AstroScopeError> {
    if !value.is_finite() {
        return Err(AstroScopeError::InvalidPhysicalParameters(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    if value <= 0.0 {
        return Err(AstroScopeError::InvalidPhysicalParameters(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(value)
}

fn require_non_negative(name: &str, value: f64) -> Result<f64, AstroScopeError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AstroScopeError::InvalidPhysicalParameters(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

/// Parse a physical value given as text (`"50"`, `"0.500 km"`).
///
/// Only the leading numeric token is read; the unit, if any, is ignored.
///
/// Return
/// ------
/// * The number, or [`AstroScopeError::InvalidPhysicalParameters`] naming `name` when the text
///   does not start with a number (`"abc"`)
pub fn parse_physical_value(name: &str, raw: &str) -> Result<f64, AstroScopeError> {
    parse_leading_number(raw).ok_or_else(|| {
        AstroScopeError::InvalidPhysicalParameters(format!("{name} must be numeric, got '{raw}'"))
    })
}

/// Compute the kinetic energy, the three damage radii and the damage class of an impact.
///
/// Arguments
/// ---------
/// * `density`: impactor bulk density (kg/m³)
/// * `speed`: impact speed (m/s)
/// * `diameter`: impactor diameter (m)
///
/// Return
/// ------
/// * [`ImpactRadius`] with radii in km. The class is `Severe` when the severe radius exceeds
///   5 km, else `Moderate` when the moderate radius exceeds 2 km, else `Light`.
/// * [`AstroScopeError::InvalidPhysicalParameters`] when any input is not a positive number
pub fn compute_impact_radius(
    density: KgPerM3,
    speed: MeterPerSecond,
    diameter: Meter,
) -> Result<ImpactRadius, AstroScopeError> {
    require_positive("density", density)?;
    require_positive("speed", speed)?;
    require_positive("diameter", diameter)?;

    let energy = kinetic_energy(density, speed, diameter);
    let energy_cbrt = energy.powf(1.0 / 3.0);

    let severe_radius_km = SEVERE_RADIUS_COEFF * energy_cbrt / METERS_PER_KM;
    let moderate_radius_km = MODERATE_RADIUS_COEFF * energy_cbrt / METERS_PER_KM;
    let light_radius_km = LIGHT_RADIUS_COEFF * energy_cbrt / METERS_PER_KM;

    let damage_classification = if severe_radius_km > SEVERE_CLASS_THRESHOLD_KM {
        DamageClassification::Severe
    } else if moderate_radius_km > MODERATE_CLASS_THRESHOLD_KM {
        DamageClassification::Moderate
    } else {
        DamageClassification::Light
    };

    debug!(energy, %damage_classification, "computed impact radius");

    Ok(ImpactRadius {
        kinetic_energy_joules: energy,
        kinetic_energy_megatons: energy / JOULES_PER_MEGATON,
        severe_radius_km,
        moderate_radius_km,
        light_radius_km,
        damage_classification,
        input_parameters: PhysicalInputs {
            density_kg_m3: density,
            speed_m_s: speed,
            diameter_m: diameter,
        },
    })
}

/// Estimate the crater left by an impact.
///
/// The crater diameter follows `D = 1.2·(E/10¹²)^0.294` m, its depth is a fifth of the
/// diameter and the volume is the one of a cylinder `π(D/2)²·depth`.
///
/// Arguments
/// ---------
/// * `diameter`: impactor diameter (m)
/// * `speed`: impact speed (m/s)
/// * `density`: impactor bulk density (kg/m³)
pub fn compute_crater_dimensions(
    diameter: Meter,
    speed: MeterPerSecond,
    density: KgPerM3,
) -> Result<CraterDimensions, AstroScopeError> {
    require_positive("diameter", diameter)?;
    require_positive("speed", speed)?;
    require_positive("density", density)?;

    let energy = kinetic_energy(density, speed, diameter);
    let crater_diameter_m = 1.2 * (energy / 1e12).powf(0.294);
    let crater_depth_m = crater_diameter_m * 0.2;

    Ok(CraterDimensions {
        crater_diameter_m,
        crater_diameter_km: crater_diameter_m / METERS_PER_KM,
        crater_depth_m,
        crater_depth_km: crater_depth_m / METERS_PER_KM,
        crater_volume_m3: PI * (crater_diameter_m / 2.0).powi(2) * crater_depth_m,
        kinetic_energy_joules: energy,
    })
}

/// Estimate casualties inside the three damage disks.
///
/// Each band uses the full disk `π r²` of its own radius. Casualties are
/// `area × population_density × fatality` with fractions 0.90 / 0.30 / 0.05, rounded half to
/// even; the total is the rounded sum of the unrounded bands.
///
/// Arguments
/// ---------
/// * `severe_radius_km`, `moderate_radius_km`, `light_radius_km`: damage radii (km)
/// * `population_density`: people per km² (see
///   [`DEFAULT_POPULATION_DENSITY`](crate::constants::DEFAULT_POPULATION_DENSITY))
///
/// Return
/// ------
/// * [`CasualtyEstimate`], or [`AstroScopeError::InvalidPhysicalParameters`] when an input is
///   negative or not finite
pub fn estimate_casualties(
    severe_radius_km: Kilometer,
    moderate_radius_km: Kilometer,
    light_radius_km: Kilometer,
    population_density: PeoplePerKm2,
) -> Result<CasualtyEstimate, AstroScopeError> {
    require_non_negative("severe radius", severe_radius_km)?;
    require_non_negative("moderate radius", moderate_radius_km)?;
    require_non_negative("light radius", light_radius_km)?;
    require_non_negative("population density", population_density)?;

    let severe_area_km2 = PI * severe_radius_km * severe_radius_km;
    let moderate_area_km2 = PI * moderate_radius_km * moderate_radius_km;
    let light_area_km2 = PI * light_radius_km * light_radius_km;

    let severe = severe_area_km2 * population_density * SEVERE_FATALITY;
    let moderate = moderate_area_km2 * population_density * MODERATE_FATALITY;
    let light = light_area_km2 * population_density * LIGHT_FATALITY;

    Ok(CasualtyEstimate {
        severe_casualties: round_count(severe),
        moderate_casualties: round_count(moderate),
        light_casualties: round_count(light),
        total_casualties: round_count(severe + moderate + light),
        affected_areas: AffectedAreas {
            severe_area_km2,
            moderate_area_km2,
            light_area_km2,
            total_area_km2: severe_area_km2 + moderate_area_km2 + light_area_km2,
        },
    })
}

fn round_count(value: f64) -> u64 {
    value.round_ties_even() as u64
}

impl fmt::Display for ImpactRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "ASTEROID IMPACT ANALYSIS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Input Parameters:")?;
        let input = &self.input_parameters;
        writeln!(f, "  Density:    {} kg/m³", format_thousands(input.density_kg_m3))?;
        writeln!(f, "  Speed:      {} m/s", format_thousands(input.speed_m_s))?;
        writeln!(f, "  Diameter:   {} m", format_thousands(input.diameter_m))?;
        writeln!(f)?;
        writeln!(f, "Calculated Results:")?;
        writeln!(
            f,
            "  Kinetic Energy: {} Joules",
            format_scientific(self.kinetic_energy_joules, 2)
        )?;
        writeln!(
            f,
            "  Kinetic Energy: {:.2} Megatons TNT",
            self.kinetic_energy_megatons
        )?;
        writeln!(f)?;
        writeln!(f, "Impact Radii:")?;
        writeln!(f, "  Severe Damage:   {:.2} km", self.severe_radius_km)?;
        writeln!(f, "  Moderate Damage: {:.2} km", self.moderate_radius_km)?;
        writeln!(f, "  Light Damage:    {:.2} km", self.light_radius_km)?;
        writeln!(f)?;
        writeln!(
            f,
            "Overall Classification: {}",
            self.damage_classification
        )?;
        write!(f, "{rule}")
    }
}
