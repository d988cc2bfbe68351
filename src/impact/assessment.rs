//! Composition of the two impact models.
//!
//! [`assess_impact`] derives the energy with the parametric formula and feeds it into the
//! overpressure rings of the blast simulator, so a single [`ImpactParameters`] value yields a
//! complete [`ImpactAssessment`].
//!
//! [`comprehensive_impact_assessment`] works on the records published by the risk feed
//! (`"Diameter": "0.500 km"`, `"Velocity": "20.000 km/s"`) and runs the parametric model end to
//! end: radius, crater and casualties.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    astroscope_errors::AstroScopeError,
    constants::{
        Degree, Joule, KgPerM3, Kilometer, Megaton, Meter, MeterPerSecond, PeoplePerKm2,
        DEFAULT_DENSITY, JOULES_PER_MEGATON, METERS_PER_KM,
    },
    conversion::{json_to_f64, parse_leading_number},
    impact::{
        blast::{blast_bands, BlastAreas, BlastCasualties, BlastRadii},
        parametric::{
            compute_crater_dimensions, compute_impact_radius, estimate_casualties, kinetic_energy,
            CasualtyEstimate, CraterDimensions, ImpactRadius,
        },
    },
};

/// Physical description of a hypothetical impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactParameters {
    pub density_kg_m3: KgPerM3,
    pub speed_m_s: MeterPerSecond,
    pub diameter_m: Meter,
    pub angle_deg: Degree,
    pub population_density_km2: PeoplePerKm2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactAssessment {
    pub kinetic_energy_joules: Joule,
    pub kinetic_energy_megatons: Megaton,
    pub radii_km: BlastRadii,
    pub areas_km2: BlastAreas,
    pub casualties: BlastCasualties,
}

impl ImpactParameters {
    pub fn new(
        density_kg_m3: KgPerM3,
        speed_m_s: MeterPerSecond,
        diameter_m: Meter,
        angle_deg: Degree,
        population_density_km2: PeoplePerKm2,
    ) -> Result<Self, AstroScopeError> {
        let params = ImpactParameters {
            density_kg_m3,
            speed_m_s,
            diameter_m,
            angle_deg,
            population_density_km2,
        };
        params.validate()?;
        Ok(params)
    }

    /// Density, speed and diameter must be strictly positive; angle and population density
    /// must not be negative. Everything must be finite.
    pub fn validate(&self) -> Result<(), AstroScopeError> {
        let positive = [
            ("density", self.density_kg_m3),
            ("speed", self.speed_m_s),
            ("diameter", self.diameter_m),
        ];
        let non_negative = [
            ("angle", self.angle_deg),
            ("population density", self.population_density_km2),
        ];

        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AstroScopeError::InvalidPhysicalParameters(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AstroScopeError::InvalidPhysicalParameters(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Energy, overpressure rings, annular areas and casualties of an impact.
///
/// Arguments
/// ---------
/// * `params`: validated impact description
///
/// Return
/// ------
/// * [`ImpactAssessment`] whose rings use the parameters' angle and population density, or
///   [`AstroScopeError::InvalidPhysicalParameters`]
pub fn assess_impact(params: &ImpactParameters) -> Result<ImpactAssessment, AstroScopeError> {
    params.validate()?;

    let energy = kinetic_energy(params.density_kg_m3, params.speed_m_s, params.diameter_m);
    let energy_mt = energy / JOULES_PER_MEGATON;
    let (radii_km, areas_km2, casualties) =
        blast_bands(energy_mt, params.angle_deg, params.population_density_km2);

    debug!(energy_mt, total = casualties.total, "assessed impact");

    Ok(ImpactAssessment {
        kinetic_energy_joules: energy,
        kinetic_energy_megatons: energy_mt,
        radii_km,
        areas_km2,
        casualties,
    })
}

/// Physical parameters extracted from a risk-feed record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordParameters {
    pub diameter_m: Meter,
    pub velocity_m_s: MeterPerSecond,
    pub density_kg_m3: KgPerM3,
}

/// Read a record field in km or km/s, as a number or as `"<number> <unit>"`.
///
/// A missing field reads as zero and is rejected later by the model.
fn record_quantity(record: &Value, key: &str) -> Result<f64, AstroScopeError> {
    let Some(raw) = record.get(key) else {
        return Ok(0.0);
    };
    let parsed = match raw {
        Value::String(s) => parse_leading_number(s),
        other => json_to_f64(other),
    };
    parsed.ok_or_else(|| {
        AstroScopeError::InvalidPhysicalParameters(format!("{key} must be numeric, got {raw}"))
    })
}

/// Convert a risk-feed record into model inputs.
///
/// `"Diameter"` (km) and `"Velocity"` (km/s) are converted to meters and meters per second.
/// The feed carries no density, so the typical stony value (3000 kg/m³) is used.
pub fn parameters_from_risk_record(record: &Value) -> Result<RecordParameters, AstroScopeError> {
    Ok(RecordParameters {
        diameter_m: record_quantity(record, "Diameter")? * METERS_PER_KM,
        velocity_m_s: record_quantity(record, "Velocity")? * METERS_PER_KM,
        density_kg_m3: DEFAULT_DENSITY,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsteroidInfo {
    pub designation: String,
    pub diameter_km: Kilometer,
    pub velocity_km_s: f64,
    pub density_kg_m3: KgPerM3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensiveAssessment {
    pub asteroid_info: AsteroidInfo,
    pub impact_assessment: ImpactRadius,
    pub crater_analysis: CraterDimensions,
    pub casualty_estimation: CasualtyEstimate,
}

/// Run the parametric model on a risk-feed record: radius, crater and casualties.
///
/// The designation is read from `"des"`, then `"Full Name"`, else `"Unknown"`.
///
/// Arguments
/// ---------
/// * `record`: JSON object with at least `"Diameter"` and `"Velocity"`
/// * `population_density`: people per km²
///
/// Return
/// ------
/// * The combined assessment, or the first error raised by one of the steps
pub fn comprehensive_impact_assessment(
    record: &Value,
    population_density: PeoplePerKm2,
) -> Result<ComprehensiveAssessment, AstroScopeError> {
    let params = parameters_from_risk_record(record)?;

    let impact = compute_impact_radius(params.density_kg_m3, params.velocity_m_s, params.diameter_m)?;
    let crater =
        compute_crater_dimensions(params.diameter_m, params.velocity_m_s, params.density_kg_m3)?;
    let casualties = estimate_casualties(
        impact.severe_radius_km,
        impact.moderate_radius_km,
        impact.light_radius_km,
        population_density,
    )?;

    let designation = ["des", "Full Name"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .unwrap_or("Unknown")
        .to_string();

    Ok(ComprehensiveAssessment {
        asteroid_info: AsteroidInfo {
            designation,
            diameter_km: params.diameter_m / METERS_PER_KM,
            velocity_km_s: params.velocity_m_s / METERS_PER_KM,
            density_kg_m3: params.density_kg_m3,
        },
        impact_assessment: impact,
        crater_analysis: crater,
        casualty_estimation: casualties,
    })
}

#[cfg(test)]
mod assessment_test {
    use super::*;
    use crate::impact::parametric::DamageClassification;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_assess_impact_composes_models() {
        let params = ImpactParameters::new(3000.0, 20000.0, 500.0, 45.0, 1000.0).unwrap();
        let result = assess_impact(&params).unwrap();

        assert_relative_eq!(result.kinetic_energy_joules, 3.926990816987241e19, max_relative = 1e-12);
        assert_relative_eq!(result.kinetic_energy_megatons, 9385.73331019895, max_relative = 1e-12);
        assert_relative_eq!(result.radii_km.r10psi, 59.66244725640204, max_relative = 1e-10);
        assert_relative_eq!(result.radii_km.r5psi, 111.86708860575382, max_relative = 1e-10);
        assert_relative_eq!(result.radii_km.r1psi, 313.2278480961107, max_relative = 1e-10);
        assert_eq!(
            result.casualties.total,
            result.casualties.severe + result.casualties.moderate + result.casualties.light
        );
    }

    #[test]
    fn test_assess_impact_matches_blast_bands() {
        let params = ImpactParameters::new(7800.0, 17000.0, 50.0, 30.0, 250.0).unwrap();
        let result = assess_impact(&params).unwrap();
        let (radii, areas, casualties) = blast_bands(result.kinetic_energy_megatons, 30.0, 250.0);
        assert_eq!(result.radii_km, radii);
        assert_eq!(result.areas_km2, areas);
        assert_eq!(result.casualties, casualties);
    }

    #[test]
    fn test_parameters_validation() {
        assert!(ImpactParameters::new(3000.0, 20000.0, 500.0, 0.0, 0.0).is_ok());
        assert_eq!(
            ImpactParameters::new(3000.0, 0.0, 500.0, 45.0, 10.0),
            Err(AstroScopeError::InvalidPhysicalParameters(
                "speed must be a positive number, got 0".into()
            ))
        );
        assert!(ImpactParameters::new(3000.0, 20000.0, 500.0, -1.0, 10.0).is_err());
        assert!(ImpactParameters::new(3000.0, 20000.0, 500.0, 45.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parameters_from_risk_record() {
        let record = json!({"des": "1979 XB", "Diameter": "0.500 km", "Velocity": "20.000 km/s"});
        let params = parameters_from_risk_record(&record).unwrap();
        assert_relative_eq!(params.diameter_m, 500.0);
        assert_relative_eq!(params.velocity_m_s, 20000.0);
        assert_eq!(params.density_kg_m3, DEFAULT_DENSITY);

        let numeric = json!({"Diameter": 0.25, "Velocity": 12.5});
        let params = parameters_from_risk_record(&numeric).unwrap();
        assert_relative_eq!(params.diameter_m, 250.0);
        assert_relative_eq!(params.velocity_m_s, 12500.0);

        assert!(parameters_from_risk_record(&json!({"Diameter": "Unknown"})).is_err());
    }

    #[test]
    fn test_comprehensive_assessment() {
        let record = json!({"des": "1979 XB", "Diameter": "0.500 km", "Velocity": "20.000 km/s"});
        let report = comprehensive_impact_assessment(&record, 150.0).unwrap();

        assert_eq!(report.asteroid_info.designation, "1979 XB");
        assert_relative_eq!(report.asteroid_info.diameter_km, 0.5);
        assert_relative_eq!(report.asteroid_info.velocity_km_s, 20.0);
        assert_relative_eq!(
            report.impact_assessment.severe_radius_km,
            0.6118230015994881,
            max_relative = 1e-12
        );
        assert_eq!(
            report.impact_assessment.damage_classification,
            DamageClassification::Light
        );
        assert_relative_eq!(
            report.crater_analysis.crater_diameter_m,
            205.03823392549887,
            max_relative = 1e-10
        );
        assert_eq!(report.casualty_estimation.severe_casualties, 159);
        assert_eq!(report.casualty_estimation.moderate_casualties, 261);
        assert_eq!(report.casualty_estimation.light_casualties, 174);
        assert_eq!(report.casualty_estimation.total_casualties, 594);
    }

    #[test]
    fn test_comprehensive_assessment_errors() {
        let missing_velocity = json!({"Full Name": "Nameless", "Diameter": "0.5 km"});
        assert_eq!(
            comprehensive_impact_assessment(&missing_velocity, 100.0),
            Err(AstroScopeError::InvalidPhysicalParameters(
                "speed must be positive, got 0".into()
            ))
        );
    }
}
