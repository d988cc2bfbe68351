//! Sentry impact-monitoring feed.
//!
//! The summary endpoint (`sentry.api`) lists every object with a non-zero impact probability;
//! the per-object endpoint (`sentry.api?des=...`) lists its virtual impactors. Both encode
//! numbers either as JSON numbers or as strings, so every numeric field goes through
//! [`json_to_f64`].
//!
//! Parsing and formatting are pure functions; only [`fetch_summary`] and
//! [`fetch_virtual_impactors`] touch the network.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::{
    astroscope_errors::AstroScopeError,
    config::AstroScopeConfig,
    constants::Designation,
    conversion::{field_f64, format_scientific},
    env_state::AstroScopeEnv,
};

pub(crate) const SOURCE: &str = "Sentry";

/// Fields that the first summary record must carry.
pub const REQUIRED_SUMMARY_FIELDS: [&str; 4] = ["des", "ip", "diameter", "ps_max"];

/// Palermo scale assumed when a record carries none; sorts such objects last.
pub const MISSING_PALERMO: f64 = -99.0;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_DIAMETER: &str = "Unknown";
pub const KINETIC_ENERGY_PLACEHOLDER: &str = "N/A (Not in Sentry summary fields)";

/// One entry of the Sentry summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentryObject {
    pub des: Designation,
    pub fullname: Option<String>,
    /// Cumulative impact probability
    pub ip: Option<f64>,
    /// Estimated diameter (km)
    pub diameter: Option<f64>,
    /// Maximum Palermo scale
    pub ps_max: Option<f64>,
    /// Hyperbolic excess velocity (km/s)
    pub v_inf: Option<f64>,
}

impl SentryObject {
    fn from_value(index: usize, value: &Value) -> Result<Self, AstroScopeError> {
        let des = value.get("des").and_then(Value::as_str).ok_or_else(|| {
            AstroScopeError::unexpected_payload(SOURCE, format!("record {index} has no designation"))
        })?;

        Ok(SentryObject {
            des: des.to_string(),
            fullname: value
                .get("fullname")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            ip: field_f64(value, "ip"),
            diameter: field_f64(value, "diameter"),
            ps_max: field_f64(value, "ps_max"),
            v_inf: field_f64(value, "v_inf"),
        })
    }

    /// Display name: the full name when published, else the designation.
    pub fn display_name(&self) -> &str {
        self.fullname.as_deref().unwrap_or(&self.des)
    }

    fn palermo_or_floor(&self) -> f64 {
        self.ps_max.unwrap_or(MISSING_PALERMO)
    }
}

/// One virtual impactor of an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualImpactor {
    pub date: Option<String>,
    /// Impact energy (Mt TNT)
    pub energy: Option<f64>,
    /// Minimum distance from the Earth center (Earth radii, as published)
    pub dist: Option<f64>,
    pub ip: Option<f64>,
    pub ps: Option<f64>,
}

/// Worst-case virtual impactor formatted for display; every field falls back to `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualImpactSummary {
    pub energy: String,
    pub date: String,
    pub dist: String,
}

impl VirtualImpactSummary {
    pub fn unavailable() -> Self {
        VirtualImpactSummary {
            energy: NOT_AVAILABLE.to_string(),
            date: NOT_AVAILABLE.to_string(),
            dist: NOT_AVAILABLE.to_string(),
        }
    }
}

/// A row of the high-risk table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskRecord {
    #[serde(rename = "Close Approach Distance")]
    pub close_approach_distance: String,
    #[serde(rename = "Velocity")]
    pub velocity: String,
    #[serde(rename = "Diameter")]
    pub diameter: String,
    #[serde(rename = "Impact Probability")]
    pub impact_probability: String,
    #[serde(rename = "Palermo Scale")]
    pub palermo_scale: String,
    #[serde(rename = "Kinetic Energy")]
    pub kinetic_energy: String,
}

/// A row of the Palermo leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub des: Designation,
    #[serde(rename = "Palermo Scale")]
    pub palermo_scale: String,
    #[serde(rename = "Impact Probability")]
    pub impact_probability: String,
    #[serde(rename = "Velocity")]
    pub velocity: String,
    #[serde(rename = "Diameter")]
    pub diameter: String,
    #[serde(rename = "Kinetic Energy")]
    pub kinetic_energy: String,
    #[serde(rename = "Impact Date")]
    pub impact_date: String,
    #[serde(rename = "Approach Distance")]
    pub approach_distance: String,
}

/// An object of the energy ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRankedNeo {
    pub name: String,
    pub energy_mt: f64,
    pub status: String,
}

/// Parse the Sentry summary payload.
///
/// A payload without `data` (or with an empty list) yields no objects. Otherwise `data` must
/// be a list of objects and the first one must carry [`REQUIRED_SUMMARY_FIELDS`].
///
/// Return
/// ------
/// * The objects in feed order, or [`AstroScopeError::UnexpectedPayload`]
pub fn parse_summary(payload: &Value) -> Result<Vec<SentryObject>, AstroScopeError> {
    let records = match payload.get("data") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(records)) => records,
        Some(_) => {
            return Err(AstroScopeError::unexpected_payload(
                SOURCE,
                "'data' is not a list",
            ))
        }
    };

    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let Some(first) = first.as_object() else {
        return Err(AstroScopeError::unexpected_payload(
            SOURCE,
            "expected a list of objects",
        ));
    };
    let missing: Vec<&str> = REQUIRED_SUMMARY_FIELDS
        .iter()
        .copied()
        .filter(|field| !first.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(AstroScopeError::unexpected_payload(
            SOURCE,
            format!("missing required fields {missing:?}"),
        ));
    }

    records
        .iter()
        .enumerate()
        .map(|(index, record)| SentryObject::from_value(index, record))
        .collect()
}

/// Parse the virtual impactor list of one object; a missing `data` yields none.
pub fn parse_virtual_impactors(payload: &Value) -> Result<Vec<VirtualImpactor>, AstroScopeError> {
    let records = match payload.get("data") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(records)) => records,
        Some(_) => {
            return Err(AstroScopeError::unexpected_payload(
                SOURCE,
                "'data' is not a list",
            ))
        }
    };

    Ok(records
        .iter()
        .map(|record| VirtualImpactor {
            date: record.get("date").and_then(Value::as_str).map(str::to_string),
            energy: field_f64(record, "energy"),
            dist: field_f64(record, "dist"),
            ip: field_f64(record, "ip"),
            ps: field_f64(record, "ps"),
        })
        .collect())
}

/// First element maximizing `key`; ties keep the earliest element.
fn first_max_by<T>(items: &[T], key: impl Fn(&T) -> f64) -> Option<&T> {
    items.iter().fold(None, |best, item| match best {
        Some(best) if key(item) <= key(best) => Some(best),
        _ => Some(item),
    })
}

/// Worst-case virtual impactor: the one with the largest energy (missing energy counts as 0).
pub fn worst_case_impactor(impactors: &[VirtualImpactor]) -> Option<&VirtualImpactor> {
    first_max_by(impactors, |vi| vi.energy.unwrap_or(0.0))
}

/// Most probable-to-matter virtual impactor: the one with the largest Palermo scale.
pub fn highest_palermo_impactor(impactors: &[VirtualImpactor]) -> Option<&VirtualImpactor> {
    first_max_by(impactors, |vi| vi.ps.unwrap_or(MISSING_PALERMO))
}

/// Format the worst-case impactor: `"{:.2} Mt"`, the date, `"{:.6} au"`.
pub fn summarize_virtual_impactors(impactors: &[VirtualImpactor]) -> VirtualImpactSummary {
    match worst_case_impactor(impactors) {
        None => VirtualImpactSummary::unavailable(),
        Some(vi) => VirtualImpactSummary {
            energy: format!("{:.2} Mt", vi.energy.unwrap_or(0.0)),
            date: vi.date.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            dist: match vi.dist {
                Some(dist) if dist != 0.0 => format!("{dist:.6} au"),
                _ => NOT_AVAILABLE.to_string(),
            },
        },
    }
}

pub fn format_velocity(v_inf: Option<f64>) -> String {
    v_inf.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.3} km/s"))
}

pub fn format_diameter(diameter: Option<f64>) -> String {
    diameter.map_or_else(|| UNKNOWN_DIAMETER.to_string(), |d| format!("{d:.3} km"))
}

pub fn format_palermo(ps: Option<f64>) -> String {
    ps.map_or_else(|| NOT_AVAILABLE.to_string(), |ps| format!("{ps:.2}"))
}

/// Impact probability in `%.2e` notation; a missing probability reads as 0.
pub fn format_impact_probability(ip: Option<f64>) -> String {
    format_scientific(ip.unwrap_or(0.0), 2)
}

/// MOID as `"{:.6} au (MOID)"`, or `"N/A"`.
pub fn format_moid(moid_au: Option<f64>) -> String {
    moid_au.map_or_else(|| NOT_AVAILABLE.to_string(), |m| format!("{m:.6} au (MOID)"))
}

/// Build a high-risk table row from a summary object and its SBDB MOID.
pub fn risk_record(object: &SentryObject, moid_au: Option<f64>) -> RiskRecord {
    RiskRecord {
        close_approach_distance: format_moid(moid_au),
        velocity: format_velocity(object.v_inf),
        diameter: format_diameter(object.diameter),
        impact_probability: format_impact_probability(object.ip),
        palermo_scale: format_palermo(object.ps_max),
        kinetic_energy: KINETIC_ENERGY_PLACEHOLDER.to_string(),
    }
}

/// Sort summary objects by Palermo scale, highest first. Missing values sort last and the
/// sort is stable.
pub fn sort_by_palermo(objects: &mut [SentryObject]) {
    objects.sort_by(|a, b| {
        b.palermo_or_floor()
            .partial_cmp(&a.palermo_or_floor())
            .unwrap_or(Ordering::Equal)
    });
}

/// Build a leaderboard row; absent numbers read as 0 (probability, speed, diameter) or −99
/// (Palermo scale).
pub fn leaderboard_entry(object: &SentryObject, vi: VirtualImpactSummary) -> LeaderboardEntry {
    LeaderboardEntry {
        des: object.des.clone(),
        palermo_scale: format!("{:.2}", object.palermo_or_floor()),
        impact_probability: format_impact_probability(object.ip),
        velocity: format!("{:.3} km/s", object.v_inf.unwrap_or(0.0)),
        diameter: format!("{:.3} km", object.diameter.unwrap_or(0.0)),
        kinetic_energy: vi.energy,
        impact_date: vi.date,
        approach_distance: vi.dist,
    }
}

/// Energy of the highest-Palermo virtual impactor rounded to 3 decimals, when positive.
pub fn ranked_energy(impactors: &[VirtualImpactor]) -> Option<f64> {
    let energy = highest_palermo_impactor(impactors)?.energy.unwrap_or(0.0);
    if energy > 0.0 {
        format!("{energy:.3}").parse().ok()
    } else {
        None
    }
}

/// GET the Sentry summary table.
pub async fn fetch_summary(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
) -> Result<Vec<SentryObject>, AstroScopeError> {
    let payload = env
        .get_json(&config.sentry_url, &[], config.summary_timeout())
        .await?;
    parse_summary(&payload)
}

/// GET the virtual impactors of one object.
pub async fn fetch_virtual_impactors(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    des: &str,
) -> Result<Vec<VirtualImpactor>, AstroScopeError> {
    let payload = env
        .get_json(
            &config.sentry_url,
            &[("des", des.to_string())],
            config.detail_timeout(),
        )
        .await?;
    parse_virtual_impactors(&payload)
}

#[cfg(test)]
mod sentry_test {
    use super::*;
    use serde_json::json;

    fn summary() -> Value {
        json!({
            "signature": {"version": "2.0"},
            "count": "3",
            "data": [
                {"des": "29075", "fullname": "29075 (1950 DA)", "ip": "3.8e-04", "diameter": "1.3",
                 "ps_max": "-0.93", "v_inf": "14.1"},
                {"des": "101955", "fullname": "101955 Bennu (1999 RQ36)", "ip": 5.7e-4, "diameter": 0.49,
                 "ps_max": -1.4, "v_inf": 5.99},
                {"des": "2000 SG344", "ip": "2.7e-03", "diameter": "0.037", "ps_max": null}
            ]
        })
    }

    #[test]
    fn test_parse_summary() {
        let objects = parse_summary(&summary()).unwrap();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0].des, "29075");
        assert_eq!(objects[0].ip, Some(3.8e-4));
        assert_eq!(objects[1].diameter, Some(0.49));
        assert_eq!(objects[2].ps_max, None);
        assert_eq!(objects[2].display_name(), "2000 SG344");
        assert_eq!(objects[1].display_name(), "101955 Bennu (1999 RQ36)");
    }

    #[test]
    fn test_parse_summary_edge_cases() {
        assert_eq!(parse_summary(&json!({"count": "0"})).unwrap(), vec![]);
        assert_eq!(parse_summary(&json!({"data": []})).unwrap(), vec![]);
        assert_eq!(
            parse_summary(&json!({"data": [{"des": "x", "ip": 1e-3}]})),
            Err(AstroScopeError::unexpected_payload(
                SOURCE,
                r#"missing required fields ["diameter", "ps_max"]"#
            ))
        );
        assert!(parse_summary(&json!({"data": [["29075", "3.8e-04"]]})).is_err());
        assert!(parse_summary(&json!({"data": "nope"})).is_err());
    }

    #[test]
    fn test_risk_record_formatting() {
        let objects = parse_summary(&summary()).unwrap();

        let record = risk_record(&objects[0], Some(0.0157));
        assert_eq!(record.close_approach_distance, "0.015700 au (MOID)");
        assert_eq!(record.velocity, "14.100 km/s");
        assert_eq!(record.diameter, "1.300 km");
        assert_eq!(record.impact_probability, "3.80e-04");
        assert_eq!(record.palermo_scale, "-0.93");
        assert_eq!(record.kinetic_energy, KINETIC_ENERGY_PLACEHOLDER);

        let sparse = risk_record(&objects[2], None);
        assert_eq!(sparse.close_approach_distance, "N/A");
        assert_eq!(sparse.velocity, "N/A");
        assert_eq!(sparse.palermo_scale, "N/A");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Impact Probability"], "3.80e-04");
    }

    #[test]
    fn test_missing_diameter_is_unknown() {
        assert_eq!(format_diameter(None), "Unknown");
        assert_eq!(format_diameter(Some(0.0366)), "0.037 km");
    }

    #[test]
    fn test_sort_by_palermo() {
        let mut objects = parse_summary(&summary()).unwrap();
        objects.reverse();
        sort_by_palermo(&mut objects);
        let order: Vec<&str> = objects.iter().map(|o| o.des.as_str()).collect();
        assert_eq!(order, vec!["29075", "101955", "2000 SG344"]);
    }

    #[test]
    fn test_leaderboard_entry_defaults() {
        let objects = parse_summary(&summary()).unwrap();
        let entry = leaderboard_entry(&objects[2], VirtualImpactSummary::unavailable());
        assert_eq!(entry.palermo_scale, "-99.00");
        assert_eq!(entry.velocity, "0.000 km/s");
        assert_eq!(entry.diameter, "0.037 km");
        assert_eq!(entry.kinetic_energy, "N/A");
    }

    #[test]
    fn test_virtual_impactors() {
        let payload = json!({
            "data": [
                {"date": "2880-03-16.84", "energy": "7.5e4", "dist": "0.62", "ps": "-0.93", "ip": "3.8e-4"},
                {"date": "2175-09-24.10", "energy": "1.2e3", "dist": "1.1", "ps": "-3.1"},
                {"date": "2190-01-01.00", "energy": "7.5e4", "ps": "-5.0"}
            ]
        });
        let vis = parse_virtual_impactors(&payload).unwrap();
        assert_eq!(vis.len(), 3);

        // tie on energy: the first one wins
        let summary = summarize_virtual_impactors(&vis);
        assert_eq!(
            summary,
            VirtualImpactSummary {
                energy: "75000.00 Mt".into(),
                date: "2880-03-16.84".into(),
                dist: "0.620000 au".into(),
            }
        );

        assert_eq!(highest_palermo_impactor(&vis).unwrap().date.as_deref(), Some("2880-03-16.84"));
        assert_eq!(ranked_energy(&vis), Some(75000.0));

        assert_eq!(summarize_virtual_impactors(&[]), VirtualImpactSummary::unavailable());
        assert_eq!(parse_virtual_impactors(&json!({})).unwrap(), vec![]);
    }

    #[test]
    fn test_zero_distance_is_not_available() {
        let vis = vec![VirtualImpactor {
            date: None,
            energy: Some(12.3456),
            dist: Some(0.0),
            ip: None,
            ps: None,
        }];
        let summary = summarize_virtual_impactors(&vis);
        assert_eq!(summary.energy, "12.35 Mt");
        assert_eq!(summary.date, "N/A");
        assert_eq!(summary.dist, "N/A");
        assert_eq!(ranked_energy(&vis), Some(12.346));
    }

    #[test]
    fn test_ranked_energy_requires_positive() {
        let vis = vec![VirtualImpactor {
            date: None,
            energy: None,
            dist: None,
            ip: None,
            ps: Some(-2.0),
        }];
        assert_eq!(ranked_energy(&vis), None);
        assert_eq!(ranked_energy(&[]), None);
    }
}
