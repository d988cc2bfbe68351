#![allow(dead_code)]

use approx::assert_relative_eq;
use astroscope::{config::AstroScopeConfig, orbital_elements::OrbitalElements};
use serde_json::{json, Value};

pub fn assert_elements_close(actual: &OrbitalElements, expected: &OrbitalElements, epsilon: f64) {
    assert_relative_eq!(
        actual.semi_major_axis,
        expected.semi_major_axis,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.eccentricity,
        expected.eccentricity,
        epsilon = epsilon
    );
    assert_relative_eq!(actual.inclination, expected.inclination, epsilon = epsilon);
    assert_relative_eq!(
        actual.ascending_node_longitude,
        expected.ascending_node_longitude,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.periapsis_argument,
        expected.periapsis_argument,
        epsilon = epsilon
    );
}

/// 433 Eros, rounded SBDB elements.
pub fn eros() -> OrbitalElements {
    OrbitalElements::new(1.458, 0.2228, 10.83, 304.3, 178.9).unwrap()
}

/// Configuration pointing every feed at a mock server.
pub fn config_for(base_url: &str) -> AstroScopeConfig {
    AstroScopeConfig {
        sentry_url: format!("{base_url}/sentry.api"),
        sbdb_url: format!("{base_url}/sbdb.api"),
        worldpop_url: format!("{base_url}/worldpop/identify"),
        sedac_url: format!("{base_url}/geoserver/wms"),
        summary_timeout_secs: 2,
        detail_timeout_secs: 2,
        population_timeout_secs: 2,
        max_retries: 3,
        ..AstroScopeConfig::default()
    }
}

/// Sentry summary with mixed string and number encodings; feed order is not Palermo order.
pub fn sentry_summary() -> Value {
    json!({
        "signature": {"source": "NASA/JPL Sentry Data API", "version": "2.0"},
        "count": "4",
        "data": [
            {"des": "2000 SG344", "fullname": "(2000 SG344)", "ip": "2.7e-03", "diameter": "0.037",
             "ps_max": "-2.77", "v_inf": "1.36"},
            {"des": "29075", "fullname": "29075 (1950 DA)", "ip": "3.8e-04", "diameter": "1.3",
             "ps_max": "-0.93", "v_inf": "14.1"},
            {"des": "101955", "fullname": "101955 Bennu (1999 RQ36)", "ip": 5.7e-4, "diameter": 0.49,
             "ps_max": -1.4, "v_inf": 5.99},
            {"des": "2023 XX", "fullname": "(2000 SG344)", "ip": "1e-6", "diameter": "0.01",
             "ps_max": "-6.5", "v_inf": "3.0"}
        ]
    })
}

pub fn sbdb_summary(fullname: &str, moid: &str) -> Value {
    json!({
        "object": {"fullname": fullname},
        "orbit": {"moid": moid, "elements": []}
    })
}

pub fn sbdb_elements(a: &str, e: &str, i: &str, om: &str, w: &str) -> Value {
    json!({
        "object": {"fullname": "test object"},
        "orbit": {
            "elements": [
                {"name": "e", "value": e},
                {"name": "a", "value": a},
                {"name": "q", "value": "1.0"},
                {"name": "i", "value": i},
                {"name": "om", "value": om},
                {"name": "w", "value": w},
                {"name": "tp", "value": "2460115.5"}
            ]
        }
    })
}

pub fn virtual_impactors(entries: &[(&str, &str, &str, &str)]) -> Value {
    let data: Vec<Value> = entries
        .iter()
        .map(|(date, energy, dist, ps)| json!({"date": date, "energy": energy, "dist": dist, "ps": ps}))
        .collect();
    json!({"data": data})
}
