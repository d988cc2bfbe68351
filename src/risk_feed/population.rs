//! Population density at a point, in people per km².
//!
//! WorldPop (ArcGIS ImageServer `identify`) is queried first. When it fails or returns no
//! value, the SEDAC GPWv4 WMS `GetFeatureInfo` is tried with WMS 1.3.0 then 1.1.1, each with
//! JSON, GML and plain-text info formats. Negative SEDAC values (no-data markers) clamp to 0.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    astroscope_errors::AstroScopeError,
    config::AstroScopeConfig,
    constants::{Degree, PeoplePerKm2},
    conversion::json_to_f64,
    env_state::{AstroScopeEnv, FeedPayload},
};

/// Raster properties that may hold the density, in lookup order.
const SEDAC_VALUE_KEYS: [&str; 3] = ["GRAY_INDEX", "value", "Band1"];

/// Half-size of the WMS bounding box around the point (degrees).
const SEDAC_HALF_BOX: Degree = 0.05;

const SEDAC_INFO_FORMATS: [&str; 3] = ["application/json", "application/vnd.ogc.gml", "text/plain"];

/// `GRAY_INDEX = 12.5` (plain text) or `<gpw:GRAY_INDEX>12.5</gpw:GRAY_INDEX>` (GML).
static KEYED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:GRAY_INDEX|value|Band1)\s*(?:=|>)\s*(-?\d+(?:\.\d+)?)")
        .expect("valid keyed number regex")
});

static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(-?\d+(?:\.\d+)?)").expect("valid number regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationSource {
    WorldPop,
    Sedac,
    None,
}

/// Result of a population lookup. `ok` is false when no provider answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationDensity {
    pub ok: bool,
    pub density_km2: Option<PeoplePerKm2>,
    pub src: PopulationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl PopulationDensity {
    fn found(density_km2: PeoplePerKm2, src: PopulationSource, year: i32) -> Self {
        PopulationDensity {
            ok: true,
            density_km2: Some(density_km2),
            src,
            year: Some(year),
        }
    }

    fn missing() -> Self {
        PopulationDensity {
            ok: false,
            density_km2: None,
            src: PopulationSource::None,
            year: None,
        }
    }
}

/// Read the pixel value of a WorldPop `identify` answer: top-level `value`, else
/// `results[0].value`. `"NoData"` and other non-numeric values read as `None`.
pub fn parse_worldpop(payload: &Value) -> Option<f64> {
    match payload.get("value") {
        Some(value) if !value.is_null() => json_to_f64(value),
        _ => payload
            .pointer("/results/0/value")
            .and_then(json_to_f64),
    }
}

fn parse_sedac_json(payload: &Value) -> Option<f64> {
    let properties = payload.pointer("/features/0/properties")?;
    SEDAC_VALUE_KEYS
        .iter()
        .find_map(|key| properties.get(*key).and_then(json_to_f64))
}

fn parse_sedac_text(text: &str) -> Option<f64> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(density) = parse_sedac_json(&value) {
            return Some(density);
        }
    }
    if let Some(caps) = KEYED_NUMBER.captures(text) {
        return caps.get(1)?.as_str().parse().ok();
    }
    if text.contains("ServiceException") {
        return None;
    }
    FIRST_NUMBER.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Extract the density from a SEDAC `GetFeatureInfo` body, clamped to be non-negative.
pub fn parse_sedac(payload: &FeedPayload) -> Option<f64> {
    let value = match payload {
        FeedPayload::Json(value) => parse_sedac_json(value),
        FeedPayload::Text(text) => parse_sedac_text(text),
    }?;
    Some(value.max(0.0))
}

/// The six `GetFeatureInfo` queries tried in order against SEDAC.
///
/// WMS 1.3.0 uses `crs` and a `minLat,minLon,maxLat,maxLon` box queried at `i/j`; WMS 1.1.1
/// uses `srs` and a `minLon,minLat,maxLon,maxLat` box queried at `x/y`.
pub fn sedac_queries(lat: Degree, lng: Degree, layer: &str) -> Vec<Vec<(&'static str, String)>> {
    let h = SEDAC_HALF_BOX;
    let bbox_130 = format!("{},{},{},{}", lat - h, lng - h, lat + h, lng + h);
    let bbox_111 = format!("{},{},{},{}", lng - h, lat - h, lng + h, lat + h);

    let common = |version: &str| {
        vec![
            ("service", "WMS".to_string()),
            ("version", version.to_string()),
            ("request", "GetFeatureInfo".to_string()),
            ("layers", layer.to_string()),
            ("query_layers", layer.to_string()),
            ("width", "101".to_string()),
            ("height", "101".to_string()),
        ]
    };

    let mut queries = Vec::with_capacity(2 * SEDAC_INFO_FORMATS.len());
    for format in SEDAC_INFO_FORMATS {
        let mut query = common("1.3.0");
        query.extend([
            ("crs", "EPSG:4326".to_string()),
            ("bbox", bbox_130.clone()),
            ("i", "50".to_string()),
            ("j", "50".to_string()),
            ("info_format", format.to_string()),
        ]);
        queries.push(query);
    }
    for format in SEDAC_INFO_FORMATS {
        let mut query = common("1.1.1");
        query.extend([
            ("srs", "EPSG:4326".to_string()),
            ("bbox", bbox_111.clone()),
            ("x", "50".to_string()),
            ("y", "50".to_string()),
            ("info_format", format.to_string()),
        ]);
        queries.push(query);
    }
    queries
}

fn worldpop_query(lat: Degree, lng: Degree, year: i32) -> Vec<(&'static str, String)> {
    let geometry = json!({"x": lng, "y": lat, "spatialReference": {"wkid": 4326}});
    vec![
        ("f", "json".to_string()),
        ("geometry", geometry.to_string()),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("returnGeometry", "false".to_string()),
        ("processAsMultidimensional", "true".to_string()),
        ("time", format!("{year}-01-01T00:00:00Z")),
    ]
}

pub async fn worldpop_density(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    lat: Degree,
    lng: Degree,
    year: i32,
) -> Result<Option<f64>, AstroScopeError> {
    let payload = env
        .get_json(
            &config.worldpop_url,
            &worldpop_query(lat, lng, year),
            config.population_timeout(),
        )
        .await?;
    Ok(parse_worldpop(&payload))
}

/// Try every SEDAC query until one yields a value. Failed attempts are skipped.
pub async fn sedac_density(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    lat: Degree,
    lng: Degree,
) -> Option<f64> {
    for query in sedac_queries(lat, lng, &config.sedac_layer) {
        match env
            .get_payload(&config.sedac_url, &query, config.population_timeout())
            .await
        {
            Ok(payload) => {
                if let Some(value) = parse_sedac(&payload) {
                    return Some(value);
                }
            }
            Err(err) => debug!(%err, "SEDAC attempt failed"),
        }
    }
    None
}

/// Population density at `(lat, lng)`: WorldPop, then SEDAC, else not found.
pub async fn population_density(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    lat: Degree,
    lng: Degree,
    year: i32,
) -> PopulationDensity {
    match worldpop_density(env, config, lat, lng, year).await {
        Ok(Some(value)) => return PopulationDensity::found(value, PopulationSource::WorldPop, year),
        Ok(None) => debug!(lat, lng, "WorldPop returned no value"),
        Err(err) => warn!(%err, lat, lng, "WorldPop lookup failed"),
    }

    match sedac_density(env, config, lat, lng).await {
        Some(value) => PopulationDensity::found(value, PopulationSource::Sedac, year),
        None => PopulationDensity::missing(),
    }
}

#[cfg(test)]
mod population_test {
    use super::*;

    #[test]
    fn test_parse_worldpop() {
        assert_eq!(parse_worldpop(&json!({"value": "1234.5"})), Some(1234.5));
        assert_eq!(parse_worldpop(&json!({"value": 87})), Some(87.0));
        assert_eq!(
            parse_worldpop(&json!({"value": null, "results": [{"value": "42"}]})),
            Some(42.0)
        );
        assert_eq!(parse_worldpop(&json!({"value": "NoData"})), None);
        assert_eq!(parse_worldpop(&json!({"results": []})), None);
    }

    #[test]
    fn test_parse_sedac_json() {
        let payload = FeedPayload::Json(json!({
            "type": "FeatureCollection",
            "features": [{"properties": {"GRAY_INDEX": 5120.25}}]
        }));
        assert_eq!(parse_sedac(&payload), Some(5120.25));

        let band = FeedPayload::Json(json!({"features": [{"properties": {"Band1": "17"}}]}));
        assert_eq!(parse_sedac(&band), Some(17.0));

        let empty = FeedPayload::Json(json!({"features": []}));
        assert_eq!(parse_sedac(&empty), None);
    }

    #[test]
    fn test_parse_sedac_text() {
        let plain = FeedPayload::Text(
            "Results for FeatureType 'gpw-v4:gpw-v4-population-density_2020':\n\
             --------------------------------------------\n\
             GRAY_INDEX = 312.75\n"
                .to_string(),
        );
        assert_eq!(parse_sedac(&plain), Some(312.75));

        let gml = FeedPayload::Text(
            r#"<?xml version="1.0"?><gml:featureMember><gpw:GRAY_INDEX>88.5</gpw:GRAY_INDEX></gml:featureMember>"#
                .to_string(),
        );
        assert_eq!(parse_sedac(&gml), Some(88.5));

        let nodata = FeedPayload::Text("GRAY_INDEX = -3.4028235e+38".to_string());
        assert_eq!(parse_sedac(&nodata), Some(0.0));

        let error = FeedPayload::Text(
            r#"<ServiceExceptionReport version="1.3.0"><ServiceException>bad</ServiceException></ServiceExceptionReport>"#
                .to_string(),
        );
        assert_eq!(parse_sedac(&error), None);

        assert_eq!(parse_sedac(&FeedPayload::Text("density 17.5".into())), Some(17.5));
    }

    #[test]
    fn test_sedac_queries() {
        let queries = sedac_queries(10.0, 20.0, "gpw-v4:layer");
        assert_eq!(queries.len(), 6);

        let get = |q: &Vec<(&str, String)>, key: &str| {
            q.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
        };
        assert_eq!(get(&queries[0], "version").as_deref(), Some("1.3.0"));
        assert_eq!(get(&queries[0], "info_format").as_deref(), Some("application/json"));
        assert_eq!(get(&queries[2], "info_format").as_deref(), Some("text/plain"));
        assert!(get(&queries[0], "bbox").unwrap().starts_with("9.95,19.95"));
        assert_eq!(get(&queries[3], "version").as_deref(), Some("1.1.1"));
        assert!(get(&queries[3], "bbox").unwrap().starts_with("19.95,9.95"));
        assert_eq!(get(&queries[3], "srs").as_deref(), Some("EPSG:4326"));
        assert_eq!(get(&queries[5], "y").as_deref(), Some("50"));
    }

    #[test]
    fn test_serialized_source() {
        let found = PopulationDensity::found(12.0, PopulationSource::WorldPop, 2020);
        let value = serde_json::to_value(&found).unwrap();
        assert_eq!(value["src"], "worldpop");
        assert_eq!(value["year"], 2020);

        let missing = serde_json::to_value(PopulationDensity::missing()).unwrap();
        assert_eq!(missing["src"], "none");
        assert_eq!(missing["ok"], false);
        assert!(missing.get("year").is_none());
    }
}
