//! JPL Small-Body Database feed.
//!
//! Two lookups are used:
//! * `sbdb.api?des=<des>`: orbital elements, reduced to the short-name map read by
//!   [`OrbitalElements::from_element_map`].
//! * `sbdb.api?sstr=<des>`: object summary, from which the full name and the Earth MOID are kept.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::{
    astroscope_errors::AstroScopeError,
    config::AstroScopeConfig,
    conversion::{field_f64, json_to_f64},
    env_state::AstroScopeEnv,
    orbital_elements::{OrbitalElements, ELEMENT_NAMES},
};

pub(crate) const SOURCE: &str = "SBDB";

/// Name and Earth MOID of a small body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SbdbObject {
    pub fullname: Option<String>,
    /// Minimum orbit intersection distance with the Earth (AU)
    pub moid_au: Option<f64>,
}

fn check_found(payload: &Value, des: &str) -> Result<(), AstroScopeError> {
    if payload.get("orbit").is_some() || payload.get("object").is_some() {
        return Ok(());
    }
    if payload.get("list").is_some() {
        return Err(AstroScopeError::unexpected_payload(
            SOURCE,
            format!("'{des}' matches several objects"),
        ));
    }
    Err(AstroScopeError::ObjectNotFound {
        source_name: SOURCE.to_string(),
        designation: des.to_string(),
    })
}

/// Reduce `orbit.elements` (a list of `{name, value, ...}`) to `{e, a, i, om, w, tp}`.
///
/// Other elements (`q`, `ma`, `per`, ...) are ignored. A listed element whose value is not
/// numeric is an [`AstroScopeError::UnexpectedPayload`]; absent elements are simply missing
/// from the map.
pub fn parse_element_map(
    payload: &Value,
    des: &str,
) -> Result<HashMap<String, f64>, AstroScopeError> {
    check_found(payload, des)?;

    let elements = payload
        .pointer("/orbit/elements")
        .and_then(Value::as_array)
        .ok_or_else(|| AstroScopeError::unexpected_payload(SOURCE, "no 'orbit.elements' list"))?;

    let mut map = HashMap::with_capacity(ELEMENT_NAMES.len());
    for element in elements {
        let Some(name) = element.get("name").and_then(Value::as_str) else {
            continue;
        };
        if !ELEMENT_NAMES.contains(&name) {
            continue;
        }
        let value = element
            .get("value")
            .and_then(json_to_f64)
            .ok_or_else(|| {
                AstroScopeError::unexpected_payload(
                    SOURCE,
                    format!("element '{name}' of '{des}' is not numeric"),
                )
            })?;
        map.insert(name.to_string(), value);
    }
    Ok(map)
}

/// Keep the full name and the MOID of an object summary.
pub fn parse_object_summary(payload: &Value, des: &str) -> Result<SbdbObject, AstroScopeError> {
    check_found(payload, des)?;

    Ok(SbdbObject {
        fullname: payload
            .pointer("/object/fullname")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string()),
        moid_au: payload.get("orbit").and_then(|orbit| field_f64(orbit, "moid")),
    })
}

pub async fn fetch_element_map(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    des: &str,
) -> Result<HashMap<String, f64>, AstroScopeError> {
    let payload = env
        .get_json(
            &config.sbdb_url,
            &[("des", des.to_string())],
            config.summary_timeout(),
        )
        .await?;
    parse_element_map(&payload, des)
}

/// Fetch and validate the orbital elements of an object.
pub async fn fetch_orbital_elements(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    des: &str,
) -> Result<OrbitalElements, AstroScopeError> {
    let map = fetch_element_map(env, config, des).await?;
    OrbitalElements::from_element_map(&map)
}

pub async fn fetch_object_summary(
    env: &AstroScopeEnv,
    config: &AstroScopeConfig,
    des: &str,
) -> Result<SbdbObject, AstroScopeError> {
    let payload = env
        .get_json(
            &config.sbdb_url,
            &[("sstr", des.to_string())],
            config.detail_timeout(),
        )
        .await?;
    parse_object_summary(&payload, des)
}
