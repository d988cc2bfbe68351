//! Runtime configuration of the risk feed aggregator.
//!
//! Every field has a default matching the public JPL and population services, so
//! `AstroScopeConfig::default()` is usable as is. Deployments override single values through
//! `ASTROSCOPE_*` environment variables (see [`AstroScopeConfig::from_env`]), or deserialize the
//! whole struct from JSON: missing keys keep their default.

use std::{env, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    astroscope_errors::AstroScopeError,
    constants::{
        PeoplePerKm2, DEFAULT_BLAST_POPULATION_DENSITY, DEFAULT_POPULATION_DENSITY,
    },
};

pub const DEFAULT_SENTRY_URL: &str = "https://ssd-api.jpl.nasa.gov/sentry.api";
pub const DEFAULT_SBDB_URL: &str = "https://ssd-api.jpl.nasa.gov/sbdb.api";
pub const DEFAULT_WORLDPOP_URL: &str = "https://worldpop.arcgis.com/arcgis/rest/services/WorldPop_Population_Density_1km/ImageServer/identify";
pub const DEFAULT_SEDAC_URL: &str = "https://sedac.ciesin.columbia.edu/geoserver/wms";
pub const DEFAULT_SEDAC_LAYER: &str = "gpw-v4:gpw-v4-population-density_2020";

/// Prefix of the environment variables read by [`AstroScopeConfig::from_env`].
pub const ENV_PREFIX: &str = "ASTROSCOPE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstroScopeConfig {
    pub sentry_url: String,
    pub sbdb_url: String,
    pub worldpop_url: String,
    pub sedac_url: String,
    pub sedac_layer: String,

    /// Timeout of the Sentry summary requests (seconds)
    pub summary_timeout_secs: u64,
    /// Timeout of the per-object Sentry and SBDB requests (seconds)
    pub detail_timeout_secs: u64,
    /// Timeout of the population density requests (seconds)
    pub population_timeout_secs: u64,

    /// Lifetime of cached risk lists and leaderboards (seconds)
    pub summary_cache_ttl_secs: u64,
    /// Lifetime of cached per-object details and virtual impactors (seconds)
    pub detail_cache_ttl_secs: u64,

    /// Attempts made by `neo_detail` before giving up
    pub max_retries: usize,

    /// Rows of `high_risk_objects` when the caller gives no limit
    pub high_risk_limit: usize,
    /// Rows of `palermo_leaderboard` when the caller gives no limit
    pub leaderboard_limit: usize,
    /// Number of Sentry objects, by Palermo scale, scanned by the energy ranking
    pub energy_ranking_limit: usize,

    pub default_population_density: PeoplePerKm2,
    pub default_blast_population_density: PeoplePerKm2,

    pub log_level: String,
    pub json_logs: bool,
}

impl Default for AstroScopeConfig {
    fn default() -> Self {
        AstroScopeConfig {
            sentry_url: DEFAULT_SENTRY_URL.to_string(),
            sbdb_url: DEFAULT_SBDB_URL.to_string(),
            worldpop_url: DEFAULT_WORLDPOP_URL.to_string(),
            sedac_url: DEFAULT_SEDAC_URL.to_string(),
            sedac_layer: DEFAULT_SEDAC_LAYER.to_string(),
            summary_timeout_secs: 10,
            detail_timeout_secs: 5,
            population_timeout_secs: 8,
            summary_cache_ttl_secs: 3600,
            detail_cache_ttl_secs: 36000,
            max_retries: 5,
            high_risk_limit: 10,
            leaderboard_limit: 10,
            energy_ranking_limit: 50,
            default_population_density: DEFAULT_POPULATION_DENSITY,
            default_blast_population_density: DEFAULT_BLAST_POPULATION_DENSITY,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

fn override_with<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) -> Result<(), AstroScopeError> {
    let key = format!("{ENV_PREFIX}{name}");
    if let Some(raw) = lookup(&key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| AstroScopeError::InvalidConfig { key, value: raw })?;
    }
    Ok(())
}

impl AstroScopeConfig {
    /// Defaults overridden by the `ASTROSCOPE_*` process environment.
    ///
    /// Recognized variables: `SENTRY_URL`, `SBDB_URL`, `WORLDPOP_URL`, `SEDAC_URL`,
    /// `SEDAC_LAYER`, `SUMMARY_TIMEOUT_SECS`, `DETAIL_TIMEOUT_SECS`, `POPULATION_TIMEOUT_SECS`,
    /// `SUMMARY_CACHE_TTL_SECS`, `DETAIL_CACHE_TTL_SECS`, `MAX_RETRIES`, `HIGH_RISK_LIMIT`,
    /// `LEADERBOARD_LIMIT`, `ENERGY_RANKING_LIMIT`, `DEFAULT_POPULATION_DENSITY`,
    /// `DEFAULT_BLAST_POPULATION_DENSITY`, `LOG_LEVEL` and
    /// `JSON_LOGS`, each with the `ASTROSCOPE_` prefix.
    pub fn from_env() -> Result<Self, AstroScopeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AstroScopeError> {
        let mut config = AstroScopeConfig::default();

        override_with(&lookup, "SENTRY_URL", &mut config.sentry_url)?;
        override_with(&lookup, "SBDB_URL", &mut config.sbdb_url)?;
        override_with(&lookup, "WORLDPOP_URL", &mut config.worldpop_url)?;
        override_with(&lookup, "SEDAC_URL", &mut config.sedac_url)?;
        override_with(&lookup, "SEDAC_LAYER", &mut config.sedac_layer)?;
        override_with(&lookup, "SUMMARY_TIMEOUT_SECS", &mut config.summary_timeout_secs)?;
        override_with(&lookup, "DETAIL_TIMEOUT_SECS", &mut config.detail_timeout_secs)?;
        override_with(
            &lookup,
            "POPULATION_TIMEOUT_SECS",
            &mut config.population_timeout_secs,
        )?;
        override_with(
            &lookup,
            "SUMMARY_CACHE_TTL_SECS",
            &mut config.summary_cache_ttl_secs,
        )?;
        override_with(&lookup, "DETAIL_CACHE_TTL_SECS", &mut config.detail_cache_ttl_secs)?;
        override_with(&lookup, "MAX_RETRIES", &mut config.max_retries)?;
        override_with(&lookup, "HIGH_RISK_LIMIT", &mut config.high_risk_limit)?;
        override_with(&lookup, "LEADERBOARD_LIMIT", &mut config.leaderboard_limit)?;
        override_with(&lookup, "ENERGY_RANKING_LIMIT", &mut config.energy_ranking_limit)?;
        override_with(
            &lookup,
            "DEFAULT_POPULATION_DENSITY",
            &mut config.default_population_density,
        )?;
        override_with(
            &lookup,
            "DEFAULT_BLAST_POPULATION_DENSITY",
            &mut config.default_blast_population_density,
        )?;
        override_with(&lookup, "LOG_LEVEL", &mut config.log_level)?;
        override_with(&lookup, "JSON_LOGS", &mut config.json_logs)?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the aggregator cannot run with.
    pub fn validate(&self) -> Result<(), AstroScopeError> {
        let invalid = |key: &str, value: String| AstroScopeError::InvalidConfig {
            key: format!("{ENV_PREFIX}{key}"),
            value,
        };

        let urls = [
            ("SENTRY_URL", &self.sentry_url),
            ("SBDB_URL", &self.sbdb_url),
            ("WORLDPOP_URL", &self.worldpop_url),
            ("SEDAC_URL", &self.sedac_url),
        ];
        for (key, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(key, url.clone()));
            }
        }

        let timeouts = [
            ("SUMMARY_TIMEOUT_SECS", self.summary_timeout_secs),
            ("DETAIL_TIMEOUT_SECS", self.detail_timeout_secs),
            ("POPULATION_TIMEOUT_SECS", self.population_timeout_secs),
        ];
        if let Some((key, value)) = timeouts.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(*key, value.to_string()));
        }

        if self.max_retries == 0 {
            return Err(invalid("MAX_RETRIES", self.max_retries.to_string()));
        }

        let densities = [
            ("DEFAULT_POPULATION_DENSITY", self.default_population_density),
            (
                "DEFAULT_BLAST_POPULATION_DENSITY",
                self.default_blast_population_density,
            ),
        ];
        if let Some((key, value)) = densities.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(invalid(*key, value.to_string()));
        }
        Ok(())
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn population_timeout(&self) -> Duration {
        Duration::from_secs(self.population_timeout_secs)
    }

    pub fn summary_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_cache_ttl_secs)
    }

    pub fn detail_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_cache_ttl_secs)
    }
}
