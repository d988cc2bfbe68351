//! # AstroScope: the risk data aggregator
//!
//! This module defines [`AstroScope`](crate::astroscope::AstroScope), the façade wiring
//! together:
//!
//! 1. **Configuration** ([`AstroScopeConfig`]): feed URLs, timeouts, cache lifetimes, defaults.
//! 2. **Network environment** ([`AstroScopeEnv`]): the shared HTTP client.
//! 3. **Time-bounded caches** ([`TtlCache`]): one per aggregated view.
//! 4. **Numeric cores**: orbit geometry and impact physics, fed with the fetched data.
//!
//! ## Caching
//!
//! | operation              | key          | lifetime (default) |
//! |------------------------|--------------|--------------------|
//! | `high_risk_objects`    | limit        | 1 h                |
//! | `palermo_leaderboard`  | limit        | 1 h                |
//! | `neo_detail`           | designation  | 10 h               |
//! | `virtual_impactor`     | designation  | 10 h               |
//!
//! Only successful answers are cached.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use astroscope::{astroscope::AstroScope, config::AstroScopeConfig};
//!
//! # async fn run() -> Result<(), astroscope::astroscope_errors::AstroScopeError> {
//! let scope = AstroScope::new(AstroScopeConfig::from_env()?)?;
//!
//! let top = scope.palermo_leaderboard(Some(5)).await?;
//! let batch = scope.orbit_points(&["433", "99942"]).await;
//! println!("{} objects, {} orbits", top.len(), batch.points.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Single-object operations return the first [`AstroScopeError`] met. Batch operations
//! (`orbit_points`, `neos_by_energy`, the MOID enrichment of `high_risk_objects`) log and skip
//! failing items instead of aborting.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    astroscope_errors::AstroScopeError,
    config::AstroScopeConfig,
    constants::{Degree, Designation, PeoplePerKm2},
    env_state::AstroScopeEnv,
    impact::{
        assessment::{comprehensive_impact_assessment, ComprehensiveAssessment},
        blast::{simulate_blast, BlastAssessment, BlastRequest},
    },
    orbit_geometry::{compute_ellipse_descriptor, compute_orbit_points, EllipseDescriptor},
    orbital_elements::OrbitalElements,
    risk_feed::{
        cache::TtlCache,
        population::{self, PopulationDensity},
        sbdb,
        sentry::{
            self, format_impact_probability, format_moid, format_palermo, EnergyRankedNeo,
            LeaderboardEntry, RiskRecord, SentryObject, VirtualImpactSummary,
        },
    },
};

/// Year queried from the population rasters when none is given.
pub const DEFAULT_POPULATION_YEAR: i32 = 2020;

/// High-risk table keyed by designation, plus the designations in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighRiskObjects {
    pub data: BTreeMap<Designation, RiskRecord>,
    pub list_of_des: Vec<Designation>,
}

/// Detailed card of one object, from Sentry and SBDB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeoDetail {
    pub des: Designation,
    #[serde(rename = "Full Name")]
    pub full_name: String,
    #[serde(rename = "Diameter")]
    pub diameter: String,
    #[serde(rename = "Velocity")]
    pub velocity: String,
    #[serde(rename = "Impact Probability")]
    pub impact_probability: String,
    #[serde(rename = "Palermo Scale")]
    pub palermo_scale: String,
    #[serde(rename = "Close Approach Distance")]
    pub close_approach_distance: String,
}

impl NeoDetail {
    /// Absent Sentry numbers read as 0, a missing SBDB full name falls back to the designation.
    pub fn from_feeds(object: &SentryObject, sbdb: &sbdb::SbdbObject) -> Self {
        NeoDetail {
            des: object.des.clone(),
            full_name: sbdb.fullname.clone().unwrap_or_else(|| object.des.clone()),
            diameter: format!("{:.3} km", object.diameter.unwrap_or(0.0)),
            velocity: format!("{:.3} km/s", object.v_inf.unwrap_or(0.0)),
            impact_probability: format_impact_probability(object.ip),
            palermo_scale: format_palermo(Some(object.ps_max.unwrap_or(0.0))),
            close_approach_distance: format_moid(sbdb.moid_au),
        }
    }
}

/// Flattened orbits of a batch of objects, with the reason of every failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrbitPointsBatch {
    pub points: BTreeMap<Designation, Vec<f64>>,
    pub failures: BTreeMap<Designation, String>,
}

/// Sampled orbit and planar ellipse of one object, computed from a single elements fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitView {
    pub points: Vec<f64>,
    pub ellipse: EllipseDescriptor,
}

#[derive(Debug)]
pub struct AstroScope {
    env: AstroScopeEnv,
    config: AstroScopeConfig,
    high_risk_cache: TtlCache<usize, HighRiskObjects>,
    leaderboard_cache: TtlCache<usize, Vec<LeaderboardEntry>>,
    detail_cache: TtlCache<Designation, NeoDetail>,
    vi_cache: TtlCache<Designation, VirtualImpactSummary>,
}

impl AstroScope {
    /// Construct a new aggregator with its own HTTP client.
    ///
    /// Arguments
    /// -----------------
    /// * `config`: validated configuration (see [`AstroScopeConfig::from_env`])
    ///
    /// Return
    /// ----------
    /// * The aggregator, or an [`AstroScopeError`] if the configuration is invalid or the HTTP
    ///   client cannot be built
    pub fn new(config: AstroScopeConfig) -> Result<Self, AstroScopeError> {
        Self::with_env(AstroScopeEnv::new()?, config)
    }

    /// Construct an aggregator over an existing environment.
    pub fn with_env(env: AstroScopeEnv, config: AstroScopeConfig) -> Result<Self, AstroScopeError> {
        config.validate()?;
        Ok(AstroScope {
            high_risk_cache: TtlCache::new(config.summary_cache_ttl()),
            leaderboard_cache: TtlCache::new(config.summary_cache_ttl()),
            detail_cache: TtlCache::new(config.detail_cache_ttl()),
            vi_cache: TtlCache::new(config.detail_cache_ttl()),
            env,
            config,
        })
    }

    pub fn config(&self) -> &AstroScopeConfig {
        &self.config
    }

    /// Drop every cached answer.
    pub fn clear_caches(&self) {
        self.high_risk_cache.clear();
        self.leaderboard_cache.clear();
        self.detail_cache.clear();
        self.vi_cache.clear();
    }

    /// The first `limit` objects of the Sentry risk table, enriched with their SBDB MOID.
    ///
    /// `None` takes the configured `high_risk_limit`. An empty risk table yields an empty
    /// result. A failed MOID lookup only sets the distance to `"N/A"`.
    pub async fn high_risk_objects(
        &self,
        limit: Option<usize>,
    ) -> Result<HighRiskObjects, AstroScopeError> {
        let limit = limit.unwrap_or(self.config.high_risk_limit);
        self.high_risk_cache
            .get_or_try_insert_with(limit, || self.fetch_high_risk_objects(limit))
            .await
    }

    async fn fetch_high_risk_objects(&self, limit: usize) -> Result<HighRiskObjects, AstroScopeError> {
        let summary = sentry::fetch_summary(&self.env, &self.config).await?;
        if summary.is_empty() {
            info!("Sentry risk table is empty");
            return Ok(HighRiskObjects::default());
        }

        info!(limit, total = summary.len(), "building high-risk table");
        let mut result = HighRiskObjects::default();
        for object in summary.iter().take(limit) {
            let moid = match sbdb::fetch_object_summary(&self.env, &self.config, &object.des).await {
                Ok(sbdb) => sbdb.moid_au,
                Err(err) => {
                    warn!(des = %object.des, %err, "MOID lookup failed");
                    None
                }
            };
            result
                .data
                .insert(object.des.clone(), sentry::risk_record(object, moid));
            result.list_of_des.push(object.des.clone());
        }
        Ok(result)
    }

    /// Detailed card of one object.
    ///
    /// The Sentry and SBDB lookups are attempted up to `max_retries` times, logging each
    /// failure. An object absent from the risk table is reported at once, without retrying.
    pub async fn neo_detail(&self, des: &str) -> Result<NeoDetail, AstroScopeError> {
        if let Some(detail) = self.detail_cache.get(&des.to_string()) {
            return Ok(detail);
        }

        let mut last_error = None;
        for attempt in 1..=self.config.max_retries {
            match self.fetch_neo_detail(des).await {
                Ok(detail) => {
                    self.detail_cache.insert(des.to_string(), detail.clone());
                    return Ok(detail);
                }
                Err(err @ AstroScopeError::ObjectNotFound { .. }) => return Err(err),
                Err(err) => {
                    warn!(des, attempt, %err, "neo detail lookup failed, retrying");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| AstroScopeError::InvalidConfig {
            key: "ASTROSCOPE_MAX_RETRIES".into(),
            value: "0".into(),
        }))
    }

    async fn fetch_neo_detail(&self, des: &str) -> Result<NeoDetail, AstroScopeError> {
        let summary = sentry::fetch_summary(&self.env, &self.config).await?;
        let object = summary
            .iter()
            .find(|o| o.des == des)
            .ok_or_else(|| AstroScopeError::ObjectNotFound {
                source_name: "Sentry".into(),
                designation: des.to_string(),
            })?;
        let sbdb = sbdb::fetch_object_summary(&self.env, &self.config, des).await?;
        Ok(NeoDetail::from_feeds(object, &sbdb))
    }

    /// Worst-case virtual impactor of an object, or `"N/A"` fields when unavailable.
    pub async fn virtual_impactor(&self, des: &str) -> VirtualImpactSummary {
        if let Some(summary) = self.vi_cache.get(&des.to_string()) {
            return summary;
        }
        match sentry::fetch_virtual_impactors(&self.env, &self.config, des).await {
            Ok(impactors) => {
                let summary = sentry::summarize_virtual_impactors(&impactors);
                self.vi_cache.insert(des.to_string(), summary.clone());
                summary
            }
            Err(err) => {
                warn!(des, %err, "virtual impactor lookup failed");
                VirtualImpactSummary::unavailable()
            }
        }
    }

    /// The `limit` objects with the highest Palermo scale, with their worst-case impactor.
    ///
    /// `None` takes the configured `leaderboard_limit`.
    pub async fn palermo_leaderboard(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, AstroScopeError> {
        let limit = limit.unwrap_or(self.config.leaderboard_limit);
        self.leaderboard_cache
            .get_or_try_insert_with(limit, || self.fetch_palermo_leaderboard(limit))
            .await
    }

    async fn fetch_palermo_leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AstroScopeError> {
        let mut summary = sentry::fetch_summary(&self.env, &self.config).await?;
        sentry::sort_by_palermo(&mut summary);

        let mut leaderboard = Vec::with_capacity(limit.min(summary.len()));
        for object in summary.iter().take(limit) {
            let vi = self.virtual_impactor(&object.des).await;
            leaderboard.push(sentry::leaderboard_entry(object, vi));
        }
        Ok(leaderboard)
    }

    /// Objects ranked by the energy of their highest-Palermo virtual impactor.
    ///
    /// Only the `energy_ranking_limit` objects with the highest Palermo scale are scanned.
    /// Objects without a positive energy, or whose lookup fails, are skipped; names already
    /// ranked are not repeated.
    pub async fn neos_by_energy(&self) -> Result<Vec<EnergyRankedNeo>, AstroScopeError> {
        let mut summary = sentry::fetch_summary(&self.env, &self.config).await?;
        sentry::sort_by_palermo(&mut summary);

        let mut seen: HashSet<String> = HashSet::new();
        let mut ranked = Vec::new();
        for object in summary.iter().take(self.config.energy_ranking_limit) {
            let name = object.display_name();
            if seen.contains(name) {
                continue;
            }
            let impactors =
                match sentry::fetch_virtual_impactors(&self.env, &self.config, &object.des).await {
                    Ok(impactors) => impactors,
                    Err(err) => {
                        warn!(des = %object.des, %err, "skipping object in energy ranking");
                        continue;
                    }
                };
            if let Some(energy_mt) = sentry::ranked_energy(&impactors) {
                seen.insert(name.to_string());
                ranked.push(EnergyRankedNeo {
                    name: name.to_string(),
                    energy_mt,
                    status: "Active".to_string(),
                });
            }
        }

        Ok(ranked
            .into_iter()
            .sorted_by(|a, b| b.energy_mt.total_cmp(&a.energy_mt))
            .collect())
    }

    /// Orbital elements of an object from SBDB.
    pub async fn orbital_elements(&self, des: &str) -> Result<OrbitalElements, AstroScopeError> {
        sbdb::fetch_orbital_elements(&self.env, &self.config, des).await
    }

    /// Flattened 200-point orbit of every designation.
    ///
    /// A failing designation is recorded in `failures` and does not stop the batch.
    pub async fn orbit_points<S: AsRef<str>>(&self, designations: &[S]) -> OrbitPointsBatch {
        let mut batch = OrbitPointsBatch::default();
        for des in designations.iter().map(|d| d.as_ref()).unique() {
            let points = match self.orbital_elements(des).await {
                Ok(elements) => compute_orbit_points(&elements),
                Err(err) => Err(err),
            };
            match points {
                Ok(points) => {
                    batch.points.insert(des.to_string(), points);
                }
                Err(err) => {
                    warn!(des, %err, "orbit computation failed");
                    batch.failures.insert(des.to_string(), err.to_string());
                }
            }
        }
        batch
    }

    /// Planar ellipse descriptor of an object's orbit.
    pub async fn orbit_ellipse(&self, des: &str) -> Result<EllipseDescriptor, AstroScopeError> {
        let elements = self.orbital_elements(des).await?;
        compute_ellipse_descriptor(&elements)
    }

    /// Flattened orbit and ellipse descriptor of an object, from one SBDB request.
    pub async fn orbit_view(&self, des: &str) -> Result<OrbitView, AstroScopeError> {
        let elements = self.orbital_elements(des).await?;
        Ok(OrbitView {
            points: compute_orbit_points(&elements)?,
            ellipse: compute_ellipse_descriptor(&elements)?,
        })
    }

    /// Population density at a point, WorldPop first then SEDAC.
    pub async fn population_density(
        &self,
        lat: Degree,
        lng: Degree,
        year: Option<i32>,
    ) -> PopulationDensity {
        population::population_density(
            &self.env,
            &self.config,
            lat,
            lng,
            year.unwrap_or(DEFAULT_POPULATION_YEAR),
        )
        .await
    }

    /// Run the blast simulator on a JSON request; an absent population density takes the
    /// configured default.
    pub fn simulate_blast(&self, payload: &Value) -> Result<BlastAssessment, AstroScopeError> {
        let mut request = BlastRequest::from_json(payload)?;
        if payload.get("pop_density_km2").is_none() {
            request.pop_density_km2 = self.config.default_blast_population_density;
        }
        simulate_blast(&request)
    }

    /// Run the parametric model on a record of the high-risk table or a detail card.
    pub fn assess_risk_record(
        &self,
        record: &Value,
        population_density: Option<PeoplePerKm2>,
    ) -> Result<ComprehensiveAssessment, AstroScopeError> {
        comprehensive_impact_assessment(
            record,
            population_density.unwrap_or(self.config.default_population_density),
        )
    }
}
