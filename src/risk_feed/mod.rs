//! # Risk feeds
//!
//! Clients of the public services the aggregator draws from:
//!
//! - [`sentry`]: JPL Sentry impact monitoring (risk table, virtual impactors)
//! - [`sbdb`]: JPL Small-Body Database (orbital elements, full names, MOID)
//! - [`population`]: WorldPop and SEDAC population density rasters
//! - [`cache`]: the time-bounded cache the aggregator stores their answers in
//!
//! Each feed splits into pure `parse_*` functions working on [`serde_json::Value`] and thin
//! `fetch_*` wrappers performing the request through [`AstroScopeEnv`](crate::env_state::AstroScopeEnv).

pub mod cache;
pub mod population;
pub mod sbdb;
pub mod sentry;
