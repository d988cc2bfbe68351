//! # AstroScope environment state
//!
//! This module defines [`crate::env_state::AstroScopeEnv`], the **shared network environment**
//! used by the risk feed aggregator. It owns a persistent [`reqwest::Client`] and offers the two
//! request shapes the feeds need:
//!
//! - [`get_json`](crate::env_state::AstroScopeEnv::get_json): JSON APIs (Sentry, SBDB, WorldPop).
//! - [`get_payload`](crate::env_state::AstroScopeEnv::get_payload): services whose body may be
//!   JSON, GML or plain text depending on the negotiated format (SEDAC WMS).
//!
//! ## Structure
//!
//! ```text
//! AstroScopeEnv
//! └── http_client (reqwest::Client, connection pool shared by clones)
//! ```
//!
//! The object is **cheaply cloneable**: clones share the same connection pool.
//! Every request carries its own timeout, so one environment serves both the slow summary feeds
//! and the fast per-object lookups.
use std::time::Duration;

use reqwest::{header, Client};
use serde_json::Value;
use tracing::trace;

use crate::astroscope_errors::AstroScopeError;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("AstroScope/", env!("CARGO_PKG_VERSION"));

/// A response body as returned by services with content negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPayload {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct AstroScopeEnv {
    pub http_client: Client,
}

impl AstroScopeEnv {
    /// Create a new environment with a fresh HTTP client.
    ///
    /// Return
    /// ------
    /// * The environment, or [`AstroScopeError::HttpError`] when the TLS backend cannot be
    ///   initialized
    pub fn new() -> Result<Self, AstroScopeError> {
        let http_client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(AstroScopeEnv { http_client })
    }

    /// Wrap an existing client, e.g. one configured with a proxy.
    pub fn with_client(http_client: Client) -> Self {
        AstroScopeEnv { http_client }
    }

    /// GET a JSON document.
    ///
    /// Arguments
    /// ---------
    /// * `url`: endpoint
    /// * `query`: query string pairs, URL-encoded by the client
    /// * `timeout`: whole-request timeout
    ///
    /// Return
    /// ------
    /// * The decoded body. Non-2xx statuses and transport failures map to
    ///   [`AstroScopeError::HttpError`], undecodable bodies to [`AstroScopeError::HttpError`] as
    ///   well (reqwest reports decoding failures through its own error type).
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, AstroScopeError> {
        trace!(url, ?query, "GET json");
        let value = self
            .http_client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }

    /// GET a body that may or may not be JSON.
    ///
    /// The body is decoded as JSON only when the response `Content-Type` says so; otherwise it
    /// is returned as text. The status is not checked: WMS servers report failures inside
    /// a 200 body and callers treat unparsable bodies as misses.
    pub async fn get_payload(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<FeedPayload, AstroScopeError> {
        trace!(url, ?query, "GET payload");
        let response = self
            .http_client
            .get(url)
            .query(query)
            .header(header::ACCEPT, "*/*")
            .timeout(timeout)
            .send()
            .await?;

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response.text().await?;
        if is_json {
            Ok(FeedPayload::Json(serde_json::from_str(&text)?))
        } else {
            Ok(FeedPayload::Text(text))
        }
    }
}
