//! Structured logging through the `tracing` ecosystem.
//!
//! The library itself only emits events (`debug!` in the numeric cores, `info!`/`warn!` in the
//! aggregator). Binaries call [`init_logging`] once to install a subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AstroScopeConfig;

/// Filter used when neither `RUST_LOG` nor a configured level is available.
pub const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Build the event filter: `RUST_LOG` wins, then the configured level, then [`DEFAULT_FILTER`].
pub fn env_filter(config: Option<&AstroScopeConfig>) -> EnvFilter {
    let fallback = match config {
        Some(config) if !config.log_level.trim().is_empty() => config.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Events go to stdout, human readable by default or one JSON object per line when
/// `config.json_logs` is set. Calling it a second time is a no-op: the first subscriber stays.
///
/// # Examples
///
/// ```no_run
/// use astroscope::{config::AstroScopeConfig, logging::init_logging};
///
/// let config = AstroScopeConfig::from_env().unwrap_or_default();
/// init_logging(Some(&config));
/// ```
pub fn init_logging(config: Option<&AstroScopeConfig>) {
    let filter = env_filter(config);
    let json = config.is_some_and(|c| c.json_logs);

    let registry = tracing_subscriber::registry().with(filter);

    // try_init fails only when a global subscriber already exists
    let _ = if json {
        registry
            .with(fmt::layer().with_target(true).json())
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
    };
}
