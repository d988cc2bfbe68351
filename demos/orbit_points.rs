use std::env;

use astroscope::astroscope::AstroScope;
use astroscope::astroscope_errors::AstroScopeError;
use astroscope::config::AstroScopeConfig;
use astroscope::logging::init_logging;

/// Fetch orbits from SBDB and print the sampled points and the ellipse descriptor as JSON.
/// Usage:
///   orbit_points <DES> [<DES> ...]
/// Example:
///   ASTROSCOPE_LOG_LEVEL=debug orbit_points 433 99942
#[tokio::main]
async fn main() -> Result<(), AstroScopeError> {
    let config = AstroScopeConfig::from_env()?;
    init_logging(Some(&config));

    let designations: Vec<String> = env::args().skip(1).collect();
    if designations.is_empty() {
        eprintln!("usage: orbit_points <DES> [<DES> ...]");
        std::process::exit(2);
    }

    let scope = AstroScope::new(config)?;
    let mut failed = false;
    for des in &designations {
        match scope.orbit_view(des).await {
            Ok(view) => println!("{des}: {}", serde_json::to_string_pretty(&view)?),
            Err(err) => {
                eprintln!("{des}: {err}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
