pub mod astroscope;
pub mod astroscope_errors;
pub mod config;
pub mod constants;
pub mod conversion;
pub mod env_state;
pub mod impact;
pub mod logging;
pub mod orbit_geometry;
pub mod orbital_elements;
mod ref_system;
pub mod risk_feed;
