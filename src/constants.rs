//! # Constants and type definitions for AstroScope
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the `astroscope` library.
//!
//! ## Overview
//!
//! - Angular and length unit conversions (degrees ↔ radians, km ↔ m)
//! - TNT-equivalence constants for impact energies
//! - Default physical assumptions used when a feed does not provide a value
//! - Core type aliases used across the crate
//!
//! These definitions are shared by the orbit geometry engine, both impact-physics models,
//! and the risk feed aggregator.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Full turn in degrees, used to normalize angular elements
pub const FULL_TURN_DEG: f64 = 360.0;

/// Meters in one kilometer
pub const METERS_PER_KM: f64 = 1000.0;

/// Energy released by one megaton of TNT, in joules
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Kilotons in one megaton
pub const KILOTONS_PER_MEGATON: f64 = 1000.0;

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Number of true-anomaly samples taken over one revolution
pub const DEFAULT_SAMPLE_COUNT: usize = 200;

/// Typical stony asteroid bulk density in kg/m³, used when no measured density exists
pub const DEFAULT_DENSITY: KgPerM3 = 3000.0;

/// Population density assumed by the parametric casualty model when none is given
pub const DEFAULT_POPULATION_DENSITY: PeoplePerKm2 = 100.0;

/// Impact angle assumed by the blast simulator when none is given
pub const DEFAULT_IMPACT_ANGLE: Degree = 45.0;

/// Population density assumed by the blast simulator when none is given
pub const DEFAULT_BLAST_POPULATION_DENSITY: PeoplePerKm2 = 3000.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Speed in meters per second
pub type MeterPerSecond = f64;
/// Density in kilograms per cubic meter
pub type KgPerM3 = f64;
/// Energy in joules
pub type Joule = f64;
/// Energy in megatons of TNT
pub type Megaton = f64;
/// Area in square kilometers
pub type SquareKilometer = f64;
/// Population density in people per square kilometer
pub type PeoplePerKm2 = f64;

/// Designation of a small body as used by the JPL SSD APIs (e.g. `"101955"`, `"2000 SG344"`)
pub type Designation = String;
