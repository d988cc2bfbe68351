//! # Impact physics
//!
//! Two simplified models of the damage caused by an asteroid impact:
//!
//! * [`parametric`]: energy `E = (π/12)·ρ·d³·v²`, damage radii `k·E^(1/3)`, crater size and
//!   casualties over full disks.
//! * [`blast`]: overpressure rings scaled on the yield in kilotons, modulated by the impact
//!   angle, casualties over annuli.
//!
//! The models are kept separate; [`assessment`] chains them (energy from the first, rings from
//! the second) and runs the parametric model on risk-feed records.
//!
//! ## Example
//!
//! ```rust
//! use astroscope::impact::parametric::{compute_impact_radius, DamageClassification};
//!
//! let iron = compute_impact_radius(7800.0, 17000.0, 50.0).unwrap();
//! assert_eq!(iron.damage_classification, DamageClassification::Light);
//! assert!((iron.kinetic_energy_megatons - 17.63).abs() < 0.01);
//! ```

pub mod assessment;
pub mod blast;
pub mod parametric;
