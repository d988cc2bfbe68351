use std::env;

use astroscope::astroscope_errors::AstroScopeError;
use astroscope::constants::{DEFAULT_DENSITY, DEFAULT_POPULATION_DENSITY};
use astroscope::impact::blast::{simulate_blast, BlastRequest};
use astroscope::impact::parametric::{
    compute_crater_dimensions, compute_impact_radius, estimate_casualties, parse_physical_value,
};
use astroscope::logging::init_logging;

/// Offline impact report for one impactor.
/// Usage:
///   impact_summary <DIAMETER_M> <SPEED_M_S> [DENSITY_KG_M3] [POP_DENSITY_KM2]
/// Example:
///   impact_summary 50 17000 7800
fn main() -> Result<(), AstroScopeError> {
    init_logging(None);

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("usage: impact_summary <DIAMETER_M> <SPEED_M_S> [DENSITY_KG_M3] [POP_DENSITY_KM2]");
        std::process::exit(2);
    }

    let diameter = parse_physical_value("diameter", &args[0])?;
    let speed = parse_physical_value("speed", &args[1])?;
    let density = match args.get(2) {
        Some(raw) => parse_physical_value("density", raw)?,
        None => DEFAULT_DENSITY,
    };
    let population = match args.get(3) {
        Some(raw) => parse_physical_value("population density", raw)?,
        None => DEFAULT_POPULATION_DENSITY,
    };

    let radius = compute_impact_radius(density, speed, diameter)?;
    print!("{radius}");

    let crater = compute_crater_dimensions(diameter, speed, density)?;
    println!(
        "Crater: {:.1} m wide, {:.1} m deep",
        crater.crater_diameter_m, crater.crater_depth_m
    );

    let casualties = estimate_casualties(
        radius.severe_radius_km,
        radius.moderate_radius_km,
        radius.light_radius_km,
        population,
    )?;
    println!(
        "Casualties at {population} /km²: {} severe, {} moderate, {} light ({} total)",
        casualties.severe_casualties,
        casualties.moderate_casualties,
        casualties.light_casualties,
        casualties.total_casualties
    );

    let blast = simulate_blast(
        &BlastRequest::new(0.0, 0.0, radius.kinetic_energy_megatons)
            .with_population_density(population),
    )?;
    println!(
        "Overpressure rings: 10 psi {:.2} km, 5 psi {:.2} km, 1 psi {:.2} km ({} casualties)",
        blast.radii_km.r10psi, blast.radii_km.r5psi, blast.radii_km.r1psi, blast.casualties_est.total
    );
    Ok(())
}
