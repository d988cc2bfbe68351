use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use astroscope::{
    impact::blast::{blast_bands, coupling_factor},
    orbit_geometry::{compute_ellipse_descriptor, compute_orbit_points, compute_orbit_samples},
    orbital_elements::OrbitalElements,
};

/// Deterministic grid of bound orbits: e ∈ [0, 0.9], angles spread over the full circle.
fn element_grid(n: usize) -> Vec<OrbitalElements> {
    (0..n)
        .filter_map(|k| {
            let t = k as f64 / n as f64;
            OrbitalElements::new(
                0.8 + 2.5 * t,
                0.9 * t,
                180.0 * t,
                360.0 * t,
                (720.0 * t) % 360.0,
            )
            .ok()
        })
        .collect()
}

fn bench_orbit_points(c: &mut Criterion) {
    let grid = element_grid(1_000);

    c.bench_function("compute_orbit_points/200", |b| {
        b.iter(|| {
            for elements in &grid {
                black_box(compute_orbit_points(black_box(elements)).ok());
            }
        })
    });

    let eros = OrbitalElements::new(1.458, 0.2228, 10.83, 304.3, 178.9)
        .expect("valid Eros elements");
    let mut group = c.benchmark_group("compute_orbit_samples");
    for count in [50usize, 200, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(compute_orbit_samples(&eros, count).ok()))
        });
    }
    group.finish();
}

fn bench_ellipse_descriptor(c: &mut Criterion) {
    let grid = element_grid(1_000);

    c.bench_function("compute_ellipse_descriptor", |b| {
        b.iter(|| {
            for elements in &grid {
                black_box(compute_ellipse_descriptor(black_box(elements)).ok());
            }
        })
    });
}

fn bench_blast_bands(c: &mut Criterion) {
    c.bench_function("blast_bands/sweep", |b| {
        b.iter(|| {
            for k in 1..=1_000 {
                let energy_mt = k as f64 * 0.5;
                let angle = (k % 90) as f64;
                black_box(blast_bands(energy_mt, angle, 3000.0));
                black_box(coupling_factor(angle));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_orbit_points,
    bench_ellipse_descriptor,
    bench_blast_bands
);
criterion_main!(benches);
