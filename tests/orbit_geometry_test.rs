use approx::assert_relative_eq;
use astroscope::{
    constants::DEFAULT_SAMPLE_COUNT,
    orbit_geometry::{
        compute_ellipse_descriptor, compute_ellipse_descriptor_from, compute_orbit_points,
        compute_orbit_samples,
    },
    orbital_elements::OrbitalElements,
};
use nalgebra::{Vector2, Vector3};

mod common;

#[test]
fn test_circular_orbit_has_constant_radius() {
    let circle = OrbitalElements::new(2.5, 0.0, 33.0, 70.0, 10.0).unwrap();
    let sample = compute_orbit_samples(&circle, DEFAULT_SAMPLE_COUNT).unwrap();

    assert_eq!(sample.len(), DEFAULT_SAMPLE_COUNT);
    for point in sample.points() {
        assert_relative_eq!(point.norm(), 2.5, epsilon = 1e-12);
    }
}

#[test]
fn test_orbit_is_closed() {
    let elements = common::eros();
    for count in [2, 3, 50, 200, 1000] {
        let sample = compute_orbit_samples(&elements, count).unwrap();
        let first = sample.points().first().unwrap();
        let last = sample.points().last().unwrap();
        assert_relative_eq!(first, last, epsilon = 1e-12);
    }
}

#[test]
fn test_periapsis_and_apoapsis_distances() {
    let elements = common::eros();
    let sample = compute_orbit_samples(&elements, 201).unwrap();
    let a = elements.semi_major_axis;
    let e = elements.eccentricity;

    // ν = 0 and ν = π are both sampled with an odd count
    assert_relative_eq!(sample.points()[0].norm(), a * (1.0 - e), epsilon = 1e-12);
    assert_relative_eq!(sample.points()[100].norm(), a * (1.0 + e), epsilon = 1e-12);

    let (min, max) = sample
        .points()
        .iter()
        .map(|p| p.norm())
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), r| (lo.min(r), hi.max(r)));
    assert!(min >= a * (1.0 - e) - 1e-12);
    assert!(max <= a * (1.0 + e) + 1e-12);
}

#[test]
fn test_points_lie_in_orbital_plane() {
    let elements = common::eros();
    let (i, om, _) = elements.angles_rad();
    let normal = Vector3::new(om.sin() * i.sin(), -om.cos() * i.sin(), i.cos());

    let sample = compute_orbit_samples(&elements, 64).unwrap();
    for point in sample.points() {
        assert_relative_eq!(point.dot(&normal), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_eros_first_point() {
    let sample = compute_orbit_samples(&common::eros(), DEFAULT_SAMPLE_COUNT).unwrap();
    assert_relative_eq!(
        sample.points()[0],
        Vector3::new(-0.6207955045665418, 0.9479674998983789, 0.004087430017756738),
        epsilon = 1e-12
    );
}

#[test]
fn test_equivalent_angles_give_same_orbit() {
    let base = common::eros();
    let wrapped = OrbitalElements::new(1.458, 0.2228, 10.83 + 360.0, 304.3 - 720.0, 178.9 - 360.0)
        .unwrap();

    let a = compute_orbit_points(&base).unwrap();
    let b = compute_orbit_points(&wrapped).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_relative_eq!(x, y, epsilon = 1e-9);
    }
}

#[test]
fn test_flattened_points_follow_samples() {
    let elements = common::eros();
    let sample = compute_orbit_samples(&elements, DEFAULT_SAMPLE_COUNT).unwrap();
    let flat = compute_orbit_points(&elements).unwrap();

    assert_eq!(flat.len(), 3 * DEFAULT_SAMPLE_COUNT);
    for (k, point) in sample.points().iter().enumerate() {
        assert_eq!(flat[3 * k], point.x);
        assert_eq!(flat[3 * k + 1], point.y);
        assert_eq!(flat[3 * k + 2], point.z);
    }
}

#[test]
fn test_circular_ellipse_descriptor() {
    let circle = OrbitalElements::new(1.0, 0.0, 0.0, 0.0, 0.0).unwrap();
    let descriptor = compute_ellipse_descriptor(&circle).unwrap();

    // the duplicated periapsis sample pulls the centroid slightly toward +X
    assert_relative_eq!(descriptor.center_x, 0.005, epsilon = 1e-6);
    assert_relative_eq!(descriptor.center_y, 0.0, epsilon = 1e-12);
    assert_relative_eq!(descriptor.x_radius, 1.0, epsilon = 1e-3);
    assert_relative_eq!(descriptor.y_radius, 1.0, epsilon = 1e-3);
}

#[test]
fn test_eros_ellipse_descriptor() {
    let descriptor = compute_ellipse_descriptor(&common::eros()).unwrap();

    assert_relative_eq!(descriptor.center_x, 0.08430598178646714, epsilon = 1e-9);
    assert_relative_eq!(descriptor.center_y, -0.12873696763702808, epsilon = 1e-9);
    assert_relative_eq!(descriptor.x_radius, 1.415322218615024, epsilon = 1e-9);
    assert_relative_eq!(descriptor.y_radius, 1.4392189085436726, epsilon = 1e-9);
    assert_relative_eq!(descriptor.rotation, -0.9840653130514706, epsilon = 1e-9);
}

#[test]
fn test_ellipse_descriptor_relative_to_earth() {
    let elements = common::eros();
    let earth = Vector2::new(1.0, 0.0);
    let descriptor = compute_ellipse_descriptor_from(&elements, earth).unwrap();
    let base = compute_ellipse_descriptor(&elements).unwrap();

    assert_relative_eq!(descriptor.center_x, base.center_x - 1.0, epsilon = 1e-12);
    assert_relative_eq!(descriptor.center_y, base.center_y, epsilon = 1e-12);
    assert_relative_eq!(descriptor.rotation, base.rotation, epsilon = 1e-12);
}

#[test]
fn test_out_of_domain_elements() {
    assert!(OrbitalElements::new(1.0, 1.0, 0.0, 0.0, 0.0).is_err());

    let mut hyperbolic = common::eros();
    hyperbolic.eccentricity = 1.5;
    assert!(compute_orbit_points(&hyperbolic).is_err());
    assert!(compute_ellipse_descriptor(&hyperbolic).is_err());
}

#[test]
fn test_elements_helper() {
    let eros = common::eros();
    common::assert_elements_close(&eros, &eros.clone(), 0.0);
}
