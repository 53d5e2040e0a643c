use approx::assert_abs_diff_eq;
use crate::utils::*;

#[test]
fn test_triple_product_points_towards_third_vector_side() {
    // (ab x ao) x ab should be perpendicular to ab and lean towards ao
    let ab = (1.0, 0.0, 0.0);
    let ao = (-0.5, 1.0, 0.0);
    let direction = triple_product(ab, ao, ab);

    assert_abs_diff_eq!(dot_product(direction, ab), 0.0, epsilon = 1e-12);
    assert!(dot_product(direction, ao) > 0.0, "Direction {:?} should face {:?}", direction, ao);
}

#[test]
fn test_triple_product_matches_explicit_crosses() {
    let a = (0.3, -1.2, 2.0);
    let b = (4.0, 0.5, -0.7);
    let c = (-1.0, 2.5, 0.25);
    let explicit = cross_product(cross_product(a, b), c);
    let fast = triple_product(a, b, c);

    assert_abs_diff_eq!(explicit.0, fast.0, epsilon = 1e-10);
    assert_abs_diff_eq!(explicit.1, fast.1, epsilon = 1e-10);
    assert_abs_diff_eq!(explicit.2, fast.2, epsilon = 1e-10);
}

#[test]
fn test_perpendicular_vector_is_perpendicular() {
    for v in [(1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 1.0), (2.0, -3.0, 0.5)] {
        let perp = perpendicular_vector(v);
        assert_abs_diff_eq!(dot_product(perp, v), 0.0, epsilon = 1e-12);
        assert!(magnitude_squared(perp) > 0.0, "Perpendicular of {:?} should not vanish", v);
    }
}

#[test]
fn test_normalize_zero_vector_falls_back_to_right() {
    assert_eq!(normalize_vector(ZERO_VECTOR), RIGHT);
    let n = normalize_vector((0.0, 3.0, 4.0));
    assert_abs_diff_eq!(vector_magnitude(n), 1.0, epsilon = 1e-12);
}

#[test]
fn test_default_config_is_valid() {
    let config = SimulationConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.idle_sleep_frames(), 15);

    let broken = SimulationConfig::new(Some(0.0), None, None, None);
    assert_eq!(broken.validate(), Err(PhysicsError::InvalidTime));
}
