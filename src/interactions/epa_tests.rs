use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::interactions::{epa_solve, epa_solve_swept, gjk_check_for_overlap, EpaResult};
use crate::models::{Basis, Simplex};
use crate::scene::{ObjectSupport, SweptObjectSupport};
use crate::shapes::{ColliderShape, ColliderTypeData, CollisionBox, CollisionQuad, CollisionSphere};
use crate::utils::ZERO_VECTOR;

fn box_collider(half: f64) -> ColliderTypeData {
    ColliderTypeData::new(ColliderShape::Box(CollisionBox::new((half, half, half)).unwrap()), 0.0, 0.5)
}

fn floor() -> CollisionQuad {
    CollisionQuad::new((-2.0, 0.0, -2.0), (0.0, 0.0, 4.0), (4.0, 0.0, 0.0), 0.0).unwrap()
}

#[test]
fn test_box_box_penetration() {
    let shape = box_collider(1.0);
    let a = ObjectSupport { collider: &shape, basis: Basis::identity(), position: ZERO_VECTOR };
    let b = ObjectSupport { collider: &shape, basis: Basis::identity(), position: (1.5, 0.3, 0.2) };

    let mut simplex = Simplex::new();
    assert!(gjk_check_for_overlap(&mut simplex, &a, &b, (1.5, 0.3, 0.2)));

    let result = epa_solve(&simplex, &a, &b);

    assert_abs_diff_eq!(result.depth(), 0.5, epsilon = 1e-3);
    assert!(result.normal.0 > 0.999, "Normal should point from A to B: {:?}", result.normal);
    assert_abs_diff_eq!(result.contact_a.0, 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(result.contact_b.0, 0.5, epsilon = 1e-3);
}

#[test]
fn test_axis_aligned_boxes_without_hint() {
    let shape = box_collider(1.0);
    let a = ObjectSupport { collider: &shape, basis: Basis::identity(), position: ZERO_VECTOR };
    let b = ObjectSupport { collider: &shape, basis: Basis::identity(), position: (1.5, 0.0, 0.0) };

    let mut simplex = Simplex::new();
    assert!(gjk_check_for_overlap(&mut simplex, &a, &b, ZERO_VECTOR));

    let result = epa_solve(&simplex, &a, &b);

    assert_abs_diff_eq!(result.depth(), 0.5, epsilon = 1e-3);
    assert_abs_diff_eq!(result.normal.0, 1.0, epsilon = 1e-3);
}

fn axis(v: (f64, f64, f64), i: usize) -> f64 {
    match i {
        0 => v.0,
        1 => v.1,
        _ => v.2,
    }
}

#[test]
fn test_box_depth_matches_separating_axis() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..300 {
        let half_a = rng.random_range(0.2..1.5);
        let half_b = rng.random_range(0.2..1.5);
        let reach = half_a + half_b - 0.05;
        let offset = (
            rng.random_range(-reach..reach),
            rng.random_range(-reach..reach),
            rng.random_range(-reach..reach),
        );

        let shape_a = box_collider(half_a);
        let shape_b = box_collider(half_b);
        let a = ObjectSupport { collider: &shape_a, basis: Basis::identity(), position: ZERO_VECTOR };
        let b = ObjectSupport { collider: &shape_b, basis: Basis::identity(), position: offset };

        let mut simplex = Simplex::new();
        assert!(gjk_check_for_overlap(&mut simplex, &a, &b, offset), "Boxes at {:?} should overlap", offset);

        let mut margins: Vec<(f64, usize)> = (0..3)
            .map(|i| (half_a + half_b - axis(offset, i).abs(), i))
            .collect();
        margins.sort_by(|x, y| x.0.total_cmp(&y.0));
        let (expected, best_axis) = margins[0];

        let result = epa_solve(&simplex, &a, &b);

        assert_abs_diff_eq!(result.depth(), expected, epsilon = 2e-3);
        if margins[1].0 - expected > 1e-2 {
            let along = axis(result.normal, best_axis) * axis(offset, best_axis).signum();
            assert!(along > 0.99, "Normal {:?} should follow axis {} for offset {:?}", result.normal, best_axis, offset);
        }
    }
}

#[test]
fn test_sphere_on_quad_penetration() {
    let quad = floor();
    let sphere = ColliderTypeData::new(ColliderShape::Sphere(CollisionSphere::new(1.0).unwrap()), 0.0, 0.5);
    let support = ObjectSupport { collider: &sphere, basis: Basis::identity(), position: (0.0, 0.5, 0.0) };

    let mut simplex = Simplex::new();
    assert!(gjk_check_for_overlap(&mut simplex, &quad, &support, quad.normal()));

    let result = epa_solve(&simplex, &quad, &support);

    assert_abs_diff_eq!(result.depth(), 0.5, epsilon = 2e-2);
    assert!(result.normal.1 > 0.98, "Normal should leave the floor: {:?}", result.normal);
    assert!(result.penetration < 0.0);
}

#[test]
fn test_swept_box_stops_on_floor() {
    let quad = floor();
    let shape = box_collider(0.25);
    let support = SweptObjectSupport {
        object: ObjectSupport { collider: &shape, basis: Basis::identity(), position: (0.1, -0.5, 0.2) },
        prev_position: (0.1, 3.0, 0.2),
    };

    let mut simplex = Simplex::new();
    assert!(gjk_check_for_overlap(&mut simplex, &quad, &support, quad.normal()));

    let mut end = support.object.position;
    let result = epa_solve_swept(&simplex, &quad, &support, support.prev_position, &mut end)
        .expect("Box moving through the floor should produce a hit");

    assert_abs_diff_eq!(end.1, 0.25, epsilon = 1e-2);
    assert_abs_diff_eq!(end.0, 0.1, epsilon = 1e-9);
    assert!(result.normal.1 > 0.99, "Normal {:?}", result.normal);
    assert_eq!(result.penetration, 0.0);
    assert_eq!(result.contact_a, result.contact_b);
}

#[test]
fn test_swept_without_motion_is_none() {
    let quad = floor();
    let shape = box_collider(0.25);
    let support = SweptObjectSupport {
        object: ObjectSupport { collider: &shape, basis: Basis::identity(), position: (0.1, 0.1, 0.2) },
        prev_position: (0.1, 0.1, 0.2),
    };

    let mut simplex = Simplex::new();
    assert!(gjk_check_for_overlap(&mut simplex, &quad, &support, quad.normal()));

    let mut end = support.object.position;
    assert!(epa_solve_swept(&simplex, &quad, &support, support.prev_position, &mut end).is_none());
    assert_eq!(end, support.object.position);
}

#[test]
fn test_swap_exchanges_sides() {
    let mut result = EpaResult {
        contact_a: (1.0, 0.0, 0.0),
        contact_b: (0.5, 0.0, 0.0),
        normal: (1.0, 0.0, 0.0),
        penetration: -0.5,
        id: 3,
    };

    result.swap();

    assert_eq!(result.contact_a, (0.5, 0.0, 0.0));
    assert_eq!(result.contact_b, (1.0, 0.0, 0.0));
    assert_eq!(result.normal, (-1.0, 0.0, 0.0));
    assert_abs_diff_eq!(result.depth(), 0.5);
}
