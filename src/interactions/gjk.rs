use log::trace;
use crate::models::Simplex;
use crate::utils::{
    cross_product, dot_product, is_zero_vector, magnitude_squared, negate_vector,
    perpendicular_vector, subtract_vectors, triple_product, Vector3, GJK_DEGENERATE_DIRECTION,
    MAX_GJK_ITERATIONS, RIGHT,
};

/// Anything that can report its furthest point along a direction.
///
/// Returns the point and a feature id: two support points with the same id come from the
/// same feature (vertex, edge or face) of the shape.
pub trait MinkowskiSupport {
    fn support(&self, direction: Vector3) -> (Vector3, u32);
}

/// Packs the feature ids of both shapes into one contact id.
pub fn combine_contact_ids(id_a: u32, id_b: u32) -> u32 {
    ((id_a & 0xFFFF) << 16) | (id_b & 0xFFFF)
}

fn add_support_point<A, B>(simplex: &mut Simplex, a: &A, b: &B, direction: Vector3) -> Option<Vector3>
where
    A: MinkowskiSupport + ?Sized,
    B: MinkowskiSupport + ?Sized,
{
    let (point_a, id_a) = a.support(direction);
    let (point_b, id_b) = b.support(negate_vector(direction));
    simplex.add_point(point_a, point_b, combine_contact_ids(id_a, id_b))
}

/// Direction perpendicular to the segment `a -> b` pointing towards the origin.
fn edge_direction(ab: Vector3, ao: Vector3) -> Vector3 {
    let direction = triple_product(ab, ao, ab);

    if magnitude_squared(direction) <= GJK_DEGENERATE_DIRECTION {
        // origin sits on the line through the edge
        perpendicular_vector(ab)
    } else {
        direction
    }
}

/// Reduces the simplex to the feature closest to the origin and picks the next search
/// direction. Returns true once the simplex encloses the origin.
fn simplex_check(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
    match simplex.size() {
        2 => {
            let a = simplex.points[1].point;
            let b = simplex.points[0].point;
            *direction = edge_direction(subtract_vectors(b, a), negate_vector(a));
            false
        }
        3 => {
            let a = simplex.points[2].point;
            let b = simplex.points[1].point;
            let c = simplex.points[0].point;

            let ab = subtract_vectors(b, a);
            let ac = subtract_vectors(c, a);
            let ao = negate_vector(a);
            let normal = cross_product(ab, ac);

            if dot_product(cross_product(ab, normal), ao) > 0.0 {
                // origin is outside edge ab
                simplex.move_point(0, 1);
                simplex.move_point(1, 2);
                simplex.truncate(2);
                *direction = edge_direction(ab, ao);
            } else if dot_product(cross_product(normal, ac), ao) > 0.0 {
                // origin is outside edge ac
                simplex.move_point(1, 2);
                simplex.truncate(2);
                *direction = edge_direction(ac, ao);
            } else if dot_product(normal, ao) > 0.0 {
                *direction = normal;
            } else {
                // keep the winding so the triangle normal faces the origin
                simplex.swap_points(0, 1);
                *direction = negate_vector(normal);
            }

            false
        }
        4 => {
            let last = simplex.points[3].point;
            let ao = negate_vector(last);

            let mut normals = [(0.0, 0.0, 0.0); 3];
            let mut front_count = 0;
            let mut last_front = 0;
            let mut last_behind = 0;

            for i in 0..3 {
                let current = simplex.points[i].point;
                let next = simplex.points[(i + 1) % 3].point;
                normals[i] = cross_product(subtract_vectors(last, current), subtract_vectors(next, current));

                if dot_product(ao, normals[i]) > 0.0 {
                    front_count += 1;
                    last_front = i;
                } else {
                    last_behind = i;
                }
            }

            match front_count {
                0 => true,
                1 => {
                    match last_front {
                        0 => {}
                        1 => {
                            simplex.move_point(0, 1);
                            simplex.move_point(1, 2);
                        }
                        _ => {
                            simplex.move_point(1, 0);
                            simplex.move_point(0, 2);
                        }
                    }
                    simplex.move_point(2, 3);
                    simplex.truncate(3);
                    *direction = normals[last_front];
                    false
                }
                2 => {
                    match last_behind {
                        0 => simplex.move_point(0, 2),
                        2 => simplex.move_point(0, 1),
                        _ => {}
                    }
                    simplex.move_point(1, 3);
                    simplex.truncate(2);

                    let a = simplex.points[1].point;
                    let b = simplex.points[0].point;
                    *direction = edge_direction(subtract_vectors(b, a), ao);
                    false
                }
                _ => {
                    // in front of every face, only the newest point matters
                    simplex.move_point(0, 3);
                    simplex.truncate(1);
                    *direction = ao;
                    false
                }
            }
        }
        _ => false,
    }
}

/// GJK overlap test between two convex supports.
///
/// On success `simplex` holds a tetrahedron enclosing the origin, ready for EPA. Gives up
/// (reports no overlap) after [`MAX_GJK_ITERATIONS`] refinements.
pub fn gjk_check_for_overlap<A, B>(simplex: &mut Simplex, a: &A, b: &B, first_direction: Vector3) -> bool
where
    A: MinkowskiSupport + ?Sized,
    B: MinkowskiSupport + ?Sized,
{
    *simplex = Simplex::new();

    let first_direction = if is_zero_vector(first_direction) { RIGHT } else { first_direction };

    let Some(first_point) = add_support_point(simplex, a, b, first_direction) else {
        return false;
    };

    if dot_product(first_point, first_direction) < 0.0 {
        return false;
    }

    let mut direction = if is_zero_vector(first_point) {
        negate_vector(first_direction)
    } else {
        negate_vector(first_point)
    };

    for iteration in 0..MAX_GJK_ITERATIONS {
        let (point_a, id_a) = a.support(direction);
        let (point_b, id_b) = b.support(negate_vector(direction));

        if dot_product(subtract_vectors(point_a, point_b), direction) <= 0.0 {
            return false;
        }

        if simplex.add_point(point_a, point_b, combine_contact_ids(id_a, id_b)).is_none() {
            return false;
        }

        if simplex_check(simplex, &mut direction) {
            trace!("gjk found an overlap after {} iterations", iteration + 1);
            return true;
        }
    }

    false
}
