use crate::models::{Basis, ObjectHandle, Ray, Transform};
use crate::shapes::{CollisionBox, CollisionCapsule, CollisionCylinder, CollisionQuad, CollisionSphere, CollisionTetrahedron};
use crate::utils::{
    add_scaled, add_vectors, cross_product, distance_squared, dot_product, magnitude_squared,
    negate_vector, normalize_vector, project_onto_plane, subtract_vectors, vector_component,
    with_component, Vector3, MIN_RAY_LENGTH, NEAR_DOT_ZERO, NEAR_EDGE_ZERO, ZERO_VECTOR,
};

/// Where a ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub at: Vector3,
    /// Surface normal, facing back towards the ray.
    pub normal: Vector3,
    /// Total distance travelled, including any portal or doorway hops.
    pub distance: f64,
    pub object: Option<ObjectHandle>,
    /// Static quad index, or the quad of a mesh collider that was hit.
    pub quad_index: Option<usize>,
    pub room: Option<usize>,
    /// Portal transform the ray went through before hitting, if any.
    pub through_portal: Option<Transform>,
    /// Bit `i` is set when the ray travelled through room `i`.
    pub passed_rooms: u64,
    pub portals_passed: u32,
}

impl RaycastHit {
    pub fn new(at: Vector3, normal: Vector3, distance: f64) -> Self {
        Self {
            at,
            normal,
            distance,
            object: None,
            quad_index: None,
            room: None,
            through_portal: None,
            passed_rooms: 0,
            portals_passed: 0,
        }
    }

    /// Moves a hit computed in a local frame into the frame of `transform`.
    pub fn transformed(mut self, transform: &Transform) -> Self {
        self.at = transform.transform_point(self.at);
        self.normal = normalize_vector(transform.rotate_vector(self.normal));
        self
    }
}

/// Distance along `ray` to a sphere's surface. The center must be ahead of the ray origin,
/// but the surface point may be behind it so spheres sitting in a portal are still hit.
pub fn ray_sphere_distance(center: Vector3, radius: f64, ray: &Ray, max_distance: f64) -> Option<f64> {
    let hyp = subtract_vectors(center, ray.origin);

    let distance = dot_product(hyp, ray.dir);
    if distance < 0.0 || distance - radius > max_distance {
        return None;
    }

    let norm_dist = magnitude_squared(hyp) - distance * distance;
    if norm_dist > radius * radius {
        return None;
    }

    let distance = distance - (radius * radius - norm_dist).sqrt();
    if distance > max_distance {
        return None;
    }

    Some(distance)
}

/// Ray against a quad given in the same frame as the ray.
pub fn raycast_quad(quad: &CollisionQuad, ray: &Ray, max_distance: f64) -> Option<RaycastHit> {
    let normal_dot = dot_product(ray.dir, quad.plane.normal);

    if normal_dot.abs() < NEAR_DOT_ZERO {
        return None;
    }

    let distance = -(dot_product(ray.origin, quad.plane.normal) + quad.plane.d) / normal_dot;

    if distance < MIN_RAY_LENGTH || distance > max_distance {
        return None;
    }

    let at = ray.at(distance);

    if quad.determine_edges(at) != 0 {
        return None;
    }

    let normal = if normal_dot > 0.0 { negate_vector(quad.plane.normal) } else { quad.plane.normal };

    Some(RaycastHit::new(at, normal, distance))
}

pub fn raycast_sphere(sphere: &CollisionSphere, center: Vector3, ray: &Ray, max_distance: f64) -> Option<RaycastHit> {
    let distance = ray_sphere_distance(center, sphere.radius, ray, max_distance)?;
    let at = ray.at(distance);
    Some(RaycastHit::new(at, normalize_vector(subtract_vectors(at, center)), distance))
}

fn local_ray(position: Vector3, basis: &Basis, ray: &Ray) -> Ray {
    Ray {
        origin: basis.unrotate(subtract_vectors(ray.origin, position)),
        dir: basis.unrotate(ray.dir),
    }
}

/// Slab test against each face pair of the box in its local frame.
pub fn raycast_box(shape: &CollisionBox, transform: &Transform, basis: &Basis, ray: &Ray, max_distance: f64) -> Option<RaycastHit> {
    let position = transform.position;
    let half = shape.half_extents;

    let distance = ray.determine_distance(position);
    if distance < 0.0 {
        return None;
    }

    if distance_squared(position, ray.at(distance)) > magnitude_squared(half) {
        return None;
    }

    let local = local_ray(position, basis, ray);
    let mut best: Option<(Vector3, Vector3, f64)> = None;

    for axis in 0..3 {
        let dir = vector_component(local.dir, axis);

        if dir.abs() < NEAR_DOT_ZERO {
            continue;
        }

        let origin = vector_component(local.origin, axis);
        let half_extent = vector_component(half, axis);
        let hit_distance = if dir > 0.0 {
            -(origin + half_extent) / dir
        } else {
            -(origin - half_extent) / dir
        };

        let limit = best.map_or(max_distance, |(_, _, distance)| distance);
        if hit_distance < MIN_RAY_LENGTH || hit_distance > limit {
            continue;
        }

        let at = local.at(hit_distance);
        if at.0.abs() > half.0 + NEAR_EDGE_ZERO ||
            at.1.abs() > half.1 + NEAR_EDGE_ZERO ||
            at.2.abs() > half.2 + NEAR_EDGE_ZERO {
            continue;
        }

        let normal = with_component(ZERO_VECTOR, axis, if dir < 0.0 { 1.0 } else { -1.0 });
        best = Some((at, normal, hit_distance));
    }

    let (at, normal, distance) = best?;
    Some(RaycastHit::new(add_vectors(position, basis.rotate(at)), basis.rotate(normal), distance))
}

fn capsule_cap_hit(
    capsule: &CollisionCapsule,
    position: Vector3,
    basis: &Basis,
    ray: &Ray,
    check_top: bool,
    max_distance: f64,
) -> Option<RaycastHit> {
    let center = if check_top {
        position
    } else {
        add_scaled(position, basis.y, -capsule.extend_downward)
    };

    let distance = ray_sphere_distance(center, capsule.radius, ray, max_distance)?;
    Some(RaycastHit::new(ray.at(distance), negate_vector(ray.dir), distance))
}

/// Capsule raycast. The normal is approximated by the reversed ray direction.
pub fn raycast_capsule(
    capsule: &CollisionCapsule,
    position: Vector3,
    basis: &Basis,
    ray: &Ray,
    max_distance: f64,
) -> Option<RaycastHit> {
    let distance = ray.determine_distance(position);
    if distance < 0.0 {
        return None;
    }

    let coarse_radius = capsule.radius + capsule.extend_downward;
    if distance - coarse_radius > max_distance {
        return None;
    }

    if distance_squared(position, ray.at(distance)) > coarse_radius * coarse_radius {
        return None;
    }

    let up = basis.y;
    let ray_up_dot = dot_product(ray.dir, up);
    if ray_up_dot.abs() > 0.999 {
        // straight down the axis, only a cap can be hit first
        return capsule_cap_hit(capsule, position, basis, ray, ray_up_dot < 0.0, max_distance);
    }

    // infinite cylinder, tested as a circle in the plane perpendicular to the axis
    let ray_to_capsule = subtract_vectors(position, ray.origin);
    let flat_ray = Ray {
        origin: add_scaled(ray.origin, up, dot_product(up, ray_to_capsule)),
        dir: normalize_vector(project_onto_plane(ray.dir, up)),
    };
    let distance = ray_sphere_distance(position, capsule.radius, &flat_ray, max_distance)?;

    let at = ray.at(distance);
    let hit_height = dot_product(subtract_vectors(at, position), up);

    if hit_height > capsule.radius || hit_height < -capsule.extend_downward - capsule.radius {
        None
    } else if hit_height < 0.0 && hit_height > -capsule.extend_downward {
        Some(RaycastHit::new(at, negate_vector(ray.dir), distance))
    } else {
        capsule_cap_hit(capsule, position, basis, ray, hit_height > 0.0, max_distance)
    }
}

pub fn raycast_cylinder(
    cylinder: &CollisionCylinder,
    transform: &Transform,
    basis: &Basis,
    ray: &Ray,
    max_distance: f64,
) -> Option<RaycastHit> {
    let local = local_ray(transform.position, basis, ray);
    let radius_sqrd = cylinder.radius * cylinder.radius;
    let mut best: Option<(f64, Vector3)> = None;

    let mut consider = |distance: f64, normal: Vector3| {
        if distance < MIN_RAY_LENGTH || distance > max_distance {
            return;
        }
        if best.map_or(true, |(current, _)| distance < current) {
            best = Some((distance, normal));
        }
    };

    // side
    let a = local.dir.0 * local.dir.0 + local.dir.2 * local.dir.2;
    if a > NEAR_DOT_ZERO {
        let b = 2.0 * (local.origin.0 * local.dir.0 + local.origin.2 * local.dir.2);
        let c = local.origin.0 * local.origin.0 + local.origin.2 * local.origin.2 - radius_sqrd;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant >= 0.0 {
            let root = discriminant.sqrt();
            for distance in [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)] {
                let at = local.at(distance);
                if at.1.abs() <= cylinder.half_height {
                    consider(distance, normalize_vector((at.0, 0.0, at.2)));
                }
            }
        }
    }

    // caps
    if local.dir.1.abs() > NEAR_DOT_ZERO {
        for cap in [cylinder.half_height, -cylinder.half_height] {
            let distance = (cap - local.origin.1) / local.dir.1;
            let at = local.at(distance);
            if at.0 * at.0 + at.2 * at.2 <= radius_sqrd {
                consider(distance, (0.0, cap.signum(), 0.0));
            }
        }
    }

    let (distance, normal) = best?;
    let mut normal = basis.rotate(normal);
    if dot_product(normal, ray.dir) > 0.0 {
        // ray started inside
        normal = negate_vector(normal);
    }

    Some(RaycastHit::new(ray.at(distance), normal, distance))
}

/// Möller-Trumbore ray against triangle `abc`.
fn ray_triangle_distance(ray: &Ray, a: Vector3, b: Vector3, c: Vector3) -> Option<f64> {
    let edge_1 = subtract_vectors(b, a);
    let edge_2 = subtract_vectors(c, a);
    let p = cross_product(ray.dir, edge_2);
    let det = dot_product(edge_1, p);

    if det.abs() < NEAR_DOT_ZERO {
        return None;
    }

    let inv_det = 1.0 / det;
    let t = subtract_vectors(ray.origin, a);
    let u = dot_product(t, p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = cross_product(t, edge_1);
    let v = dot_product(ray.dir, q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some(dot_product(edge_2, q) * inv_det)
}

pub fn raycast_tetrahedron(
    tetrahedron: &CollisionTetrahedron,
    position: Vector3,
    basis: &Basis,
    ray: &Ray,
    max_distance: f64,
) -> Option<RaycastHit> {
    let local = local_ray(position, basis, ray);
    let vertices = tetrahedron.local_vertices();
    let faces = [[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]];

    let mut best: Option<(f64, Vector3)> = None;

    for [a, b, c] in faces {
        let (a, b, c) = (vertices[a], vertices[b], vertices[c]);

        let Some(distance) = ray_triangle_distance(&local, a, b, c) else {
            continue;
        };

        let limit = best.map_or(max_distance, |(current, _)| current);
        if distance < MIN_RAY_LENGTH || distance > limit {
            continue;
        }

        let mut normal = normalize_vector(cross_product(subtract_vectors(b, a), subtract_vectors(c, a)));
        if dot_product(normal, local.dir) > 0.0 {
            normal = negate_vector(normal);
        }
        best = Some((distance, normal));
    }

    let (distance, normal) = best?;
    Some(RaycastHit::new(ray.at(distance), basis.rotate(normal), distance))
}
