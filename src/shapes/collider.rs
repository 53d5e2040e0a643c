use crate::interactions::{
    raycast_box, raycast_capsule, raycast_cylinder, raycast_quad, raycast_sphere,
    raycast_tetrahedron, MinkowskiSupport, RaycastHit,
};
use crate::models::{Basis, Box3D, Ray, Transform};
use crate::shapes::{
    CollisionBox, CollisionCapsule, CollisionCylinder, CollisionQuad, CollisionSphere,
    CollisionTetrahedron, CompoundCollider, MeshCollider,
};
use crate::utils::{distance_squared, vector_magnitude, Vector3, ZERO_VECTOR};

/// Discriminant of [`ColliderShape`], handy for logging and dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionShapeType {
    None,
    Box,
    Quad,
    Sphere,
    Capsule,
    Cylinder,
    Tetrahedron,
    Compound,
    Mesh,
}

/// Every collider shape the narrow phase understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    /// Placeholder that never collides.
    None,
    Box(CollisionBox),
    Quad(CollisionQuad),
    Sphere(CollisionSphere),
    Capsule(CollisionCapsule),
    Cylinder(CollisionCylinder),
    Tetrahedron(CollisionTetrahedron),
    Compound(CompoundCollider),
    Mesh(MeshCollider),
}

/// Shape plus the surface material used when it touches something.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderTypeData {
    pub shape: ColliderShape,
    pub bounce: f64,
    pub friction: f64,
}

impl ColliderTypeData {
    pub fn new(shape: ColliderShape, bounce: f64, friction: f64) -> Self {
        Self { shape, bounce, friction }
    }

    pub fn shape_type(&self) -> CollisionShapeType {
        match &self.shape {
            ColliderShape::None => CollisionShapeType::None,
            ColliderShape::Box(_) => CollisionShapeType::Box,
            ColliderShape::Quad(_) => CollisionShapeType::Quad,
            ColliderShape::Sphere(_) => CollisionShapeType::Sphere,
            ColliderShape::Capsule(_) => CollisionShapeType::Capsule,
            ColliderShape::Cylinder(_) => CollisionShapeType::Cylinder,
            ColliderShape::Tetrahedron(_) => CollisionShapeType::Tetrahedron,
            ColliderShape::Compound(_) => CollisionShapeType::Compound,
            ColliderShape::Mesh(_) => CollisionShapeType::Mesh,
        }
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        match &self.shape {
            ColliderShape::None | ColliderShape::Mesh(_) => 1.0,
            ColliderShape::Box(shape) => shape.moment_of_inertia(mass),
            ColliderShape::Quad(shape) => shape.moment_of_inertia(mass),
            ColliderShape::Sphere(shape) => shape.moment_of_inertia(mass),
            ColliderShape::Capsule(shape) => shape.moment_of_inertia(mass),
            ColliderShape::Cylinder(shape) => shape.moment_of_inertia(mass),
            ColliderShape::Tetrahedron(shape) => shape.moment_of_inertia(mass),
            ColliderShape::Compound(shape) => shape.moment_of_inertia(mass),
        }
    }

    /// World aligned box around the shape placed at `transform`.
    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        match &self.shape {
            ColliderShape::None => Box3D::from_point(transform.position),
            ColliderShape::Box(shape) => shape.bounding_box(transform),
            ColliderShape::Quad(shape) => shape.bounding_box(transform),
            ColliderShape::Sphere(shape) => shape.bounding_box(transform),
            ColliderShape::Capsule(shape) => shape.bounding_box(transform),
            ColliderShape::Cylinder(shape) => shape.bounding_box(transform),
            ColliderShape::Tetrahedron(shape) => shape.bounding_box(transform),
            ColliderShape::Compound(shape) => shape.bounding_box(transform),
            ColliderShape::Mesh(shape) => shape.bounding_box(transform),
        }
    }

    /// Furthest point along `direction` relative to the body origin, plus its feature id.
    ///
    /// Meshes are not convex and answer with the origin; they are collided quad by quad.
    pub fn minkowski_support(&self, basis: &Basis, direction: Vector3) -> (Vector3, u32) {
        match &self.shape {
            ColliderShape::None | ColliderShape::Mesh(_) => (ZERO_VECTOR, 0),
            ColliderShape::Box(shape) => shape.support(basis, direction),
            ColliderShape::Quad(shape) => {
                let (local, id) = shape.support(basis.unrotate(direction));
                (basis.rotate(local), id)
            }
            ColliderShape::Sphere(shape) => shape.support(direction),
            ColliderShape::Capsule(shape) => shape.support(basis, direction),
            ColliderShape::Cylinder(shape) => shape.support(basis, direction),
            ColliderShape::Tetrahedron(shape) => shape.support(basis, direction),
            ColliderShape::Compound(shape) => shape.support(basis, direction),
        }
    }

    /// Casts `ray` against the shape placed at `transform`. The returned hit carries the
    /// world point, the surface normal facing the ray and the distance from the ray origin.
    pub fn raycast(&self, transform: &Transform, basis: &Basis, ray: &Ray, max_distance: f64) -> Option<RaycastHit> {
        match &self.shape {
            ColliderShape::None => None,
            ColliderShape::Box(shape) => raycast_box(shape, transform, basis, ray, max_distance),
            ColliderShape::Quad(shape) => {
                let transform = transform.rigid();
                let local_ray = ray.transform(&transform.inverse());
                let hit = raycast_quad(shape, &local_ray, max_distance)?;
                Some(hit.transformed(&transform))
            }
            ColliderShape::Sphere(shape) => raycast_sphere(shape, transform.position, ray, max_distance),
            ColliderShape::Capsule(shape) => raycast_capsule(shape, transform.position, basis, ray, max_distance),
            ColliderShape::Cylinder(shape) => raycast_cylinder(shape, transform, basis, ray, max_distance),
            ColliderShape::Tetrahedron(shape) => raycast_tetrahedron(shape, transform.position, basis, ray, max_distance),
            ColliderShape::Compound(shape) => raycast_compound(shape, transform, basis, ray, max_distance),
            ColliderShape::Mesh(shape) => raycast_mesh(shape, transform, ray, max_distance),
        }
    }
}

fn raycast_compound(
    compound: &CompoundCollider,
    transform: &Transform,
    basis: &Basis,
    ray: &Ray,
    max_distance: f64,
) -> Option<RaycastHit> {
    let bounds = compound.bounding_box(transform);
    let radius = vector_magnitude(bounds.half_size());
    let center_distance = ray.determine_distance(bounds.center());
    let closest = ray.at(center_distance);
    let offset = distance_squared(closest, bounds.center());

    if offset > radius * radius || center_distance + radius < 0.0 {
        return None;
    }

    let mut best: Option<RaycastHit> = None;

    for index in 0..compound.children().len() {
        let child_transform = compound.child_transform(index, transform);
        let child = &compound.children()[index];
        let limit = best.as_ref().map_or(max_distance, |hit| hit.distance);

        if let Some(hit) = child.collider.raycast(&child_transform, basis, ray, limit) {
            if best.as_ref().map_or(true, |current| hit.distance < current.distance) {
                best = Some(hit);
            }
        }
    }

    best
}

fn raycast_mesh(mesh: &MeshCollider, transform: &Transform, ray: &Ray, max_distance: f64) -> Option<RaycastHit> {
    // meshes are rigid, a scaled body transform is ignored
    let transform = transform.rigid();
    let local_ray = ray.transform(&transform.inverse());

    let center_distance = local_ray.determine_distance(mesh.local_center);
    let closest = local_ray.at(center_distance);
    let offset = distance_squared(closest, mesh.local_center);
    let radius = mesh.radius_from_center;

    if offset > radius * radius || center_distance + radius < 0.0 {
        return None;
    }

    let mut best: Option<(usize, RaycastHit)> = None;

    for (index, child) in mesh.children().iter().enumerate() {
        let limit = best.as_ref().map_or(max_distance, |(_, hit)| hit.distance);

        if let Some(hit) = raycast_quad(&child.quad, &local_ray, limit) {
            best = Some((index, hit));
        }
    }

    best.map(|(index, hit)| {
        let mut hit = hit.transformed(&transform);
        hit.quad_index = Some(index);
        hit
    })
}
