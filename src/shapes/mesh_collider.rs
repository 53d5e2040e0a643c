use crate::models::{Box3D, Transform};
use crate::shapes::QuadCollider;
use crate::utils::{vector_magnitude, PhysicsError, Vector3};

/// Static-shaped collection of quads that moves as one (kinematic) body.
///
/// Quads are stored in the mesh's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCollider {
    children: Vec<QuadCollider>,
    pub local_center: Vector3,
    pub local_half_bounding_box: Vector3,
    pub radius_from_center: f64,
}

impl MeshCollider {
    pub fn new(children: Vec<QuadCollider>) -> Result<Self, PhysicsError> {
        let mut bounds = children
            .iter()
            .map(QuadCollider::bounding_box)
            .reduce(|a, b| a.union(&b))
            .ok_or(PhysicsError::EmptyCollider)?;

        // keep a little depth on flat meshes so the box never degenerates
        bounds = bounds.union(&Box3D::from_center_half_size(bounds.center(), (0.001, 0.001, 0.001)));

        let local_half_bounding_box = bounds.half_size();

        Ok(Self {
            children,
            local_center: bounds.center(),
            local_half_bounding_box,
            radius_from_center: vector_magnitude(local_half_bounding_box),
        })
    }

    pub fn children(&self) -> &[QuadCollider] {
        &self.children
    }

    /// Meshes are meant to be kinematic, so any value works.
    pub fn moment_of_inertia(&self, _mass: f64) -> f64 {
        1.0
    }

    /// Scale on `transform` is ignored, as it is for mesh collision and raycasts.
    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let transform = transform.rigid();
        let half_size = transform.rotation.rotated_bounding_box_size(self.local_half_bounding_box);
        Box3D::from_center_half_size(transform.transform_point(self.local_center), half_size)
    }
}
