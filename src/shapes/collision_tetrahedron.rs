use crate::models::{Basis, Box3D, Transform};
use crate::utils::{add_scaled, dot_product, scale_vector, PhysicsError, Vector3};

/// Tetrahedron with a top vertex at `+y`, a bottom back vertex at `(0, -y, -z)` and two bottom
/// front vertices at `(±x, -y, z)`, all scaled by `dimensions`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionTetrahedron {
    pub dimensions: Vector3,
}

impl CollisionTetrahedron {
    pub fn new(dimensions: Vector3) -> Result<Self, PhysicsError> {
        if !(dimensions.0 > 0.0 && dimensions.1 > 0.0 && dimensions.2 > 0.0) {
            return Err(PhysicsError::InvalidDimension(format!("tetrahedron dimensions {:?}", dimensions)));
        }
        Ok(Self { dimensions })
    }

    /// The four corners in local space: top, bottom back, bottom front right, bottom front left.
    pub fn local_vertices(&self) -> [Vector3; 4] {
        let (x, y, z) = self.dimensions;
        [(0.0, y, 0.0), (0.0, -y, -z), (x, -y, z), (-x, -y, z)]
    }

    pub fn support(&self, basis: &Basis, direction: Vector3) -> (Vector3, u32) {
        let (x, y, z) = self.dimensions;
        let bottom = scale_vector(basis.y, -y);

        let bottom_back = add_scaled(bottom, basis.z, -z);
        let x_dir = dot_product(basis.x, direction) > 0.0;
        let bottom_front = add_scaled(add_scaled(bottom, basis.z, z), basis.x, if x_dir { x } else { -x });

        let back_distance = dot_product(direction, bottom_back);
        let front_distance = dot_product(direction, bottom_front);

        let (best_bottom, best_bottom_distance, bottom_is_back) = if back_distance > front_distance {
            (bottom_back, back_distance, true)
        } else {
            (bottom_front, front_distance, false)
        };

        let top = scale_vector(basis.y, y);
        if dot_product(direction, top) > best_bottom_distance {
            // top vertex touches every face but the bottom
            return (top, 0x7);
        }

        if bottom_is_back {
            (best_bottom, 0xE)
        } else {
            (best_bottom, 0x9 | if x_dir { 0x2 } else { 0x4 })
        }
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        let height = 2.0 * self.dimensions.1;
        let half_width = self.dimensions.0;
        let half_depth = self.dimensions.2;

        let side_len_sqrd = height * height + (half_width * half_width).max(half_depth * half_depth);
        mass * side_len_sqrd * (1.0 / 20.0)
    }

    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let half_size = transform.rotation.rotated_bounding_box_size(self.dimensions);
        Box3D::from_center_half_size(transform.position, half_size)
    }
}
