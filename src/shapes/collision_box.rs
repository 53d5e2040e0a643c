use crate::models::{Basis, Box3D, Transform};
use crate::utils::{add_scaled, dot_product, magnitude_squared, PhysicsError, Vector3, ZERO_VECTOR};

/// Solid box given by its half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBox {
    pub half_extents: Vector3,
}

impl CollisionBox {
    pub fn new(half_extents: Vector3) -> Result<Self, PhysicsError> {
        if !(half_extents.0 >= 0.0 && half_extents.1 >= 0.0 && half_extents.2 >= 0.0) {
            return Err(PhysicsError::InvalidDimension(format!("box half extents {:?}", half_extents)));
        }
        Ok(Self { half_extents })
    }

    /// Furthest corner along `direction`, relative to the box center.
    ///
    /// Axis `i` contributes bit `2i` when the positive face is chosen and `2i + 1` for the
    /// negative face. A direction perpendicular to an axis touches both faces and sets both bits.
    pub fn support(&self, basis: &Basis, direction: Vector3) -> (Vector3, u32) {
        let axes = [(basis.x, self.half_extents.0), (basis.y, self.half_extents.1), (basis.z, self.half_extents.2)];
        let mut output = ZERO_VECTOR;
        let mut id = 0u32;

        for (axis_index, (axis, half_extent)) in axes.iter().enumerate() {
            let axis_dot = dot_product(*axis, direction);
            let positive_bit = 1 << (2 * axis_index);
            let negative_bit = 1 << (2 * axis_index + 1);

            if axis_dot > 0.0 {
                output = add_scaled(output, *axis, *half_extent);
                id |= positive_bit;
            } else if axis_dot < 0.0 {
                output = add_scaled(output, *axis, -half_extent);
                id |= negative_bit;
            } else {
                output = add_scaled(output, *axis, *half_extent);
                id |= positive_bit | negative_bit;
            }
        }

        (output, id)
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        mass * magnitude_squared(self.half_extents) * (1.0 / 6.0)
    }

    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let half_size = transform.rotation.rotated_bounding_box_size(self.half_extents);
        Box3D::from_center_half_size(transform.position, half_size)
    }
}
