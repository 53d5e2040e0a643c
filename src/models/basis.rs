use crate::models::Quaternion;
use crate::utils::{add_scaled, cross_product, dot_product, scale_vector, Vector3, RIGHT, UP};

/// The three local axes of a rotation, expressed in world space.
///
/// Shape support functions work against a basis so the quaternion is only expanded once
/// per body per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub x: Vector3,
    pub y: Vector3,
    pub z: Vector3,
}

impl Default for Basis {
    fn default() -> Self {
        Basis::identity()
    }
}

impl Basis {
    pub fn identity() -> Self {
        Self { x: (1.0, 0.0, 0.0), y: (0.0, 1.0, 0.0), z: (0.0, 0.0, 1.0) }
    }

    pub fn from_quaternion(rotation: &Quaternion) -> Self {
        let x = rotation.rotate_point(RIGHT);
        let y = rotation.rotate_point(UP);
        Self { x, y, z: cross_product(x, y) }
    }

    /// Local to world.
    pub fn rotate(&self, input: Vector3) -> Vector3 {
        let output = scale_vector(self.x, input.0);
        let output = add_scaled(output, self.y, input.1);
        add_scaled(output, self.z, input.2)
    }

    /// World to local.
    pub fn unrotate(&self, input: Vector3) -> Vector3 {
        (dot_product(self.x, input), dot_product(self.y, input), dot_product(self.z, input))
    }
}
