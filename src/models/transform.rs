use crate::models::Quaternion;
use crate::utils::{
    add_vectors, multiply_components, negate_vector, subtract_vectors, Vector3, ZERO_VECTOR,
};

/// Position, rotation and scale. Points are scaled, then rotated, then translated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Quaternion,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: ZERO_VECTOR,
            rotation: Quaternion::identity(),
            scale: (1.0, 1.0, 1.0),
        }
    }

    /// Unscaled transform from a position and rotation.
    pub fn new(position: Vector3, rotation: Quaternion) -> Self {
        Self { position, rotation, scale: (1.0, 1.0, 1.0) }
    }

    pub fn from_position(position: Vector3) -> Self {
        Self::new(position, Quaternion::identity())
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.conjugate();
        let scale = (1.0 / self.scale.0, 1.0 / self.scale.1, 1.0 / self.scale.2);
        let position = multiply_components(rotation.rotate_point(negate_vector(self.position)), scale);

        Transform { position, rotation, scale }
    }

    /// Returns `self ∘ other`: applying the result is the same as applying `other` then `self`.
    pub fn concat(&self, other: &Transform) -> Transform {
        let rotated_offset = self.rotation.rotate_point(other.position);
        Transform {
            position: add_vectors(self.position, multiply_components(rotated_offset, self.scale)),
            rotation: self.rotation.multiply(&other.rotation).normalized(),
            scale: multiply_components(self.scale, other.scale),
        }
    }

    /// The same placement without scale.
    pub fn rigid(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    pub fn transform_point(&self, point: Vector3) -> Vector3 {
        add_vectors(self.position, self.rotation.rotate_point(multiply_components(point, self.scale)))
    }

    pub fn transform_point_inverse(&self, point: Vector3) -> Vector3 {
        let local = self.transform_point_inverse_no_scale(point);
        (local.0 / self.scale.0, local.1 / self.scale.1, local.2 / self.scale.2)
    }

    /// Moves a world point into the local frame ignoring scale (rigid-body frame).
    pub fn transform_point_inverse_no_scale(&self, point: Vector3) -> Vector3 {
        self.rotation.conjugate().rotate_point(subtract_vectors(point, self.position))
    }

    /// Rotates a direction; translation and scale do not apply.
    pub fn rotate_vector(&self, direction: Vector3) -> Vector3 {
        self.rotation.rotate_point(direction)
    }
}
