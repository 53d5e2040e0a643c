use crate::models::{Box3D, Transform};
use crate::utils::{magnitude_squared, scale_vector, PhysicsError, Vector3, RIGHT};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSphere {
    pub radius: f64,
}

impl CollisionSphere {
    pub fn new(radius: f64) -> Result<Self, PhysicsError> {
        if !(radius > 0.0) {
            return Err(PhysicsError::InvalidDimension(format!("sphere radius {}", radius)));
        }
        Ok(Self { radius })
    }

    /// A sphere has one feature, so every support point shares id 1.
    pub fn support(&self, direction: Vector3) -> (Vector3, u32) {
        let mag_sqrd = magnitude_squared(direction);

        if mag_sqrd == 0.0 {
            return (scale_vector(RIGHT, self.radius), 1);
        }

        (scale_vector(direction, self.radius / mag_sqrd.sqrt()), 1)
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        (2.0 / 5.0) * mass * self.radius * self.radius
    }

    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        Box3D::from_center_half_size(transform.position, (self.radius, self.radius, self.radius))
    }
}
