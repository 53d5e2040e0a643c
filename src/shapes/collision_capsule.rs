use crate::models::{Basis, Box3D, Transform};
use crate::shapes::unit_circle::{circle_feature_id, furthest_circle_index, UNIT_CIRCLE};
use crate::utils::{add_scaled, dot_product, magnitude_squared, scale_vector, PhysicsError, Vector3};

/// Upright capsule: a sphere of `radius` at the body origin swept `extend_downward` along -y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionCapsule {
    pub radius: f64,
    pub extend_downward: f64,
}

impl CollisionCapsule {
    pub fn new(radius: f64, extend_downward: f64) -> Result<Self, PhysicsError> {
        if !(radius > 0.0) || !(extend_downward >= 0.0) {
            return Err(PhysicsError::InvalidDimension(
                format!("capsule radius {} extend {}", radius, extend_downward)
            ));
        }
        Ok(Self { radius, extend_downward })
    }

    /// Mostly vertical directions snap to the top or bottom pole; others use the eight point
    /// ring, dropped to the lower hemisphere center when pointing down.
    pub fn support(&self, basis: &Basis, direction: Vector3) -> (Vector3, u32) {
        let direction_y = dot_product(basis.y, direction);

        if direction_y * direction_y > 0.5 * magnitude_squared(direction) {
            if direction_y > 0.0 {
                return (scale_vector(basis.y, self.radius), 0xFF);
            }
            return (scale_vector(basis.y, -self.radius - self.extend_downward), 0xFF00);
        }

        let horizontal = (dot_product(basis.x, direction), dot_product(basis.z, direction));
        let circle_index = furthest_circle_index(horizontal);
        let mut id = circle_feature_id(circle_index);

        let circle = UNIT_CIRCLE[circle_index];
        let mut output = scale_vector(basis.x, circle.0 * self.radius);
        output = add_scaled(output, basis.z, circle.1 * self.radius);

        if direction_y < 0.0 {
            output = add_scaled(output, basis.y, -self.extend_downward);
            id <<= 8;
        }

        (output, id)
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        (2.0 / 5.0) * mass * self.radius * self.radius
    }

    /// Capsules stay upright, so the box ignores rotation.
    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let position = transform.position;
        Box3D::new(
            (position.0 - self.radius, position.1 - self.radius - self.extend_downward, position.2 - self.radius),
            (position.0 + self.radius, position.1 + self.radius, position.2 + self.radius),
        )
    }
}
