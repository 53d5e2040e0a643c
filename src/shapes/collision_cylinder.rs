use crate::models::{Basis, Box3D, Transform};
use crate::shapes::unit_circle::{circle_feature_id, UNIT_CIRCLE};
use crate::utils::{add_scaled, dot_product, scale_vector, PhysicsError, Vector3};

const TOP_CAP_ID: u32 = 0x100;
const BOTTOM_CAP_ID: u32 = 0x200;

/// Cylinder around the local y axis, approximated by an octagonal prism for collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionCylinder {
    pub radius: f64,
    pub half_height: f64,
}

impl CollisionCylinder {
    pub fn new(radius: f64, half_height: f64) -> Result<Self, PhysicsError> {
        if !(radius > 0.0) || !(half_height >= 0.0) {
            return Err(PhysicsError::InvalidDimension(
                format!("cylinder radius {} half height {}", radius, half_height)
            ));
        }
        Ok(Self { radius, half_height })
    }

    pub fn support(&self, basis: &Basis, direction: Vector3) -> (Vector3, u32) {
        let horizontal = (dot_product(basis.x, direction), dot_product(basis.z, direction));

        // first strictly better point wins, so ties resolve in ring order
        let mut circle_index = 0;
        let mut best_dot = f64::NEG_INFINITY;
        for (index, point) in UNIT_CIRCLE.iter().enumerate() {
            let point_dot = point.0 * horizontal.0 + point.1 * horizontal.1;
            if point_dot > best_dot {
                best_dot = point_dot;
                circle_index = index;
            }
        }

        let circle = UNIT_CIRCLE[circle_index];
        let mut output = scale_vector(basis.x, circle.0 * self.radius);
        output = add_scaled(output, basis.z, circle.1 * self.radius);

        let mut id = circle_feature_id(circle_index);

        if dot_product(basis.y, direction) >= 0.0 {
            output = add_scaled(output, basis.y, self.half_height);
            id |= TOP_CAP_ID;
        } else {
            output = add_scaled(output, basis.y, -self.half_height);
            id |= BOTTOM_CAP_ID;
        }

        (output, id)
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        let height = 2.0 * self.half_height;
        mass * (3.0 * self.radius * self.radius + height * height) / 12.0
    }

    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let half_size = transform.rotation.rotated_bounding_box_size((self.radius, self.half_height, self.radius));
        Box3D::from_center_half_size(transform.position, half_size)
    }
}
