use crate::utils::{add_scaled, dot_product, normalize_vector, Vector3};

/// Plane `dot(normal, p) + d = 0`; `normal` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub d: f64,
}

impl Plane {
    pub fn from_normal_and_point(normal: Vector3, point: Vector3) -> Self {
        let normal = normalize_vector(normal);
        Self { normal, d: -dot_product(normal, point) }
    }

    /// Signed distance, positive on the side the normal points to.
    pub fn point_distance(&self, point: Vector3) -> f64 {
        dot_product(self.normal, point) + self.d
    }

    pub fn project_point(&self, point: Vector3) -> Vector3 {
        add_scaled(point, self.normal, -self.point_distance(point))
    }

    /// Distance along the ray to the plane, if the ray is not parallel to it.
    pub fn ray_intersection(&self, origin: Vector3, direction: Vector3) -> Option<f64> {
        let normal_dot = dot_product(self.normal, direction);
        if normal_dot.abs() < 1e-12 {
            return None;
        }
        Some(-self.point_distance(origin) / normal_dot)
    }
}
