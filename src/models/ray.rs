use crate::models::Transform;
use crate::utils::{add_scaled, dot_product, normalize_vector, subtract_vectors, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    /// Unit direction.
    pub dir: Vector3,
}

impl Ray {
    /// Builds a ray, normalizing `direction`.
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, dir: normalize_vector(direction) }
    }

    pub fn at(&self, distance: f64) -> Vector3 {
        add_scaled(self.origin, self.dir, distance)
    }

    /// Distance along the ray of the projection of `point`.
    pub fn determine_distance(&self, point: Vector3) -> f64 {
        dot_product(subtract_vectors(point, self.origin), self.dir)
    }

    pub fn transform(&self, transform: &Transform) -> Ray {
        Ray {
            origin: transform.transform_point(self.origin),
            dir: transform.rotate_vector(self.dir),
        }
    }
}
