use crate::utils::{
    add_vectors, max_components, min_components, scale_vector, subtract_vectors, Vector3,
};

/// World aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3D {
    pub min: Vector3,
    pub max: Vector3,
}

impl Box3D {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_size(center: Vector3, half_size: Vector3) -> Self {
        Self {
            min: subtract_vectors(center, half_size),
            max: add_vectors(center, half_size),
        }
    }

    pub fn from_point(point: Vector3) -> Self {
        Self { min: point, max: point }
    }

    pub fn has_overlap(&self, other: &Box3D) -> bool {
        self.min.0 <= other.max.0 && self.max.0 >= other.min.0 &&
            self.min.1 <= other.max.1 && self.max.1 >= other.min.1 &&
            self.min.2 <= other.max.2 && self.max.2 >= other.min.2
    }

    pub fn contains_point(&self, point: Vector3) -> bool {
        point.0 >= self.min.0 && point.0 <= self.max.0 &&
            point.1 >= self.min.1 && point.1 <= self.max.1 &&
            point.2 >= self.min.2 && point.2 <= self.max.2
    }

    pub fn union(&self, other: &Box3D) -> Box3D {
        Box3D {
            min: min_components(self.min, other.min),
            max: max_components(self.max, other.max),
        }
    }

    pub fn union_point(&self, point: Vector3) -> Box3D {
        Box3D {
            min: min_components(self.min, point),
            max: max_components(self.max, point),
        }
    }

    /// Grows the box to cover its own translation by `offset`.
    pub fn extend_direction(&self, offset: Vector3) -> Box3D {
        self.union(&Box3D {
            min: add_vectors(self.min, offset),
            max: add_vectors(self.max, offset),
        })
    }

    /// Corner of the box furthest along `direction`.
    pub fn support_point(&self, direction: Vector3) -> Vector3 {
        (
            if direction.0 > 0.0 { self.max.0 } else { self.min.0 },
            if direction.1 > 0.0 { self.max.1 } else { self.min.1 },
            if direction.2 > 0.0 { self.max.2 } else { self.min.2 },
        )
    }

    pub fn center(&self) -> Vector3 {
        scale_vector(add_vectors(self.min, self.max), 0.5)
    }

    pub fn half_size(&self) -> Vector3 {
        scale_vector(subtract_vectors(self.max, self.min), 0.5)
    }
}
