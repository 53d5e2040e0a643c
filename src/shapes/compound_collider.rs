use crate::models::{Basis, Box3D, Transform};
use crate::shapes::{ColliderShape, ColliderTypeData};
use crate::utils::{
    add_vectors, dot_product, PhysicsError, Vector3, COMPOUND_COLLIDER_MAX_CHILD_COUNT, ZERO_VECTOR,
};

/// One convex piece of a compound collider, placed relative to the parent body origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundChild {
    pub collider: ColliderTypeData,
    pub parent_offset: Vector3,
}

impl CompoundChild {
    pub fn new(collider: ColliderTypeData, parent_offset: Vector3) -> Self {
        Self { collider, parent_offset }
    }
}

/// Up to four convex children that move with one rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundCollider {
    children: Vec<CompoundChild>,
}

impl CompoundCollider {
    pub fn new(children: Vec<CompoundChild>) -> Result<Self, PhysicsError> {
        if children.is_empty() {
            return Err(PhysicsError::EmptyCollider);
        }
        if children.len() > COMPOUND_COLLIDER_MAX_CHILD_COUNT {
            return Err(PhysicsError::TooManyChildren {
                max: COMPOUND_COLLIDER_MAX_CHILD_COUNT,
                found: children.len(),
            });
        }
        if children.iter().any(|child| !child.collider.shape.is_convex()) {
            return Err(PhysicsError::CalculationError(
                "compound children must be convex shapes".to_string()
            ));
        }

        Ok(Self { children })
    }

    pub fn children(&self) -> &[CompoundChild] {
        &self.children
    }

    /// World position of a child given the parent body position and rotation basis.
    pub fn child_position(&self, index: usize, parent_position: Vector3, basis: &Basis) -> Vector3 {
        let offset = self.children.get(index).map_or(ZERO_VECTOR, |child| child.parent_offset);
        add_vectors(parent_position, basis.rotate(offset))
    }

    pub fn child_transform(&self, index: usize, parent: &Transform) -> Transform {
        let offset = self.children.get(index).map_or(ZERO_VECTOR, |child| child.parent_offset);
        Transform {
            position: add_vectors(parent.position, parent.rotation.rotate_point(offset)),
            ..*parent
        }
    }

    /// Support of the child reaching furthest along `direction`; the child keeps its own ids.
    pub fn support(&self, basis: &Basis, direction: Vector3) -> (Vector3, u32) {
        let mut best = (ZERO_VECTOR, 0);
        let mut best_distance = f64::NEG_INFINITY;

        for child in &self.children {
            let (local, id) = child.collider.minkowski_support(basis, direction);
            let point = add_vectors(local, basis.rotate(child.parent_offset));
            let distance = dot_product(point, direction);

            if distance > best_distance {
                best_distance = distance;
                best = (point, id);
            }
        }

        best
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        let child_mass = mass / self.children.len() as f64;
        self.children.iter().map(|child| child.collider.moment_of_inertia(child_mass)).sum()
    }

    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let mut result: Option<Box3D> = None;

        for index in 0..self.children.len() {
            let child_box = self.children[index].collider.bounding_box(&self.child_transform(index, transform));
            result = Some(match result {
                Some(current) => current.union(&child_box),
                None => child_box,
            });
        }

        result.unwrap_or_else(|| Box3D::from_point(transform.position))
    }
}

impl ColliderShape {
    /// Shapes that can be used directly with GJK.
    pub fn is_convex(&self) -> bool {
        !matches!(self, ColliderShape::None | ColliderShape::Compound(_) | ColliderShape::Mesh(_))
    }
}
