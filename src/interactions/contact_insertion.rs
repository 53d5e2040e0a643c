use crate::interactions::EpaResult;
use crate::models::ObjectHandle;
use crate::utils::{cross_product, normalize_vector, perpendicular_vector, Vector3, MAX_CONTACTS_PER_MANIFOLD, RIGHT, UP, ZERO_VECTOR};

/// One side of a contact manifold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactShape {
    /// Static level quad, by index into the scene's quad list. Has no body.
    StaticQuad(usize),
    /// A registered object. `part` tells compound children and mesh quads apart and is zero
    /// for plain shapes.
    Object { handle: ObjectHandle, part: u16 },
}

impl ContactShape {
    pub fn object(handle: ObjectHandle) -> Self {
        ContactShape::Object { handle, part: 0 }
    }

    pub fn handle(&self) -> Option<ObjectHandle> {
        match self {
            ContactShape::StaticQuad(_) => None,
            ContactShape::Object { handle, .. } => Some(*handle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub id: u32,
    /// Contact on A relative to A's center of mass, in A's local frame.
    pub contact_a_local: Vector3,
    pub contact_b_local: Vector3,
    /// Contact on A relative to A's center of mass, in world orientation.
    pub contact_a_world: Vector3,
    pub contact_b_world: Vector3,
    /// Negative while the shapes overlap.
    pub penetration: f64,
    /// Accumulated impulses, kept between ticks for warm starting.
    pub normal_impulse: f64,
    pub tangent_impulse: [f64; 2],
    /// Restitution plus baumgarte.
    pub bias: f64,
    pub normal_mass: f64,
    pub tangent_mass: [f64; 2],
}

impl Default for ContactPoint {
    fn default() -> Self {
        Self {
            id: 0,
            contact_a_local: ZERO_VECTOR,
            contact_b_local: ZERO_VECTOR,
            contact_a_world: ZERO_VECTOR,
            contact_b_world: ZERO_VECTOR,
            penetration: 0.0,
            normal_impulse: 0.0,
            tangent_impulse: [0.0; 2],
            bias: 0.0,
            normal_mass: 0.0,
            tangent_mass: [0.0; 2],
        }
    }
}

impl ContactPoint {
    fn reset_solver_state(&mut self) {
        self.normal_impulse = 0.0;
        self.tangent_impulse = [0.0; 2];
        self.bias = 0.0;
        self.normal_mass = 0.0;
        self.tangent_mass = [0.0; 2];
    }
}

/// Up to eight contact points between one ordered pair of shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub contacts: [ContactPoint; MAX_CONTACTS_PER_MANIFOLD],
    pub contact_count: usize,
    pub tangent_vectors: [Vector3; 2],
    /// From A to B.
    pub normal: Vector3,
    pub restitution: f64,
    pub friction: f64,
    pub shape_a: ContactShape,
    pub shape_b: ContactShape,
}

impl ContactManifold {
    pub fn new(shape_a: ContactShape, shape_b: ContactShape) -> Self {
        Self {
            contacts: [ContactPoint::default(); MAX_CONTACTS_PER_MANIFOLD],
            contact_count: 0,
            tangent_vectors: [RIGHT, (0.0, 0.0, 1.0)],
            normal: UP,
            restitution: 0.0,
            friction: 0.0,
            shape_a,
            shape_b,
        }
    }

    pub fn points(&self) -> &[ContactPoint] {
        &self.contacts[..self.contact_count]
    }

    pub fn points_mut(&mut self) -> &mut [ContactPoint] {
        &mut self.contacts[..self.contact_count]
    }

    pub fn is_empty(&self) -> bool {
        self.contact_count == 0
    }

    /// True when this manifold is for `a` and `b`, in either order.
    pub fn connects(&self, a: ContactShape, b: ContactShape) -> bool {
        (self.shape_a == a && self.shape_b == b) || (self.shape_a == b && self.shape_b == a)
    }

    pub fn involves(&self, handle: ObjectHandle) -> bool {
        self.shape_a.handle() == Some(handle) || self.shape_b.handle() == Some(handle)
    }

    /// Removes the point at `index`, keeping the rest in order.
    pub fn remove_point(&mut self, index: usize) {
        if index >= self.contact_count {
            return;
        }
        self.contacts.copy_within(index + 1..self.contact_count, index);
        self.contact_count -= 1;
    }

    pub fn set_material(&mut self, friction: f64, restitution: f64) {
        self.friction = friction;
        self.restitution = restitution;
    }
}

/// Adds an EPA result to `manifold`.
///
/// A point with the same feature id is updated in place and keeps its accumulated impulses.
/// A full manifold replaces its shallowest point, unless an existing point already covers
/// every feature of the new one and more, in which case the new point is dropped.
pub fn contact_insert(manifold: &mut ContactManifold, result: &EpaResult) {
    let mut should_replace = true;
    let mut replacement_index = 0;
    let mut largest_penetration = f64::NEG_INFINITY;

    let mut insert_index = 0;
    while insert_index < manifold.contact_count {
        let existing = &manifold.contacts[insert_index];

        if existing.id == result.id {
            break;
        }

        if existing.penetration > largest_penetration {
            replacement_index = insert_index;
            largest_penetration = existing.penetration;
        }

        if (existing.id & result.id) == result.id && existing.id > result.id {
            should_replace = false;
        }

        insert_index += 1;
    }

    manifold.normal = result.normal;
    manifold.tangent_vectors[0] = normalize_vector(perpendicular_vector(result.normal));
    manifold.tangent_vectors[1] = cross_product(result.normal, manifold.tangent_vectors[0]);

    if insert_index == MAX_CONTACTS_PER_MANIFOLD {
        if !should_replace {
            return;
        }
        insert_index = replacement_index;
    } else {
        should_replace = false;
    }

    let point = &mut manifold.contacts[insert_index];
    point.id = result.id;
    point.contact_a_local = result.contact_a;
    point.contact_b_local = result.contact_b;
    point.contact_a_world = result.contact_a;
    point.contact_b_world = result.contact_b;
    point.penetration = result.penetration;

    if insert_index == manifold.contact_count {
        // a fresh slot may hold state from a removed point
        point.reset_solver_state();
        manifold.contact_count += 1;
    }

    if should_replace {
        point.reset_solver_state();
    }
}
