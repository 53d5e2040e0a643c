use std::rc::Rc;
use slotmap::SlotMap;
use crate::interactions::{ContactShape, MinkowskiSupport, SolverBodies};
use crate::models::{Basis, Box3D, CollisionLayers, ObjectHandle, RigidBody, Transform};
use crate::shapes::{ColliderShape, ColliderTypeData, CompoundChild};
use crate::utils::{add_vectors, dot_product, subtract_vectors, PhysicsError, SimulationConfig, Vector3};

/// A collider bound to the rigid body that moves it.
///
/// The body is owned here; gameplay code reads and writes it through the scene accessors.
#[derive(Debug, Clone)]
pub struct CollisionObject {
    pub collider: Rc<ColliderTypeData>,
    pub body: RigidBody,
    pub bounding_box: Box3D,
    pub collision_layers: CollisionLayers,
    /// Triggers report overlaps instead of producing contacts.
    pub is_trigger: bool,
    /// Body position at the start of the last step, used for swept collisions.
    pub prev_position: Vector3,
    /// Side of every doorway of the current room the body was on before integrating.
    pub doorway_sides: u32,
}

impl CollisionObject {
    /// Builds a dynamic body sized for `collider`. Mesh colliders become kinematic.
    pub fn new(
        collider: Rc<ColliderTypeData>,
        mass: f64,
        collision_layers: CollisionLayers,
        config: &SimulationConfig,
    ) -> Result<Self, PhysicsError> {
        if matches!(collider.shape, ColliderShape::None) {
            return Err(PhysicsError::CalculationError("Collision object needs a shape".to_string()));
        }

        let mut body = RigidBody::new(mass, collider.moment_of_inertia(mass), config)?;
        if matches!(collider.shape, ColliderShape::Mesh(_)) {
            body.mark_kinematic();
        }

        let bounding_box = collider.bounding_box(&body.transform);
        let prev_position = body.transform.position;

        Ok(Self {
            collider,
            body,
            bounding_box,
            collision_layers,
            is_trigger: false,
            prev_position,
            doorway_sides: 0,
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.body.set_transform(transform);
        self.prev_position = transform.position;
        self.update_bounding_box();
        self
    }

    pub fn with_room(mut self, room: Option<usize>) -> Self {
        self.body.current_room = room;
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn position(&self) -> Vector3 {
        self.body.transform.position
    }

    /// Awake and simulated by the integrator.
    pub fn is_active(&self) -> bool {
        !self.body.is_kinematic() && !self.body.is_sleeping()
    }

    /// Whether this object searches for contacts itself. Sleeping and kinematic objects only
    /// get contacts when an active object runs into them.
    pub fn should_generate_contacts(&self) -> bool {
        self.is_active()
    }

    pub fn update_bounding_box(&mut self) {
        self.bounding_box = self.collider.bounding_box(&self.body.transform);
    }

    /// Bounding box covering both the previous and the current position.
    pub fn swept_bounding_box(&self) -> Box3D {
        let offset = subtract_vectors(self.prev_position, self.body.transform.position);
        self.bounding_box.extend_direction(offset)
    }

    /// The convex pieces GJK runs against: the collider itself, or each compound child.
    /// Meshes yield nothing here and are handled quad by quad.
    pub fn parts(&self) -> impl Iterator<Item = ColliderPart<'_>> + '_ {
        let position = self.body.transform.position;
        let basis = self.body.rotation_basis;

        let single = if self.collider.shape.is_convex() {
            Some(ColliderPart { index: 0, collider: self.collider.as_ref(), position })
        } else {
            None
        };

        let children: &[CompoundChild] = match &self.collider.shape {
            ColliderShape::Compound(compound) => compound.children(),
            _ => &[],
        };

        single.into_iter().chain(children.iter().enumerate().map(move |(index, child)| ColliderPart {
            index: index as u16,
            collider: &child.collider,
            position: add_vectors(position, basis.rotate(child.parent_offset)),
        }))
    }
}

/// One convex piece of a collision object, placed in world space.
#[derive(Debug, Clone, Copy)]
pub struct ColliderPart<'a> {
    pub index: u16,
    pub collider: &'a ColliderTypeData,
    pub position: Vector3,
}

impl<'a> ColliderPart<'a> {
    pub fn support(&self, basis: Basis) -> ObjectSupport<'a> {
        ObjectSupport { collider: self.collider, basis, position: self.position }
    }
}

/// Minkowski support of a convex collider at a position and orientation.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSupport<'a> {
    pub collider: &'a ColliderTypeData,
    pub basis: Basis,
    pub position: Vector3,
}

impl MinkowskiSupport for ObjectSupport<'_> {
    fn support(&self, direction: Vector3) -> (Vector3, u32) {
        let (point, id) = self.collider.minkowski_support(&self.basis, direction);
        (add_vectors(point, self.position), id)
    }
}

/// Support of a collider swept from its previous to its current position.
#[derive(Debug, Clone, Copy)]
pub struct SweptObjectSupport<'a> {
    pub object: ObjectSupport<'a>,
    pub prev_position: Vector3,
}

impl MinkowskiSupport for SweptObjectSupport<'_> {
    fn support(&self, direction: Vector3) -> (Vector3, u32) {
        let (point, id) = self.object.collider.minkowski_support(&self.object.basis, direction);

        let position = if dot_product(self.object.position, direction) > dot_product(self.prev_position, direction) {
            self.object.position
        } else {
            self.prev_position
        };

        (add_vectors(point, position), id)
    }
}

impl SolverBodies for SlotMap<ObjectHandle, CollisionObject> {
    fn body(&self, shape: ContactShape) -> Option<&RigidBody> {
        shape.handle().and_then(|handle| self.get(handle)).map(|object| &object.body)
    }

    fn bodies_mut(&mut self, a: ContactShape, b: ContactShape) -> (Option<&mut RigidBody>, Option<&mut RigidBody>) {
        match (a.handle(), b.handle()) {
            (Some(handle_a), Some(handle_b)) if handle_a != handle_b => {
                match self.get_disjoint_mut([handle_a, handle_b]) {
                    Some([object_a, object_b]) => (Some(&mut object_a.body), Some(&mut object_b.body)),
                    None => (None, None),
                }
            }
            (Some(handle_a), _) => (self.get_mut(handle_a).map(|object| &mut object.body), None),
            (None, Some(handle_b)) => (None, self.get_mut(handle_b).map(|object| &mut object.body)),
            (None, None) => (None, None),
        }
    }
}
