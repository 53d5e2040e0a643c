use log::{debug, trace, warn};
use slotmap::SlotMap;
use crate::interactions::{raycast_quad, ContactSolver, RaycastHit};
use crate::models::{CollisionLayers, ObjectHandle, Portal, PortalTable, Ray, Transform};
use crate::scene::{objects_overlap, CollisionObject, NarrowPhase, TriggerEvent, World};
use crate::shapes::QuadCollider;
use crate::utils::{magnitude_squared, subtract_vectors, PhysicsError, SimulationConfig, Vector3, MAX_TRACKED_ROOMS};

/// What a ray hit inside one room.
enum RoomHit {
    Surface(RaycastHit),
    Doorway { at: Vector3, distance: f64, next_room: usize },
}

/// Owns all static level geometry, the registered objects, the portals and the contact
/// solver, and advances them one fixed step at a time.
#[derive(Debug)]
pub struct CollisionScene {
    config: SimulationConfig,
    world: World,
    quads: Vec<QuadCollider>,
    objects: SlotMap<ObjectHandle, CollisionObject>,
    /// Registration order; pairs are tested in this order every tick.
    dynamic_objects: Vec<ObjectHandle>,
    portals: PortalTable,
    contact_solver: ContactSolver,
    trigger_events: Vec<TriggerEvent>,
}

impl CollisionScene {
    pub fn new(config: SimulationConfig) -> Result<Self, PhysicsError> {
        config.validate()?;

        Ok(Self {
            config,
            world: World::new(),
            quads: Vec::new(),
            objects: SlotMap::with_capacity_and_key(config.dynamic_object_capacity),
            dynamic_objects: Vec::with_capacity(config.dynamic_object_capacity),
            portals: PortalTable::new(),
            contact_solver: ContactSolver::new(config.manifold_capacity),
            trigger_events: Vec::new(),
        })
    }

    /// Starts from a prepared set of rooms and doorways.
    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn quads(&self) -> &[QuadCollider] {
        &self.quads
    }

    pub fn portals(&self) -> &PortalTable {
        &self.portals
    }

    pub fn contact_solver(&self) -> &ContactSolver {
        &self.contact_solver
    }

    /// Trigger overlaps found during the last [`CollisionScene::update_dynamics`].
    pub fn trigger_events(&self) -> &[TriggerEvent] {
        &self.trigger_events
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&CollisionObject> {
        self.objects.get(handle)
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut CollisionObject> {
        self.objects.get_mut(handle)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &CollisionObject)> {
        self.dynamic_objects.iter().filter_map(|handle| self.objects.get(*handle).map(|object| (*handle, object)))
    }

    pub fn dynamic_object_count(&self) -> usize {
        self.dynamic_objects.len()
    }

    /// Adds a piece of level geometry, optionally owned by a room. Returns its quad index.
    pub fn add_static_quad(&mut self, quad: QuadCollider, room: Option<usize>) -> Result<usize, PhysicsError> {
        self.world.check_room(room)?;

        let index = self.quads.len();
        self.quads.push(quad);

        if let Some(room) = room {
            self.world.rooms[room].quad_indices.push(index);
        }

        Ok(index)
    }

    pub fn add_dynamic_object(&mut self, mut object: CollisionObject) -> Result<ObjectHandle, PhysicsError> {
        let capacity = self.config.dynamic_object_capacity;
        if self.dynamic_objects.len() >= capacity {
            warn!("collision scene full, rejecting object at {:?}", object.position());
            return Err(PhysicsError::SceneFull { capacity });
        }

        self.world.check_room(object.body.current_room)?;

        object.update_bounding_box();
        object.doorway_sides = self.world.check_doorway_sides(object.position(), object.body.current_room);

        let handle = self.objects.insert(object);
        self.dynamic_objects.push(handle);
        Ok(handle)
    }

    /// Unregisters an object and frees every manifold it was part of.
    pub fn remove_dynamic_object(&mut self, handle: ObjectHandle) -> Result<CollisionObject, PhysicsError> {
        let object = self.objects.remove(handle).ok_or(PhysicsError::UnknownObject)?;
        self.dynamic_objects.retain(|current| *current != handle);
        self.contact_solver.remove_object(handle);
        self.trigger_events.retain(|event| event.trigger != handle && event.other.handle() != Some(handle));
        Ok(object)
    }

    /// Opens portal `index` and drops contacts lying on it so bodies can fall through.
    pub fn open_portal(&mut self, index: usize, portal: Portal) -> Result<(), PhysicsError> {
        self.world.check_room(portal.room)?;
        self.portals.open(index, portal)?;
        self.contact_solver.check_portal_contacts(&portal, &self.objects);
        debug!("portal {} opened at {:?}", index, portal.transform.position);
        Ok(())
    }

    pub fn close_portal(&mut self, index: usize) -> Result<Option<Portal>, PhysicsError> {
        self.portals.close(index)
    }

    /// GJK overlap between two registered objects.
    pub fn overlap(&self, a: ObjectHandle, b: ObjectHandle, hint: Vector3) -> Result<bool, PhysicsError> {
        let object_a = self.objects.get(a).ok_or(PhysicsError::UnknownObject)?;
        let object_b = self.objects.get(b).ok_or(PhysicsError::UnknownObject)?;
        Ok(objects_overlap(object_a, object_b, hint))
    }

    /// Quads a body in `room` collides with: the room's own quads, or every quad when the
    /// body is not in a known room.
    fn room_quads(&self, room: Option<usize>) -> Vec<usize> {
        match room.and_then(|room| self.world.room(room)) {
            Some(room) => room.quad_indices.clone(),
            None => (0..self.quads.len()).collect(),
        }
    }

    /// Advances the scene by one fixed step.
    ///
    /// Stale contacts are purged first, then every active object is collided with the static
    /// quads of its room and with the other objects. The solver runs, bodies integrate and
    /// pass through portals and doorways, and finally bounding boxes are refreshed.
    pub fn update_dynamics(&mut self) {
        self.trigger_events.clear();
        self.contact_solver.remove_unused_contacts(&self.objects);

        self.collide_static_quads();
        self.collide_object_pairs();

        self.contact_solver.solve(&mut self.objects, &self.config);

        self.integrate();
    }

    fn collide_static_quads(&mut self) {
        let swept_threshold_sqrd = self.config.swept_distance_threshold * self.config.swept_distance_threshold;

        for index in 0..self.dynamic_objects.len() {
            let handle = self.dynamic_objects[index];

            let (room, moved) = match self.objects.get(handle) {
                Some(object) if object.should_generate_contacts() => (
                    object.body.current_room,
                    magnitude_squared(subtract_vectors(object.position(), object.prev_position)) > swept_threshold_sqrd,
                ),
                _ => continue,
            };

            let quad_indices = self.room_quads(room);

            let Some(object) = self.objects.get_mut(handle) else {
                continue;
            };

            let mut narrow_phase = NarrowPhase {
                solver: &mut self.contact_solver,
                portals: &self.portals,
                trigger_events: &mut self.trigger_events,
            };

            for quad_index in quad_indices {
                let quad = &self.quads[quad_index];

                if moved {
                    narrow_phase.collide_with_quad_swept(handle, object, quad_index, quad);
                } else {
                    narrow_phase.collide_with_quad(handle, object, quad_index, quad);
                }
            }
        }
    }

    fn collide_object_pairs(&mut self) {
        let count = self.dynamic_objects.len();

        for i in 0..count {
            for j in (i + 1)..count {
                let handle_a = self.dynamic_objects[i];
                let handle_b = self.dynamic_objects[j];

                let Some([a, b]) = self.objects.get_disjoint_mut([handle_a, handle_b]) else {
                    continue;
                };

                if !a.should_generate_contacts() && !b.should_generate_contacts() {
                    continue;
                }

                let mut narrow_phase = NarrowPhase {
                    solver: &mut self.contact_solver,
                    portals: &self.portals,
                    trigger_events: &mut self.trigger_events,
                };

                if narrow_phase.collide_objects(handle_a, a, handle_b, b) {
                    for object in [a, b] {
                        if object.body.is_sleeping() {
                            object.body.wake(&self.config);
                        }
                    }
                }
            }
        }
    }

    fn integrate(&mut self) {
        for handle in &self.dynamic_objects {
            let Some(object) = self.objects.get_mut(*handle) else {
                continue;
            };

            if object.is_active() {
                object.prev_position = object.position();
                let room = object.body.current_room;
                let sides = self.world.check_doorway_sides(object.position(), room);

                object.body.update(&self.config);

                if object.body.check_portals(&self.portals, &self.config) != 0 {
                    // the jump through the portal is not a motion to sweep
                    object.prev_position = object.position();
                } else {
                    let new_room = self.world.check_doorway_crossings(object.position(), room, sides);
                    if new_room != room {
                        trace!("object moved from room {:?} to {:?}", room, new_room);
                        object.body.current_room = new_room;
                    }
                }
            } else {
                if object.body.is_sleeping() {
                    // contacts keep pushing on sleeping bodies; none of it may carry over
                    object.body.velocity = (0.0, 0.0, 0.0);
                    object.body.angular_velocity = (0.0, 0.0, 0.0);
                }
                object.prev_position = object.position();
            }

            object.doorway_sides = self.world.check_doorway_sides(object.position(), object.body.current_room);
            object.update_bounding_box();
        }
    }

    /// Casts a ray starting in `room`, following it through open doorways and portals.
    ///
    /// Only quads and objects whose layers intersect `layer_mask` are hit. The returned
    /// distance is the total length travelled, and `passed_rooms` has a bit for every room
    /// the ray crossed.
    pub fn raycast(&self, room: Option<usize>, ray: Ray, layer_mask: CollisionLayers, max_distance: f64) -> Option<RaycastHit> {
        let mut ray = ray;
        let mut room = room;
        let mut remaining = max_distance;
        let mut travelled = 0.0;
        let mut passed_rooms = 0u64;
        let mut portals_passed = 0;
        let mut through_portal: Option<Transform> = None;

        // every doorway hop enters a new room; a ray bouncing between portals is capped
        let max_steps = self.world.rooms.len() + self.config.max_portal_passes as usize + 1;

        for _ in 0..max_steps {
            if let Some(room) = room {
                if room < MAX_TRACKED_ROOMS {
                    passed_rooms |= 1 << room;
                } else {
                    warn!("room {} does not fit the passed-rooms mask", room);
                }
            }

            match self.raycast_room(room, &ray, layer_mask, remaining)? {
                RoomHit::Doorway { at, distance, next_room } => {
                    travelled += distance;
                    remaining -= distance;
                    ray.origin = at;
                    room = Some(next_room);
                }
                RoomHit::Surface(mut hit) => {
                    let portal_index = if portals_passed < self.config.max_portal_passes {
                        self.portals.touched_portal(hit.at)
                    } else {
                        None
                    };

                    let portal = portal_index.and_then(|index| {
                        let transform = self.portals.portal_transform(index)?;
                        let exit_room = self.portals.get(1 - index)?.room;
                        Some((transform, exit_room))
                    });

                    let Some((transform, exit_room)) = portal else {
                        hit.distance += travelled;
                        hit.room = room;
                        hit.passed_rooms = passed_rooms;
                        hit.portals_passed = portals_passed;
                        hit.through_portal = through_portal;
                        return Some(hit);
                    };

                    trace!("ray passed through a portal at {:?}", hit.at);
                    travelled += hit.distance;
                    remaining -= hit.distance;
                    ray = Ray { origin: transform.transform_point(hit.at), dir: transform.rotate_vector(ray.dir) };
                    through_portal = Some(match through_portal {
                        Some(previous) => transform.concat(&previous),
                        None => transform,
                    });
                    portals_passed += 1;
                    room = exit_room;
                }
            }
        }

        None
    }

    /// Nearest hit inside one room: its static quads, its open doorways and the objects in it.
    fn raycast_room(&self, room: Option<usize>, ray: &Ray, layer_mask: CollisionLayers, max_distance: f64) -> Option<RoomHit> {
        let mut best: Option<RoomHit> = None;
        let mut limit = max_distance;

        for quad_index in self.room_quads(room) {
            let quad = &self.quads[quad_index];
            if !quad.collision_layers.intersects(layer_mask) {
                continue;
            }

            if let Some(mut hit) = raycast_quad(&quad.quad, ray, limit) {
                limit = hit.distance;
                hit.quad_index = Some(quad_index);
                best = Some(RoomHit::Surface(hit));
            }
        }

        for (handle, object) in self.objects() {
            if object.is_trigger || !object.collision_layers.intersects(layer_mask) {
                continue;
            }

            let in_room = room.is_none() || object.body.current_room.is_none() || object.body.current_room == room;
            if !in_room {
                continue;
            }

            if let Some(mut hit) = object.collider.raycast(&object.body.transform, &object.body.rotation_basis, ray, limit) {
                limit = hit.distance;
                hit.object = Some(handle);
                best = Some(RoomHit::Surface(hit));
            }
        }

        if let Some(current) = room.and_then(|room| self.world.room(room).map(|data| (room, data))) {
            let (room_index, room_data) = current;

            for doorway_index in &room_data.doorway_indices {
                let doorway = &self.world.doorways[*doorway_index];
                if !doorway.open {
                    continue;
                }

                if let Some(hit) = raycast_quad(&doorway.quad, ray, limit) {
                    limit = hit.distance;
                    best = Some(RoomHit::Doorway {
                        at: hit.at,
                        distance: hit.distance,
                        next_room: doorway.other_room(room_index),
                    });
                }
            }
        }

        best
    }

    /// Furthest a ray can travel inside the rooms it passed, for clipping long rays.
    pub fn max_distance_in_direction(&self, ray: &Ray, room_mask: u64) -> f64 {
        self.world.max_distance_in_direction(ray, room_mask)
    }
}
