use log::{debug, warn};
use slotmap::SlotMap;
use crate::interactions::{ContactManifold, ContactShape};
use crate::models::{ManifoldHandle, ObjectHandle, Portal, RigidBody};
use crate::utils::{
    add_scaled, add_vectors, cross_product, dot_product, magnitude_squared, safe_invert,
    scale_vector, subtract_vectors, SimulationConfig, Vector3, CONTACT_MOVE_TOLERANCE,
    NEGATIVE_PENETRATION_BIAS, ZERO_VECTOR,
};

/// Gives the solver access to the bodies behind the shapes of a manifold.
///
/// Static quads have no body; so does anything the implementor does not know about.
pub trait SolverBodies {
    fn body(&self, shape: ContactShape) -> Option<&RigidBody>;

    /// Both bodies at once. Implementations must return `None` for a side that refers to the
    /// same body as the other side.
    fn bodies_mut(&mut self, a: ContactShape, b: ContactShape) -> (Option<&mut RigidBody>, Option<&mut RigidBody>);
}

/// Owns every contact manifold and resolves them with sequential impulses.
#[derive(Debug, Clone)]
pub struct ContactSolver {
    manifolds: SlotMap<ManifoldHandle, ContactManifold>,
    capacity: usize,
}

impl ContactSolver {
    pub fn new(capacity: usize) -> Self {
        Self {
            manifolds: SlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    pub fn manifold(&self, handle: ManifoldHandle) -> Option<&ContactManifold> {
        self.manifolds.get(handle)
    }

    pub fn manifold_mut(&mut self, handle: ManifoldHandle) -> Option<&mut ContactManifold> {
        self.manifolds.get_mut(handle)
    }

    pub fn manifolds(&self) -> impl Iterator<Item = (ManifoldHandle, &ContactManifold)> {
        self.manifolds.iter()
    }

    /// Existing manifold between `a` and `b`, in either order.
    pub fn find_manifold(&self, a: ContactShape, b: ContactShape) -> Option<ManifoldHandle> {
        self.manifolds
            .iter()
            .find(|(_, manifold)| manifold.connects(a, b))
            .map(|(handle, _)| handle)
    }

    /// Finds the manifold for the pair or allocates one with `a` as shape A.
    ///
    /// Returns `None` when the arena is full; the contact is dropped for this tick.
    pub fn get_contact_manifold(&mut self, a: ContactShape, b: ContactShape) -> Option<ManifoldHandle> {
        if let Some(handle) = self.find_manifold(a, b) {
            return Some(handle);
        }

        if self.manifolds.len() >= self.capacity {
            warn!("contact solver full ({} manifolds), dropping contact {:?} / {:?}", self.capacity, a, b);
            return None;
        }

        Some(self.manifolds.insert(ContactManifold::new(a, b)))
    }

    /// Refreshes every contact from the current body transforms and drops the ones that
    /// separated or slid apart. Empty manifolds are freed.
    pub fn remove_unused_contacts<S: SolverBodies + ?Sized>(&mut self, bodies: &S) {
        let mut emptied = Vec::new();

        for (handle, manifold) in self.manifolds.iter_mut() {
            let body_a = bodies.body(manifold.shape_a);
            let body_b = bodies.body(manifold.shape_b);
            let normal = manifold.normal;

            let mut index = 0;
            while index < manifold.contact_count {
                let point = &mut manifold.contacts[index];

                point.contact_a_world = world_offset(body_a, point.contact_a_local);
                point.contact_b_world = world_offset(body_b, point.contact_b_local);

                let world_a = add_vectors(body_position(body_a), point.contact_a_world);
                let world_b = add_vectors(body_position(body_b), point.contact_b_world);
                let separation = subtract_vectors(world_b, world_a);

                point.penetration = dot_product(separation, normal);

                let tangent_drift = add_scaled(separation, normal, -point.penetration);
                let drifted = magnitude_squared(tangent_drift) > CONTACT_MOVE_TOLERANCE * CONTACT_MOVE_TOLERANCE;

                if point.penetration >= NEGATIVE_PENETRATION_BIAS || drifted {
                    manifold.remove_point(index);
                } else {
                    index += 1;
                }
            }

            if manifold.is_empty() {
                emptied.push(handle);
            }
        }

        for handle in emptied {
            self.manifolds.remove(handle);
        }
    }

    /// Drops contact points lying on a newly opened portal so bodies can pass through the
    /// surface behind it.
    pub fn check_portal_contacts<S: SolverBodies + ?Sized>(&mut self, portal: &Portal, bodies: &S) {
        let mut emptied = Vec::new();

        for (handle, manifold) in self.manifolds.iter_mut() {
            let position_a = body_position(bodies.body(manifold.shape_a));
            let position_b = body_position(bodies.body(manifold.shape_b));

            let mut index = 0;
            while index < manifold.contact_count {
                let point = &manifold.contacts[index];
                let on_portal = portal.is_touching(add_vectors(position_a, point.contact_a_world)) ||
                    portal.is_touching(add_vectors(position_b, point.contact_b_world));

                if on_portal {
                    debug!("removing contact {:#x} touching a new portal", point.id);
                    manifold.remove_point(index);
                } else {
                    index += 1;
                }
            }

            if manifold.is_empty() {
                emptied.push(handle);
            }
        }

        for handle in emptied {
            self.manifolds.remove(handle);
        }
    }

    /// Frees every manifold involving `handle`.
    pub fn remove_object(&mut self, handle: ObjectHandle) {
        self.manifolds.retain(|_, manifold| !manifold.involves(handle));
    }

    /// Manifolds involving `handle`.
    pub fn manifolds_for(&self, handle: ObjectHandle) -> impl Iterator<Item = &ContactManifold> {
        self.manifolds.values().filter(move |manifold| manifold.involves(handle))
    }

    /// One pre-solve pass followed by `config.solver_iterations` impulse passes.
    pub fn solve<S: SolverBodies + ?Sized>(&mut self, bodies: &mut S, config: &SimulationConfig) {
        for manifold in self.manifolds.values_mut() {
            let (body_a, body_b) = bodies.bodies_mut(manifold.shape_a, manifold.shape_b);
            pre_solve(manifold, body_a, body_b, config);
        }

        for _ in 0..config.solver_iterations {
            for manifold in self.manifolds.values_mut() {
                let (body_a, body_b) = bodies.bodies_mut(manifold.shape_a, manifold.shape_b);
                iterate(manifold, body_a, body_b);
            }
        }
    }
}

fn body_position(body: Option<&RigidBody>) -> Vector3 {
    body.map_or(ZERO_VECTOR, |body| body.transform.position)
}

fn world_offset(body: Option<&RigidBody>, local: Vector3) -> Vector3 {
    match body {
        Some(body) => body.transform.rotation.rotate_point(local),
        None => local,
    }
}

/// Velocity of B relative to A at the contact.
fn relative_velocity(body_a: &Option<&mut RigidBody>, ra: Vector3, body_b: &Option<&mut RigidBody>, rb: Vector3) -> Vector3 {
    let velocity_b = body_b.as_ref().map_or(ZERO_VECTOR, |body| body.velocity_at_local_point(rb));
    let velocity_a = body_a.as_ref().map_or(ZERO_VECTOR, |body| body.velocity_at_local_point(ra));
    subtract_vectors(velocity_b, velocity_a)
}

/// Applies `-impulse` to A and `+impulse` to B at their contact offsets.
fn apply_impulse_pair(
    body_a: &mut Option<&mut RigidBody>,
    ra: Vector3,
    body_b: &mut Option<&mut RigidBody>,
    rb: Vector3,
    impulse: Vector3,
) {
    if let Some(body) = body_a.as_deref_mut() {
        body.velocity = add_scaled(body.velocity, impulse, -body.mass_inv);
        body.angular_velocity = add_scaled(body.angular_velocity, cross_product(ra, impulse), -body.moment_of_inertia_inv);
    }

    if let Some(body) = body_b.as_deref_mut() {
        body.velocity = add_scaled(body.velocity, impulse, body.mass_inv);
        body.angular_velocity = add_scaled(body.angular_velocity, cross_product(rb, impulse), body.moment_of_inertia_inv);
    }
}

fn pre_solve(
    manifold: &mut ContactManifold,
    mut body_a: Option<&mut RigidBody>,
    mut body_b: Option<&mut RigidBody>,
    config: &SimulationConfig,
) {
    let normal = manifold.normal;
    let tangents = manifold.tangent_vectors;
    let restitution = manifold.restitution;

    let (mass_inv_a, inertia_inv_a) = body_a.as_ref().map_or((0.0, 0.0), |b| (b.mass_inv, b.moment_of_inertia_inv));
    let (mass_inv_b, inertia_inv_b) = body_b.as_ref().map_or((0.0, 0.0), |b| (b.mass_inv, b.moment_of_inertia_inv));

    for point in manifold.points_mut() {
        point.contact_a_world = world_offset(body_a.as_deref(), point.contact_a_local);
        point.contact_b_world = world_offset(body_b.as_deref(), point.contact_b_local);
        let ra = point.contact_a_world;
        let rb = point.contact_b_world;

        // JM^-1J^T for the normal and both friction directions
        let linear = mass_inv_a + mass_inv_b;
        let normal_mass = linear +
            inertia_inv_a * magnitude_squared(cross_product(ra, normal)) +
            inertia_inv_b * magnitude_squared(cross_product(rb, normal));
        point.normal_mass = safe_invert(normal_mass);

        for (i, tangent) in tangents.iter().enumerate() {
            let tangent_mass = linear +
                inertia_inv_a * magnitude_squared(cross_product(*tangent, ra)) +
                inertia_inv_b * magnitude_squared(cross_product(*tangent, rb));
            point.tangent_mass[i] = safe_invert(tangent_mass);
        }

        point.bias = -config.baumgarte * (1.0 / config.fixed_delta_time) *
            (point.penetration + config.penetration_slop).min(0.0);

        // warm start with last tick's impulses
        let mut warm_start = scale_vector(normal, point.normal_impulse);
        if cfg!(feature = "friction") {
            warm_start = add_scaled(warm_start, tangents[0], point.tangent_impulse[0]);
            warm_start = add_scaled(warm_start, tangents[1], point.tangent_impulse[1]);
        }
        apply_impulse_pair(&mut body_a, ra, &mut body_b, rb, warm_start);

        let normal_velocity = dot_product(relative_velocity(&body_a, ra, &body_b, rb), normal);
        if normal_velocity < -config.restitution_velocity_threshold {
            point.bias += -restitution * normal_velocity;
        }
    }
}

fn iterate(manifold: &mut ContactManifold, mut body_a: Option<&mut RigidBody>, mut body_b: Option<&mut RigidBody>) {
    let normal = manifold.normal;
    let tangents = manifold.tangent_vectors;
    let friction = manifold.friction;
    let use_friction = cfg!(feature = "friction");

    for point in manifold.points_mut() {
        let ra = point.contact_a_world;
        let rb = point.contact_b_world;

        for (i, tangent) in tangents.iter().enumerate().filter(|_| use_friction) {
            let velocity = relative_velocity(&body_a, ra, &body_b, rb);
            let lambda = -dot_product(velocity, *tangent) * point.tangent_mass[i];
            let max_lambda = friction * point.normal_impulse;

            let previous = point.tangent_impulse[i];
            point.tangent_impulse[i] = (previous + lambda).max(-max_lambda).min(max_lambda);
            let lambda = point.tangent_impulse[i] - previous;

            apply_impulse_pair(&mut body_a, ra, &mut body_b, rb, scale_vector(*tangent, lambda));
        }

        let velocity = relative_velocity(&body_a, ra, &body_b, rb);
        let normal_velocity = dot_product(velocity, normal);
        let lambda = point.normal_mass * (-normal_velocity + point.bias);

        let previous = point.normal_impulse;
        point.normal_impulse = (previous + lambda).max(0.0);
        let lambda = point.normal_impulse - previous;

        apply_impulse_pair(&mut body_a, ra, &mut body_b, rb, scale_vector(normal, lambda));
    }
}
