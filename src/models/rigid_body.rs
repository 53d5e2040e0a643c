use bitflags::bitflags;
use log::debug;
use crate::models::{Basis, PortalTable, Transform};
use crate::utils::{
    add_scaled, add_vectors, cross_product, dot_product, magnitude_squared, normalize_vector,
    scale_vector, subtract_vectors, PhysicsError, SimulationConfig, Vector3,
    PORTAL_EXIT_XY_CLAMP_DISTANCE, ZERO_VECTOR,
};

bitflags! {
    /// State bits of a rigid body.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RigidBodyFlags: u32 {
        /// The body center is on the -z side of portal 0.
        const IN_FRONT_PORTAL_0 = 1 << 0;
        const IN_FRONT_PORTAL_1 = 1 << 1;
        /// Portals were closed last time they were checked.
        const PORTALS_INACTIVE = 1 << 2;
        const CROSSED_PORTAL_0 = 1 << 3;
        const CROSSED_PORTAL_1 = 1 << 4;
        const GRABBABLE = 1 << 5;
        const TOUCHING_PORTAL_A = 1 << 6;
        const TOUCHING_PORTAL_B = 1 << 7;
        const WAS_TOUCHING_PORTAL_A = 1 << 8;
        const WAS_TOUCHING_PORTAL_B = 1 << 9;
        const IS_KINEMATIC = 1 << 10;
        const IS_SLEEPING = 1 << 11;
        const IS_PLAYER = 1 << 12;
        /// The body fell through the kill plane.
        const FIZZLED = 1 << 13;
        const DISABLE_GRAVITY = 1 << 14;
    }
}

impl RigidBodyFlags {
    /// Flags rewritten by every portal check.
    pub const PORTAL_STATE: RigidBodyFlags = RigidBodyFlags::IN_FRONT_PORTAL_0
        .union(RigidBodyFlags::IN_FRONT_PORTAL_1)
        .union(RigidBodyFlags::PORTALS_INACTIVE)
        .union(RigidBodyFlags::CROSSED_PORTAL_0)
        .union(RigidBodyFlags::CROSSED_PORTAL_1)
        .union(RigidBodyFlags::TOUCHING_PORTAL_A)
        .union(RigidBodyFlags::TOUCHING_PORTAL_B)
        .union(RigidBodyFlags::WAS_TOUCHING_PORTAL_A)
        .union(RigidBodyFlags::WAS_TOUCHING_PORTAL_B);

    pub fn in_front_portal(index: usize) -> Self {
        Self::from_bits_retain(Self::IN_FRONT_PORTAL_0.bits() << index)
    }

    pub fn crossed_portal(index: usize) -> Self {
        Self::from_bits_retain(Self::CROSSED_PORTAL_0.bits() << index)
    }

    pub fn touching_portal(index: usize) -> Self {
        Self::from_bits_retain(Self::TOUCHING_PORTAL_A.bits() << index)
    }

    pub fn was_touching_portal(index: usize) -> Self {
        Self::from_bits_retain(Self::WAS_TOUCHING_PORTAL_A.bits() << index)
    }
}

/// Mass used for kinematic bodies; only its inverse (zero) enters the solver.
const KINEMATIC_MASS: f64 = 1.0e15;

/// Plain-data snapshot of everything a save file needs to restore a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyState {
    pub transform: Transform,
    pub velocity: Vector3,
    pub angular_velocity: Vector3,
    pub current_room: Option<usize>,
    pub flags: RigidBodyFlags,
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub transform: Transform,
    pub velocity: Vector3,
    pub angular_velocity: Vector3,
    /// Cached axes of `transform.rotation`.
    pub rotation_basis: Basis,
    pub mass: f64,
    pub mass_inv: f64,
    /// Scalar moment of inertia; every shape is treated as roughly isotropic.
    pub moment_of_inertia: f64,
    pub moment_of_inertia_inv: f64,
    pub flags: RigidBodyFlags,
    pub current_room: Option<usize>,
    pub sleep_frames: u32,
}

impl RigidBody {
    pub fn new(mass: f64, moment_of_inertia: f64, config: &SimulationConfig) -> Result<Self, PhysicsError> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(PhysicsError::InvalidMass);
        }
        if !(moment_of_inertia > 0.0) {
            return Err(PhysicsError::CalculationError("Moment of inertia must be positive".to_string()));
        }

        Ok(Self {
            transform: Transform::identity(),
            velocity: ZERO_VECTOR,
            angular_velocity: ZERO_VECTOR,
            rotation_basis: Basis::identity(),
            mass,
            mass_inv: 1.0 / mass,
            moment_of_inertia,
            moment_of_inertia_inv: 1.0 / moment_of_inertia,
            flags: RigidBodyFlags::empty(),
            current_room: None,
            sleep_frames: config.idle_sleep_frames(),
        })
    }

    pub fn position(&self) -> Vector3 {
        self.transform.position
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.update_basis();
    }

    pub fn update_basis(&mut self) {
        self.rotation_basis = Basis::from_quaternion(&self.transform.rotation);
    }

    pub fn is_kinematic(&self) -> bool {
        self.flags.contains(RigidBodyFlags::IS_KINEMATIC)
    }

    pub fn is_sleeping(&self) -> bool {
        self.flags.contains(RigidBodyFlags::IS_SLEEPING)
    }

    pub fn mark_kinematic(&mut self) {
        self.flags.insert(RigidBodyFlags::IS_KINEMATIC);
        self.mass = KINEMATIC_MASS;
        self.mass_inv = 0.0;
        self.moment_of_inertia = KINEMATIC_MASS;
        self.moment_of_inertia_inv = 0.0;
    }

    pub fn unmark_kinematic(&mut self, mass: f64, moment_of_inertia: f64) -> Result<(), PhysicsError> {
        if !(mass > 0.0) {
            return Err(PhysicsError::InvalidMass);
        }
        if !(moment_of_inertia > 0.0) {
            return Err(PhysicsError::CalculationError("Moment of inertia must be positive".to_string()));
        }

        self.flags.remove(RigidBodyFlags::IS_KINEMATIC);
        self.mass = mass;
        self.mass_inv = 1.0 / mass;
        self.moment_of_inertia = moment_of_inertia;
        self.moment_of_inertia_inv = 1.0 / moment_of_inertia;
        Ok(())
    }

    pub fn wake(&mut self, config: &SimulationConfig) {
        self.flags.remove(RigidBodyFlags::IS_SLEEPING);
        self.sleep_frames = config.idle_sleep_frames();
    }

    /// Applies `impulse` at `world_point`, changing both linear and angular velocity.
    pub fn apply_impulse(&mut self, world_point: Vector3, impulse: Vector3) {
        let offset = subtract_vectors(world_point, self.transform.position);
        let torque = cross_product(offset, impulse);

        self.angular_velocity = add_scaled(self.angular_velocity, torque, self.moment_of_inertia_inv);
        self.velocity = add_scaled(self.velocity, impulse, self.mass_inv);
    }

    /// Velocity of a point given relative to the center of mass, in world orientation.
    pub fn velocity_at_local_point(&self, local_point: Vector3) -> Vector3 {
        add_vectors(cross_product(self.angular_velocity, local_point), self.velocity)
    }

    pub fn velocity_at_world_point(&self, world_point: Vector3) -> Vector3 {
        self.velocity_at_local_point(subtract_vectors(world_point, self.transform.position))
    }

    /// Advances the body by one fixed step: gravity, sleep bookkeeping, integration,
    /// angular damping and the kill plane.
    pub fn update(&mut self, config: &SimulationConfig) {
        if !self.flags.contains(RigidBodyFlags::DISABLE_GRAVITY) {
            self.velocity.1 += config.gravity_step();
        }

        let threshold = config.sleep_velocity_threshold;
        let is_still = self.velocity.0.abs() < threshold &&
            self.velocity.1.abs() < threshold &&
            self.velocity.2.abs() < threshold &&
            self.angular_velocity.0.abs() < threshold &&
            self.angular_velocity.1.abs() < threshold &&
            self.angular_velocity.2.abs() < threshold;

        if is_still {
            self.sleep_frames = self.sleep_frames.saturating_sub(1);

            if self.sleep_frames == 0 {
                debug!("rigid body at {:?} fell asleep", self.transform.position);
                self.flags.insert(RigidBodyFlags::IS_SLEEPING);
                return;
            }
        } else {
            self.sleep_frames = config.idle_sleep_frames();
        }

        let dt = config.fixed_delta_time;
        self.transform.position = add_scaled(self.transform.position, self.velocity, dt);
        self.transform.rotation = self.transform.rotation.apply_angular_velocity(self.angular_velocity, dt);

        self.angular_velocity = scale_vector(self.angular_velocity, config.angular_damping);

        if self.transform.position.1 < config.kill_plane_y {
            debug!("rigid body fizzled at {:?}", self.transform.position);
            self.transform.position.1 = config.kill_plane_y;
            self.velocity.1 = 0.0;
            self.flags.insert(RigidBodyFlags::FIZZLED);
        }

        self.update_basis();
    }

    /// Moves the body from the frame of `from` into the frame of `to`, carrying its
    /// velocity relative to the moving surfaces.
    pub fn teleport(
        &mut self,
        from: &Transform,
        to: &Transform,
        from_velocity: Vector3,
        to_velocity: Vector3,
        to_room: Option<usize>,
    ) {
        let local_point = from.transform_point_inverse_no_scale(self.transform.position);
        self.transform.position = to.transform_point(local_point);

        let rotation_transfer = to.rotation.multiply(&from.rotation.conjugate());

        let relative_velocity = subtract_vectors(self.velocity, from_velocity);
        self.velocity = add_vectors(rotation_transfer.rotate_point(relative_velocity), to_velocity);
        self.angular_velocity = rotation_transfer.rotate_point(self.angular_velocity);
        self.transform.rotation = rotation_transfer.multiply(&self.transform.rotation).normalized();

        self.current_room = to_room;
        self.update_basis();
    }

    /// Pulls the body back inside a slightly smaller oval of the portal it is entering.
    fn clamp_to_portal(&mut self, portal: &Transform, local_point: &mut Vector3) {
        let mut clamped = (local_point.0, local_point.1 * 0.5, 0.0);
        let max_sqrd = PORTAL_EXIT_XY_CLAMP_DISTANCE * PORTAL_EXIT_XY_CLAMP_DISTANCE;

        // 0.9^64 shrinks anything finite below the clamp distance
        for _ in 0..64 {
            if magnitude_squared(clamped) <= max_sqrd {
                break;
            }
            clamped = scale_vector(clamped, 0.9);
        }

        local_point.0 = clamped.0;
        local_point.1 = clamped.1 * 2.0;
        self.transform.position = portal.transform_point(*local_point);
    }

    /// Detects the body crossing either portal plane while touching it and teleports it.
    ///
    /// # Return
    /// `0` when nothing happened, otherwise `1 + index` of the portal that was entered.
    pub fn check_portals(&mut self, portals: &PortalTable, config: &SimulationConfig) -> usize {
        let Some(portal_pair) = portals.both() else {
            self.flags.remove(RigidBodyFlags::IN_FRONT_PORTAL_0 | RigidBodyFlags::IN_FRONT_PORTAL_1);
            self.flags.insert(RigidBodyFlags::PORTALS_INACTIVE);
            return 0;
        };

        let mut new_flags = RigidBodyFlags::empty();

        if self.flags.contains(RigidBodyFlags::TOUCHING_PORTAL_A) {
            new_flags.insert(RigidBodyFlags::WAS_TOUCHING_PORTAL_A);
        }

        if self.flags.contains(RigidBodyFlags::TOUCHING_PORTAL_B) {
            new_flags.insert(RigidBodyFlags::WAS_TOUCHING_PORTAL_B);
        }

        let mut result = 0;

        for i in 0..2 {
            let portal = portal_pair[i];
            let other_portal = portal_pair[1 - i];
            let inverse_rotation = portal.transform.rotation.conjugate();
            let mut local_point = inverse_rotation.rotate_point(
                subtract_vectors(self.transform.position, portal.transform.position)
            );

            let mask = RigidBodyFlags::in_front_portal(i);

            if local_point.2 < 0.0 {
                new_flags.insert(mask);
            }

            if !self.flags.intersects(RigidBodyFlags::touching_portal(i) | RigidBodyFlags::was_touching_portal(i)) {
                continue;
            }

            // skip the first tick portals are active and the tick after a teleport
            if self.flags.intersects(RigidBodyFlags::PORTALS_INACTIVE | RigidBodyFlags::crossed_portal(1 - i)) ||
                new_flags.contains(RigidBodyFlags::CROSSED_PORTAL_0) {
                continue;
            }

            let local_velocity = inverse_rotation.rotate_point(self.velocity);

            if dot_product(local_velocity, local_point) < 0.0 &&
                !self.flags.contains(RigidBodyFlags::touching_portal(1 - i)) {
                self.clamp_to_portal(&portal.transform, &mut local_point);
            }

            // portal 0 is entered from its front, portal 1 from its back
            let xor_mask = if i == 0 { 0 } else { mask.bits() };

            if (!new_flags.bits() ^ xor_mask) & (self.flags.bits() ^ xor_mask) & mask.bits() == 0 {
                continue;
            }

            self.teleport(
                &portal.transform,
                &other_portal.transform,
                portal.velocity,
                other_portal.velocity,
                other_portal.room,
            );
            debug!("rigid body teleported through portal {} to {:?}", i, self.transform.position);

            let speed_sqrd = magnitude_squared(self.velocity);

            if speed_sqrd > config.max_portal_speed * config.max_portal_speed {
                self.velocity = scale_vector(normalize_vector(self.velocity), config.max_portal_speed);
            }

            if speed_sqrd < config.min_portal_speed * config.min_portal_speed {
                let exit_normal = other_portal.transform.rotate_vector(
                    (0.0, 0.0, if i == 0 { 1.0 } else { -1.0 })
                );

                // only floor portals push bodies out
                if exit_normal.1 > 0.9 {
                    self.velocity = if speed_sqrd < 0.000001 {
                        scale_vector(exit_normal, config.min_portal_speed)
                    } else {
                        scale_vector(normalize_vector(self.velocity), config.min_portal_speed)
                    };
                }
            }

            new_flags.insert(RigidBodyFlags::crossed_portal(i));
            new_flags.insert(RigidBodyFlags::touching_portal(1 - i));
            new_flags.remove(RigidBodyFlags::was_touching_portal(i));
            result = i + 1;
        }

        self.flags.remove(RigidBodyFlags::PORTAL_STATE);
        self.flags.insert(new_flags);

        result
    }

    pub fn snapshot(&self) -> RigidBodyState {
        RigidBodyState {
            transform: self.transform,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            current_room: self.current_room,
            flags: self.flags,
        }
    }

    pub fn restore(&mut self, state: &RigidBodyState) {
        self.transform = state.transform;
        self.velocity = state.velocity;
        self.angular_velocity = state.angular_velocity;
        self.current_room = state.current_room;
        self.flags = state.flags;
        self.update_basis();
    }
}
