use log::trace;
use crate::interactions::{
    contact_insert, epa_solve, epa_solve_swept, gjk_check_for_overlap, ContactShape, ContactSolver,
    EpaResult,
};
use crate::models::{Basis, ObjectHandle, PortalTable, Simplex};
use crate::scene::{CollisionObject, ObjectSupport, SweptObjectSupport};
use crate::shapes::{ColliderShape, CollisionQuad, MeshCollider, QuadCollider};
use crate::utils::{add_scaled, add_vectors, dot_product, subtract_vectors, Vector3};

/// Distance a body is left inside a surface after a swept hit, so the regular contact
/// still exists next tick.
const SWEPT_SETTLE_DISTANCE: f64 = 0.01;

/// An overlap involving a trigger object during the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub trigger: ObjectHandle,
    pub other: ContactShape,
}

/// Outcome of sweeping a body from its previous position against a static quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweptResult {
    Miss,
    /// The body already overlapped at its previous position; the regular test applies.
    Overlap,
    /// First contact along the motion, with the body position at that moment.
    Hit { result: EpaResult, object_end: Vector3 },
}

/// The state narrow-phase tests write into.
pub struct NarrowPhase<'a> {
    pub solver: &'a mut ContactSolver,
    pub portals: &'a PortalTable,
    pub trigger_events: &'a mut Vec<TriggerEvent>,
}

/// Contacts against one-sided quads with a normal opposing the quad face, or lying past a
/// disabled quad edge, are not real.
fn quad_accepts(quad: &CollisionQuad, result: &EpaResult) -> bool {
    if quad.thickness == 0.0 && dot_product(result.normal, quad.normal()) < 0.0 {
        return false;
    }
    !quad.is_past_disabled_edge(result.contact_a)
}

impl NarrowPhase<'_> {
    fn push_trigger(&mut self, trigger: ObjectHandle, other: ContactShape) {
        let event = TriggerEvent { trigger, other };
        if !self.trigger_events.contains(&event) {
            self.trigger_events.push(event);
        }
    }

    /// Inserts `result` (A = `shape_a`, B = `shape_b`) into the pair's manifold, flipping it
    /// when the manifold was created with the shapes the other way around.
    fn insert_contact(
        &mut self,
        shape_a: ContactShape,
        shape_b: ContactShape,
        mut result: EpaResult,
        friction: f64,
        restitution: f64,
    ) -> bool {
        let Some(handle) = self.solver.get_contact_manifold(shape_a, shape_b) else {
            return false;
        };
        let Some(manifold) = self.solver.manifold_mut(handle) else {
            return false;
        };

        if manifold.shape_a != shape_a {
            result.swap();
        }

        manifold.set_material(friction, restitution);
        contact_insert(manifold, &result);
        true
    }

    /// Collides one object against one static quad at its current position.
    pub fn collide_with_quad(
        &mut self,
        handle: ObjectHandle,
        object: &mut CollisionObject,
        quad_index: usize,
        quad: &QuadCollider,
    ) -> bool {
        if !object.collision_layers.interacts_with(quad.collision_layers) ||
            !object.bounding_box.has_overlap(&quad.bounding_box()) {
            return false;
        }

        let basis = object.body.rotation_basis;
        let quad_shape = ContactShape::StaticQuad(quad_index);
        let mut found = Vec::new();

        for part in object.parts() {
            let support = part.support(basis);
            let mut simplex = Simplex::new();

            if !gjk_check_for_overlap(&mut simplex, &quad.quad, &support, quad.quad.normal()) {
                continue;
            }

            if object.is_trigger {
                found.push((part.index, None));
                continue;
            }

            let result = epa_solve(&simplex, &quad.quad, &support);
            if quad_accepts(&quad.quad, &result) {
                found.push((part.index, Some(result)));
            }
        }

        let mut generated = false;

        for (part, result) in found {
            let object_shape = ContactShape::Object { handle, part };

            let Some(mut result) = result else {
                self.push_trigger(handle, quad_shape);
                continue;
            };

            let touching = self.portals.is_touching_portal(result.contact_a);
            if !touching.is_empty() {
                object.body.flags.insert(touching);
                continue;
            }

            result.contact_b = object.body.transform.transform_point_inverse_no_scale(result.contact_b);

            generated |= self.insert_contact(
                quad_shape,
                object_shape,
                result,
                quad.friction.max(object.collider.friction),
                quad.bounce.min(object.collider.bounce),
            );
        }

        generated
    }

    /// Sweeps one convex piece of `object` from its previous position to its current one.
    fn sweep_part(
        &self,
        object: &CollisionObject,
        support: SweptObjectSupport<'_>,
        quad: &QuadCollider,
    ) -> SweptResult {
        let mut simplex = Simplex::new();

        if !gjk_check_for_overlap(&mut simplex, &quad.quad, &support, quad.quad.normal()) {
            return SweptResult::Miss;
        }

        let mut part_end = support.object.position;
        let Some(result) = epa_solve_swept(&simplex, &quad.quad, &support, support.prev_position, &mut part_end) else {
            return SweptResult::Overlap;
        };

        if !quad_accepts(&quad.quad, &result) {
            return SweptResult::Miss;
        }

        let offset = subtract_vectors(object.body.transform.position, support.object.position);
        SweptResult::Hit { result, object_end: add_vectors(part_end, offset) }
    }

    /// Collides a fast object against a static quad along its motion this tick.
    pub fn collide_with_quad_swept(
        &mut self,
        handle: ObjectHandle,
        object: &mut CollisionObject,
        quad_index: usize,
        quad: &QuadCollider,
    ) -> bool {
        if !object.collision_layers.interacts_with(quad.collision_layers) ||
            !object.swept_bounding_box().has_overlap(&quad.bounding_box()) {
            return false;
        }

        if object.is_trigger {
            return self.collide_with_quad(handle, object, quad_index, quad);
        }

        let basis = object.body.rotation_basis;
        let movement = subtract_vectors(object.prev_position, object.body.transform.position);
        let mut outcome = SweptResult::Miss;
        let mut hit_part = 0;

        for part in object.parts() {
            let support = SweptObjectSupport {
                object: part.support(basis),
                prev_position: add_vectors(part.position, movement),
            };

            match self.sweep_part(object, support, quad) {
                SweptResult::Miss => {}
                SweptResult::Overlap => outcome = SweptResult::Overlap,
                hit @ SweptResult::Hit { .. } => {
                    outcome = hit;
                    hit_part = part.index;
                    break;
                }
            }
        }

        match outcome {
            SweptResult::Miss => false,
            SweptResult::Overlap => self.collide_with_quad(handle, object, quad_index, quad),
            SweptResult::Hit { mut result, object_end } => {
                let touching = self.portals.is_touching_portal(result.contact_a);
                if !touching.is_empty() {
                    object.body.flags.insert(touching);
                    return false;
                }

                trace!("swept hit against quad {} moves body to {:?}", quad_index, object_end);
                object.body.transform.position = object_end;
                result.contact_b = object.body.transform.transform_point_inverse_no_scale(result.contact_b);

                let restitution = quad.bounce.max(object.collider.bounce);
                let inserted = self.insert_contact(
                    ContactShape::StaticQuad(quad_index),
                    ContactShape::Object { handle, part: hit_part },
                    result,
                    quad.friction.min(object.collider.friction),
                    restitution,
                );

                let normal_velocity = dot_product(result.normal, object.body.velocity);
                if normal_velocity < 0.0 {
                    object.body.velocity = add_scaled(
                        object.body.velocity,
                        result.normal,
                        -(1.0 + restitution) * normal_velocity,
                    );
                }
                object.body.transform.position = add_scaled(
                    object.body.transform.position,
                    result.normal,
                    -SWEPT_SETTLE_DISTANCE,
                );
                object.update_bounding_box();

                inserted
            }
        }
    }

    /// Collides two registered objects. Triggers only report events.
    pub fn collide_objects(
        &mut self,
        handle_a: ObjectHandle,
        a: &mut CollisionObject,
        handle_b: ObjectHandle,
        b: &mut CollisionObject,
    ) -> bool {
        if (a.is_trigger && b.is_trigger) ||
            !a.collision_layers.interacts_with(b.collision_layers) ||
            !a.bounding_box.has_overlap(&b.bounding_box) {
            return false;
        }

        let a_is_mesh = matches!(a.collider.shape, ColliderShape::Mesh(_));
        let b_is_mesh = matches!(b.collider.shape, ColliderShape::Mesh(_));

        match (a_is_mesh, b_is_mesh) {
            (true, true) => false,
            (true, false) => self.collide_mesh(handle_a, a, handle_b, b),
            (false, true) => self.collide_mesh(handle_b, b, handle_a, a),
            (false, false) => self.collide_convex_parts(handle_a, a, handle_b, b),
        }
    }

    fn collide_convex_parts(
        &mut self,
        handle_a: ObjectHandle,
        a: &mut CollisionObject,
        handle_b: ObjectHandle,
        b: &mut CollisionObject,
    ) -> bool {
        let basis_a = a.body.rotation_basis;
        let basis_b = b.body.rotation_basis;
        let mut found = Vec::new();

        for part_a in a.parts() {
            let support_a = part_a.support(basis_a);

            for part_b in b.parts() {
                let support_b = part_b.support(basis_b);
                let mut simplex = Simplex::new();
                let hint = subtract_vectors(part_b.position, part_a.position);

                if !gjk_check_for_overlap(&mut simplex, &support_a, &support_b, hint) {
                    continue;
                }

                if a.is_trigger || b.is_trigger {
                    found.push((part_a.index, part_b.index, None));
                    continue;
                }

                found.push((part_a.index, part_b.index, Some(epa_solve(&simplex, &support_a, &support_b))));
            }
        }

        let mut generated = false;

        for (part_a, part_b, result) in found {
            let shape_a = ContactShape::Object { handle: handle_a, part: part_a };
            let shape_b = ContactShape::Object { handle: handle_b, part: part_b };

            let Some(mut result) = result else {
                if a.is_trigger {
                    self.push_trigger(handle_a, shape_b);
                } else {
                    self.push_trigger(handle_b, shape_a);
                }
                continue;
            };

            let touching = self.portals.is_touching_portal(result.contact_a);
            if !touching.is_empty() {
                b.body.flags.insert(touching);
                continue;
            }

            let touching = self.portals.is_touching_portal(result.contact_b);
            if !touching.is_empty() {
                a.body.flags.insert(touching);
                continue;
            }

            result.contact_a = a.body.transform.transform_point_inverse_no_scale(result.contact_a);
            result.contact_b = b.body.transform.transform_point_inverse_no_scale(result.contact_b);

            generated |= self.insert_contact(
                shape_a,
                shape_b,
                result,
                a.collider.friction.max(b.collider.friction),
                a.collider.bounce.min(b.collider.bounce),
            );
        }

        generated
    }

    /// Collides every quad of a mesh with the convex pieces of `other`. The test runs in the
    /// mesh's local frame so the quads never have to be transformed.
    fn collide_mesh(
        &mut self,
        mesh_handle: ObjectHandle,
        mesh_object: &CollisionObject,
        other_handle: ObjectHandle,
        other: &mut CollisionObject,
    ) -> bool {
        let ColliderShape::Mesh(mesh) = &mesh_object.collider.shape else {
            return false;
        };

        let mesh_transform = mesh_object.body.transform.rigid();
        let found = mesh_contacts(mesh, mesh_object, other);
        let mut generated = false;

        for (quad_index, part, result) in found {
            let mesh_shape = ContactShape::Object { handle: mesh_handle, part: quad_index };
            let other_shape = ContactShape::Object { handle: other_handle, part };

            let Some(mut result) = result else {
                let trigger = if other.is_trigger { other_handle } else { mesh_handle };
                let against = if other.is_trigger { mesh_shape } else { other_shape };
                self.push_trigger(trigger, against);
                continue;
            };

            let touching = self.portals.is_touching_portal(mesh_transform.transform_point(result.contact_a));
            if !touching.is_empty() {
                other.body.flags.insert(touching);
                continue;
            }

            // contact_a is already relative to the mesh body
            let contact_b_world = mesh_transform.transform_point(result.contact_b);
            result.contact_b = other.body.transform.transform_point_inverse_no_scale(contact_b_world);
            result.normal = mesh_transform.rotate_vector(result.normal);

            generated |= self.insert_contact(
                mesh_shape,
                other_shape,
                result,
                mesh_object.collider.friction.max(other.collider.friction),
                mesh_object.collider.bounce.min(other.collider.bounce),
            );
        }

        generated
    }
}

/// GJK/EPA results of every mesh quad against every convex piece of `other`, in the mesh's
/// local frame. `None` marks a trigger overlap.
fn mesh_contacts(
    mesh: &MeshCollider,
    mesh_object: &CollisionObject,
    other: &CollisionObject,
) -> Vec<(u16, u16, Option<EpaResult>)> {
    let mesh_transform = mesh_object.body.transform.rigid();
    let inverse_rotation = mesh_transform.rotation.conjugate();
    let relative_basis = Basis::from_quaternion(&inverse_rotation.multiply(&other.body.transform.rotation));
    let is_trigger = mesh_object.is_trigger || other.is_trigger;
    let mut found = Vec::new();

    for part in other.parts() {
        let support = ObjectSupport {
            collider: part.collider,
            basis: relative_basis,
            position: mesh_transform.transform_point_inverse_no_scale(part.position),
        };

        for (quad_index, quad) in mesh.children().iter().enumerate() {
            let Ok(quad_index) = u16::try_from(quad_index) else {
                break;
            };

            if !quad.collision_layers.interacts_with(other.collision_layers) {
                continue;
            }

            let mut simplex = Simplex::new();
            if !gjk_check_for_overlap(&mut simplex, &quad.quad, &support, quad.quad.normal()) {
                continue;
            }

            if is_trigger {
                found.push((quad_index, part.index, None));
                continue;
            }

            let result = epa_solve(&simplex, &quad.quad, &support);
            if quad_accepts(&quad.quad, &result) {
                found.push((quad_index, part.index, Some(result)));
            }
        }
    }

    found
}

/// Boolean overlap between two objects, ignoring layers and triggers. `hint` seeds the GJK
/// search; pass the expected separation direction from `a` to `b` when known.
pub fn objects_overlap(a: &CollisionObject, b: &CollisionObject, hint: Vector3) -> bool {
    match (&a.collider.shape, &b.collider.shape) {
        (ColliderShape::Mesh(_), ColliderShape::Mesh(_)) => false,
        (ColliderShape::Mesh(mesh), _) => mesh_overlaps(mesh, a, b),
        (_, ColliderShape::Mesh(mesh)) => mesh_overlaps(mesh, b, a),
        _ => {
            let basis_a = a.body.rotation_basis;
            let basis_b = b.body.rotation_basis;

            a.parts().any(|part_a| {
                b.parts().any(|part_b| {
                    let mut simplex = Simplex::new();
                    gjk_check_for_overlap(&mut simplex, &part_a.support(basis_a), &part_b.support(basis_b), hint)
                })
            })
        }
    }
}

fn mesh_overlaps(mesh: &MeshCollider, mesh_object: &CollisionObject, other: &CollisionObject) -> bool {
    let mesh_transform = mesh_object.body.transform.rigid();
    let relative_basis = Basis::from_quaternion(
        &mesh_transform.rotation.conjugate().multiply(&other.body.transform.rotation),
    );

    other.parts().any(|part| {
        let support = ObjectSupport {
            collider: part.collider,
            basis: relative_basis,
            position: mesh_transform.transform_point_inverse_no_scale(part.position),
        };

        mesh.children().iter().any(|quad| {
            let mut simplex = Simplex::new();
            gjk_check_for_overlap(&mut simplex, &quad.quad, &support, quad.quad.normal())
        })
    })
}
