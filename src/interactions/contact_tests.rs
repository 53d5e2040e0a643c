use std::rc::Rc;
use approx::assert_abs_diff_eq;
use slotmap::SlotMap;
use crate::interactions::{contact_insert, ContactManifold, ContactShape, ContactSolver, EpaResult};
use crate::models::{CollisionLayers, ObjectHandle, Portal, Transform};
use crate::scene::CollisionObject;
use crate::shapes::{ColliderShape, ColliderTypeData, CollisionSphere};
use crate::utils::{cross_product, dot_product, vector_magnitude, SimulationConfig, MAX_CONTACTS_PER_MANIFOLD};

fn result_with(id: u32, penetration: f64) -> EpaResult {
    EpaResult {
        contact_a: (0.0, 0.0, 0.0),
        contact_b: (0.0, -0.45, 0.0),
        normal: (0.0, 1.0, 0.0),
        penetration,
        id,
    }
}

fn handles(count: usize) -> Vec<ObjectHandle> {
    let mut keys: SlotMap<ObjectHandle, ()> = SlotMap::with_key();
    (0..count).map(|_| keys.insert(())).collect()
}

/// A unit mass ball of radius 0.5 whose bottom dips 0.05 below y = 0.
fn resting_ball() -> (SlotMap<ObjectHandle, CollisionObject>, ObjectHandle) {
    let config = SimulationConfig::default();
    let collider = Rc::new(ColliderTypeData::new(ColliderShape::Sphere(CollisionSphere::new(0.5).unwrap()), 0.0, 0.5));
    let object = CollisionObject::new(collider, 1.0, CollisionLayers::STATIC, &config)
        .unwrap()
        .with_transform(Transform::from_position((0.0, 0.4, 0.0)));

    let mut objects = SlotMap::with_key();
    let handle = objects.insert(object);
    (objects, handle)
}

fn floor_contact(solver: &mut ContactSolver, handle: ObjectHandle) {
    let manifold_handle = solver.get_contact_manifold(ContactShape::StaticQuad(0), ContactShape::object(handle)).unwrap();
    let manifold = solver.manifold_mut(manifold_handle).unwrap();
    contact_insert(manifold, &result_with(1, -0.05));
}

#[test]
fn test_insert_sets_normal_and_tangents() {
    let ids = handles(1);
    let mut manifold = ContactManifold::new(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));

    contact_insert(&mut manifold, &result_with(1, -0.1));

    assert_eq!(manifold.contact_count, 1);
    assert_eq!(manifold.normal, (0.0, 1.0, 0.0));

    let [tangent_u, tangent_v] = manifold.tangent_vectors;
    assert_abs_diff_eq!(dot_product(tangent_u, manifold.normal), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dot_product(tangent_v, manifold.normal), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(vector_magnitude(tangent_u), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(vector_magnitude(cross_product(tangent_u, tangent_v)), 1.0, epsilon = 1e-12);
}

#[test]
fn test_insert_same_id_keeps_impulse() {
    let ids = handles(1);
    let mut manifold = ContactManifold::new(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));

    contact_insert(&mut manifold, &result_with(7, -0.1));
    manifold.contacts[0].normal_impulse = 5.0;
    contact_insert(&mut manifold, &result_with(7, -0.2));

    assert_eq!(manifold.contact_count, 1);
    assert_abs_diff_eq!(manifold.contacts[0].normal_impulse, 5.0);
    assert_abs_diff_eq!(manifold.contacts[0].penetration, -0.2);
}

#[test]
fn test_full_manifold_replaces_shallowest() {
    let ids = handles(1);
    let mut manifold = ContactManifold::new(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));

    for i in 0..MAX_CONTACTS_PER_MANIFOLD {
        contact_insert(&mut manifold, &result_with(1 << i, -0.1 * (i + 1) as f64));
        manifold.contacts[i].normal_impulse = 1.0;
    }
    contact_insert(&mut manifold, &result_with(1 << 12, -2.0));

    assert_eq!(manifold.contact_count, MAX_CONTACTS_PER_MANIFOLD);
    assert_eq!(manifold.contacts[0].id, 1 << 12);
    assert_abs_diff_eq!(manifold.contacts[0].normal_impulse, 0.0);
    assert_abs_diff_eq!(manifold.contacts[1].normal_impulse, 1.0);
}

#[test]
fn test_manifold_never_grows_past_capacity() {
    let ids = handles(1);
    let mut manifold = ContactManifold::new(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));

    for i in 0..20 {
        contact_insert(&mut manifold, &result_with(1 << i, -0.05 * ((i % 5) + 1) as f64));
        assert!(manifold.contact_count <= MAX_CONTACTS_PER_MANIFOLD, "Manifold grew to {}", manifold.contact_count);
    }
    assert_eq!(manifold.contact_count, MAX_CONTACTS_PER_MANIFOLD);
}

#[test]
fn test_full_manifold_drops_covered_feature() {
    let ids = handles(1);
    let mut manifold = ContactManifold::new(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));

    contact_insert(&mut manifold, &result_with(0x3, -0.1));
    for i in 1..MAX_CONTACTS_PER_MANIFOLD {
        contact_insert(&mut manifold, &result_with(1 << (i + 4), -0.2));
    }

    // 0x1 is part of the edge already stored as 0x3
    contact_insert(&mut manifold, &result_with(0x1, -0.5));

    assert_eq!(manifold.contact_count, MAX_CONTACTS_PER_MANIFOLD);
    assert!(manifold.points().iter().all(|point| point.id != 0x1), "Covered point should be dropped");
}

#[test]
fn test_remove_point_keeps_order() {
    let ids = handles(1);
    let mut manifold = ContactManifold::new(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));

    for id in [1, 2, 4] {
        contact_insert(&mut manifold, &result_with(id, -0.1));
    }
    manifold.remove_point(0);
    manifold.remove_point(5);

    let remaining: Vec<u32> = manifold.points().iter().map(|point| point.id).collect();
    assert_eq!(remaining, vec![2, 4]);
}

#[test]
fn test_get_contact_manifold_is_order_independent() {
    let ids = handles(2);
    let mut solver = ContactSolver::new(1);
    let a = ContactShape::object(ids[0]);
    let b = ContactShape::Object { handle: ids[1], part: 2 };

    let first = solver.get_contact_manifold(a, b).unwrap();
    assert_eq!(solver.get_contact_manifold(b, a), Some(first));
    assert_eq!(solver.manifold(first).unwrap().shape_a, a);

    // arena holds a single manifold
    assert_eq!(solver.get_contact_manifold(a, ContactShape::StaticQuad(3)), None);
    assert_eq!(solver.len(), 1);
}

#[test]
fn test_remove_unused_keeps_touching_contacts() {
    let (objects, handle) = resting_ball();
    let mut solver = ContactSolver::new(8);
    floor_contact(&mut solver, handle);

    solver.remove_unused_contacts(&objects);

    let manifold = solver.manifolds_for(handle).next().unwrap();
    assert_eq!(manifold.contact_count, 1);
    assert_abs_diff_eq!(manifold.contacts[0].penetration, -0.05, epsilon = 1e-12);
}

#[test]
fn test_remove_unused_drops_separated_contacts() {
    let (mut objects, handle) = resting_ball();
    let mut solver = ContactSolver::new(8);
    floor_contact(&mut solver, handle);

    objects[handle].body.transform.position.1 = 1.0;
    solver.remove_unused_contacts(&objects);

    assert!(solver.is_empty(), "Separated manifold should be freed");
}

#[test]
fn test_remove_unused_drops_sliding_contacts() {
    let (mut objects, handle) = resting_ball();
    let mut solver = ContactSolver::new(8);
    floor_contact(&mut solver, handle);

    objects[handle].body.transform.position.0 = 0.5;
    solver.remove_unused_contacts(&objects);

    assert!(solver.is_empty(), "Contact that slid away should be dropped");
}

#[test]
fn test_portal_contacts_are_dropped() {
    let (objects, handle) = resting_ball();
    let mut solver = ContactSolver::new(8);
    floor_contact(&mut solver, handle);

    let far_portal = Portal::new(Transform::from_position((20.0, 0.0, 0.0)), None);
    solver.check_portal_contacts(&far_portal, &objects);
    assert_eq!(solver.len(), 1);

    let portal = Portal::new(Transform::from_position((0.0, 0.0, 0.0)), None);
    solver.check_portal_contacts(&portal, &objects);
    assert!(solver.is_empty());
}

#[test]
fn test_remove_object_frees_manifolds() {
    let ids = handles(3);
    let mut solver = ContactSolver::new(8);
    solver.get_contact_manifold(ContactShape::object(ids[0]), ContactShape::object(ids[1]));
    solver.get_contact_manifold(ContactShape::StaticQuad(0), ContactShape::object(ids[0]));
    solver.get_contact_manifold(ContactShape::object(ids[1]), ContactShape::object(ids[2]));

    solver.remove_object(ids[0]);

    assert_eq!(solver.len(), 1);
    assert_eq!(solver.manifolds_for(ids[0]).count(), 0);
}

#[test]
fn test_solve_pushes_body_out_of_floor() {
    let (mut objects, handle) = resting_ball();
    let config = SimulationConfig::default();
    let mut solver = ContactSolver::new(8);
    floor_contact(&mut solver, handle);

    objects[handle].body.velocity = (0.0, -0.5, 0.0);
    solver.solve(&mut objects, &config);

    let manifold = solver.manifolds_for(handle).next().unwrap();
    assert!(manifold.contacts[0].normal_impulse > 0.0);
    assert!(objects[handle].body.velocity.1 > 0.0, "Velocity {:?}", objects[handle].body.velocity);
    assert_abs_diff_eq!(objects[handle].body.angular_velocity.0, 0.0, epsilon = 1e-12);
}
