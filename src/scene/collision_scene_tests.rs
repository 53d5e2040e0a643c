use std::f64::consts::PI;
use std::rc::Rc;
use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::interactions::ContactShape;
use crate::models::{Box3D, CollisionLayers, Portal, Quaternion, Ray, RigidBodyFlags, Transform};
use crate::scene::{CollisionObject, CollisionScene, Doorway, World};
use crate::shapes::{ColliderShape, ColliderTypeData, CollisionBox, CollisionQuad, CollisionSphere, QuadCollider};
use crate::utils::{PhysicsError, SimulationConfig};

fn sphere_collider(radius: f64) -> Rc<ColliderTypeData> {
    Rc::new(ColliderTypeData::new(ColliderShape::Sphere(CollisionSphere::new(radius).unwrap()), 0.0, 0.5))
}

fn box_collider(half_size: f64) -> Rc<ColliderTypeData> {
    let shape = CollisionBox::new((half_size, half_size, half_size)).unwrap();
    Rc::new(ColliderTypeData::new(ColliderShape::Box(shape), 0.0, 0.5))
}

fn object_at(collider: Rc<ColliderTypeData>, position: (f64, f64, f64), layers: CollisionLayers) -> CollisionObject {
    CollisionObject::new(collider, 1.0, layers, &SimulationConfig::default())
        .unwrap()
        .with_transform(Transform::from_position(position))
}

/// 20x20 one-sided floor at y = 0 facing up.
fn floor() -> QuadCollider {
    let quad = CollisionQuad::new((-10.0, 0.0, -10.0), (0.0, 0.0, 20.0), (20.0, 0.0, 0.0), 0.0).unwrap();
    QuadCollider::new(quad, CollisionLayers::all())
}

/// 10x10 wall in the plane `x`, facing -x.
fn wall(x: f64) -> QuadCollider {
    let quad = CollisionQuad::new((x, -4.0, -5.0), (0.0, 0.0, 10.0), (0.0, 10.0, 0.0), 0.0).unwrap();
    QuadCollider::new(quad, CollisionLayers::all())
}

fn scene_with_floor() -> CollisionScene {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
    scene.add_static_quad(floor(), None).unwrap();
    scene
}

#[test]
fn test_scene_rejects_objects_past_capacity() {
    let config = SimulationConfig { dynamic_object_capacity: 1, ..SimulationConfig::default() };
    let mut scene = CollisionScene::new(config).unwrap();

    scene.add_dynamic_object(object_at(sphere_collider(0.5), (0.0, 1.0, 0.0), CollisionLayers::TANGIBLE)).unwrap();
    let result = scene.add_dynamic_object(object_at(sphere_collider(0.5), (0.0, 3.0, 0.0), CollisionLayers::TANGIBLE));

    assert_eq!(result.unwrap_err(), PhysicsError::SceneFull { capacity: 1 });
}

#[test]
fn test_scene_rejects_unknown_rooms() {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();

    assert_eq!(scene.add_static_quad(floor(), Some(0)).unwrap_err(), PhysicsError::InvalidRoom(0));

    let object = object_at(sphere_collider(0.5), (0.0, 1.0, 0.0), CollisionLayers::TANGIBLE).with_room(Some(2));
    assert_eq!(scene.add_dynamic_object(object).unwrap_err(), PhysicsError::InvalidRoom(2));
}

#[test]
fn test_sphere_comes_to_rest_on_floor() {
    let mut scene = scene_with_floor();
    let handle = scene
        .add_dynamic_object(object_at(sphere_collider(0.5), (0.0, 0.48, 0.0), CollisionLayers::TANGIBLE))
        .unwrap();

    for _ in 0..90 {
        scene.update_dynamics();
    }

    let position = scene.object(handle).unwrap().position();
    assert!(position.1 > 0.35 && position.1 < 0.55, "Sphere should rest on the floor, got {:?}", position);
    assert_abs_diff_eq!(position.0, 0.0, epsilon = 0.05);
    assert_abs_diff_eq!(position.2, 0.0, epsilon = 0.05);
}

#[test]
fn test_floor_contact_creates_one_manifold() {
    let mut scene = scene_with_floor();
    let handle = scene
        .add_dynamic_object(object_at(sphere_collider(0.5), (0.0, 0.45, 0.0), CollisionLayers::TANGIBLE))
        .unwrap();

    scene.update_dynamics();

    assert_eq!(scene.contact_solver().len(), 1);
    let (_, manifold) = scene.contact_solver().manifolds().next().unwrap();
    assert_eq!(manifold.shape_a, ContactShape::StaticQuad(0));
    assert_eq!(manifold.shape_b, ContactShape::object(handle));
    assert_abs_diff_eq!(manifold.normal.1, 1.0, epsilon = 1e-3);
}

#[test]
fn test_fast_box_does_not_tunnel_through_floor() {
    let mut scene = scene_with_floor();
    let mut object = object_at(box_collider(0.25), (0.0, 3.0, 0.0), CollisionLayers::TANGIBLE);
    object.body.velocity = (0.0, -30.0, 0.0);
    let handle = scene.add_dynamic_object(object).unwrap();

    for _ in 0..10 {
        scene.update_dynamics();
    }

    let position = scene.object(handle).unwrap().position();
    assert!(position.1 > 0.0, "Fast box should stop on the floor, got {:?}", position);
}

#[test]
fn test_removing_object_frees_its_manifolds() {
    let mut scene = scene_with_floor();
    let handle = scene
        .add_dynamic_object(object_at(sphere_collider(0.5), (0.0, 0.45, 0.0), CollisionLayers::TANGIBLE))
        .unwrap();

    scene.update_dynamics();
    assert!(!scene.contact_solver().is_empty());

    scene.remove_dynamic_object(handle).unwrap();
    assert!(scene.contact_solver().is_empty());
    assert_eq!(scene.remove_dynamic_object(handle).unwrap_err(), PhysicsError::UnknownObject);
}

#[test]
fn test_opening_portal_drops_contacts_on_it() {
    let mut scene = scene_with_floor();
    scene
        .add_dynamic_object(object_at(sphere_collider(0.5), (0.0, 0.45, 0.0), CollisionLayers::TANGIBLE))
        .unwrap();

    scene.update_dynamics();
    assert_eq!(scene.contact_solver().len(), 1);

    let facing_up = Quaternion::from_axis_angle((1.0, 0.0, 0.0), -PI / 2.0);
    scene.open_portal(0, Portal::new(Transform::new((0.0, 0.0, 0.0), facing_up), None)).unwrap();

    assert!(scene.contact_solver().is_empty());
}

#[test]
fn test_disjoint_layers_never_collide() {
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..50 {
        let layers_a = CollisionLayers::from_bits_truncate(rng.random::<u16>());
        let layers_b = CollisionLayers::from_bits_truncate(rng.random::<u16>());

        let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
        for (position, layers) in [((0.0, 0.0, 0.0), layers_a), ((1.0, 0.0, 0.0), layers_b)] {
            let mut object = object_at(sphere_collider(0.75), position, layers);
            object.body.flags.insert(RigidBodyFlags::DISABLE_GRAVITY);
            scene.add_dynamic_object(object).unwrap();
        }

        scene.update_dynamics();

        let expected = usize::from(layers_a.intersects(layers_b));
        assert_eq!(
            scene.contact_solver().len(),
            expected,
            "Layers {:?} and {:?} produced the wrong number of manifolds",
            layers_a,
            layers_b
        );
    }
}

#[test]
fn test_trigger_reports_event_without_contact() {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();

    let mut trigger = object_at(sphere_collider(1.0), (0.0, 0.0, 0.0), CollisionLayers::TANGIBLE).as_trigger();
    trigger.body.flags.insert(RigidBodyFlags::DISABLE_GRAVITY);
    let trigger = scene.add_dynamic_object(trigger).unwrap();

    let mut visitor = object_at(sphere_collider(0.5), (1.0, 0.0, 0.0), CollisionLayers::TANGIBLE);
    visitor.body.flags.insert(RigidBodyFlags::DISABLE_GRAVITY);
    let visitor = scene.add_dynamic_object(visitor).unwrap();

    scene.update_dynamics();

    assert!(scene.contact_solver().is_empty());
    assert_eq!(scene.trigger_events().len(), 1);
    assert_eq!(scene.trigger_events()[0].trigger, trigger);
    assert_eq!(scene.trigger_events()[0].other.handle(), Some(visitor));
}

#[test]
fn test_overlap_query() {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
    let a = scene.add_dynamic_object(object_at(box_collider(1.0), (0.0, 0.0, 0.0), CollisionLayers::TANGIBLE)).unwrap();
    let b = scene.add_dynamic_object(object_at(box_collider(1.0), (1.5, 0.0, 0.0), CollisionLayers::TANGIBLE)).unwrap();
    let c = scene.add_dynamic_object(object_at(box_collider(1.0), (5.0, 0.0, 0.0), CollisionLayers::TANGIBLE)).unwrap();

    assert!(scene.overlap(a, b, (1.0, 0.0, 0.0)).unwrap());
    assert!(!scene.overlap(a, c, (1.0, 0.0, 0.0)).unwrap());
}

/// Room 0 holds a wall at x = 5 with portal 0 on it, room 1 a wall at x = 110; portal 1
/// sits at x = 100 in room 1.
fn portal_scene() -> CollisionScene {
    let mut world = World::new();
    world.add_room(Box3D::new((-10.0, -5.0, -5.0), (5.0, 5.0, 5.0)));
    world.add_room(Box3D::new((95.0, -5.0, -5.0), (110.0, 5.0, 5.0)));

    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap().with_world(world);
    scene.add_static_quad(wall(5.0), Some(0)).unwrap();
    scene.add_static_quad(wall(110.0), Some(1)).unwrap();
    scene
}

fn open_portals(scene: &mut CollisionScene) {
    let facing_x = Quaternion::from_axis_angle((0.0, 1.0, 0.0), PI / 2.0);
    scene.open_portal(0, Portal::new(Transform::new((5.0, 1.0, 0.0), facing_x), Some(0))).unwrap();
    scene.open_portal(1, Portal::new(Transform::new((100.0, 1.0, 0.0), facing_x), Some(1))).unwrap();
}

#[test]
fn test_raycast_hits_wall_without_portals() {
    let scene = portal_scene();
    let ray = Ray::new((0.0, 1.0, 0.0), (1.0, 0.0, 0.0));

    let hit = scene.raycast(Some(0), ray, CollisionLayers::all(), 100.0).unwrap();

    assert_abs_diff_eq!(hit.distance, 5.0, epsilon = 1e-9);
    assert_eq!(hit.quad_index, Some(0));
    assert_eq!(hit.passed_rooms, 0b01);
    assert_eq!(hit.portals_passed, 0);
    assert!(hit.through_portal.is_none());
}

#[test]
fn test_raycast_continues_through_portal() {
    let mut scene = portal_scene();
    open_portals(&mut scene);
    let ray = Ray::new((0.0, 1.0, 0.0), (1.0, 0.0, 0.0));

    let hit = scene.raycast(Some(0), ray, CollisionLayers::all(), 100.0).unwrap();

    assert_abs_diff_eq!(hit.distance, 15.0, epsilon = 1e-6);
    assert_abs_diff_eq!(hit.at.0, 110.0, epsilon = 1e-6);
    assert_abs_diff_eq!(hit.at.1, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(hit.at.2, 0.0, epsilon = 1e-6);
    assert_eq!(hit.passed_rooms, 0b11);
    assert_eq!(hit.portals_passed, 1);
    assert_eq!(hit.room, Some(1));

    let through = hit.through_portal.expect("Hit behind a portal should carry its transform");
    let entry = through.transform_point((5.0, 1.0, 0.0));
    assert_abs_diff_eq!(entry.0, 100.0, epsilon = 1e-6);
    assert_abs_diff_eq!(entry.1, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(entry.2, 0.0, epsilon = 1e-6);

    // the hit seen from room 0, straight through the portal
    let seen_from_start = through.inverse().transform_point(hit.at);
    assert_abs_diff_eq!(seen_from_start.0, 15.0, epsilon = 1e-6);
    assert_abs_diff_eq!(seen_from_start.1, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(seen_from_start.2, 0.0, epsilon = 1e-6);
}

#[test]
fn test_raycast_respects_layer_mask() {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
    let glass = QuadCollider::new(wall(5.0).quad, CollisionLayers::TRANSPARENT);
    scene.add_static_quad(glass, None).unwrap();
    scene.add_static_quad(wall(8.0), None).unwrap();

    let ray = Ray::new((0.0, 1.0, 0.0), (1.0, 0.0, 0.0));

    let hit = scene.raycast(None, ray, CollisionLayers::TANGIBLE, 100.0).unwrap();
    assert_abs_diff_eq!(hit.distance, 8.0, epsilon = 1e-9);

    let hit = scene.raycast(None, ray, CollisionLayers::TRANSPARENT, 100.0).unwrap();
    assert_abs_diff_eq!(hit.distance, 5.0, epsilon = 1e-9);
}

#[test]
fn test_raycast_hits_dynamic_object() {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
    let handle = scene
        .add_dynamic_object(object_at(sphere_collider(1.0), (10.0, 0.0, 0.0), CollisionLayers::TANGIBLE))
        .unwrap();

    let ray = Ray::new((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
    let hit = scene.raycast(None, ray, CollisionLayers::TANGIBLE, 100.0).unwrap();

    assert_eq!(hit.object, Some(handle));
    assert_abs_diff_eq!(hit.distance, 9.0, epsilon = 1e-9);
    assert!(scene.raycast(None, ray, CollisionLayers::TANGIBLE, 5.0).is_none());
}

/// Rooms 0 and 1 joined by a doorway at x = 10, with a wall at x = 20 in room 1.
fn doorway_scene() -> CollisionScene {
    let mut world = World::new();
    world.add_room(Box3D::new((-10.0, -5.0, -5.0), (10.0, 5.0, 5.0)));
    world.add_room(Box3D::new((10.0, -5.0, -5.0), (30.0, 5.0, 5.0)));
    let opening = CollisionQuad::new((10.0, -5.0, -5.0), (0.0, 0.0, 10.0), (0.0, 10.0, 0.0), 0.0).unwrap();
    world.add_doorway(Doorway::new(opening, 0, 1)).unwrap();

    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap().with_world(world);
    scene.add_static_quad(wall(20.0), Some(1)).unwrap();
    scene
}

#[test]
fn test_raycast_passes_open_doorway() {
    let mut scene = doorway_scene();
    let ray = Ray::new((0.0, 1.0, 0.0), (1.0, 0.0, 0.0));

    let hit = scene.raycast(Some(0), ray, CollisionLayers::all(), 100.0).unwrap();
    assert_abs_diff_eq!(hit.distance, 20.0, epsilon = 1e-9);
    assert_eq!(hit.passed_rooms, 0b11);
    assert_eq!(hit.room, Some(1));

    scene.world_mut().set_doorway_open(0, false).unwrap();
    assert!(scene.raycast(Some(0), ray, CollisionLayers::all(), 100.0).is_none());
}

#[test]
fn test_body_moves_through_doorway_into_next_room() {
    let mut scene = doorway_scene();
    let mut object = object_at(sphere_collider(0.25), (9.0, 1.0, 0.0), CollisionLayers::TANGIBLE).with_room(Some(0));
    object.body.flags.insert(RigidBodyFlags::DISABLE_GRAVITY);
    object.body.velocity = (60.0, 0.0, 0.0);
    let handle = scene.add_dynamic_object(object).unwrap();

    scene.update_dynamics();

    let object = scene.object(handle).unwrap();
    assert_abs_diff_eq!(object.position().0, 11.0, epsilon = 1e-9);
    assert_eq!(object.body.current_room, Some(1));
}

#[test]
fn test_body_teleports_through_portal_pair() {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
    let facing_x = Quaternion::from_axis_angle((0.0, 1.0, 0.0), PI / 2.0);
    scene.open_portal(0, Portal::new(Transform::new((5.0, 1.0, 0.0), facing_x), None)).unwrap();
    scene.open_portal(1, Portal::new(Transform::new((100.0, 1.0, 0.0), facing_x), None)).unwrap();

    let mut object = object_at(sphere_collider(0.25), (4.85, 1.0, 0.0), CollisionLayers::TANGIBLE);
    object.body.flags.insert(RigidBodyFlags::DISABLE_GRAVITY | RigidBodyFlags::TOUCHING_PORTAL_A);
    object.body.velocity = (3.0, 0.0, 0.0);
    let handle = scene.add_dynamic_object(object).unwrap();

    for _ in 0..4 {
        scene.update_dynamics();
    }

    let position = scene.object(handle).unwrap().position();
    assert!(position.0 > 90.0, "Body should come out of the far portal, got {:?}", position);
}
