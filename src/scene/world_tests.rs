use approx::assert_abs_diff_eq;
use crate::models::{Box3D, Ray};
use crate::scene::{Doorway, World};
use crate::shapes::CollisionQuad;
use crate::utils::PhysicsError;

/// Two rooms side by side along x, joined by a 10x10 doorway in the plane x = 10.
fn two_rooms() -> World {
    let mut world = World::new();
    world.add_room(Box3D::new((-10.0, -5.0, -5.0), (10.0, 5.0, 5.0)));
    world.add_room(Box3D::new((10.0, -5.0, -5.0), (30.0, 5.0, 5.0)));

    let doorway = CollisionQuad::new((10.0, -5.0, -5.0), (0.0, 0.0, 10.0), (0.0, 10.0, 0.0), 0.0).unwrap();
    world.add_doorway(Doorway::new(doorway, 0, 1)).unwrap();
    world
}

#[test]
fn test_add_doorway_links_both_rooms() {
    let world = two_rooms();
    assert_eq!(world.rooms[0].doorway_indices, vec![0]);
    assert_eq!(world.rooms[1].doorway_indices, vec![0]);
    assert_eq!(world.doorways[0].other_room(0), 1);
    assert_eq!(world.doorways[0].other_room(1), 0);
}

#[test]
fn test_add_doorway_rejects_unknown_room() {
    let mut world = two_rooms();
    let quad = CollisionQuad::new((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), 0.0).unwrap();
    assert_eq!(world.add_doorway(Doorway::new(quad, 0, 7)).unwrap_err(), PhysicsError::InvalidRoom(7));
}

#[test]
fn test_doorway_sides_follow_plane() {
    let world = two_rooms();

    // the doorway normal points along -x
    let in_room_a = world.check_doorway_sides((5.0, 0.0, 0.0), Some(0));
    let in_room_b = world.check_doorway_sides((15.0, 0.0, 0.0), Some(1));

    assert_eq!(in_room_a, 1);
    assert_eq!(in_room_b, 0);
    assert_eq!(world.check_doorway_sides((5.0, 0.0, 0.0), None), 0);
}

#[test]
fn test_crossing_inside_doorway_changes_room() {
    let world = two_rooms();
    let sides = world.check_doorway_sides((9.0, 1.0, 0.0), Some(0));

    assert_eq!(world.check_doorway_crossings((11.0, 1.0, 0.0), Some(0), sides), Some(1));
    assert_eq!(world.check_doorway_crossings((9.5, 1.0, 0.0), Some(0), sides), Some(0));
}

#[test]
fn test_crossing_outside_doorway_keeps_room() {
    let world = two_rooms();
    let sides = world.check_doorway_sides((9.0, 8.0, 0.0), Some(0));

    // passes the plane well above the opening
    assert_eq!(world.check_doorway_crossings((11.0, 8.0, 0.0), Some(0), sides), Some(0));
}

#[test]
fn test_max_distance_in_direction_uses_masked_rooms() {
    let world = two_rooms();
    let ray = Ray::new((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));

    assert_abs_diff_eq!(world.max_distance_in_direction(&ray, 0b01), 10.0, epsilon = 1e-12);
    assert_abs_diff_eq!(world.max_distance_in_direction(&ray, 0b11), 30.0, epsilon = 1e-12);
    assert_abs_diff_eq!(world.max_distance_in_direction(&ray, 0), 0.0, epsilon = 1e-12);
}
