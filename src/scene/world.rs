use log::warn;
use crate::models::{Box3D, Ray};
use crate::shapes::CollisionQuad;
use crate::utils::{PhysicsError, Vector3, MAX_TRACKED_ROOMS};

/// A region of the level. Static quads and bodies are grouped per room so a body only
/// collides with the geometry around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub quad_indices: Vec<usize>,
    pub doorway_indices: Vec<usize>,
    pub bounding_box: Box3D,
}

impl Room {
    pub fn new(bounding_box: Box3D) -> Self {
        Self { quad_indices: Vec::new(), doorway_indices: Vec::new(), bounding_box }
    }
}

/// Opening between two rooms. The quad normal points into `room_a`.
#[derive(Debug, Clone, PartialEq)]
pub struct Doorway {
    pub quad: CollisionQuad,
    pub room_a: usize,
    pub room_b: usize,
    pub open: bool,
}

impl Doorway {
    pub fn new(quad: CollisionQuad, room_a: usize, room_b: usize) -> Self {
        Self { quad, room_a, room_b, open: true }
    }

    /// The room on the other side of the doorway when seen from `room`.
    pub fn other_room(&self, room: usize) -> usize {
        if room == self.room_a { self.room_b } else { self.room_a }
    }
}

/// Rooms and the doorways connecting them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub rooms: Vec<Room>,
    pub doorways: Vec<Doorway>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&mut self, bounding_box: Box3D) -> usize {
        self.rooms.push(Room::new(bounding_box));
        self.rooms.len() - 1
    }

    pub fn add_doorway(&mut self, doorway: Doorway) -> Result<usize, PhysicsError> {
        for room in [doorway.room_a, doorway.room_b] {
            if room >= self.rooms.len() {
                return Err(PhysicsError::InvalidRoom(room));
            }
        }

        let index = self.doorways.len();
        let mut rooms = vec![doorway.room_a];
        if doorway.room_b != doorway.room_a {
            rooms.push(doorway.room_b);
        }

        for room in rooms {
            let doorway_indices = &mut self.rooms[room].doorway_indices;
            doorway_indices.push(index);
            if doorway_indices.len() > 32 {
                warn!("room {} has more than 32 doorways, crossings past the 32nd are not tracked", room);
            }
        }

        self.doorways.push(doorway);
        Ok(index)
    }

    pub fn set_doorway_open(&mut self, doorway: usize, open: bool) -> Result<(), PhysicsError> {
        let doorway = self.doorways
            .get_mut(doorway)
            .ok_or_else(|| PhysicsError::CalculationError(format!("Unknown doorway {}", doorway)))?;
        doorway.open = open;
        Ok(())
    }

    pub fn room(&self, room: usize) -> Option<&Room> {
        self.rooms.get(room)
    }

    pub fn check_room(&self, room: Option<usize>) -> Result<(), PhysicsError> {
        match room {
            Some(room) if room >= self.rooms.len() => Err(PhysicsError::InvalidRoom(room)),
            _ => Ok(()),
        }
    }

    /// Bit `i` is set when `position` is in front of the plane of the room's `i`th doorway.
    pub fn check_doorway_sides(&self, position: Vector3, room: Option<usize>) -> u32 {
        let Some(room) = room.and_then(|room| self.rooms.get(room)) else {
            return 0;
        };

        let mut side_mask = 0;

        for (i, doorway_index) in room.doorway_indices.iter().take(32).enumerate() {
            let doorway = &self.doorways[*doorway_index];
            if doorway.quad.plane.point_distance(position) > 0.0 {
                side_mask |= 1 << i;
            }
        }

        side_mask
    }

    /// Room the body ends up in after moving to `position`, given the doorway sides it was on
    /// before moving. Only crossings inside a doorway's outline change rooms.
    pub fn check_doorway_crossings(&self, position: Vector3, room: Option<usize>, side_mask: u32) -> Option<usize> {
        let current = room?;
        let Some(room_data) = self.rooms.get(current) else {
            return room;
        };

        for (i, doorway_index) in room_data.doorway_indices.iter().take(32).enumerate() {
            let doorway = &self.doorways[*doorway_index];
            let distance = doorway.quad.plane.point_distance(position);

            let was_in_front = side_mask & (1 << i) != 0;
            let is_in_front = distance > 0.0;

            if was_in_front == is_in_front {
                continue;
            }

            let projected = doorway.quad.plane.project_point(position);
            if doorway.quad.determine_edges(projected) != 0 {
                continue;
            }

            return Some(doorway.other_room(current));
        }

        room
    }

    /// Furthest distance along `ray` reached by any room in `room_mask`.
    pub fn max_distance_in_direction(&self, ray: &Ray, room_mask: u64) -> f64 {
        let mut result = 0.0_f64;

        for (index, room) in self.rooms.iter().enumerate().take(MAX_TRACKED_ROOMS) {
            if room_mask & (1 << index) == 0 {
                continue;
            }

            let furthest = room.bounding_box.support_point(ray.dir);
            result = result.max(ray.determine_distance(furthest));
        }

        result
    }
}
