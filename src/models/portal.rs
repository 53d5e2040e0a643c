use crate::models::{RigidBodyFlags, Transform};
use crate::utils::{PhysicsError, Vector3, PORTAL_THICKNESS, PORTAL_X_RADIUS, ZERO_VECTOR};

/// One open portal: its surface transform, the room it sits in and the velocity of the
/// surface it is attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub transform: Transform,
    pub room: Option<usize>,
    pub velocity: Vector3,
}

impl Portal {
    pub fn new(transform: Transform, room: Option<usize>) -> Self {
        Self { transform, room, velocity: ZERO_VECTOR }
    }

    /// True when `point` lies inside the portal oval and within its thickness.
    pub fn is_touching(&self, point: Vector3) -> bool {
        let local = self.transform.transform_point_inverse(point);

        if local.2.abs() > PORTAL_THICKNESS {
            return false;
        }

        let x = local.0 / PORTAL_X_RADIUS;
        x * x + local.1 * local.1 < 1.0
    }
}

/// The pair of portal slots. Portals only carry bodies and rays when both slots are open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortalTable {
    portals: [Option<Portal>; 2],
}

impl PortalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, index: usize, portal: Portal) -> Result<(), PhysicsError> {
        let slot = self.portals.get_mut(index).ok_or(PhysicsError::InvalidPortalIndex(index))?;
        *slot = Some(portal);
        Ok(())
    }

    pub fn close(&mut self, index: usize) -> Result<Option<Portal>, PhysicsError> {
        let slot = self.portals.get_mut(index).ok_or(PhysicsError::InvalidPortalIndex(index))?;
        Ok(slot.take())
    }

    pub fn get(&self, index: usize) -> Option<&Portal> {
        self.portals.get(index).and_then(|portal| portal.as_ref())
    }

    /// Both portals, or `None` while either slot is empty.
    pub fn both(&self) -> Option<[&Portal; 2]> {
        match (&self.portals[0], &self.portals[1]) {
            (Some(a), Some(b)) => Some([a, b]),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.both().is_some()
    }

    /// Transform carrying points entering portal `from_portal` to the matching place at the other portal.
    pub fn portal_transform(&self, from_portal: usize) -> Option<Transform> {
        let [a, b] = self.both()?;
        let (from, to) = if from_portal == 0 { (a, b) } else { (b, a) };
        Some(to.transform.concat(&from.transform.inverse()))
    }

    /// Touching flag (`TOUCHING_PORTAL_A` / `TOUCHING_PORTAL_B`) of the first portal `point` touches.
    pub fn is_touching_portal(&self, point: Vector3) -> RigidBodyFlags {
        let Some(portals) = self.both() else {
            return RigidBodyFlags::empty();
        };

        for (index, portal) in portals.iter().enumerate() {
            if portal.is_touching(point) {
                return RigidBodyFlags::touching_portal(index);
            }
        }

        RigidBodyFlags::empty()
    }

    /// Index of the open portal touched by `point`.
    pub fn touched_portal(&self, point: Vector3) -> Option<usize> {
        let portals = self.both()?;
        portals.iter().position(|portal| portal.is_touching(point))
    }
}
