use bitflags::bitflags;

bitflags! {
    /// Layers an object lives on. Two objects only interact when their layers intersect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionLayers: u16 {
        const TANGIBLE = 1 << 0;
        const STATIC = 1 << 1;
        const TRANSPARENT = 1 << 2;
        const GRABBABLE = 1 << 3;
        const FIZZLER = 1 << 4;
        /// Surfaces portals cannot be placed on or shot through.
        const BLOCK_PORTAL = 1 << 5;
        const BLOCK_BALL = 1 << 6;
        const BLOCK_TURRET_SIGHT = 1 << 7;
        const BLOCK_TURRET_SHOTS = 1 << 8;
    }
}

impl CollisionLayers {
    pub fn interacts_with(&self, other: CollisionLayers) -> bool {
        self.intersects(other)
    }
}
