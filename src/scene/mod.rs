mod collision_object;
mod narrow_phase;
mod world;
mod collision_scene;

pub use collision_object::*;
pub use narrow_phase::*;
pub use world::*;
pub use collision_scene::*;

#[cfg(test)]
mod world_tests;
#[cfg(test)]
mod collision_scene_tests;
