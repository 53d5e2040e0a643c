mod collider;
mod collision_box;
mod collision_sphere;
mod unit_circle;
mod collision_capsule;
mod collision_cylinder;
mod collision_tetrahedron;
mod collision_quad;
mod compound_collider;
mod mesh_collider;

pub use collider::*;
pub use collision_box::*;
pub use collision_sphere::*;
pub use collision_capsule::*;
pub use collision_cylinder::*;
pub use collision_tetrahedron::*;
pub use collision_quad::*;
pub use compound_collider::*;
pub use mesh_collider::*;
