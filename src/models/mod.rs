mod quaternion;
mod transform;
mod basis;
mod plane;
mod ray;
mod box3d;
mod simplex;
mod handles;
mod portal;
mod rigid_body;
mod collision_layers;

pub use quaternion::*;
pub use transform::*;
pub use basis::*;
pub use plane::*;
pub use ray::*;
pub use box3d::*;
pub use simplex::*;
pub use handles::*;
pub use portal::*;
pub use rigid_body::*;
pub use collision_layers::*;
