// demos/portal_drop.rs
//
// Run with `RUST_LOG=info cargo run --example portal_drop`.

use std::f64::consts::PI;
use std::rc::Rc;
use log::info;
use rs_portal_physics::models::{CollisionLayers, Portal, Quaternion, Ray, RigidBodyFlags, Transform};
use rs_portal_physics::scene::{CollisionObject, CollisionScene};
use rs_portal_physics::shapes::{ColliderShape, ColliderTypeData, CollisionBox, CollisionQuad, CollisionSphere, QuadCollider};
use rs_portal_physics::utils::{PhysicsError, SimulationConfig};

fn main() -> Result<(), PhysicsError> {
    env_logger::init();

    let mut scene = CollisionScene::new(SimulationConfig::default())?;

    let floor = CollisionQuad::new((-10.0, 0.0, -10.0), (0.0, 0.0, 20.0), (20.0, 0.0, 0.0), 0.0)?;
    scene.add_static_quad(QuadCollider::new(floor, CollisionLayers::all()), None)?;

    let crate_collider = Rc::new(ColliderTypeData::new(ColliderShape::Box(CollisionBox::new((0.25, 0.25, 0.25))?), 0.1, 0.6));
    let crate_box = CollisionObject::new(crate_collider, 2.0, CollisionLayers::TANGIBLE, scene.config())?
        .with_transform(Transform::from_position((-2.0, 4.0, 0.0)));
    let crate_handle = scene.add_dynamic_object(crate_box)?;

    // a ball already half inside the entry portal, drifting into it
    let facing_x = Quaternion::from_axis_angle((0.0, 1.0, 0.0), PI / 2.0);
    scene.open_portal(0, Portal::new(Transform::new((5.0, 1.0, 0.0), facing_x), None))?;
    scene.open_portal(1, Portal::new(Transform::new((40.0, 1.0, 0.0), facing_x), None))?;

    let ball_collider = Rc::new(ColliderTypeData::new(ColliderShape::Sphere(CollisionSphere::new(0.25)?), 0.5, 0.2));
    let mut ball = CollisionObject::new(ball_collider, 1.0, CollisionLayers::TANGIBLE, scene.config())?
        .with_transform(Transform::from_position((4.85, 1.0, 0.0)));
    ball.body.flags.insert(RigidBodyFlags::DISABLE_GRAVITY | RigidBodyFlags::TOUCHING_PORTAL_A);
    ball.body.velocity = (3.0, 0.0, 0.0);
    let ball_handle = scene.add_dynamic_object(ball)?;

    for tick in 0..60 {
        scene.update_dynamics();

        if tick % 10 == 0 {
            if let (Some(crate_box), Some(ball)) = (scene.object(crate_handle), scene.object(ball_handle)) {
                info!("tick {:>2}: crate at {:?}, ball at {:?}", tick, crate_box.position(), ball.position());
            }
        }
    }

    let ray = Ray::new((0.0, 1.0, 0.0), (1.0, 0.0, 0.0));
    match scene.raycast(None, ray, CollisionLayers::all(), 100.0) {
        Some(hit) => info!(
            "ray stopped at {:?} after {:.2} units, {} portal(s) passed",
            hit.at, hit.distance, hit.portals_passed
        ),
        None => info!("ray hit nothing"),
    }

    info!("{} contact manifolds alive", scene.contact_solver().len());
    Ok(())
}
