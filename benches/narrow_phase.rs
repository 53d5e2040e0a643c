use std::hint::black_box;
use std::rc::Rc;
use criterion::{Criterion, criterion_group, criterion_main};
use rs_portal_physics::interactions::{epa_solve, gjk_check_for_overlap};
use rs_portal_physics::models::{Basis, CollisionLayers, Ray, Simplex, Transform};
use rs_portal_physics::scene::{CollisionObject, CollisionScene, ObjectSupport};
use rs_portal_physics::shapes::{ColliderShape, ColliderTypeData, CollisionBox, CollisionQuad, CollisionSphere, QuadCollider};
use rs_portal_physics::utils::{SimulationConfig, ZERO_VECTOR};

fn box_collider(half: f64) -> ColliderTypeData {
    ColliderTypeData::new(ColliderShape::Box(CollisionBox::new((half, half, half)).unwrap()), 0.0, 0.5)
}

pub fn bench_gjk_epa(c: &mut Criterion) {
    let mut group = c.benchmark_group("gjk_epa");
    group.measurement_time(std::time::Duration::from_secs(5));
    group.sample_size(100);

    let shape = box_collider(1.0);
    let sphere = ColliderTypeData::new(ColliderShape::Sphere(CollisionSphere::new(1.0).unwrap()), 0.0, 0.5);
    let a = ObjectSupport { collider: &shape, basis: Basis::identity(), position: ZERO_VECTOR };
    let b = ObjectSupport { collider: &shape, basis: Basis::identity(), position: (1.5, 0.3, 0.2) };
    let ball = ObjectSupport { collider: &sphere, basis: Basis::identity(), position: (1.4, 0.6, -0.3) };

    group.bench_function("gjk_box_box", |bench| bench.iter(|| {
        let mut simplex = Simplex::new();
        black_box(gjk_check_for_overlap(&mut simplex, &a, &b, (1.5, 0.3, 0.2)))
    }));

    group.bench_function("gjk_epa_box_box", |bench| bench.iter(|| {
        let mut simplex = Simplex::new();
        if gjk_check_for_overlap(&mut simplex, &a, &b, (1.5, 0.3, 0.2)) {
            black_box(epa_solve(&simplex, &a, &b));
        }
    }));

    group.bench_function("gjk_epa_box_sphere", |bench| bench.iter(|| {
        let mut simplex = Simplex::new();
        if gjk_check_for_overlap(&mut simplex, &a, &ball, (1.4, 0.6, -0.3)) {
            black_box(epa_solve(&simplex, &a, &ball));
        }
    }));
}

fn stacked_scene() -> CollisionScene {
    let mut scene = CollisionScene::new(SimulationConfig::default()).unwrap();
    let floor = CollisionQuad::new((-10.0, 0.0, -10.0), (0.0, 0.0, 20.0), (20.0, 0.0, 0.0), 0.0).unwrap();
    scene.add_static_quad(QuadCollider::new(floor, CollisionLayers::all()), None).unwrap();

    let collider = Rc::new(box_collider(0.5));
    for i in 0..16 {
        let position = ((i % 4) as f64 * 1.5 - 2.25, 0.5 + (i / 4) as f64 * 1.1, 0.0);
        let object = CollisionObject::new(collider.clone(), 1.0, CollisionLayers::TANGIBLE, scene.config())
            .unwrap()
            .with_transform(Transform::from_position(position));
        scene.add_dynamic_object(object).unwrap();
    }

    scene
}

pub fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    group.measurement_time(std::time::Duration::from_secs(5));
    group.sample_size(50);

    group.bench_function("update_dynamics_16_boxes", |bench| {
        let mut scene = stacked_scene();
        bench.iter(|| scene.update_dynamics())
    });

    let scene = stacked_scene();
    let ray = Ray::new((-9.0, 0.6, 0.0), (1.0, 0.0, 0.0));
    group.bench_function("raycast", |bench| bench.iter(|| {
        black_box(scene.raycast(None, ray, CollisionLayers::all(), 50.0))
    }));
}

criterion_group!(benches, bench_gjk_epa, bench_scene);
criterion_main!(benches);
