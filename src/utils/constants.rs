use crate::utils;

pub const DEFAULT_SIMULATION_CONFIG: utils::SimulationConfig = utils::SimulationConfig {
    fixed_delta_time: 1.0 / 30.0,
    gravity: -9.8,
    baumgarte: 0.2,
    penetration_slop: 0.01,
    solver_iterations: 2,
    restitution_velocity_threshold: 1.0,
    sleep_velocity_threshold: 0.001,
    sleep_time: 0.5,
    angular_damping: 0.99,
    kill_plane_y: -10.0,
    max_portal_speed: 1000.0 / 64.0,
    min_portal_speed: 300.0 / 64.0,
    swept_distance_threshold: 0.25,
    max_portal_passes: 2,
    manifold_capacity: 64,
    dynamic_object_capacity: 64,
};

// GJK / EPA
pub const MAX_GJK_ITERATIONS: usize = 10;
pub const MAX_SIMPLEX_SIZE: usize = 4;
pub const MAX_EPA_ITERATIONS: usize = 10;
pub const EPA_CONVERGENCE_TOLERANCE: f64 = 0.001;
pub const MAX_EPA_POINTS: usize = MAX_SIMPLEX_SIZE + MAX_EPA_ITERATIONS;
pub const MAX_EPA_TRIANGLES: usize = 4 + 2 * MAX_EPA_ITERATIONS;
/// Squared length under which a GJK search direction counts as degenerate.
pub const GJK_DEGENERATE_DIRECTION: f64 = 1e-7;

// contacts
pub const MAX_CONTACTS_PER_MANIFOLD: usize = 8;
pub const NEGATIVE_PENETRATION_BIAS: f64 = 0.00001;
pub const CONTACT_MOVE_TOLERANCE: f64 = 0.1;

// colliders
pub const COMPOUND_COLLIDER_MAX_CHILD_COUNT: usize = 4;
pub const EDGE_ZERO_BIAS: f64 = 0.001;

// raycasting
pub const NEAR_DOT_ZERO: f64 = 0.00001;
pub const MIN_RAY_LENGTH: f64 = 0.0001;
pub const NEAR_EDGE_ZERO: f64 = 0.001;

// portals
pub const PORTAL_THICKNESS: f64 = 0.11;
pub const PORTAL_X_RADIUS: f64 = 0.5;
pub const PORTAL_EXIT_XY_CLAMP_DISTANCE: f64 = 0.15;

/// Room bitmasks are `u64`, so only the first 64 rooms can be reported.
pub const MAX_TRACKED_ROOMS: usize = 64;
