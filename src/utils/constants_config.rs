// src/utils/constants_config.rs
use crate::utils::{
    DEFAULT_SIMULATION_CONFIG,
    errors::PhysicsError
};

/// Tunables for one fixed simulation step.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub fixed_delta_time: f64,
    pub gravity: f64,
    pub baumgarte: f64,
    pub penetration_slop: f64,
    pub solver_iterations: usize,
    /// Approach speed above which restitution is added to the contact bias.
    pub restitution_velocity_threshold: f64,
    pub sleep_velocity_threshold: f64,
    /// Seconds a body has to stay below the sleep threshold before it sleeps.
    pub sleep_time: f64,
    pub angular_damping: f64,
    pub kill_plane_y: f64,
    pub max_portal_speed: f64,
    pub min_portal_speed: f64,
    /// Per-step displacement above which a body collides with static geometry using a sweep.
    pub swept_distance_threshold: f64,
    pub max_portal_passes: u32,
    pub manifold_capacity: usize,
    pub dynamic_object_capacity: usize,
}


impl Default for SimulationConfig {
    fn default() -> Self {
        DEFAULT_SIMULATION_CONFIG
    }
}

impl SimulationConfig {
    pub fn new(
        fixed_delta_time: Option<f64>,
        gravity: Option<f64>,
        baumgarte: Option<f64>,
        penetration_slop: Option<f64>,
    ) -> Self {
        let default = DEFAULT_SIMULATION_CONFIG;
        Self {
            fixed_delta_time: fixed_delta_time.unwrap_or(default.fixed_delta_time),
            gravity: gravity.unwrap_or(default.gravity),
            baumgarte: baumgarte.unwrap_or(default.baumgarte),
            penetration_slop: penetration_slop.unwrap_or(default.penetration_slop),
            ..default
        }
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.fixed_delta_time > 0.0) { return Err(PhysicsError::InvalidTime); }
        if self.baumgarte < 0.0 {
            return Err(PhysicsError::CalculationError("Baumgarte factor must be non-negative".to_string()));
        }
        if self.manifold_capacity == 0 || self.dynamic_object_capacity == 0 {
            return Err(PhysicsError::CalculationError("Scene capacities must be positive".to_string()));
        }
        Ok(())
    }

    /// Number of consecutive quiet steps before a body falls asleep.
    pub fn idle_sleep_frames(&self) -> u32 {
        (self.sleep_time / self.fixed_delta_time).round().max(1.0) as u32
    }

    /// Velocity change gravity applies over one step.
    pub fn gravity_step(&self) -> f64 {
        self.gravity * self.fixed_delta_time
    }
}
