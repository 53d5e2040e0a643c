mod gjk;
mod epa;
mod contact_insertion;
mod contact_solver;
mod raycasting;

pub use gjk::*;
pub use epa::*;
pub use contact_insertion::*;
pub use contact_solver::*;
pub use raycasting::*;

#[cfg(test)]
mod epa_tests;
#[cfg(test)]
mod contact_tests;
