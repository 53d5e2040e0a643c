mod constants;
mod constants_config;
mod math_helpers;
pub mod errors;

pub use constants::*;
pub use constants_config::*;
pub use math_helpers::*;
pub use errors::PhysicsError;

#[cfg(test)]
mod math_helpers_tests;
