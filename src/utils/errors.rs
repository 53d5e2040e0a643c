use std::fmt;
use std::error::Error;

/// Represents errors that can occur while building or registering collision state.
///
/// The per-tick collision pipeline never returns these; they only come out of
/// constructors and scene registration calls.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Indicates an invalid mass value (e.g., negative or zero mass).
    InvalidMass,
    /// Indicates a negative or non-finite shape dimension.
    InvalidDimension(String),
    /// Indicates an invalid time value (e.g., a non-positive timestep).
    InvalidTime,
    /// A compound collider was given more children than it can hold.
    TooManyChildren { max: usize, found: usize },
    /// A compound or mesh collider was built without any children.
    EmptyCollider,
    /// The scene has no room left for another dynamic object.
    SceneFull { capacity: usize },
    /// The handle does not refer to a registered object.
    UnknownObject,
    /// Portal index outside of 0..=1.
    InvalidPortalIndex(usize),
    /// Room index outside of the world.
    InvalidRoom(usize),
    /// A general error for calculations that produce invalid results.
    CalculationError(String),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PhysicsError::InvalidMass => write!(f, "Invalid mass value"),
            PhysicsError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            PhysicsError::InvalidTime => write!(f, "Invalid time value"),
            PhysicsError::TooManyChildren { max, found } => {
                write!(f, "Too many collider children: {} (max {})", found, max)
            }
            PhysicsError::EmptyCollider => write!(f, "Collider has no children"),
            PhysicsError::SceneFull { capacity } => {
                write!(f, "Collision scene is full ({} dynamic objects)", capacity)
            }
            PhysicsError::UnknownObject => write!(f, "Unknown collision object"),
            PhysicsError::InvalidPortalIndex(index) => write!(f, "Invalid portal index {}", index),
            PhysicsError::InvalidRoom(room) => write!(f, "Invalid room index {}", room),
            PhysicsError::CalculationError(msg) => write!(f, "Calculation error: {}", msg),
        }
    }
}


impl Error for PhysicsError {}
