use std::fmt;
use std::error::Error;

/// Represents errors that can occur while building or stepping rigid bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Indicates an invalid mass value (e.g., negative, zero or non-finite mass).
    InvalidMass,
    /// Indicates an invalid time step (e.g., negative or non-finite `dt`).
    InvalidTime,
    /// Indicates a shape dimension that is zero, negative or not finite.
    InvalidGeometry(String),
    /// Indicates a matrix whose determinant is too close to zero to be inverted.
    SingularMatrix,
    /// Indicates world bounds whose minimum exceeds the maximum on some axis.
    InvalidBounds,
    /// Indicates a configuration value outside its accepted range.
    InvalidConfiguration(String),
    /// Indicates a body handle that does not refer to a live body.
    BodyNotFound(usize),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PhysicsError::InvalidMass => write!(f, "Invalid mass value"),
            PhysicsError::InvalidTime => write!(f, "Invalid time value"),
            PhysicsError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            PhysicsError::SingularMatrix => write!(f, "Matrix is singular and cannot be inverted"),
            PhysicsError::InvalidBounds => write!(f, "Invalid bounds: minimum exceeds maximum"),
            PhysicsError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            PhysicsError::BodyNotFound(id) => write!(f, "No body with id {}", id),
        }
    }
}

impl Error for PhysicsError {}
