// src/models/material.rs

use crate::errors::PhysicsError;
use crate::utils::{PhysicsConstants, DEFAULT_PHYSICS_CONSTANTS};

/// Surface coefficients carried into every contact a body takes part in.
///
/// # Properties
/// * `restitution` - Coefficient of restitution for collisions, in `[0, 1]`
/// * `friction` - Coefficient of (Coulomb) friction, non-negative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub restitution: f64,
    pub friction: f64,
}

impl Default for Material {
    fn default() -> Self {
        Material::from_constants(&DEFAULT_PHYSICS_CONSTANTS)
    }
}

impl Material {
    /// Creates a new material.
    ///
    /// # Errors
    /// `PhysicsError::InvalidConfiguration` when restitution is outside `[0, 1]` or
    /// friction is negative.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Material;
    ///
    /// let ice = Material::new(0.1, 0.03).unwrap();
    /// assert_eq!(ice.friction, 0.03);
    /// assert!(Material::new(1.5, 0.2).is_err());
    /// ```
    pub fn new(restitution: f64, friction: f64) -> Result<Self, PhysicsError> {
        if !(0.0..=1.0).contains(&restitution) {
            return Err(PhysicsError::InvalidConfiguration("restitution must be in [0, 1]".to_string()));
        }
        if !(friction >= 0.0 && friction.is_finite()) {
            return Err(PhysicsError::InvalidConfiguration("friction must be non-negative".to_string()));
        }
        Ok(Material { restitution, friction })
    }

    pub fn from_constants(constants: &PhysicsConstants) -> Self {
        Material {
            restitution: constants.default_restitution,
            friction: constants.default_friction,
        }
    }

    pub fn steel() -> Self {
        Material { restitution: 0.6, friction: 0.74 }
    }

    pub fn rubber() -> Self {
        Material { restitution: 0.85, friction: 1.0 }
    }

    pub fn wood() -> Self {
        Material { restitution: 0.4, friction: 0.5 }
    }

    /// Coefficients for a contact between two materials: the bouncier restitution
    /// wins, friction is the geometric mean.
    pub fn combine(&self, other: &Material) -> Material {
        Material {
            restitution: self.restitution.max(other.restitution),
            friction: (self.friction * other.friction).sqrt(),
        }
    }
}
