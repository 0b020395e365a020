// src/utils/constants_config.rs
use crate::errors::PhysicsError;
use crate::models::Vector3;
use crate::utils::DEFAULT_PHYSICS_CONSTANTS;

/// Tunable parameters shared by bodies, the broad-phase and the narrow-phase.
///
/// Damping factors are the fraction of velocity retained after one second,
/// applied as `v *= damping^dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConstants {
    /// Magnitude of gravitational acceleration in m/s², acting along −Y.
    pub gravity: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub default_restitution: f64,
    pub default_friction: f64,
    /// Objects a node holds before it subdivides.
    pub octree_max_objects: usize,
    pub octree_max_depth: usize,
    /// Relative determinant threshold: a matrix is singular when
    /// `|det| < singular_epsilon · max|mᵢⱼ|³`.
    pub singular_epsilon: f64,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        DEFAULT_PHYSICS_CONSTANTS
    }
}

impl PhysicsConstants {
    pub fn new(
        gravity: Option<f64>,
        linear_damping: Option<f64>,
        angular_damping: Option<f64>,
        default_restitution: Option<f64>,
        default_friction: Option<f64>,
        octree_max_objects: Option<usize>,
        octree_max_depth: Option<usize>,
    ) -> Self {
        let default = DEFAULT_PHYSICS_CONSTANTS;
        Self {
            gravity: gravity.unwrap_or(default.gravity),
            linear_damping: linear_damping.unwrap_or(default.linear_damping),
            angular_damping: angular_damping.unwrap_or(default.angular_damping),
            default_restitution: default_restitution.unwrap_or(default.default_restitution),
            default_friction: default_friction.unwrap_or(default.default_friction),
            octree_max_objects: octree_max_objects.unwrap_or(default.octree_max_objects),
            octree_max_depth: octree_max_depth.unwrap_or(default.octree_max_depth),
            singular_epsilon: default.singular_epsilon,
        }
    }

    /// Replaces the singular-matrix threshold used when bodies invert their inertia.
    pub fn with_singular_epsilon(self, singular_epsilon: f64) -> Self {
        Self { singular_epsilon, ..self }
    }

    /// Checks that every parameter is inside its accepted range.
    ///
    /// # Errors
    /// Returns `PhysicsError::InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfiguration("gravity must be finite".to_string()));
        }
        if !(self.linear_damping > 0.0 && self.linear_damping <= 1.0) {
            return Err(PhysicsError::InvalidConfiguration("linear_damping must be in (0, 1]".to_string()));
        }
        if !(self.angular_damping > 0.0 && self.angular_damping <= 1.0) {
            return Err(PhysicsError::InvalidConfiguration("angular_damping must be in (0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.default_restitution) {
            return Err(PhysicsError::InvalidConfiguration("default_restitution must be in [0, 1]".to_string()));
        }
        if !(self.default_friction >= 0.0 && self.default_friction.is_finite()) {
            return Err(PhysicsError::InvalidConfiguration("default_friction must be non-negative".to_string()));
        }
        if self.octree_max_objects == 0 {
            return Err(PhysicsError::InvalidConfiguration("octree_max_objects must be at least 1".to_string()));
        }
        if !(self.singular_epsilon > 0.0) {
            return Err(PhysicsError::InvalidConfiguration("singular_epsilon must be positive".to_string()));
        }
        Ok(())
    }

    /// Gravitational acceleration as a world-space vector.
    pub fn gravity_vector(&self) -> Vector3 {
        Vector3::new(0.0, -self.gravity, 0.0)
    }

    /// Force gravity exerts on a body of the given mass.
    pub fn gravity_force(&self, mass: f64) -> Result<Vector3, PhysicsError> {
        if !(mass > 0.0) || !mass.is_finite() { return Err(PhysicsError::InvalidMass); }
        Ok(self.gravity_vector() * mass)
    }
}
