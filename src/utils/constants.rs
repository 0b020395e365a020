use crate::utils;

pub const DEFAULT_PHYSICS_CONSTANTS: utils::PhysicsConstants = utils::PhysicsConstants {
    gravity: 9.80665,
    linear_damping: 0.99,
    angular_damping: 0.99,
    default_restitution: 0.5,
    default_friction: 0.5,
    octree_max_objects: 8,
    octree_max_depth: 8,
    singular_epsilon: 1e-10,
};

/// Below this length a vector is treated as zero (rotation axes, normals).
pub const EPSILON: f64 = 1e-10;
