// src/utils/constants_config_tests.rs

use crate::assert_float_eq;
use crate::errors::PhysicsError;
use crate::utils::{PhysicsConstants, DEFAULT_PHYSICS_CONSTANTS};

#[test]
fn test_default_constants_are_valid() {
    let constants = PhysicsConstants::default();
    assert_eq!(constants, DEFAULT_PHYSICS_CONSTANTS);
    assert!(constants.validate().is_ok());
    assert_float_eq(constants.gravity, 9.80665, 1e-12, Some("Standard gravity"));
}

#[test]
fn test_new_overrides_only_given_fields() {
    let constants = PhysicsConstants::new(Some(3.711), None, Some(0.5), None, None, Some(4), None);
    assert_float_eq(constants.gravity, 3.711, 1e-12, None);
    assert_float_eq(constants.linear_damping, DEFAULT_PHYSICS_CONSTANTS.linear_damping, 1e-12, None);
    assert_float_eq(constants.angular_damping, 0.5, 1e-12, None);
    assert_eq!(constants.octree_max_objects, 4);
    assert_eq!(constants.octree_max_depth, DEFAULT_PHYSICS_CONSTANTS.octree_max_depth);
}

#[test]
fn test_validate_rejects_out_of_range_values() {
    let mut constants = PhysicsConstants::default();
    constants.linear_damping = 0.0;
    assert!(matches!(constants.validate(), Err(PhysicsError::InvalidConfiguration(_))));

    let mut constants = PhysicsConstants::default();
    constants.angular_damping = 1.5;
    assert!(constants.validate().is_err());

    let mut constants = PhysicsConstants::default();
    constants.octree_max_objects = 0;
    assert!(constants.validate().is_err());

    let mut constants = PhysicsConstants::default();
    constants.default_restitution = -0.1;
    assert!(constants.validate().is_err());
}

#[test]
fn test_gravity_force_points_down() {
    let constants = PhysicsConstants::default();
    let force = constants.gravity_force(2.0).unwrap();
    assert_float_eq(force.x, 0.0, 1e-12, None);
    assert_float_eq(force.y, -2.0 * 9.80665, 1e-12, None);
    assert_eq!(constants.gravity_force(0.0), Err(PhysicsError::InvalidMass));
}
