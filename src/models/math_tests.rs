// src/models/math_tests.rs

use std::f64::consts::{FRAC_PI_2, PI};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::assert_float_eq;
use crate::errors::PhysicsError;
use crate::models::{Aabb, Matrix3x3, Quaternion, Vector3};

fn random_unit_vector(rng: &mut StdRng) -> Vector3 {
    loop {
        let v = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if v.length() > 0.1 {
            return v.normalized();
        }
    }
}

#[test]
fn test_vector_arithmetic() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(4.0, 5.0, 6.0);
    assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
    assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
    assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
    assert_eq!(2.0 * a, Vector3::new(2.0, 4.0, 6.0));
    assert_eq!(b / 2.0, Vector3::new(2.0, 2.5, 3.0));
    assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
    assert_float_eq(a.dot(&b), 32.0, 1e-12, None);
    assert_eq!(a.cross(&b), Vector3::new(-3.0, 6.0, -3.0));
}

#[test]
fn test_vector_setters_mutate_in_place() {
    let mut v = Vector3::ZERO;
    v.set_x(1.0);
    v.set_y(-2.0);
    v.set_z(3.5);
    assert_eq!(v, Vector3::new(1.0, -2.0, 3.5));
}

#[test]
fn test_set_vector_length() {
    let mut v = Vector3::new(3.0, 0.0, 4.0);
    let len = v.set_vector_length(10.0).length();
    assert_float_eq(len, 10.0, 1e-12, Some("Chained length should be 10"));
    assert_abs_diff_eq!(v, Vector3::new(6.0, 0.0, 8.0), epsilon = 1e-12);

    let mut zero = Vector3::ZERO;
    zero.set_vector_length(1.0);
    assert_eq!(zero, Vector3::ZERO, "Zero vector must stay zero");
}

#[test]
fn test_rotate_vector_quarter_turn() {
    let v = Vector3::UNIT_X.rotate_vector(&Vector3::UNIT_Z, FRAC_PI_2);
    assert_abs_diff_eq!(v, Vector3::UNIT_Y, epsilon = 1e-12);
}

#[test]
fn test_rotate_vector_identity_and_zero_axis() {
    let axis = Vector3::new(1.0, 2.0, -0.5).normalized();
    assert_abs_diff_eq!(axis.rotate_vector(&axis, 0.0), axis, epsilon = 1e-12);

    let v = Vector3::new(1.0, 2.0, 3.0);
    assert_eq!(v.rotate_vector(&Vector3::ZERO, 1.2), v);
}

#[test]
fn test_rotate_vector_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let axis = random_unit_vector(&mut rng);
        let v = random_unit_vector(&mut rng) * rng.random_range(0.1..10.0);
        let theta = rng.random_range(-2.0 * PI..2.0 * PI);
        let back = v.rotate_vector(&axis, theta).rotate_vector(&axis, -theta);
        assert_abs_diff_eq!(back, v, epsilon = 1e-9);
    }
}

#[test]
fn test_matrix_determinant_and_inverse() {
    let m = Matrix3x3::new([2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0]);
    assert_float_eq(m.determinant(), 6.0, 1e-12, Some("Sarrus determinant"));

    let inverse = m.inverse().unwrap();
    assert_relative_eq!(m * inverse, Matrix3x3::identity(), epsilon = 1e-12);
    assert_relative_eq!(inverse * m, Matrix3x3::identity(), epsilon = 1e-12);
}

#[test]
fn test_matrix_inverse_is_scale_relative() {
    let tiny = Matrix3x3::from_diagonal(4e-4, 4e-4, 4e-4);
    assert!(tiny.determinant() < 1e-10);
    assert_relative_eq!(tiny.inverse().unwrap(), Matrix3x3::from_diagonal(2500.0, 2500.0, 2500.0), max_relative = 1e-12);

    let huge = Matrix3x3::from_diagonal(1e6, 1e6, 1e-6);
    assert_eq!(huge.inverse(), Err(PhysicsError::SingularMatrix), "Ill-conditioned despite a large determinant");
    assert!(huge.inverse_with_epsilon(1e-20).is_ok());
    assert_eq!(Matrix3x3::from_diagonal(1.0, 1.0, f64::NAN).inverse(), Err(PhysicsError::SingularMatrix));
}

#[test]
fn test_matrix_inverse_singular() {
    let singular = Matrix3x3::new([1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]);
    assert_eq!(singular.inverse(), Err(PhysicsError::SingularMatrix));

    let (fallback, ok) = singular.inverse_or_identity();
    assert!(!ok);
    assert_eq!(fallback, Matrix3x3::identity());

    let (inverse, ok) = Matrix3x3::from_diagonal(2.0, 2.0, 2.0).inverse_or_identity();
    assert!(ok);
    assert_float_eq(inverse.get(2, 2), 0.5, 1e-12, None);
}

#[test]
fn test_matrix_arithmetic_and_transpose() {
    let a = Matrix3x3::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    let t = a.transpose();
    assert_float_eq(t.get(0, 2), 7.0, 1e-12, None);
    assert_float_eq(t.get(2, 0), 3.0, 1e-12, None);

    let sum = a + Matrix3x3::identity();
    assert_float_eq(sum.get(1, 1), 6.0, 1e-12, None);
    let diff = sum - a;
    assert_eq!(diff, Matrix3x3::identity());
    assert_float_eq((a * 2.0).get(2, 1), 16.0, 1e-12, None);

    let v = a * Vector3::new(1.0, 0.0, -1.0);
    assert_eq!(v, Vector3::new(-2.0, -2.0, -2.0));
}

#[test]
fn test_quaternion_rotate_matches_matrix() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let q = Quaternion::from_axis_angle(&random_unit_vector(&mut rng), rng.random_range(-PI..PI));
        let v = random_unit_vector(&mut rng) * 3.0;
        let by_quaternion = q.rotate(&v);
        let by_matrix = q.to_rotation_matrix() * v;
        assert_abs_diff_eq!(by_quaternion, by_matrix, epsilon = 1e-10);

        let sandwich = q.multiply(&Quaternion::from_vector(&v)).multiply(&q.conjugate());
        assert_abs_diff_eq!(by_quaternion, sandwich.vector_part(), epsilon = 1e-10);
        assert_abs_diff_eq!(q.inverse_rotate(&by_quaternion), v, epsilon = 1e-10);
    }
}

#[test]
fn test_quaternion_hamilton_product() {
    let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
    let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
    let k = Quaternion::new(0.0, 0.0, 0.0, 1.0);
    assert_eq!(i * j, k);
    assert_eq!(j * i, Quaternion::new(0.0, 0.0, 0.0, -1.0));
    assert_eq!(i * i, Quaternion::new(-1.0, 0.0, 0.0, 0.0));
}

#[test]
fn test_quaternion_degenerate_fallbacks() {
    let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
    assert_eq!(zero.normalized(), Quaternion::identity());
    assert_eq!(zero.inverse(), Quaternion::identity());
    assert_eq!(Quaternion::from_axis_angle(&Vector3::ZERO, 1.0), Quaternion::identity());

    let (axis, angle) = Quaternion::identity().to_axis_angle();
    assert_float_eq(axis.length(), 1.0, 1e-12, Some("Axis must be unit even for zero angle"));
    assert_float_eq(angle, 0.0, 1e-12, None);
}

#[test]
fn test_quaternion_axis_angle_round_trip() {
    let axis = Vector3::new(0.0, 3.0, 4.0).normalized();
    let q = Quaternion::from_axis_angle(&axis, 1.25);
    let (back_axis, back_angle) = q.to_axis_angle();
    assert_abs_diff_eq!(back_axis, axis, epsilon = 1e-10);
    assert_float_eq(back_angle, 1.25, 1e-10, None);
}

#[test]
fn test_quaternion_integrate_preserves_unit_norm() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut q = Quaternion::identity();
    for _ in 0..10_000 {
        let omega = random_unit_vector(&mut rng) * rng.random_range(0.0..20.0);
        let dt = rng.random_range(0.0..0.05);
        q = q.integrate(&omega, dt);
        assert!((q.magnitude() - 1.0).abs() < 1e-9, "|q| drifted to {}", q.magnitude());
    }
}

#[test]
fn test_quaternion_integrate_follows_rotation() {
    // Constant spin about Z at π/2 rad/s for one second in small steps.
    let omega = Vector3::new(0.0, 0.0, FRAC_PI_2);
    let mut q = Quaternion::identity();
    for _ in 0..1000 {
        q = q.integrate(&omega, 0.001);
    }
    let v = q.rotate(&Vector3::UNIT_X);
    assert_abs_diff_eq!(v, Vector3::UNIT_Y, epsilon = 1e-3);
}

#[test]
fn test_quaternion_euler_round_trip() {
    let q = Quaternion::from_euler(0.3, -0.4, 1.1);
    let (roll, pitch, yaw) = q.to_euler();
    assert_float_eq(roll, 0.3, 1e-10, None);
    assert_float_eq(pitch, -0.4, 1e-10, None);
    assert_float_eq(yaw, 1.1, 1e-10, None);
}

#[test]
fn test_quaternion_slerp_endpoints_and_midpoint() {
    let a = Quaternion::identity();
    let b = Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2);
    assert_relative_eq!(a.slerp(&b, 0.0), a, epsilon = 1e-12);
    assert_relative_eq!(a.slerp(&b, 1.0), b, epsilon = 1e-12);
    let mid = a.slerp(&b, 0.5);
    assert_relative_eq!(mid, Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2 / 2.0), epsilon = 1e-12);
}

#[test]
fn test_aabb_intersects_and_contains() {
    let a = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0)).unwrap();
    let touching = Aabb::new(Vector3::new(1.0, -1.0, -1.0), Vector3::new(2.0, 1.0, 1.0)).unwrap();
    let apart = Aabb::new(Vector3::new(1.5, 1.5, 1.5), Vector3::new(2.0, 2.0, 2.0)).unwrap();
    assert!(a.intersects(&touching));
    assert!(!a.intersects(&apart));
    assert!(a.contains_aabb(&Aabb::from_center_half_extents(Vector3::ZERO, Vector3::new(0.5, 0.5, 0.5))));
    assert!(!a.contains_aabb(&touching));
    assert!(Aabb::new(Vector3::new(1.0, 0.0, 0.0), Vector3::ZERO).is_err());
}

#[test]
fn test_aabb_octants_partition_parent() {
    let parent = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 4.0, 4.0)).unwrap();
    let mut volume = 0.0;
    for i in 0..8 {
        let child = parent.octant(i);
        assert!(parent.contains_aabb(&child));
        let size = child.size();
        assert_abs_diff_eq!(size, Vector3::new(2.0, 2.0, 2.0), epsilon = 1e-12);
        volume += size.x * size.y * size.z;
    }
    assert_float_eq(volume, 64.0, 1e-12, None);
    assert_eq!(parent.octant(7).min, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn test_aabb_sphere_queries() {
    let a = Aabb::from_center_half_extents(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
    assert_float_eq(a.distance_squared_to_point(&Vector3::new(3.0, 0.0, 0.0)), 4.0, 1e-12, None);
    assert!(a.intersects_sphere(&Vector3::new(3.0, 0.0, 0.0), 2.0));
    assert!(!a.intersects_sphere(&Vector3::new(3.0, 0.0, 0.0), 1.9));
}
