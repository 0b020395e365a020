// src/interactions/collision_detector_tests.rs

use std::f64::consts::FRAC_PI_4;
use std::rc::Rc;
use approx::assert_abs_diff_eq;
use crate::assert_float_eq;
use crate::interactions::{apply_contact_impulse, detect_sphere_sphere, CollisionDetector, Contact};
use crate::models::{Material, Quaternion, RigidBody, Shape3D, Vector3};

fn body(shape: Shape3D, position: Vector3) -> RigidBody {
    RigidBody::with_shape(1.0, position, Rc::new(shape)).unwrap()
}

fn sphere(radius: f64, position: Vector3) -> RigidBody {
    body(Shape3D::new_sphere(radius).unwrap(), position)
}

fn cube(position: Vector3) -> RigidBody {
    body(Shape3D::new_cuboid(2.0, 2.0, 2.0).unwrap(), position)
}

fn cylinder(position: Vector3) -> RigidBody {
    body(Shape3D::new_cylinder(1.0, 2.0).unwrap(), position)
}

fn pyramid(position: Vector3) -> RigidBody {
    body(Shape3D::new_pyramid(2.0, 2.0).unwrap(), position)
}

fn assert_normal(contact: &Contact, expected: Vector3, tolerance: f64) {
    assert_abs_diff_eq!(contact.normal, expected, epsilon = tolerance);
    assert_float_eq(contact.normal.length(), 1.0, 1e-9, Some("Contact normal must be unit length"));
}

#[test]
fn test_sphere_sphere_overlap() {
    let _ = env_logger::builder().is_test(true).try_init();
    let a = sphere(1.0, Vector3::ZERO);
    let b = sphere(1.0, Vector3::new(1.5, 0.0, 0.0));
    let detector = CollisionDetector::new();

    let contact = detector.detect_collision(&a, &b).unwrap();
    assert_float_eq(contact.penetration, 0.5, 1e-12, Some("Overlap of two unit spheres 1.5 apart"));
    assert_normal(&contact, Vector3::UNIT_X, 1e-12);
    assert_abs_diff_eq!(contact.point, Vector3::new(0.75, 0.0, 0.0), epsilon = 1e-12);

    let reversed = detector.detect_collision(&b, &a).unwrap();
    assert_normal(&reversed, -Vector3::UNIT_X, 1e-12);
    assert_float_eq(reversed.penetration, 0.5, 1e-12, None);
}

#[test]
fn test_sphere_sphere_direct_call() {
    let a = sphere(1.0, Vector3::ZERO);
    let b = sphere(1.0, Vector3::new(0.0, 1.5, 0.0));
    let (sa, sb) = match (a.shape().unwrap().as_ref(), b.shape().unwrap().as_ref()) {
        (Shape3D::Sphere(sa), Shape3D::Sphere(sb)) => (*sa, *sb),
        other => panic!("Unexpected shapes {:?}", other),
    };
    let contact = detect_sphere_sphere(&a, &sa, &b, &sb).unwrap();
    assert_float_eq(contact.penetration, 0.5, 1e-12, None);
    assert_normal(&contact, Vector3::UNIT_Y, 1e-12);
}

#[test]
fn test_sphere_sphere_separated_touching_and_coincident() {
    let detector = CollisionDetector::new();
    let a = sphere(1.0, Vector3::ZERO);
    assert!(detector.detect_collision(&a, &sphere(1.0, Vector3::new(3.0, 0.0, 0.0))).is_none());
    assert!(detector.detect_collision(&a, &sphere(1.0, Vector3::new(2.0, 0.0, 0.0))).is_none(), "Touching is not penetrating");

    let coincident = detector.detect_collision(&a, &sphere(0.5, Vector3::ZERO)).unwrap();
    assert_float_eq(coincident.penetration, 1.5, 1e-12, None);
    assert_normal(&coincident, Vector3::UNIT_X, 1e-12);
}

#[test]
fn test_bodies_without_shape_never_collide() {
    let bare = RigidBody::new(1.0, Vector3::ZERO).unwrap();
    let ball = sphere(1.0, Vector3::ZERO);
    let detector = CollisionDetector::new();
    assert!(detector.detect_collision(&bare, &ball).is_none());
    assert!(detector.detect_manifold(&ball, &bare).is_none());
}

#[test]
fn test_sphere_box_face_and_reverse() {
    let detector = CollisionDetector::new();
    let ball = sphere(1.0, Vector3::new(1.5, 0.0, 0.0));
    let block = cube(Vector3::ZERO);

    let contact = detector.detect_collision(&ball, &block).unwrap();
    assert_float_eq(contact.penetration, 0.5, 1e-12, None);
    assert_normal(&contact, -Vector3::UNIT_X, 1e-12);
    assert_abs_diff_eq!(contact.point, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

    let reversed = detector.detect_collision(&block, &ball).unwrap();
    assert_normal(&reversed, Vector3::UNIT_X, 1e-12);

    assert!(detector.detect_collision(&sphere(1.0, Vector3::new(2.5, 0.0, 0.0)), &block).is_none());
}

#[test]
fn test_sphere_centre_inside_box() {
    let contact = CollisionDetector::new()
        .detect_collision(&sphere(0.5, Vector3::new(0.8, 0.1, 0.0)), &cube(Vector3::ZERO))
        .unwrap();
    assert_float_eq(contact.penetration, 0.7, 1e-12, Some("Radius plus distance to the nearest face"));
    assert_normal(&contact, -Vector3::UNIT_X, 1e-12);
}

#[test]
fn test_sphere_against_rotated_box_corner() {
    let mut block = cube(Vector3::ZERO);
    block.set_orientation(Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_4));
    let ball = sphere(0.3, Vector3::new(1.6, 0.0, 0.0));

    let contact = CollisionDetector::new().detect_collision(&ball, &block).unwrap();
    assert_float_eq(contact.penetration, 0.3 - (1.6 - 2.0_f64.sqrt()), 1e-9, Some("Corner at sqrt(2)"));
    assert_normal(&contact, -Vector3::UNIT_X, 1e-9);
}

#[test]
fn test_sphere_cylinder_cap_and_side() {
    let detector = CollisionDetector::new();
    let drum = cylinder(Vector3::ZERO);

    let cap = detector.detect_collision(&sphere(0.5, Vector3::new(0.2, 0.0, 1.3)), &drum).unwrap();
    assert_float_eq(cap.penetration, 0.2, 1e-12, None);
    assert_normal(&cap, -Vector3::UNIT_Z, 1e-12);

    let side = detector.detect_collision(&sphere(0.5, Vector3::new(0.0, 1.2, 0.0)), &drum).unwrap();
    assert_float_eq(side.penetration, 0.3, 1e-12, None);
    assert_normal(&side, -Vector3::UNIT_Y, 1e-12);

    assert!(detector.detect_collision(&sphere(0.5, Vector3::new(1.2, 1.2, 0.0)), &drum).is_none());
}

#[test]
fn test_sphere_pyramid_apex_and_base() {
    let detector = CollisionDetector::new();
    let tent = pyramid(Vector3::ZERO);

    let apex = detector.detect_collision(&sphere(0.5, Vector3::new(0.0, 0.0, 1.3)), &tent).unwrap();
    assert_float_eq(apex.penetration, 0.2, 1e-12, None);
    assert_normal(&apex, -Vector3::UNIT_Z, 1e-12);

    let base = detector.detect_collision(&sphere(0.5, Vector3::new(0.1, -0.2, -1.4)), &tent).unwrap();
    assert_float_eq(base.penetration, 0.1, 1e-12, None);
    assert_normal(&base, Vector3::UNIT_Z, 1e-12);

    assert!(detector.detect_collision(&sphere(0.5, Vector3::new(0.9, 0.9, 0.9)), &tent).is_none());
}

#[test]
fn test_box_box_face_manifold() {
    let detector = CollisionDetector::new();
    let a = cube(Vector3::ZERO);
    let b = cube(Vector3::new(1.5, 0.0, 0.0));

    let manifold = detector.detect_manifold(&a, &b).unwrap();
    assert_float_eq(manifold.penetration, 0.5, 1e-12, None);
    assert_abs_diff_eq!(manifold.normal, Vector3::UNIT_X, epsilon = 1e-12);
    assert!(manifold.len() >= 4, "Face-face contact needs several points, got {}", manifold.len());
    for contact in &manifold.contacts {
        assert_float_eq(contact.penetration, 0.5, 1e-9, None);
        assert!(contact.point.x >= 0.5 - 1e-9 && contact.point.x <= 1.0 + 1e-9);
    }

    let single = detector.detect_collision(&a, &b).unwrap();
    assert_float_eq(single.penetration, 0.5, 1e-12, None);
    assert_abs_diff_eq!(single.point, Vector3::new(0.75, 0.0, 0.0), epsilon = 1e-9);

    assert!(detector.detect_manifold(&a, &cube(Vector3::new(2.5, 0.0, 0.0))).is_none());
}

#[test]
fn test_box_box_rotated_corner() {
    let a = cube(Vector3::ZERO);
    let mut b = cube(Vector3::new(2.3, 0.0, 0.0));
    b.set_orientation(Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_4));

    let manifold = CollisionDetector::new().detect_manifold(&a, &b).unwrap();
    let depth = 1.0 - (2.3 - 2.0_f64.sqrt());
    assert_float_eq(manifold.penetration, depth, 1e-9, Some("Corner depth past the face"));
    for contact in &manifold.contacts {
        assert_float_eq(contact.penetration, depth, 1e-9, None);
    }
    assert_abs_diff_eq!(manifold.normal, Vector3::UNIT_X, epsilon = 1e-9);
    assert_eq!(manifold.len(), 2, "The leading edge of B touches A at its two end vertices");
}

#[test]
fn test_box_cylinder_via_gjk() {
    let detector = CollisionDetector::new();
    let block = cube(Vector3::ZERO);
    let drum = cylinder(Vector3::new(1.8, 0.0, 0.0));

    let contact = detector.detect_collision(&block, &drum).unwrap();
    assert_float_eq(contact.penetration, 0.2, 1e-3, None);
    assert_normal(&contact, Vector3::UNIT_X, 1e-2);

    let reversed = detector.detect_collision(&drum, &block).unwrap();
    assert_normal(&reversed, -Vector3::UNIT_X, 1e-2);

    assert!(detector.detect_collision(&block, &cylinder(Vector3::new(2.5, 0.0, 0.0))).is_none());
}

#[test]
fn test_box_pyramid_via_gjk() {
    let contact = CollisionDetector::new()
        .detect_collision(&cube(Vector3::new(0.0, 0.0, -1.8)), &pyramid(Vector3::ZERO))
        .unwrap();
    assert_float_eq(contact.penetration, 0.2, 1e-6, None);
    assert_normal(&contact, Vector3::UNIT_Z, 1e-6);
}

#[test]
fn test_cylinder_pairs_via_gjk() {
    let detector = CollisionDetector::new();

    let stacked = detector
        .detect_collision(&cylinder(Vector3::ZERO), &cylinder(Vector3::new(0.0, 0.0, 1.9)))
        .unwrap();
    assert_float_eq(stacked.penetration, 0.1, 1e-6, None);
    assert_normal(&stacked, Vector3::UNIT_Z, 1e-6);

    let capped = detector
        .detect_collision(&cylinder(Vector3::ZERO), &pyramid(Vector3::new(0.0, 0.0, 1.9)))
        .unwrap();
    assert_float_eq(capped.penetration, 0.1, 1e-6, None);
    assert_normal(&capped, Vector3::UNIT_Z, 1e-6);

    assert!(detector
        .detect_collision(&cylinder(Vector3::ZERO), &cylinder(Vector3::new(0.0, 0.0, 2.5)))
        .is_none());
}

#[test]
fn test_pyramid_pyramid_via_gjk() {
    let detector = CollisionDetector::new();
    let contact = detector
        .detect_collision(&pyramid(Vector3::ZERO), &pyramid(Vector3::new(0.0, 0.0, -1.9)))
        .unwrap();
    assert_float_eq(contact.penetration, 0.1, 1e-6, Some("Apex of the lower pyramid pokes through the base"));
    assert_normal(&contact, -Vector3::UNIT_Z, 1e-6);

    assert!(detector
        .detect_collision(&pyramid(Vector3::ZERO), &pyramid(Vector3::new(3.0, 0.0, 0.0)))
        .is_none());
}

#[test]
fn test_manifold_wraps_single_contact() {
    let manifold = CollisionDetector::new()
        .detect_manifold(&sphere(1.0, Vector3::ZERO), &cylinder(Vector3::new(1.5, 0.0, 0.0)))
        .unwrap();
    assert_eq!(manifold.len(), 1);
    assert_float_eq(manifold.penetration, 0.5, 1e-12, None);
    assert_eq!(manifold.deepest().map(|c| c.normal), Some(manifold.normal));
}

#[test]
fn test_contact_combines_materials() {
    let mut a = sphere(1.0, Vector3::ZERO);
    let mut b = sphere(1.0, Vector3::new(1.0, 0.0, 0.0));
    a.set_material(Material::rubber());
    b.set_material(Material::steel());
    let contact = CollisionDetector::new().detect_collision(&a, &b).unwrap();
    assert_float_eq(contact.restitution, 0.85, 1e-12, None);
    assert_float_eq(contact.friction, 0.74_f64.sqrt(), 1e-12, None);
}

#[test]
fn test_contact_impulse_inelastic_and_separating() {
    let plastic = Material::new(0.0, 0.0).unwrap();
    let mut a = RigidBody::new(1.0, Vector3::ZERO).unwrap();
    let mut b = RigidBody::new(1.0, Vector3::new(1.5, 0.0, 0.0)).unwrap();
    a.set_velocity(Vector3::new(2.0, 0.0, 0.0));
    let contact = Contact::new(Vector3::new(0.75, 0.0, 0.0), Vector3::UNIT_X, 0.5, &plastic, &plastic);

    let j = apply_contact_impulse(&mut a, &mut b, &contact);
    assert_float_eq(j, 1.0, 1e-12, None);
    assert_abs_diff_eq!(a.velocity(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    assert_abs_diff_eq!(b.velocity(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    assert_abs_diff_eq!(a.linear_momentum() + b.linear_momentum(), Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);

    // now moving apart: nothing to do
    b.set_velocity(Vector3::new(3.0, 0.0, 0.0));
    assert_eq!(apply_contact_impulse(&mut a, &mut b, &contact), 0.0);
    assert_abs_diff_eq!(a.velocity(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
}

#[test]
fn test_contact_impulse_elastic_unequal_masses() {
    let elastic = Material::new(1.0, 0.5).unwrap();
    let mut light = RigidBody::new(1.0, Vector3::ZERO).unwrap();
    let mut heavy = RigidBody::new(3.0, Vector3::new(2.0, 0.0, 0.0)).unwrap();
    light.set_velocity(Vector3::new(2.0, 0.0, 0.0));
    let contact = Contact::new(Vector3::new(1.0, 0.0, 0.0), Vector3::UNIT_X, 0.1, &elastic, &elastic);

    let j = apply_contact_impulse(&mut light, &mut heavy, &contact);
    assert_float_eq(j, 3.0, 1e-12, Some("j = 2·v / (1/m1 + 1/m2)"));
    assert_abs_diff_eq!(light.velocity(), Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    assert_abs_diff_eq!(heavy.velocity(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    assert_eq!(light.angular_velocity(), Vector3::ZERO, "No slip means no friction spin");
}

#[test]
fn test_contact_impulse_friction_opposes_slip() {
    let grippy = Material::new(0.0, 1.0).unwrap();
    let mut a = RigidBody::new(1.0, Vector3::new(0.0, 1.0, 0.0)).unwrap();
    let mut b = RigidBody::new(1000.0, Vector3::ZERO).unwrap();
    a.set_velocity(Vector3::new(1.0, -1.0, 0.0));
    let contact = Contact::new(Vector3::new(0.0, 0.5, 0.0), -Vector3::UNIT_Y, 0.01, &grippy, &grippy);

    let j = apply_contact_impulse(&mut a, &mut b, &contact);
    assert!(j > 0.0);
    assert!(a.velocity().y.abs() < 1e-2, "Inelastic contact removes the approach speed");
    assert!(a.velocity().x < 1.0, "Friction must slow the sliding body");
    assert!(a.velocity().x >= 0.0, "Friction must not reverse the slip");
    assert!(a.angular_velocity().z.abs() > 0.0, "Off-centre friction spins the body");
}

#[test]
fn test_contact_new_clamps_and_flips() {
    let m = Material::default();
    let contact = Contact::new(Vector3::ZERO, Vector3::UNIT_Y, -0.3, &m, &m);
    assert_eq!(contact.penetration, 0.0);
    assert_eq!(contact.flipped().normal, -Vector3::UNIT_Y);
    assert_eq!(contact.flipped().penetration, contact.penetration);
}
