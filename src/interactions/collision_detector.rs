use log::trace;
use crate::interactions::gjk_collision_3d::{gjk_epa_contact, PlacedShape};
use crate::interactions::{CollisionManifold, Contact};
use crate::models::{Cuboid, Cylinder, Pyramid, RigidBody, Shape3D, Sphere, Vector3};
use crate::utils::EPSILON;

/// Edge-edge axes shorter than this (near-parallel edges) are skipped by SAT.
const SAT_AXIS_EPSILON: f64 = 1e-6;

/// Narrow-phase dispatcher over every pair of shape variants.
///
/// Normals always point from the first body to the second and a reported contact
/// always has positive penetration; touching or separated pairs give `None`.
/// Bodies without a shape never collide.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use rs_rigid_body::interactions::CollisionDetector;
/// use rs_rigid_body::models::{RigidBody, Shape3D, Vector3};
///
/// let ball = Rc::new(Shape3D::new_sphere(1.0).unwrap());
/// let a = RigidBody::with_shape(1.0, Vector3::ZERO, Rc::clone(&ball)).unwrap();
/// let b = RigidBody::with_shape(1.0, Vector3::new(1.5, 0.0, 0.0), ball).unwrap();
///
/// let contact = CollisionDetector::new().detect_collision(&a, &b).unwrap();
/// assert!((contact.penetration - 0.5).abs() < 1e-12);
/// assert_eq!(contact.normal, Vector3::UNIT_X);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionDetector;

impl CollisionDetector {
    pub fn new() -> Self {
        CollisionDetector
    }

    /// Single-contact test for any pair of bodies.
    ///
    /// Box-box pairs collapse their manifold to one contact at the centroid of the
    /// manifold points, carrying the SAT penetration.
    pub fn detect_collision(&self, a: &RigidBody, b: &RigidBody) -> Option<Contact> {
        let (shape_a, shape_b) = (a.shape()?, b.shape()?);
        let contact = match (shape_a.as_ref(), shape_b.as_ref()) {
            (Shape3D::Sphere(sa), Shape3D::Sphere(sb)) => detect_sphere_sphere(a, sa, b, sb),
            (Shape3D::Sphere(s), Shape3D::Cuboid(c)) => detect_sphere_box(a, s, b, c),
            (Shape3D::Sphere(s), Shape3D::Cylinder(c)) => detect_sphere_cylinder(a, s, b, c),
            (Shape3D::Sphere(s), Shape3D::Pyramid(p)) => detect_sphere_pyramid(a, s, b, p),
            (_, Shape3D::Sphere(_)) => self.detect_collision(b, a).map(|c| c.flipped()),
            (Shape3D::Cuboid(ca), Shape3D::Cuboid(cb)) => {
                detect_box_box(a, ca, b, cb).map(|manifold| collapse_manifold(&manifold))
            },
            (Shape3D::Cuboid(c), Shape3D::Cylinder(cy)) => detect_box_cylinder(a, c, b, cy),
            (Shape3D::Cuboid(c), Shape3D::Pyramid(p)) => detect_box_pyramid(a, c, b, p),
            (Shape3D::Cylinder(ca), Shape3D::Cylinder(cb)) => detect_cylinder_cylinder(a, ca, b, cb),
            (Shape3D::Cylinder(c), Shape3D::Pyramid(p)) => detect_cylinder_pyramid(a, c, b, p),
            (Shape3D::Pyramid(pa), Shape3D::Pyramid(pb)) => detect_pyramid_pyramid(a, pa, b, pb),
            (Shape3D::Cylinder(_), Shape3D::Cuboid(_))
            | (Shape3D::Pyramid(_), Shape3D::Cuboid(_))
            | (Shape3D::Pyramid(_), Shape3D::Cylinder(_)) => self.detect_collision(b, a).map(|c| c.flipped()),
        };
        if let Some(c) = &contact {
            trace!(
                "{:?}-{:?} contact at {:?}, depth {}",
                shape_a.shape_type(),
                shape_b.shape_type(),
                c.point,
                c.penetration
            );
        }
        contact
    }

    /// Multi-point test. Box-box pairs produce a full SAT manifold; every other pair
    /// wraps its single contact.
    pub fn detect_manifold(&self, a: &RigidBody, b: &RigidBody) -> Option<CollisionManifold> {
        let (shape_a, shape_b) = (a.shape()?, b.shape()?);
        if let (Shape3D::Cuboid(ca), Shape3D::Cuboid(cb)) = (shape_a.as_ref(), shape_b.as_ref()) {
            return detect_box_box(a, ca, b, cb);
        }
        self.detect_collision(a, b)
            .and_then(|contact| CollisionManifold::from_contacts(vec![contact]))
    }
}

/// Distance against the sum of radii; coincident centres use +X as the normal.
pub fn detect_sphere_sphere(a: &RigidBody, sphere_a: &Sphere, b: &RigidBody, sphere_b: &Sphere) -> Option<Contact> {
    let delta = b.position() - a.position();
    let distance = delta.length();
    let radii = sphere_a.radius() + sphere_b.radius();
    if distance >= radii {
        return None;
    }
    let normal = if distance > EPSILON { delta / distance } else { Vector3::UNIT_X };
    let penetration = radii - distance;
    // midway through the overlap region
    let point = a.position() + normal * (sphere_a.radius() - penetration / 2.0);
    Some(Contact::new(point, normal, penetration, &a.material(), &b.material()))
}

pub fn detect_sphere_box(a: &RigidBody, sphere: &Sphere, b: &RigidBody, cuboid: &Cuboid) -> Option<Contact> {
    let local = b.world_to_local(&a.position());
    sphere_against_surface(a, sphere, b, project_onto_box(cuboid, &local))
}

pub fn detect_sphere_cylinder(a: &RigidBody, sphere: &Sphere, b: &RigidBody, cylinder: &Cylinder) -> Option<Contact> {
    let local = b.world_to_local(&a.position());
    sphere_against_surface(a, sphere, b, project_onto_cylinder(cylinder, &local))
}

pub fn detect_sphere_pyramid(a: &RigidBody, sphere: &Sphere, b: &RigidBody, pyramid: &Pyramid) -> Option<Contact> {
    let local = b.world_to_local(&a.position());
    sphere_against_surface(a, sphere, b, project_onto_pyramid(pyramid, &local))
}

/// Separating Axis Theorem over the 15 candidate axes of two oriented boxes.
///
/// The axis of least overlap becomes the manifold normal. Contacts are the
/// vertices of each box lying inside the other; when there are none (edge-edge)
/// a single contact is placed between the two deepest support points.
pub fn detect_box_box(a: &RigidBody, box_a: &Cuboid, b: &RigidBody, box_b: &Cuboid) -> Option<CollisionManifold> {
    let axes_a = body_axes(a);
    let axes_b = body_axes(b);
    let half_a = box_a.half_extents();
    let half_b = box_b.half_extents();
    let offset = b.position() - a.position();

    let project = |axes: &[Vector3; 3], half: &Vector3, axis: &Vector3| {
        half.x * axes[0].dot(axis).abs() + half.y * axes[1].dot(axis).abs() + half.z * axes[2].dot(axis).abs()
    };

    let mut candidates: Vec<Vector3> = Vec::with_capacity(15);
    candidates.extend_from_slice(&axes_a);
    candidates.extend_from_slice(&axes_b);
    for ua in &axes_a {
        for ub in &axes_b {
            let cross = ua.cross(ub);
            if cross.length() > SAT_AXIS_EPSILON {
                candidates.push(cross.normalized());
            }
        }
    }

    let mut best_axis = Vector3::UNIT_X;
    let mut best_overlap = f64::INFINITY;
    for axis in &candidates {
        let overlap = project(&axes_a, &half_a, axis) + project(&axes_b, &half_b, axis) - offset.dot(axis).abs();
        if overlap <= 0.0 {
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = if offset.dot(axis) < 0.0 { -*axis } else { *axis };
        }
    }

    let normal = best_axis;
    let reach_a = project(&axes_a, &half_a, &normal);
    let reach_b = project(&axes_b, &half_b, &normal);
    let face_a = a.position().dot(&normal) + reach_a;
    let face_b = b.position().dot(&normal) - reach_b;
    let (material_a, material_b) = (a.material(), b.material());
    let shape_a = Shape3D::Cuboid(*box_a);
    let shape_b = Shape3D::Cuboid(*box_b);

    let mut contacts = Vec::new();
    for vertex in shape_b.key_vertices().iter().map(|v| b.local_to_world(v)) {
        if shape_a.contains_point(&a.world_to_local(&vertex)) {
            let depth = (face_a - vertex.dot(&normal)).clamp(0.0, best_overlap);
            contacts.push(Contact::new(vertex, normal, depth, &material_a, &material_b));
        }
    }
    for vertex in shape_a.key_vertices().iter().map(|v| a.local_to_world(v)) {
        if shape_b.contains_point(&b.world_to_local(&vertex)) {
            let depth = (vertex.dot(&normal) - face_b).clamp(0.0, best_overlap);
            contacts.push(Contact::new(vertex, normal, depth, &material_a, &material_b));
        }
    }
    if contacts.is_empty() {
        let deepest_a = box_support(a, &axes_a, &half_a, &normal);
        let deepest_b = box_support(b, &axes_b, &half_b, &-normal);
        let point = (deepest_a + deepest_b) * 0.5;
        contacts.push(Contact::new(point, normal, best_overlap, &material_a, &material_b));
    }

    Some(CollisionManifold { contacts, normal, penetration: best_overlap })
}

pub fn detect_box_cylinder(a: &RigidBody, cuboid: &Cuboid, b: &RigidBody, cylinder: &Cylinder) -> Option<Contact> {
    convex_contact(a, &Shape3D::Cuboid(*cuboid), b, &Shape3D::Cylinder(*cylinder))
}

pub fn detect_box_pyramid(a: &RigidBody, cuboid: &Cuboid, b: &RigidBody, pyramid: &Pyramid) -> Option<Contact> {
    convex_contact(a, &Shape3D::Cuboid(*cuboid), b, &Shape3D::Pyramid(*pyramid))
}

pub fn detect_cylinder_cylinder(a: &RigidBody, cylinder_a: &Cylinder, b: &RigidBody, cylinder_b: &Cylinder) -> Option<Contact> {
    convex_contact(a, &Shape3D::Cylinder(*cylinder_a), b, &Shape3D::Cylinder(*cylinder_b))
}

pub fn detect_cylinder_pyramid(a: &RigidBody, cylinder: &Cylinder, b: &RigidBody, pyramid: &Pyramid) -> Option<Contact> {
    convex_contact(a, &Shape3D::Cylinder(*cylinder), b, &Shape3D::Pyramid(*pyramid))
}

pub fn detect_pyramid_pyramid(a: &RigidBody, pyramid_a: &Pyramid, b: &RigidBody, pyramid_b: &Pyramid) -> Option<Contact> {
    convex_contact(a, &Shape3D::Pyramid(*pyramid_a), b, &Shape3D::Pyramid(*pyramid_b))
}

/// GJK/EPA on the support mappings, after a bounding-sphere reject.
fn convex_contact(a: &RigidBody, shape_a: &Shape3D, b: &RigidBody, shape_b: &Shape3D) -> Option<Contact> {
    let reach = shape_a.bounding_radius() + shape_b.bounding_radius();
    if a.position().distance(&b.position()) > reach {
        return None;
    }
    let placed_a = PlacedShape::from_body(a, shape_a);
    let placed_b = PlacedShape::from_body(b, shape_b);
    let info = gjk_epa_contact(&placed_a, &placed_b)?;
    let point = (info.point_a + info.point_b) * 0.5;
    Some(Contact::new(point, info.normal, info.penetration, &a.material(), &b.material()))
}

fn collapse_manifold(manifold: &CollisionManifold) -> Contact {
    let count = manifold.contacts.len().max(1) as f64;
    let centroid = manifold
        .contacts
        .iter()
        .fold(Vector3::ZERO, |acc, c| acc + c.point)
        / count;
    let first = manifold.contacts.first();
    Contact {
        point: centroid,
        normal: manifold.normal,
        penetration: manifold.penetration,
        restitution: first.map_or(0.0, |c| c.restitution),
        friction: first.map_or(0.0, |c| c.friction),
    }
}

/// Where a sphere centre sits relative to a shape's surface, in the shape's frame.
#[derive(Debug, Clone, Copy)]
struct SurfaceProjection {
    /// Closest surface point.
    point: Vector3,
    /// Outward surface normal at `point`.
    normal: Vector3,
    /// Unsigned distance from the query point to `point`.
    distance: f64,
    inside: bool,
}

impl SurfaceProjection {
    /// Builds the projection for a point outside the shape, given its clamp onto it.
    fn outside(local: &Vector3, closest: Vector3) -> Option<Self> {
        let delta = *local - closest;
        let distance = delta.length();
        if distance <= EPSILON {
            return None;
        }
        Some(SurfaceProjection { point: closest, normal: delta / distance, distance, inside: false })
    }
}

fn sphere_against_surface(sphere_body: &RigidBody, sphere: &Sphere, shape_body: &RigidBody, projection: SurfaceProjection) -> Option<Contact> {
    let penetration = if projection.inside {
        sphere.radius() + projection.distance
    } else {
        sphere.radius() - projection.distance
    };
    if penetration <= 0.0 {
        return None;
    }
    // surface normal leaves the shape towards the sphere; contact normal runs sphere -> shape
    let normal = -shape_body.orientation().rotate(&projection.normal);
    let point = shape_body.local_to_world(&projection.point);
    Some(Contact::new(point, normal, penetration, &sphere_body.material(), &shape_body.material()))
}

fn project_onto_box(cuboid: &Cuboid, local: &Vector3) -> SurfaceProjection {
    let h = cuboid.half_extents();
    let closest = Vector3::new(
        local.x.clamp(-h.x, h.x),
        local.y.clamp(-h.y, h.y),
        local.z.clamp(-h.z, h.z),
    );
    if let Some(projection) = SurfaceProjection::outside(local, closest) {
        return projection;
    }

    // inside (or on the surface): push out through the nearest face
    let gaps = [h.x - local.x.abs(), h.y - local.y.abs(), h.z - local.z.abs()];
    let mut axis = 0;
    for i in 1..3 {
        if gaps[i] < gaps[axis] {
            axis = i;
        }
    }
    let sign = if local.axis(axis) >= 0.0 { 1.0 } else { -1.0 };
    let mut normal = Vector3::ZERO;
    let mut point = *local;
    match axis {
        0 => {
            normal.set_x(sign);
            point.set_x(sign * h.x);
        },
        1 => {
            normal.set_y(sign);
            point.set_y(sign * h.y);
        },
        _ => {
            normal.set_z(sign);
            point.set_z(sign * h.z);
        },
    }
    SurfaceProjection { point, normal, distance: gaps[axis].max(0.0), inside: true }
}

fn project_onto_cylinder(cylinder: &Cylinder, local: &Vector3) -> SurfaceProjection {
    let r = cylinder.radius();
    let h2 = cylinder.height() / 2.0;
    let radial = Vector3::new(local.x, local.y, 0.0);
    let radial_length = radial.length();

    let clamped_radial = if radial_length > r { radial * (r / radial_length) } else { radial };
    let closest = clamped_radial + Vector3::new(0.0, 0.0, local.z.clamp(-h2, h2));
    if let Some(projection) = SurfaceProjection::outside(local, closest) {
        return projection;
    }

    let side_gap = r - radial_length;
    let cap_gap = h2 - local.z.abs();
    if side_gap < cap_gap {
        let direction = if radial_length > EPSILON { radial / radial_length } else { Vector3::UNIT_X };
        SurfaceProjection {
            point: direction * r + Vector3::new(0.0, 0.0, local.z),
            normal: direction,
            distance: side_gap.max(0.0),
            inside: true,
        }
    } else {
        let sign = if local.z >= 0.0 { 1.0 } else { -1.0 };
        SurfaceProjection {
            point: Vector3::new(local.x, local.y, sign * h2),
            normal: Vector3::new(0.0, 0.0, sign),
            distance: cap_gap.max(0.0),
            inside: true,
        }
    }
}

fn project_onto_pyramid(pyramid: &Pyramid, local: &Vector3) -> SurfaceProjection {
    let planes = pyramid.face_planes();
    let inside = planes.iter().all(|(n, offset)| n.dot(local) <= *offset);

    if !inside {
        let closest = pyramid
            .triangles()
            .iter()
            .map(|[a, b, c]| closest_point_on_triangle(local, a, b, c))
            .min_by(|p, q| (*p - *local).length_squared().total_cmp(&(*q - *local).length_squared()))
            .unwrap_or(*local);
        if let Some(projection) = SurfaceProjection::outside(local, closest) {
            return projection;
        }
    }

    let (normal, gap) = planes
        .iter()
        .map(|(n, offset)| (*n, offset - n.dot(local)))
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .unwrap_or((Vector3::UNIT_Z, 0.0));
    SurfaceProjection {
        point: *local + normal * gap,
        normal,
        distance: gap.max(0.0),
        inside: true,
    }
}

/// Closest point to `p` on triangle `abc` (Voronoi-region walk).
pub fn closest_point_on_triangle(p: &Vector3, a: &Vector3, b: &Vector3, c: &Vector3) -> Vector3 {
    let ab = *b - *a;
    let ac = *c - *a;
    let ap = *p - *a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = *p - *b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return *a + ab * (d1 / (d1 - d3));
    }

    let cp = *p - *c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return *a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return *b + (*c - *b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    *a + ab * (vb * denom) + ac * (vc * denom)
}

fn body_axes(body: &RigidBody) -> [Vector3; 3] {
    let q = body.orientation();
    [q.rotate(&Vector3::UNIT_X), q.rotate(&Vector3::UNIT_Y), q.rotate(&Vector3::UNIT_Z)]
}

fn box_support(body: &RigidBody, axes: &[Vector3; 3], half: &Vector3, direction: &Vector3) -> Vector3 {
    let mut point = body.position();
    for (axis, extent) in axes.iter().zip([half.x, half.y, half.z]) {
        let sign = if axis.dot(direction) >= 0.0 { 1.0 } else { -1.0 };
        point += *axis * (extent * sign);
    }
    point
}
