use std::f64::consts::PI;
use log::trace;
use crate::models::{Quaternion, RigidBody, Shape3D, Simplex, SupportPoint, Vector3};
use crate::utils::EPSILON;

const GJK_MAX_ITERATIONS: usize = 64;
const EPA_MAX_ITERATIONS: usize = 128;
const EPA_TOLERANCE: f64 = 1e-7;

/// A shape placed in the world by a body's pose.
#[derive(Debug, Clone, Copy)]
pub struct PlacedShape<'a> {
    pub shape: &'a Shape3D,
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl<'a> PlacedShape<'a> {
    pub fn new(shape: &'a Shape3D, position: Vector3, orientation: Quaternion) -> Self {
        PlacedShape { shape, position, orientation }
    }

    pub fn from_body(body: &RigidBody, shape: &'a Shape3D) -> Self {
        PlacedShape::new(shape, body.position(), body.orientation())
    }

    /// World-space support point: the local support of the direction brought into
    /// the shape's frame, then transformed back out.
    pub fn support(&self, direction: &Vector3) -> Vector3 {
        let local_dir = self.orientation.inverse_rotate(direction);
        self.position + self.orientation.rotate(&self.shape.support_point(&local_dir))
    }
}

/// A face of the polytope for EPA algorithm
#[derive(Debug, Clone, Copy)]
struct Face {
    indices: [usize; 3],
    normal: Vector3,
    distance: f64,
}

/// Contact information from GJK/EPA
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    pub point_a: Vector3, // deepest point of shape A inside B
    pub point_b: Vector3, // deepest point of shape B inside A
    pub normal: Vector3,  // unit normal pointing from A to B
    pub penetration: f64,
}

/// Get the support point for Minkowski difference (shape_a - shape_b)
pub fn get_support_point(shape_a: &PlacedShape, shape_b: &PlacedShape, direction: &Vector3) -> SupportPoint {
    let point_a = shape_a.support(direction);
    let point_b = shape_b.support(&-*direction);
    SupportPoint { point: point_a - point_b, point_a, point_b }
}

/// GJK (Gilbert-Johnson-Keerthi) algorithm for collision detection between convex shapes
///
/// # Returns
/// `Some(Simplex)` enclosing (or touching) the origin if the shapes intersect,
/// `None` if a separating direction was found.
pub fn gjk_collision_detection(shape_a: &PlacedShape, shape_b: &PlacedShape) -> Option<Simplex> {
    let mut direction = get_initial_direction(shape_a, shape_b);
    let mut simplex = Simplex::new();
    let first = get_support_point(shape_a, shape_b, &direction);
    simplex.add(first);
    direction = -first.point;

    for _ in 0..GJK_MAX_ITERATIONS {
        if direction.is_near_zero() {
            // origin lies on the current simplex
            return Some(simplex);
        }
        let support = get_support_point(shape_a, shape_b, &direction);
        if support.point.dot(&direction) < 0.0 {
            return None;
        }
        simplex.add(support);
        if do_simplex(&mut simplex, &mut direction) {
            return Some(simplex);
        }
    }
    trace!("GJK gave up after {} iterations", GJK_MAX_ITERATIONS);
    None
}

fn get_initial_direction(shape_a: &PlacedShape, shape_b: &PlacedShape) -> Vector3 {
    let direction = shape_b.position - shape_a.position;
    if direction.is_near_zero() {
        Vector3::UNIT_X
    } else {
        direction
    }
}

/// Reduces the simplex to the feature nearest the origin and picks the next search
/// direction. Returns true once the origin is enclosed.
fn do_simplex(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
    let enclosed = match simplex.size() {
        2 => handle_line_case(simplex, direction),
        3 => handle_triangle_case(simplex, direction),
        4 => handle_tetrahedron_case(simplex, direction),
        _ => false,
    };
    enclosed || direction.is_near_zero()
}

fn handle_line_case(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
    let a = simplex.get_a();
    let b = simplex.get_b();
    let ab = b.point - a.point;
    let ao = -a.point;

    if ab.dot(&ao) > 0.0 {
        *direction = ab.cross(&ao).cross(&ab);
    } else {
        simplex.set_a(a);
        *direction = ao;
    }
    false
}

fn handle_triangle_case(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
    let a = simplex.get_a();
    let b = simplex.get_b();
    let c = simplex.get_c();
    let ab = b.point - a.point;
    let ac = c.point - a.point;
    let ao = -a.point;
    let abc = ab.cross(&ac);

    if abc.cross(&ac).dot(&ao) > 0.0 {
        if ac.dot(&ao) > 0.0 {
            simplex.set_ab(a, c);
            *direction = ac.cross(&ao).cross(&ac);
        } else {
            simplex.set_ab(a, b);
            return handle_line_case(simplex, direction);
        }
    } else if ab.cross(&abc).dot(&ao) > 0.0 {
        simplex.set_ab(a, b);
        return handle_line_case(simplex, direction);
    } else {
        let side = abc.dot(&ao);
        if side > 0.0 {
            *direction = abc;
        } else if side < 0.0 {
            simplex.set_abc(a, c, b);
            *direction = -abc;
        } else {
            *direction = Vector3::ZERO;
        }
    }
    false
}

fn handle_tetrahedron_case(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
    let a = simplex.get_a();
    let b = simplex.get_b();
    let c = simplex.get_c();
    let d = simplex.get_d();
    let ab = b.point - a.point;
    let ac = c.point - a.point;
    let ad = d.point - a.point;
    let ao = -a.point;

    if ab.cross(&ac).dot(&ao) > 0.0 {
        simplex.set_abc(a, b, c);
        return handle_triangle_case(simplex, direction);
    }
    if ac.cross(&ad).dot(&ao) > 0.0 {
        simplex.set_abc(a, c, d);
        return handle_triangle_case(simplex, direction);
    }
    if ad.cross(&ab).dot(&ao) > 0.0 {
        simplex.set_abc(a, d, b);
        return handle_triangle_case(simplex, direction);
    }
    true
}

/// Expanding Polytope Algorithm: penetration depth, normal and witness points from
/// a GJK simplex that encloses the origin.
///
/// Lower-dimensional simplices (the shapes only touch, or the origin sat on a
/// feature) are first blown up to a tetrahedron with extra support points.
pub fn epa_contact_points(shape_a: &PlacedShape, shape_b: &PlacedShape, simplex: &Simplex) -> Option<ContactInfo> {
    let mut polytope = build_initial_polytope(shape_a, shape_b, simplex)?;
    let interior = polytope.iter().fold(Vector3::ZERO, |acc, p| acc + p.point) / 4.0;

    let mut faces = Vec::with_capacity(32);
    for indices in [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]] {
        faces.push(make_face(&polytope, indices, &interior)?);
    }

    for _ in 0..EPA_MAX_ITERATIONS {
        let closest = *closest_face(&faces)?;
        let support = get_support_point(shape_a, shape_b, &closest.normal);
        if support.point.dot(&closest.normal) - closest.distance < EPA_TOLERANCE {
            return Some(calculate_contact_from_face(&polytope, &closest));
        }

        // remove every face the new point can see and stitch the horizon
        let mut horizon: Vec<(usize, usize)> = Vec::new();
        faces.retain(|face| {
            let visible = face.normal.dot(&(support.point - polytope[face.indices[0]].point)) > EPSILON;
            if visible {
                let [i, j, k] = face.indices;
                add_horizon_edge(&mut horizon, i, j);
                add_horizon_edge(&mut horizon, j, k);
                add_horizon_edge(&mut horizon, k, i);
            }
            !visible
        });

        let new_index = polytope.len();
        polytope.push(support);
        for (i, j) in horizon {
            if let Some(face) = make_face(&polytope, [i, j, new_index], &interior) {
                faces.push(face);
            }
        }
    }

    trace!("EPA hit its iteration cap; using the closest face found");
    closest_face(&faces).map(|face| calculate_contact_from_face(&polytope, face))
}

fn closest_face(faces: &[Face]) -> Option<&Face> {
    faces.iter().min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// An edge shared by two removed faces is interior to the hole; drop it.
fn add_horizon_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
    if let Some(pos) = edges.iter().position(|&(x, y)| x == b && y == a) {
        edges.swap_remove(pos);
    } else {
        edges.push((a, b));
    }
}

/// Builds a face oriented away from `interior`; `None` for a degenerate triangle.
fn make_face(polytope: &[SupportPoint], indices: [usize; 3], interior: &Vector3) -> Option<Face> {
    let a = polytope[indices[0]].point;
    let b = polytope[indices[1]].point;
    let c = polytope[indices[2]].point;
    let normal = (b - a).cross(&(c - a));
    if normal.is_near_zero() {
        return None;
    }
    let mut normal = normal.normalized();
    let mut indices = indices;
    if normal.dot(&(a - *interior)) < 0.0 {
        normal = -normal;
        indices.swap(1, 2);
    }
    Some(Face { indices, normal, distance: normal.dot(&a) })
}

fn build_initial_polytope(shape_a: &PlacedShape, shape_b: &PlacedShape, simplex: &Simplex) -> Option<Vec<SupportPoint>> {
    let mut points = simplex.points.clone();

    if points.len() == 4 && tetrahedron_volume(&points).abs() < EPSILON {
        points.pop();
    }

    if points.len() == 1 {
        let axes = [
            Vector3::UNIT_X, -Vector3::UNIT_X,
            Vector3::UNIT_Y, -Vector3::UNIT_Y,
            Vector3::UNIT_Z, -Vector3::UNIT_Z,
        ];
        for direction in axes {
            let p = get_support_point(shape_a, shape_b, &direction);
            if (p.point - points[0].point).length_squared() > EPSILON {
                points.push(p);
                break;
            }
        }
    }

    if points.len() == 2 {
        let ab = points[1].point - points[0].point;
        let perpendicular = ab.any_perpendicular();
        for step in 0..6 {
            let direction = perpendicular.rotate_vector(&ab, step as f64 * PI / 3.0);
            let p = get_support_point(shape_a, shape_b, &direction);
            if !ab.cross(&(p.point - points[0].point)).is_near_zero() {
                points.push(p);
                break;
            }
        }
    }

    if points.len() == 3 {
        let normal = (points[1].point - points[0].point)
            .cross(&(points[2].point - points[0].point))
            .normalized();
        for direction in [normal, -normal] {
            let p = get_support_point(shape_a, shape_b, &direction);
            if (p.point - points[0].point).dot(&normal).abs() > EPSILON {
                points.push(p);
                break;
            }
        }
    }

    if points.len() == 4 && tetrahedron_volume(&points).abs() >= EPSILON {
        Some(points)
    } else {
        None
    }
}

fn tetrahedron_volume(points: &[SupportPoint]) -> f64 {
    let a = points[0].point;
    (points[1].point - a).cross(&(points[2].point - a)).dot(&(points[3].point - a)) / 6.0
}

/// Witness points are interpolated on the face with the barycentric coordinates of
/// the origin's projection.
fn calculate_contact_from_face(polytope: &[SupportPoint], face: &Face) -> ContactInfo {
    let [i, j, k] = face.indices;
    let projection = face.normal * face.distance;
    let (u, v, w) = barycentric_coordinates_of_closest_point(
        &projection,
        &polytope[i].point,
        &polytope[j].point,
        &polytope[k].point,
    );
    ContactInfo {
        point_a: polytope[i].point_a * u + polytope[j].point_a * v + polytope[k].point_a * w,
        point_b: polytope[i].point_b * u + polytope[j].point_b * v + polytope[k].point_b * w,
        normal: face.normal,
        penetration: face.distance.max(0.0),
    }
}

/// Barycentric coordinates `(u, v, w)` of `p` with respect to triangle `abc`.
pub fn barycentric_coordinates_of_closest_point(p: &Vector3, a: &Vector3, b: &Vector3, c: &Vector3) -> (f64, f64, f64) {
    let v0 = *b - *a;
    let v1 = *c - *a;
    let v2 = *p - *a;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < EPSILON {
        return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    (1.0 - v - w, v, w)
}

/// Runs GJK then EPA; `None` when the shapes are separated or only touch.
pub fn gjk_epa_contact(shape_a: &PlacedShape, shape_b: &PlacedShape) -> Option<ContactInfo> {
    let simplex = gjk_collision_detection(shape_a, shape_b)?;
    let info = epa_contact_points(shape_a, shape_b, &simplex)?;
    if info.penetration > 0.0 {
        Some(info)
    } else {
        None
    }
}
