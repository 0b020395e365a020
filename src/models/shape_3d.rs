use std::f64::consts::PI;
use crate::errors::PhysicsError;
use crate::models::{Aabb, Matrix3x3, Quaternion, Vector3};
use crate::utils::EPSILON;

/// Discriminant of a [`Shape3D`], used by the narrow-phase dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeType {
    Sphere,
    Cuboid,
    Cylinder,
    Pyramid,
}

/// Solid sphere centred on the body origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Result<Self, PhysicsError> {
        validate_dimension("sphere radius", radius)?;
        Ok(Sphere { radius })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Box with full extents along local X (width), Y (height) and Z (depth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    width: f64,
    height: f64,
    depth: f64,
}

impl Cuboid {
    pub fn new(width: f64, height: f64, depth: f64) -> Result<Self, PhysicsError> {
        validate_dimension("cuboid width", width)?;
        validate_dimension("cuboid height", height)?;
        validate_dimension("cuboid depth", depth)?;
        Ok(Cuboid { width, height, depth })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn half_extents(&self) -> Vector3 {
        Vector3::new(self.width / 2.0, self.height / 2.0, self.depth / 2.0)
    }
}

/// Solid cylinder whose axis is local Z, spanning `z ∈ [-h/2, h/2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    radius: f64,
    height: f64,
}

impl Cylinder {
    pub fn new(radius: f64, height: f64) -> Result<Self, PhysicsError> {
        validate_dimension("cylinder radius", radius)?;
        validate_dimension("cylinder height", height)?;
        Ok(Cylinder { radius, height })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Square-based pyramid: base in the plane `z = -h/2`, apex at `(0, 0, h/2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pyramid {
    base_width: f64,
    height: f64,
}

impl Pyramid {
    pub fn new(base_width: f64, height: f64) -> Result<Self, PhysicsError> {
        validate_dimension("pyramid base width", base_width)?;
        validate_dimension("pyramid height", height)?;
        Ok(Pyramid { base_width, height })
    }

    pub fn base_width(&self) -> f64 {
        self.base_width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Four base corners followed by the apex.
    pub fn vertices(&self) -> [Vector3; 5] {
        let w2 = self.base_width / 2.0;
        let h2 = self.height / 2.0;
        [
            Vector3::new(-w2, -w2, -h2),
            Vector3::new(w2, -w2, -h2),
            Vector3::new(w2, w2, -h2),
            Vector3::new(-w2, w2, -h2),
            Vector3::new(0.0, 0.0, h2),
        ]
    }

    /// Outward face planes as `(unit normal, offset)` with `normal · p <= offset` inside.
    pub fn face_planes(&self) -> [(Vector3, f64); 5] {
        let v = self.vertices();
        let apex = v[4];
        let mut planes = [(Vector3::new(0.0, 0.0, -1.0), self.height / 2.0); 5];
        for i in 0..4 {
            let a = v[i];
            let b = v[(i + 1) % 4];
            let normal = (b - a).cross(&(apex - a)).normalized();
            planes[i + 1] = (normal, normal.dot(&a));
        }
        planes
    }

    /// Triangulated surface: four sides then the base as two triangles.
    pub fn triangles(&self) -> [[Vector3; 3]; 6] {
        let v = self.vertices();
        [
            [v[0], v[1], v[4]],
            [v[1], v[2], v[4]],
            [v[2], v[3], v[4]],
            [v[3], v[0], v[4]],
            [v[0], v[2], v[1]],
            [v[0], v[3], v[2]],
        ]
    }
}

fn validate_dimension(name: &str, value: f64) -> Result<(), PhysicsError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PhysicsError::InvalidGeometry(format!("{} must be positive and finite, got {}", name, value)));
    }
    Ok(())
}

/// Immutable geometric descriptor of a rigid body's volume.
///
/// A shape has no position or orientation of its own; those belong to the
/// [`RigidBody`](crate::models::RigidBody) that references it. Every variant has its
/// principal axes aligned with the local frame, so all inertia tensors are diagonal.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape3D {
    Sphere(Sphere),
    Cuboid(Cuboid),
    Cylinder(Cylinder),
    Pyramid(Pyramid),
}

/// Low-poly local-space mesh handed to an external renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMesh {
    pub vertices: Vec<Vector3>,
    /// Each face lists vertex indices in counter-clockwise order seen from outside.
    pub faces: Vec<Vec<usize>>,
}

impl Shape3D {
    /// Creates a new sphere with the given radius
    ///
    /// # Errors
    /// `PhysicsError::InvalidGeometry` if the radius is not positive.
    pub fn new_sphere(radius: f64) -> Result<Self, PhysicsError> {
        Ok(Shape3D::Sphere(Sphere::new(radius)?))
    }

    /// Creates a new cuboid with the given dimensions
    pub fn new_cuboid(width: f64, height: f64, depth: f64) -> Result<Self, PhysicsError> {
        Ok(Shape3D::Cuboid(Cuboid::new(width, height, depth)?))
    }

    /// Creates a new cylinder (axis along local Z) with the given radius and height
    pub fn new_cylinder(radius: f64, height: f64) -> Result<Self, PhysicsError> {
        Ok(Shape3D::Cylinder(Cylinder::new(radius, height)?))
    }

    /// Creates a new square-based pyramid
    pub fn new_pyramid(base_width: f64, height: f64) -> Result<Self, PhysicsError> {
        Ok(Shape3D::Pyramid(Pyramid::new(base_width, height)?))
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape3D::Sphere(_) => ShapeType::Sphere,
            Shape3D::Cuboid(_) => ShapeType::Cuboid,
            Shape3D::Cylinder(_) => ShapeType::Cylinder,
            Shape3D::Pyramid(_) => ShapeType::Pyramid,
        }
    }

    /// Returns the body-space inertia tensor about the centre for the given mass.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Shape3D;
    ///
    /// let sphere = Shape3D::new_sphere(1.0).unwrap();
    /// let inertia = sphere.calculate_inertia_tensor(5.0);
    /// assert!((inertia.get(0, 0) - 2.0).abs() < 1e-12);
    /// ```
    pub fn calculate_inertia_tensor(&self, mass: f64) -> Matrix3x3 {
        match self {
            Shape3D::Sphere(s) => {
                // (2/5) m r²
                let i = (2.0 / 5.0) * mass * s.radius.powi(2);
                Matrix3x3::from_diagonal(i, i, i)
            },
            Shape3D::Cuboid(c) => {
                let (w, h, d) = (c.width, c.height, c.depth);
                let ixx = (mass / 12.0) * (h.powi(2) + d.powi(2));
                let iyy = (mass / 12.0) * (w.powi(2) + d.powi(2));
                let izz = (mass / 12.0) * (w.powi(2) + h.powi(2));
                Matrix3x3::from_diagonal(ixx, iyy, izz)
            },
            Shape3D::Cylinder(c) => {
                // Ixx = Iyy = (m/12)(3r² + h²), Izz = (m/2) r²
                let ixx_iyy = (mass / 12.0) * (3.0 * c.radius.powi(2) + c.height.powi(2));
                let izz = (mass / 2.0) * c.radius.powi(2);
                Matrix3x3::from_diagonal(ixx_iyy, ixx_iyy, izz)
            },
            Shape3D::Pyramid(p) => {
                // Geometric height is used; not corrected for the true centroid.
                let (w, h) = (p.base_width, p.height);
                let ixx_iyy = (mass / 20.0) * (w.powi(2) + 4.0 * h.powi(2));
                let izz = (mass / 10.0) * w.powi(2);
                Matrix3x3::from_diagonal(ixx_iyy, ixx_iyy, izz)
            },
        }
    }

    /// Local points whose rotated images bound the shape: 8 for cuboid and
    /// cylinder (the cylinder's enclosing box), 5 for the pyramid, the 6 axis
    /// extremes for the sphere.
    pub fn key_vertices(&self) -> Vec<Vector3> {
        match self {
            Shape3D::Sphere(s) => {
                let r = s.radius;
                vec![
                    Vector3::new(r, 0.0, 0.0), Vector3::new(-r, 0.0, 0.0),
                    Vector3::new(0.0, r, 0.0), Vector3::new(0.0, -r, 0.0),
                    Vector3::new(0.0, 0.0, r), Vector3::new(0.0, 0.0, -r),
                ]
            },
            Shape3D::Cuboid(c) => {
                Aabb::from_center_half_extents(Vector3::ZERO, c.half_extents()).corners().to_vec()
            },
            Shape3D::Cylinder(c) => {
                let half = Vector3::new(c.radius, c.radius, c.height / 2.0);
                Aabb::from_center_half_extents(Vector3::ZERO, half).corners().to_vec()
            },
            Shape3D::Pyramid(p) => p.vertices().to_vec(),
        }
    }

    /// World-space bounding box for the shape placed at `position` with `orientation`.
    ///
    /// Spheres are orientation independent; the other shapes rotate their key
    /// vertices and take per-axis extrema.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::{Quaternion, Shape3D, Vector3};
    ///
    /// let cube = Shape3D::new_cuboid(2.0, 2.0, 2.0).unwrap();
    /// let aabb = cube.get_aabb(&Vector3::ZERO, &Quaternion::identity());
    /// assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
    /// assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    /// ```
    pub fn get_aabb(&self, position: &Vector3, orientation: &Quaternion) -> Aabb {
        if let Shape3D::Sphere(s) = self {
            let r = Vector3::new(s.radius, s.radius, s.radius);
            return Aabb { min: *position - r, max: *position + r };
        }
        let world = self
            .key_vertices()
            .into_iter()
            .map(|v| orientation.rotate(&v) + *position);
        Aabb::from_points(world).unwrap_or(Aabb { min: *position, max: *position })
    }

    /// Largest extent of the shape along any local axis.
    pub fn characteristic_size(&self) -> f64 {
        match self {
            Shape3D::Sphere(s) => 2.0 * s.radius,
            Shape3D::Cuboid(c) => c.width.max(c.height).max(c.depth),
            Shape3D::Cylinder(c) => (2.0 * c.radius).max(c.height),
            Shape3D::Pyramid(p) => p.base_width.max(p.height),
        }
    }

    /// Returns the volume of the shape
    pub fn volume(&self) -> f64 {
        match self {
            Shape3D::Sphere(s) => (4.0 / 3.0) * PI * s.radius.powi(3),
            Shape3D::Cuboid(c) => c.width * c.height * c.depth,
            Shape3D::Cylinder(c) => PI * c.radius.powi(2) * c.height,
            Shape3D::Pyramid(p) => p.base_width.powi(2) * p.height / 3.0,
        }
    }

    /// Returns the radius of the smallest origin-centred sphere enclosing the shape
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Shape3D::Sphere(s) => s.radius,
            Shape3D::Cuboid(c) => c.half_extents().length(),
            Shape3D::Cylinder(c) => (c.radius.powi(2) + (c.height / 2.0).powi(2)).sqrt(),
            Shape3D::Pyramid(p) => p
                .vertices()
                .iter()
                .map(|v| v.length())
                .fold(0.0, f64::max),
        }
    }

    /// Checks if a local-space point is inside the shape (surface inclusive)
    pub fn contains_point(&self, point: &Vector3) -> bool {
        let slack = 1e-9;
        match self {
            Shape3D::Sphere(s) => point.length_squared() <= s.radius.powi(2) + slack,
            Shape3D::Cuboid(c) => {
                let h = c.half_extents();
                point.x.abs() <= h.x + slack && point.y.abs() <= h.y + slack && point.z.abs() <= h.z + slack
            },
            Shape3D::Cylinder(c) => {
                point.x.powi(2) + point.y.powi(2) <= c.radius.powi(2) + slack
                    && point.z.abs() <= c.height / 2.0 + slack
            },
            Shape3D::Pyramid(p) => p
                .face_planes()
                .iter()
                .all(|(normal, offset)| normal.dot(point) <= offset + slack),
        }
    }

    /// Furthest local point in `direction` (the support mapping used by GJK/EPA).
    pub fn support_point(&self, direction: &Vector3) -> Vector3 {
        match self {
            Shape3D::Sphere(s) => {
                if direction.is_near_zero() {
                    Vector3::new(s.radius, 0.0, 0.0)
                } else {
                    direction.normalized() * s.radius
                }
            },
            Shape3D::Cuboid(c) => {
                let h = c.half_extents();
                Vector3::new(
                    if direction.x >= 0.0 { h.x } else { -h.x },
                    if direction.y >= 0.0 { h.y } else { -h.y },
                    if direction.z >= 0.0 { h.z } else { -h.z },
                )
            },
            Shape3D::Cylinder(c) => {
                let radial = Vector3::new(direction.x, direction.y, 0.0);
                let rim = if radial.length() > EPSILON {
                    radial.normalized() * c.radius
                } else {
                    Vector3::ZERO
                };
                let h2 = c.height / 2.0;
                rim + Vector3::new(0.0, 0.0, if direction.z >= 0.0 { h2 } else { -h2 })
            },
            Shape3D::Pyramid(p) => {
                let vertices = p.vertices();
                let mut best = vertices[0];
                let mut best_dot = best.dot(direction);
                for v in vertices.iter().skip(1) {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best_dot = d;
                        best = *v;
                    }
                }
                best
            },
        }
    }

    /// Produces the local-space mesh an external renderer draws for this shape.
    pub fn render(&self) -> ShapeMesh {
        ShapeMesh {
            vertices: self.create_vertices(),
            faces: self.create_faces(),
        }
    }

    fn create_vertices(&self) -> Vec<Vector3> {
        match self {
            Shape3D::Sphere(s) => {
                // icosahedron scaled onto the sphere
                let radius = s.radius;
                let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
                let raw = [
                    (0.0, 1.0, phi), (0.0, 1.0, -phi), (0.0, -1.0, phi), (0.0, -1.0, -phi),
                    (1.0, phi, 0.0), (1.0, -phi, 0.0), (-1.0, phi, 0.0), (-1.0, -phi, 0.0),
                    (phi, 0.0, 1.0), (phi, 0.0, -1.0), (-phi, 0.0, 1.0), (-phi, 0.0, -1.0),
                ];
                raw.iter()
                    .map(|&v| {
                        let mut vertex = Vector3::from(v);
                        vertex.set_vector_length(radius);
                        vertex
                    })
                    .collect()
            },
            Shape3D::Cuboid(c) => {
                let h = c.half_extents();
                vec![
                    Vector3::new(-h.x, -h.y, -h.z),
                    Vector3::new(h.x, -h.y, -h.z),
                    Vector3::new(h.x, h.y, -h.z),
                    Vector3::new(-h.x, h.y, -h.z),
                    Vector3::new(-h.x, -h.y, h.z),
                    Vector3::new(h.x, -h.y, h.z),
                    Vector3::new(h.x, h.y, h.z),
                    Vector3::new(-h.x, h.y, h.z),
                ]
            },
            Shape3D::Cylinder(c) => {
                let h2 = c.height / 2.0;
                let mut vertices = Vec::with_capacity(CYLINDER_SEGMENTS * 2 + 2);
                vertices.push(Vector3::new(0.0, 0.0, h2));
                vertices.push(Vector3::new(0.0, 0.0, -h2));
                for i in 0..CYLINDER_SEGMENTS {
                    let angle = 2.0 * PI * (i as f64) / (CYLINDER_SEGMENTS as f64);
                    let x = c.radius * angle.cos();
                    let y = c.radius * angle.sin();
                    vertices.push(Vector3::new(x, y, h2));
                    vertices.push(Vector3::new(x, y, -h2));
                }
                vertices
            },
            Shape3D::Pyramid(p) => p.vertices().to_vec(),
        }
    }

    fn create_faces(&self) -> Vec<Vec<usize>> {
        match self {
            Shape3D::Sphere(_) => vec![
                vec![0, 2, 8], vec![0, 8, 4], vec![0, 4, 6], vec![0, 6, 10], vec![0, 10, 2],
                vec![3, 1, 9], vec![3, 9, 5], vec![3, 5, 7], vec![3, 7, 11], vec![3, 11, 1],
                vec![2, 5, 8], vec![8, 5, 9], vec![8, 9, 4], vec![4, 9, 1], vec![4, 1, 6],
                vec![6, 1, 11], vec![6, 11, 10], vec![10, 11, 7], vec![10, 7, 2], vec![2, 7, 5],
            ],
            Shape3D::Cuboid(_) => vec![
                vec![0, 3, 2, 1], // -Z
                vec![4, 5, 6, 7], // +Z
                vec![0, 4, 7, 3], // -X
                vec![1, 2, 6, 5], // +X
                vec![0, 1, 5, 4], // -Y
                vec![3, 7, 6, 2], // +Y
            ],
            Shape3D::Cylinder(_) => {
                let n = CYLINDER_SEGMENTS;
                let mut faces = Vec::with_capacity(n + 2);
                faces.push((0..n).map(|i| 2 + i * 2).collect());
                faces.push((0..n).rev().map(|i| 3 + i * 2).collect());
                for i in 0..n {
                    let next = (i + 1) % n;
                    faces.push(vec![3 + i * 2, 3 + next * 2, 2 + next * 2, 2 + i * 2]);
                }
                faces
            },
            Shape3D::Pyramid(_) => vec![
                vec![0, 3, 2, 1],
                vec![0, 1, 4],
                vec![1, 2, 4],
                vec![2, 3, 4],
                vec![3, 0, 4],
            ],
        }
    }
}

const CYLINDER_SEGMENTS: usize = 16;
