use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use approx::{AbsDiffEq, RelativeEq};
use log::warn;
use crate::utils::EPSILON;

/// A 3D vector of doubles used for positions, velocities, forces and axes.
///
/// All operations are pure except [`Vector3::set_vector_length`] and the
/// `set_x`/`set_y`/`set_z` setters, which mutate in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vector3 = Vector3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

    /// Creates a vector from its components.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Vector3;
    ///
    /// let v = Vector3::new(1.0, 2.0, 3.0);
    /// assert_eq!(v.y, 2.0);
    /// ```
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    pub fn set_z(&mut self, z: f64) {
        self.z = z;
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product `self × other`.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Vector3;
    ///
    /// let z = Vector3::UNIT_X.cross(&Vector3::UNIT_Y);
    /// assert_eq!(z, Vector3::UNIT_Z);
    /// ```
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance(&self, other: &Vector3) -> f64 {
        (*self - *other).length()
    }

    /// Scales the vector in place so its length becomes `length`, returning `self`
    /// for chaining. A zero vector is left untouched.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Vector3;
    ///
    /// let mut v = Vector3::new(3.0, 0.0, 4.0);
    /// v.set_vector_length(1.0);
    /// assert!((v.length() - 1.0).abs() < 1e-12);
    /// ```
    pub fn set_vector_length(&mut self, length: f64) -> &mut Self {
        let current = self.length();
        if current > EPSILON {
            let scale = length / current;
            self.x *= scale;
            self.y *= scale;
            self.z *= scale;
        }
        self
    }

    /// Returns a unit-length copy, or the zero vector if `self` has no length.
    pub fn normalized(&self) -> Vector3 {
        let mut v = *self;
        v.set_vector_length(1.0);
        v
    }

    pub fn is_near_zero(&self) -> bool {
        self.length_squared() < EPSILON * EPSILON
    }

    /// Rotates the vector about `axis` by `angle` radians (Rodrigues' formula).
    ///
    /// A zero-length axis means "no rotation" and returns the vector unchanged.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Vector3;
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let v = Vector3::UNIT_X.rotate_vector(&Vector3::UNIT_Z, FRAC_PI_2);
    /// assert!((v.y - 1.0).abs() < 1e-12);
    /// ```
    pub fn rotate_vector(&self, axis: &Vector3, angle: f64) -> Vector3 {
        if axis.is_near_zero() {
            warn!("rotate_vector called with a zero-length axis; leaving vector unchanged");
            return *self;
        }
        let k = axis.normalized();
        let (sin, cos) = angle.sin_cos();
        *self * cos + k.cross(self) * sin + k * (k.dot(self) * (1.0 - cos))
    }

    pub fn component_min(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn component_max(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn abs(&self) -> Vector3 {
        Vector3::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Component by axis index (0 = x, 1 = y, anything else = z).
    pub fn axis(&self, index: usize) -> f64 {
        match index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// A unit vector perpendicular to `self` (arbitrary if `self` is zero).
    pub fn any_perpendicular(&self) -> Vector3 {
        let candidate = if self.x.abs() < 0.9 { Vector3::UNIT_X } else { Vector3::UNIT_Y };
        let perpendicular = self.cross(&candidate);
        if perpendicular.is_near_zero() {
            Vector3::UNIT_Z
        } else {
            perpendicular.normalized()
        }
    }

    pub fn to_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }
}

impl From<(f64, f64, f64)> for Vector3 {
    fn from(value: (f64, f64, f64)) -> Self {
        Vector3::new(value.0, value.1, value.2)
    }
}

impl From<Vector3> for (f64, f64, f64) {
    fn from(value: Vector3) -> Self {
        value.to_tuple()
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs * self
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Vector3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl MulAssign<f64> for Vector3 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl AbsDiffEq for Vector3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.x, &other.x, epsilon)
            && f64::abs_diff_eq(&self.y, &other.y, epsilon)
            && f64::abs_diff_eq(&self.z, &other.z, epsilon)
    }
}

impl RelativeEq for Vector3 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        f64::relative_eq(&self.x, &other.x, epsilon, max_relative)
            && f64::relative_eq(&self.y, &other.y, epsilon, max_relative)
            && f64::relative_eq(&self.z, &other.z, epsilon, max_relative)
    }
}
