use std::f64::consts::PI;
use std::ops::Mul;
use approx::{AbsDiffEq, RelativeEq};
use crate::models::{Matrix3x3, Vector3};
use crate::utils::EPSILON;

/// Quaternion representation for 3D rotations to avoid gimbal lock.
///
/// Convention `w + xi + yj + zk`. Orientation quaternions are expected to be unit
/// length; only [`Quaternion::integrate`] renormalizes automatically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Quaternion {
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Quaternion { w, x, y, z }
    }

    /// Creates a new identity quaternion (no rotation)
    pub const fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// A pure quaternion `(0, v)`.
    pub fn from_vector(v: &Vector3) -> Self {
        Quaternion { w: 0.0, x: v.x, y: v.y, z: v.z }
    }

    pub fn vector_part(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn is_near_identity(&self, epsilon: f64) -> bool {
        (self.w - 1.0).abs() < epsilon &&
            self.x.abs() < epsilon &&
            self.y.abs() < epsilon &&
            self.z.abs() < epsilon
    }

    /// Creates a quaternion from axis-angle representation.
    ///
    /// A zero-length axis yields the identity rotation.
    pub fn from_axis_angle(axis: &Vector3, angle: f64) -> Self {
        let magnitude = axis.length();
        if magnitude < EPSILON {
            return Quaternion::identity();
        }

        let (sin_half, cos_half) = (angle / 2.0).sin_cos();
        let n = *axis / magnitude;

        Quaternion {
            w: cos_half,
            x: n.x * sin_half,
            y: n.y * sin_half,
            z: n.z * sin_half,
        }
    }

    /// Converts to `(axis, angle)`. For a (near) zero angle the axis is undefined,
    /// so +X is returned rather than dividing by a vanishing sine.
    pub fn to_axis_angle(&self) -> (Vector3, f64) {
        let q = self.normalized();
        let w = q.w.clamp(-1.0, 1.0);
        let angle = 2.0 * w.acos();
        let sin_half = (1.0 - w * w).sqrt();
        if sin_half < 1e-9 {
            return (Vector3::UNIT_X, 0.0);
        }
        (q.vector_part() / sin_half, angle)
    }

    /// Creates a quaternion from Euler angles (roll, pitch, yaw)
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        // ZYX convention
        let (sy, cy) = (yaw * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sr, cr) = (roll * 0.5).sin_cos();

        Quaternion {
            w: cr * cp * cy + sr * sp * sy,
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
        }
    }

    /// Converts quaternion to Euler angles (roll, pitch, yaw)
    pub fn to_euler(&self) -> (f64, f64, f64) {
        let q = self.normalized();

        let sinr_cosp = 2.0 * (q.w * q.x + q.y * q.z);
        let cosr_cosp = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
        let roll = sinr_cosp.atan2(cosr_cosp);

        let sinp = 2.0 * (q.w * q.y - q.z * q.x);
        let pitch = if sinp.abs() >= 1.0 {
            (PI / 2.0).copysign(sinp) // gimbal lock
        } else {
            sinp.asin()
        };

        let siny_cosp = 2.0 * (q.w * q.z + q.x * q.y);
        let cosy_cosp = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
        let yaw = siny_cosp.atan2(cosy_cosp);

        (roll, pitch, yaw)
    }

    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the length/magnitude of the quaternion
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns a normalized version of the quaternion; near-zero input gives identity.
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < EPSILON {
            return Quaternion::identity();
        }
        Quaternion {
            w: self.w / mag,
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
        }
    }

    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Hamilton product `self * other` (apply `other` first, then `self`).
    pub fn multiply(&self, other: &Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Returns the conjugate of the quaternion
    pub fn conjugate(&self) -> Quaternion {
        Quaternion {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Returns the inverse of the quaternion; near-zero input gives identity.
    pub fn inverse(&self) -> Quaternion {
        let mag_squared = self.dot(self);
        if mag_squared < EPSILON {
            return Quaternion::identity();
        }

        let conj = self.conjugate();
        Quaternion {
            w: conj.w / mag_squared,
            x: conj.x / mag_squared,
            y: conj.y / mag_squared,
            z: conj.z / mag_squared,
        }
    }

    /// Rotates `v` by this (unit) quaternion.
    ///
    /// Equivalent to `q * v * q⁻¹`, evaluated as `v + w·t + u × t` with `t = 2 (u × v)`.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::{Quaternion, Vector3};
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let q = Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_2);
    /// let v = q.rotate(&Vector3::UNIT_X);
    /// assert!((v.y - 1.0).abs() < 1e-12);
    /// ```
    pub fn rotate(&self, v: &Vector3) -> Vector3 {
        let u = self.vector_part();
        let t = u.cross(v) * 2.0;
        *v + t * self.w + u.cross(&t)
    }

    /// Rotates `v` by the inverse rotation (world to local for a unit quaternion).
    pub fn inverse_rotate(&self, v: &Vector3) -> Vector3 {
        self.conjugate().rotate(v)
    }

    /// Rotation matrix equivalent of this quaternion (normalized first).
    pub fn to_rotation_matrix(&self) -> Matrix3x3 {
        let q = self.normalized();
        let (w, x, y, z) = (q.w, q.x, q.y, q.z);
        Matrix3x3::new([
            1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - w * z), 2.0 * (x * z + w * y),
            2.0 * (x * y + w * z), 1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - w * x),
            2.0 * (x * z - w * y), 2.0 * (y * z + w * x), 1.0 - 2.0 * (x * x + y * y),
        ])
    }

    /// Advances an orientation by angular velocity `omega` (world frame) over `dt`.
    ///
    /// First-order step of `dq/dt = ½ ω q`, followed by renormalization; the
    /// renormalization keeps `|q| = 1` under repeated integration.
    pub fn integrate(&self, omega: &Vector3, dt: f64) -> Quaternion {
        let spin = Quaternion::from_vector(omega).multiply(self);
        let half_dt = 0.5 * dt;
        Quaternion {
            w: self.w + spin.w * half_dt,
            x: self.x + spin.x * half_dt,
            y: self.y + spin.y * half_dt,
            z: self.z + spin.z * half_dt,
        }
        .normalized()
    }

    /// Spherical linear interpolation between two quaternions
    pub fn slerp(&self, other: &Quaternion, t: f64) -> Quaternion {
        let q1 = self.normalized();
        let mut q2 = other.normalized();

        let mut dot = q1.dot(&q2);

        // take the shorter path
        if dot < 0.0 {
            q2 = Quaternion { w: -q2.w, x: -q2.x, y: -q2.y, z: -q2.z };
            dot = -dot;
        }

        // Nearly parallel: lerp and renormalize
        const DOT_THRESHOLD: f64 = 0.9995;
        if dot > DOT_THRESHOLD {
            let result = Quaternion {
                w: q1.w + t * (q2.w - q1.w),
                x: q1.x + t * (q2.x - q1.x),
                y: q1.y + t * (q2.y - q1.y),
                z: q1.z + t * (q2.z - q1.z),
            };
            return result.normalized();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta_0 = theta_0.sin();

        let s0 = ((1.0 - t) * theta_0).sin() / sin_theta_0;
        let s1 = theta.sin() / sin_theta_0;

        Quaternion {
            w: s0 * q1.w + s1 * q2.w,
            x: s0 * q1.x + s1 * q2.x,
            y: s0 * q1.y + s1 * q2.y,
            z: s0 * q1.z + s1 * q2.z,
        }
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.multiply(&rhs)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.w, &other.w, epsilon)
            && f64::abs_diff_eq(&self.x, &other.x, epsilon)
            && f64::abs_diff_eq(&self.y, &other.y, epsilon)
            && f64::abs_diff_eq(&self.z, &other.z, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        f64::relative_eq(&self.w, &other.w, epsilon, max_relative)
            && f64::relative_eq(&self.x, &other.x, epsilon, max_relative)
            && f64::relative_eq(&self.y, &other.y, epsilon, max_relative)
            && f64::relative_eq(&self.z, &other.z, epsilon, max_relative)
    }
}
