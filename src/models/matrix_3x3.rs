use std::ops::{Add, Mul, Sub};
use approx::{AbsDiffEq, RelativeEq};
use log::warn;
use crate::errors::PhysicsError;
use crate::models::Vector3;
use crate::utils::DEFAULT_PHYSICS_CONSTANTS;

/// Row-major 3x3 matrix, used for inertia tensors and rotation matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3x3 {
    pub m: [f64; 9],
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Matrix3x3::identity()
    }
}

impl Matrix3x3 {
    pub const fn new(m: [f64; 9]) -> Self {
        Matrix3x3 { m }
    }

    pub const fn identity() -> Self {
        Matrix3x3 { m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] }
    }

    pub const fn zero() -> Self {
        Matrix3x3 { m: [0.0; 9] }
    }

    /// Builds a diagonal matrix, e.g. a principal-axis inertia tensor.
    pub fn from_diagonal(xx: f64, yy: f64, zz: f64) -> Self {
        Matrix3x3 { m: [xx, 0.0, 0.0, 0.0, yy, 0.0, 0.0, 0.0, zz] }
    }

    /// Builds a matrix from three row vectors.
    pub fn from_rows(r0: Vector3, r1: Vector3, r2: Vector3) -> Self {
        Matrix3x3 { m: [r0.x, r0.y, r0.z, r1.x, r1.y, r1.z, r2.x, r2.y, r2.z] }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[row * 3 + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.m[row * 3 + col] = value;
    }

    pub fn diagonal(&self) -> Vector3 {
        Vector3::new(self.m[0], self.m[4], self.m[8])
    }

    pub fn row(&self, row: usize) -> Vector3 {
        Vector3::new(self.m[row * 3], self.m[row * 3 + 1], self.m[row * 3 + 2])
    }

    pub fn column(&self, col: usize) -> Vector3 {
        Vector3::new(self.m[col], self.m[3 + col], self.m[6 + col])
    }

    pub fn scale(&self, factor: f64) -> Matrix3x3 {
        let mut m = self.m;
        m.iter_mut().for_each(|v| *v *= factor);
        Matrix3x3 { m }
    }

    pub fn multiply(&self, other: &Matrix3x3) -> Matrix3x3 {
        let mut m = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                m[row * 3 + col] = (0..3).map(|k| self.get(row, k) * other.get(k, col)).sum();
            }
        }
        Matrix3x3 { m }
    }

    pub fn mul_vector(&self, v: &Vector3) -> Vector3 {
        Vector3::new(
            self.m[0] * v.x + self.m[1] * v.y + self.m[2] * v.z,
            self.m[3] * v.x + self.m[4] * v.y + self.m[5] * v.z,
            self.m[6] * v.x + self.m[7] * v.y + self.m[8] * v.z,
        )
    }

    pub fn transpose(&self) -> Matrix3x3 {
        let m = &self.m;
        Matrix3x3 { m: [m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]] }
    }

    /// Determinant by the rule of Sarrus.
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0] * m[4] * m[8] + m[1] * m[5] * m[6] + m[2] * m[3] * m[7]
            - m[2] * m[4] * m[6]
            - m[0] * m[5] * m[7]
            - m[1] * m[3] * m[8]
    }

    /// Largest absolute entry.
    pub fn max_abs(&self) -> f64 {
        self.m.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }

    /// Inverse via adjugate over determinant.
    ///
    /// The singularity test is relative to the matrix scale.
    ///
    /// # Errors
    /// Returns `PhysicsError::SingularMatrix` when `|det| < 1e-10 · max|mᵢⱼ|³`.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::Matrix3x3;
    ///
    /// let inertia = Matrix3x3::from_diagonal(2.0, 4.0, 8.0);
    /// let inverse = inertia.inverse().unwrap();
    /// assert_eq!(inverse.get(1, 1), 0.25);
    /// assert!(Matrix3x3::from_diagonal(4e-4, 4e-4, 4e-4).inverse().is_ok());
    /// assert!(Matrix3x3::zero().inverse().is_err());
    /// ```
    pub fn inverse(&self) -> Result<Matrix3x3, PhysicsError> {
        self.inverse_with_epsilon(DEFAULT_PHYSICS_CONSTANTS.singular_epsilon)
    }

    /// Inverse with a caller-chosen relative threshold: the matrix counts as
    /// singular when `|det| < epsilon · max|mᵢⱼ|³`.
    pub fn inverse_with_epsilon(&self, epsilon: f64) -> Result<Matrix3x3, PhysicsError> {
        let det = self.determinant();
        let scale = self.max_abs();
        if !det.is_finite() || scale == 0.0 || det.abs() < epsilon * scale.powi(3) {
            return Err(PhysicsError::SingularMatrix);
        }
        let m = &self.m;
        let adjugate = [
            m[4] * m[8] - m[5] * m[7],
            m[2] * m[7] - m[1] * m[8],
            m[1] * m[5] - m[2] * m[4],
            m[5] * m[6] - m[3] * m[8],
            m[0] * m[8] - m[2] * m[6],
            m[2] * m[3] - m[0] * m[5],
            m[3] * m[7] - m[4] * m[6],
            m[1] * m[6] - m[0] * m[7],
            m[0] * m[4] - m[1] * m[3],
        ];
        Ok(Matrix3x3 { m: adjugate }.scale(1.0 / det))
    }

    /// Inverse that falls back to identity on singular input.
    ///
    /// The flag is `false` when the fallback was taken, so callers can tell a real
    /// inverse from a substituted one.
    pub fn inverse_or_identity(&self) -> (Matrix3x3, bool) {
        match self.inverse() {
            Ok(inverse) => (inverse, true),
            Err(_) => {
                warn!("singular matrix (det = {:e}); substituting identity", self.determinant());
                (Matrix3x3::identity(), false)
            }
        }
    }

    /// `self * diag * selfᵀ`, the similarity transform used to move a body-space
    /// inertia tensor into world space when `self` is a rotation.
    pub fn rotate_tensor(&self, tensor: &Matrix3x3) -> Matrix3x3 {
        self.multiply(tensor).multiply(&self.transpose())
    }
}

impl Add for Matrix3x3 {
    type Output = Matrix3x3;

    fn add(self, rhs: Matrix3x3) -> Matrix3x3 {
        let mut m = self.m;
        m.iter_mut().zip(rhs.m.iter()).for_each(|(a, b)| *a += b);
        Matrix3x3 { m }
    }
}

impl Sub for Matrix3x3 {
    type Output = Matrix3x3;

    fn sub(self, rhs: Matrix3x3) -> Matrix3x3 {
        let mut m = self.m;
        m.iter_mut().zip(rhs.m.iter()).for_each(|(a, b)| *a -= b);
        Matrix3x3 { m }
    }
}

impl Mul for Matrix3x3 {
    type Output = Matrix3x3;

    fn mul(self, rhs: Matrix3x3) -> Matrix3x3 {
        self.multiply(&rhs)
    }
}

impl Mul<Vector3> for Matrix3x3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.mul_vector(&rhs)
    }
}

impl Mul<f64> for Matrix3x3 {
    type Output = Matrix3x3;

    fn mul(self, rhs: f64) -> Matrix3x3 {
        self.scale(rhs)
    }
}

impl AbsDiffEq for Matrix3x3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.m.iter().zip(other.m.iter()).all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}

impl RelativeEq for Matrix3x3 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| f64::relative_eq(a, b, epsilon, max_relative))
    }
}
