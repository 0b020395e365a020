mod vector_3d;
mod matrix_3x3;
mod quaternion;
mod aabb;
mod shape_3d;
mod material;
mod rigid_body;
mod simplex;

pub use vector_3d::*;
pub use matrix_3x3::*;
pub use quaternion::*;
pub use aabb::*;
pub use shape_3d::*;
pub use material::*;
pub use rigid_body::*;
pub use simplex::*;

#[cfg(test)]
mod math_tests;
