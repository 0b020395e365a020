mod contact;
mod octree;
mod collision_detector;
pub mod gjk_collision_3d;

pub use contact::*;
pub use octree::*;
pub use collision_detector::*;

#[cfg(test)]
mod collision_detector_tests;
