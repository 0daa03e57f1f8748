//! f64 geometric value types shared by the visibility pipeline.

mod bounding_sphere;

pub use bounding_sphere::BoundingSphere;
pub use glam::DVec3;
