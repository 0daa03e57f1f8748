//! Horizon occlusion culling against a single dominant occluder sphere.
//!
//! A renderer builds an [`Occluder`] once per frame from the occluding body
//! (typically a planet) and the camera position, then either classifies each
//! candidate's bounding sphere with [`Occluder::visibility`], or precomputes
//! a conservative stand-in point per static cluster with
//! [`compute_occludee_point`] and tests that single point every frame.

mod error;
mod occludee;
mod occluder;
mod visibility;

pub use error::OcclusionError;
pub use occludee::compute_occludee_point;
pub use occluder::Occluder;
pub use visibility::Visibility;
