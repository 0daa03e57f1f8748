//! Conservative occludee-point reduction.
//!
//! Collapses a cluster of sample positions (for example the corner and edge
//! vertices of a terrain tile) into a single point whose visibility against
//! an occluder is a sufficient condition for the visibility of every sample.
//! The reduced point then stands in for the whole cluster in cheap per-frame
//! horizon tests, and the bias is always toward over-reporting visibility,
//! never toward hiding geometry a sample would have shown.

use glam::DVec3;
use tracing::{debug, trace};
use vista_math::BoundingSphere;

use crate::error::OcclusionError;

/// cos(0.01°): past this alignment the cross product of the plane normal
/// and a sample direction is too short to serve as a rotation axis.
const PARALLEL_COS_THRESHOLD: f64 = 0.999_999_984_769_129_1;

/// sin(0.1°): the smallest horizon-to-plane dot product for which the
/// reduced point stays numerically bounded.
const MIN_HORIZON_DOT: f64 = 0.001_745_328_365_898_308_8;

/// Length guard for near-degenerate cross products.
const CROSS_LENGTH_EPSILON: f64 = 1e-13;

/// Reduce `sample_positions` to a single conservative test point relative to
/// `occluder_sphere`.
///
/// A plane is built through the occluder center with its normal pointing at
/// `representative_position` (typically the center of the samples' bounding
/// sphere). Each sample contributes the extreme points of its own horizon
/// circle on the occluder; the sample whose horizon dips closest to the
/// plane dictates how far the result must be pushed out along the normal so
/// that the single point is hidden only when every sample is.
///
/// Returns `Ok(None)` when a sample lies inside the occluder sphere or the
/// limiting horizon direction is within 0.1° of the plane, where no bounded
/// point exists. A result pointing away from the samples (negative
/// magnitude) is still returned; callers must run it through a visibility
/// query either way.
pub fn compute_occludee_point(
    occluder_sphere: &BoundingSphere,
    representative_position: DVec3,
    sample_positions: &[DVec3],
) -> Result<Option<DVec3>, OcclusionError> {
    if occluder_sphere.radius <= 0.0 {
        return Err(OcclusionError::NonPositiveRadius(occluder_sphere.radius));
    }
    if sample_positions.is_empty() {
        return Err(OcclusionError::NoSamplePositions);
    }
    let occluder_position = occluder_sphere.center;
    let to_representative = representative_position - occluder_position;
    if to_representative == DVec3::ZERO {
        return Err(OcclusionError::DegenerateRepresentative);
    }
    let plane_normal = to_representative.normalize();
    let plane_d = -plane_normal.dot(occluder_position);

    let any_rotation = any_rotation_vector(occluder_position, plane_normal, plane_d);

    let mut min_dot = f64::INFINITY;
    for &sample in sample_positions {
        let Some(dot) =
            horizon_to_plane_normal_dot(occluder_sphere, plane_normal, any_rotation, sample)
        else {
            debug!(?sample, "sample inside the occluder sphere, no occludee point");
            return Ok(None);
        };
        min_dot = min_dot.min(dot);
    }

    // Within 0.1° of perpendicular the point runs away to infinity; report
    // the configuration as unusable instead.
    if min_dot.abs() < MIN_HORIZON_DOT {
        debug!(min_dot, "limiting horizon nearly perpendicular to the plane normal");
        return Ok(None);
    }

    let magnitude = occluder_sphere.radius / min_dot;
    trace!(min_dot, magnitude, "occludee point computed");
    Ok(Some(occluder_position + plane_normal * magnitude))
}

/// An arbitrary unit vector lying in the plane `dot(n, v) + d = 0` through
/// the occluder center.
///
/// The center is perturbed by one unit along the two minor axes of the
/// normal and the plane equation is solved along the major axis, which keeps
/// the division well conditioned. The major axis compares x against y first
/// and then z against the winner; that order is observable through which
/// in-plane axis is chosen for normals lying close to a coordinate axis.
fn any_rotation_vector(occluder_position: DVec3, plane_normal: DVec3, plane_d: f64) -> DVec3 {
    let abs_normal = plane_normal.abs();
    let mut major_axis = if abs_normal.x > abs_normal.y { 0 } else { 1 };
    if (major_axis == 0 && abs_normal.z > abs_normal.x)
        || (major_axis == 1 && abs_normal.z > abs_normal.y)
    {
        major_axis = 2;
    }
    let (perturbed, unit) = match major_axis {
        0 => (
            DVec3::new(
                occluder_position.x,
                occluder_position.y + 1.0,
                occluder_position.z + 1.0,
            ),
            DVec3::X,
        ),
        1 => (
            DVec3::new(
                occluder_position.x + 1.0,
                occluder_position.y,
                occluder_position.z + 1.0,
            ),
            DVec3::Y,
        ),
        _ => (
            DVec3::new(
                occluder_position.x + 1.0,
                occluder_position.y + 1.0,
                occluder_position.z,
            ),
            DVec3::Z,
        ),
    };
    let u = (plane_normal.dot(perturbed) + plane_d) / -plane_normal.dot(unit);
    (perturbed + unit * u - occluder_position).normalize()
}

/// Axis about which a sample-to-occluder direction is rotated 90° to land on
/// the sample's horizon circle. Falls back to `any_rotation` when the sample
/// direction is nearly parallel to the plane normal.
fn rotation_vector(
    occluder_position: DVec3,
    plane_normal: DVec3,
    position: DVec3,
    any_rotation: DVec3,
) -> DVec3 {
    let position_direction = (position - occluder_position).normalize();
    if plane_normal.dot(position_direction) < PARALLEL_COS_THRESHOLD {
        let cross = plane_normal.cross(position_direction);
        if cross.length() > CROSS_LENGTH_EPSILON {
            return cross.normalize();
        }
    }
    any_rotation
}

/// The smaller dot product of the plane normal with the directions from the
/// occluder center to the two extreme points of `position`'s horizon circle
/// on the occluder sphere.
///
/// Returns `None` when the position lies inside the occluder sphere.
fn horizon_to_plane_normal_dot(
    occluder_sphere: &BoundingSphere,
    plane_normal: DVec3,
    any_rotation: DVec3,
    position: DVec3,
) -> Option<f64> {
    let occluder_position = occluder_sphere.center;

    let to_occluder = occluder_position - position;
    let distance_squared = to_occluder.length_squared();
    let radius_squared = occluder_sphere.radius * occluder_sphere.radius;
    if distance_squared < radius_squared {
        return None;
    }

    // Horizon geometry of the sample with respect to the occluder sphere.
    let horizon_distance_squared = distance_squared - radius_squared;
    let horizon_distance = horizon_distance_squared.sqrt();
    let distance = distance_squared.sqrt();
    let cos_theta = horizon_distance / distance;
    let horizon_plane_distance = cos_theta * horizon_distance;
    let direction = to_occluder / distance;
    let horizon_plane_position = position + direction * horizon_plane_distance;
    let horizon_cross_distance =
        (horizon_distance_squared - horizon_plane_distance * horizon_plane_distance)
            .max(0.0)
            .sqrt();

    // Rotate the sample-to-occluder direction a quarter turn to point along
    // the horizon circle.
    let axis = rotation_vector(occluder_position, plane_normal, position, any_rotation);
    let cross_direction = rotate_quarter_turn(axis, direction).normalize();

    let offset = cross_direction * horizon_cross_distance;
    let dot0 =
        plane_normal.dot((horizon_plane_position + offset - occluder_position).normalize());
    let dot1 =
        plane_normal.dot((horizon_plane_position - offset - occluder_position).normalize());
    Some(dot0.min(dot1))
}

/// Rodrigues rotation of `v` by 90° about the unit vector `axis`:
/// `R = K + a·aᵀ`, with `K` the cross-product matrix of the axis.
fn rotate_quarter_turn(axis: DVec3, v: DVec3) -> DVec3 {
    let DVec3 { x, y, z } = axis;
    DVec3::new(
        x * x * v.x + (x * y - z) * v.y + (x * z + y) * v.z,
        (x * y + z) * v.x + y * y * v.y + (y * z - x) * v.z,
        (x * z - y) * v.x + (y * z + x) * v.y + z * z * v.z,
    )
}
