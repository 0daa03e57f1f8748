//! Occluder construction and sphere visibility classification.

use glam::DVec3;
use tracing::trace;
use vista_math::BoundingSphere;

use crate::error::OcclusionError;
use crate::visibility::Visibility;

/// Radian tolerance for silhouette-angle comparisons. Exact tangency is
/// classified on the non-occluded side so verdicts do not flicker at the
/// boundary.
const ANGLE_EPSILON: f64 = 1e-10;

/// A single convex occluding body, seen from a fixed camera position, with
/// its horizon geometry cached at construction.
///
/// Rebuild the occluder whenever the camera or the occluding body moves
/// (typically once per frame); instances are read-only afterwards and may be
/// shared freely across threads.
#[derive(Clone, Debug)]
pub struct Occluder {
    sphere: BoundingSphere,
    camera_position: DVec3,
    /// Distance from the camera to the occluder center.
    camera_distance: f64,
    /// Distance from the camera to the tangent (horizon) circle on the
    /// occluder sphere.
    horizon_distance: f64,
}

impl Occluder {
    /// Build an occluder from its bounding sphere and the camera position.
    ///
    /// Fails when the sphere radius is not strictly positive or the camera
    /// lies inside or on the sphere, since the horizon is undefined there.
    pub fn new(sphere: BoundingSphere, camera_position: DVec3) -> Result<Self, OcclusionError> {
        if sphere.radius <= 0.0 {
            return Err(OcclusionError::NonPositiveRadius(sphere.radius));
        }
        let camera_distance = sphere.distance_to_center(camera_position);
        if camera_distance <= sphere.radius {
            return Err(OcclusionError::CameraInsideOccluder {
                distance: camera_distance,
                radius: sphere.radius,
            });
        }
        let horizon_distance =
            (camera_distance * camera_distance - sphere.radius * sphere.radius).sqrt();
        trace!(camera_distance, horizon_distance, "occluder constructed");
        Ok(Self {
            sphere,
            camera_position,
            camera_distance,
            horizon_distance,
        })
    }

    /// The occluding sphere.
    pub fn sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    /// Center of the occluding sphere.
    pub fn position(&self) -> DVec3 {
        self.sphere.center
    }

    /// Radius of the occluding sphere.
    pub fn radius(&self) -> f64 {
        self.sphere.radius
    }

    /// Camera position this occluder was built for.
    pub fn camera_position(&self) -> DVec3 {
        self.camera_position
    }

    /// Straight-line distance from the camera to the horizon circle.
    pub fn horizon_distance(&self) -> f64 {
        self.horizon_distance
    }

    /// Classify how much of `occludee` can be seen past this occluder.
    ///
    /// Compares the angular half-widths of the two silhouettes as seen from
    /// the camera, gated on the occludee actually sitting beyond the horizon
    /// plane. An occludee with a larger radius than the occluder is always
    /// reported [`Visibility::Full`], even when partially blocked.
    pub fn visibility(&self, occludee: &BoundingSphere) -> Visibility {
        let to_occludee = occludee.center - self.camera_position;
        let occludee_distance = to_occludee.length();

        // A camera inside or touching the occludee has nothing left to
        // occlude.
        if occludee_distance <= occludee.radius {
            return Visibility::Full;
        }

        if occludee.radius > self.sphere.radius {
            return Visibility::Full;
        }

        let to_occluder = self.sphere.center - self.camera_position;
        let cos_theta = (to_occluder.dot(to_occludee)
            / (self.camera_distance * occludee_distance))
            .clamp(-1.0, 1.0);

        // Depth gate: only geometry beyond the horizon plane can be hidden.
        // Anything nearer than the tangent point stays fully visible no
        // matter how the silhouettes overlap.
        if occludee_distance * cos_theta <= self.horizon_distance {
            return Visibility::Full;
        }

        let theta = cos_theta.acos();
        // Half-angle of the occluder's silhouette cone. Well-defined since
        // the camera is strictly outside the sphere.
        let alpha = (self.sphere.radius / self.camera_distance).asin();
        // Half-angle subtended by the occludee, clamped for an occludee
        // larger than its own distance.
        let beta = (occludee.radius / occludee_distance).min(1.0).asin();

        if theta + beta < alpha - ANGLE_EPSILON {
            Visibility::None
        } else if theta - beta >= alpha - ANGLE_EPSILON {
            Visibility::Full
        } else {
            Visibility::Partial
        }
    }

    /// Whether any part of `occludee` can be seen (`visibility != None`).
    pub fn is_visible(&self, occludee: &BoundingSphere) -> bool {
        self.visibility(occludee) != Visibility::None
    }

    /// Test a single point, typically one produced by
    /// [`compute_occludee_point`](crate::compute_occludee_point).
    pub fn is_point_visible(&self, point: DVec3) -> bool {
        self.is_visible(&BoundingSphere::new(point, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_rejects_camera_at_center() {
        let sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -8.0), 2.0);
        let err = Occluder::new(sphere, DVec3::new(0.0, 0.0, -8.0)).unwrap_err();
        assert!(matches!(err, OcclusionError::CameraInsideOccluder { .. }));
    }

    #[test]
    fn test_construction_rejects_camera_on_surface() {
        let sphere = BoundingSphere::new(DVec3::ZERO, 2.0);
        let err = Occluder::new(sphere, DVec3::new(2.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, OcclusionError::CameraInsideOccluder { .. }));
    }

    #[test]
    fn test_construction_rejects_zero_radius() {
        let sphere = BoundingSphere::new(DVec3::ZERO, 0.0);
        let err = Occluder::new(sphere, DVec3::new(5.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(err, OcclusionError::NonPositiveRadius(0.0));
    }

    #[test]
    fn test_horizon_distance_is_tangent_length() {
        let sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -1.5), 0.5);
        let occluder = Occluder::new(sphere, DVec3::ZERO).unwrap();
        assert!((occluder.horizon_distance() - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    /// A smaller occludee directly behind the occluder is entirely eclipsed.
    #[test]
    fn test_entirely_eclipses_a_smaller_occludee() {
        let giant = BoundingSphere::new(DVec3::new(0.0, 0.0, -1.5), 0.5);
        let little = BoundingSphere::new(DVec3::new(0.0, 0.0, -2.75), 0.25);
        let occluder = Occluder::new(giant, DVec3::ZERO).unwrap();
        assert!(!occluder.is_visible(&little));
        assert_eq!(occluder.visibility(&little), Visibility::None);
    }

    /// A larger occludee behind a smaller occluder stays fully visible.
    #[test]
    fn test_larger_occludee_behind_smaller_occluder_is_full() {
        let little = BoundingSphere::new(DVec3::new(0.0, 0.0, -1.5), 0.5);
        let big = BoundingSphere::new(DVec3::new(0.0, 0.0, -3.0), 1.0);
        let occluder = Occluder::new(little, DVec3::ZERO).unwrap();
        assert_eq!(occluder.visibility(&big), Visibility::Full);
    }

    #[test]
    fn test_occludee_in_front_of_occluder_is_full() {
        let little = BoundingSphere::new(DVec3::new(0.0, 0.0, -2.75), 0.25);
        let big = BoundingSphere::new(DVec3::new(0.0, 0.0, -1.5), 0.5);
        let occluder = Occluder::new(little, DVec3::ZERO).unwrap();
        assert!(occluder.radius() < big.radius);
        assert!(occluder.is_visible(&big));
        assert_eq!(occluder.visibility(&big), Visibility::Full);
    }

    #[test]
    fn test_blocks_an_aligned_occludee_of_equal_size() {
        let front = BoundingSphere::new(DVec3::new(0.0, 0.0, -1.5), 0.5);
        let back = BoundingSphere::new(DVec3::new(0.0, 0.0, -2.5), 0.5);
        let occluder = Occluder::new(front, DVec3::ZERO).unwrap();
        assert!(!occluder.is_visible(&back));
        assert_eq!(occluder.visibility(&back), Visibility::None);
    }

    /// Side-by-side spheres do not occlude each other; the depth gate keeps
    /// the neighbor fully visible.
    #[test]
    fn test_side_by_side_occludee_is_full() {
        let left = BoundingSphere::new(DVec3::new(-1.25, 0.0, -1.5), 0.5);
        let right = BoundingSphere::new(DVec3::new(1.25, 0.0, -1.5), 0.5);
        let occluder = Occluder::new(left, DVec3::ZERO).unwrap();
        assert_eq!(occluder.visibility(&right), Visibility::Full);
    }

    #[test]
    fn test_partially_blocks_an_offset_occludee() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -2.0), 1.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        let occludee = BoundingSphere::new(DVec3::new(0.5, 0.5, -3.0), 1.0);
        assert_eq!(occluder.visibility(&occludee), Visibility::Partial);
    }

    #[test]
    fn test_partially_blocks_a_laterally_intersecting_occludee() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(-0.5, 0.0, -1.0), 1.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        let occludee = BoundingSphere::new(DVec3::new(0.5, 0.0, -1.0), 1.0);
        assert_eq!(occluder.visibility(&occludee), Visibility::Partial);
    }

    #[test]
    fn test_partially_blocks_a_vertically_intersecting_occludee() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -2.0), 1.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        let occludee = BoundingSphere::new(DVec3::new(0.0, 0.5, -2.5), 1.0);
        assert_eq!(occluder.visibility(&occludee), Visibility::Partial);
    }

    /// An occludee nearer to the camera than the tangent point can never be
    /// hidden, even when it sits dead on the viewing axis.
    #[test]
    fn test_depth_gate_keeps_near_occludee_full() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -4.0), 1.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        let near = BoundingSphere::new(DVec3::new(0.0, 0.0, -1.0), 0.5);
        assert!(near.center.length() < occluder.horizon_distance());
        assert_eq!(occluder.visibility(&near), Visibility::Full);
    }

    #[test]
    fn test_camera_inside_occludee_is_full() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -5.0), 1.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        let around_camera = BoundingSphere::new(DVec3::new(0.0, 0.2, 0.0), 0.5);
        assert_eq!(occluder.visibility(&around_camera), Visibility::Full);
    }

    /// Shrinking an occludee at a fixed center never makes it more visible.
    #[test]
    fn test_visibility_is_monotonic_in_occludee_radius() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -2.0), 1.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        let center = DVec3::new(1.5, 0.0, -4.0);
        let small = BoundingSphere::new(center, 0.2);
        let large = BoundingSphere::new(center, 1.0);
        assert_eq!(occluder.visibility(&small), Visibility::None);
        assert_eq!(occluder.visibility(&large), Visibility::Partial);
        assert!(occluder.visibility(&small) <= occluder.visibility(&large));
    }

    #[test]
    fn test_point_visibility() {
        let occluder_sphere = BoundingSphere::new(DVec3::new(0.0, 0.0, -8.0), 2.0);
        let occluder = Occluder::new(occluder_sphere, DVec3::ZERO).unwrap();
        // Behind the planet, on the viewing axis.
        assert!(!occluder.is_point_visible(DVec3::new(0.0, 0.0, -20.0)));
        // Off to the side, well clear of the silhouette.
        assert!(occluder.is_point_visible(DVec3::new(15.0, 0.0, -20.0)));
        // In front of the horizon.
        assert!(occluder.is_point_visible(DVec3::new(0.0, 0.0, -3.0)));
    }
}
