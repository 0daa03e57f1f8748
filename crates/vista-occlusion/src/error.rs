/// Errors reported by occluder construction and the occludee-point
/// reduction. All of them indicate bad geometry setup on the caller's side
/// and are detected synchronously at the call boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OcclusionError {
    /// The occluder sphere has a zero or negative radius.
    #[error("occluder radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    /// The camera lies inside or on the occluder sphere, where the horizon
    /// geometry is undefined.
    #[error(
        "camera at distance {distance} from the occluder center is inside or on \
         the occluder sphere of radius {radius}"
    )]
    CameraInsideOccluder {
        /// Distance from the camera to the occluder center.
        distance: f64,
        /// Radius of the occluder sphere.
        radius: f64,
    },
    /// The occludee-point reduction was given no sample positions.
    #[error("occludee point reduction requires at least one sample position")]
    NoSamplePositions,
    /// The representative position coincides with the occluder center, so no
    /// viewing direction can be derived for the reduction plane.
    #[error("representative position coincides with the occluder center")]
    DegenerateRepresentative,
}
