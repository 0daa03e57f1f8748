use glam::DVec3;

/// A sphere enclosing a piece of geometry, used as the input and output type
/// of all visibility tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere in world space.
    pub center: DVec3,
    /// Radius of the sphere. Never negative.
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a sphere from an explicit center and radius.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Compute a tight enclosing sphere of a point set with Ritter's
    /// algorithm: seed from the farthest pair among the axis-extreme points,
    /// then grow the sphere over every point left outside.
    ///
    /// Returns `None` for an empty slice. A single point yields a sphere of
    /// radius zero.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;

        let mut x_min = first;
        let mut x_max = first;
        let mut y_min = first;
        let mut y_max = first;
        let mut z_min = first;
        let mut z_max = first;
        for &p in points {
            if p.x < x_min.x {
                x_min = p;
            }
            if p.x > x_max.x {
                x_max = p;
            }
            if p.y < y_min.y {
                y_min = p;
            }
            if p.y > y_max.y {
                y_max = p;
            }
            if p.z < z_min.z {
                z_min = p;
            }
            if p.z > z_max.z {
                z_max = p;
            }
        }

        // The axis pair with the widest span seeds the sphere.
        let spans = [
            (x_min, x_max, x_min.distance_squared(x_max)),
            (y_min, y_max, y_min.distance_squared(y_max)),
            (z_min, z_max, z_min.distance_squared(z_max)),
        ];
        let (a, b, _) = spans
            .into_iter()
            .max_by(|lhs, rhs| lhs.2.total_cmp(&rhs.2))?;

        let mut center = (a + b) * 0.5;
        let mut radius = a.distance(center);

        // Growth pass: shift the center toward each outlier just enough to
        // cover both it and the far side of the current sphere.
        for &p in points {
            let d = p.distance(center);
            if d > radius {
                let grown = (radius + d) * 0.5;
                center += (p - center) * ((d - radius) / (2.0 * d));
                radius = grown;
            }
        }

        Some(Self { center, radius })
    }

    /// Whether `point` lies inside or on the sphere.
    pub fn contains_point(&self, point: DVec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Distance from the sphere center to `point`.
    pub fn distance_to_center(&self, point: DVec3) -> f64 {
        self.center.distance(point)
    }
}
