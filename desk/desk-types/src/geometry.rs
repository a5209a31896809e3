//! Planar geometry utilities.
//!
//! Every size and collision check on the desk happens in the horizontal
//! plane. Planar points use [`Point2`] with `.x` holding world X and `.y`
//! holding world **Z**.

use std::f64::consts::PI;

use nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extract the heading about +Y from an orientation.
///
/// The heading is read from where the rotation sends local +X, so it is
/// well defined for upright bodies and degrades gracefully for tilted ones.
///
/// # Example
///
/// ```
/// use desk_types::{yaw_from_rotation, yaw_rotation};
///
/// let q = yaw_rotation(1.2);
/// assert!((yaw_from_rotation(&q) - 1.2).abs() < 1e-12);
/// ```
#[must_use]
pub fn yaw_from_rotation(rotation: &UnitQuaternion<f64>) -> f64 {
    let axis = rotation * Vector3::x();
    if axis.x.abs() < 1e-12 && axis.z.abs() < 1e-12 {
        // Local +X points straight up or down; fall back to local +Z.
        let forward = rotation * Vector3::z();
        return forward.x.atan2(forward.z);
    }
    (-axis.z).atan2(axis.x)
}

/// Build a rotation of `yaw` radians about +Y.
#[must_use]
pub fn yaw_rotation(yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
}

/// Wrap an angle into `(-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Drop the vertical component of a world point.
#[must_use]
pub fn planar(point: &Point3<f64>) -> Point2<f64> {
    Point2::new(point.x, point.z)
}

/// Express a world planar point in a frame at `origin` with heading `yaw`.
///
/// Inverse of [`to_world_2d`].
#[must_use]
pub fn to_local_2d(origin: &Point2<f64>, yaw: f64, world: &Point2<f64>) -> Point2<f64> {
    let (s, c) = yaw.sin_cos();
    let d = world - origin;
    Point2::new(d.x * c - d.y * s, d.x * s + d.y * c)
}

/// Map a local planar point of a frame at `origin` with heading `yaw` to world.
#[must_use]
pub fn to_world_2d(origin: &Point2<f64>, yaw: f64, local: &Point2<f64>) -> Point2<f64> {
    let (s, c) = yaw.sin_cos();
    Point2::new(
        origin.x + local.x * c + local.y * s,
        origin.y - local.x * s + local.y * c,
    )
}

/// Half-extents of the axis-aligned box enclosing a rectangle rotated by `yaw`.
///
/// # Example
///
/// ```
/// use desk_types::rotated_half_extents;
/// use nalgebra::Vector2;
///
/// let e = rotated_half_extents(&Vector2::new(2.0, 1.0), std::f64::consts::FRAC_PI_2);
/// assert!((e.x - 1.0).abs() < 1e-12);
/// assert!((e.y - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn rotated_half_extents(half: &Vector2<f64>, yaw: f64) -> Vector2<f64> {
    let (s, c) = yaw.sin_cos();
    Vector2::new(
        half.x * c.abs() + half.y * s.abs(),
        half.x * s.abs() + half.y * c.abs(),
    )
}

/// Horizontal half-diagonal of a box with the given full size.
#[must_use]
pub fn half_diagonal(size: &Vector3<f64>) -> f64 {
    (0.5 * size.x).hypot(0.5 * size.z)
}

/// Rotated rectangle on the tabletop plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    /// Center (`x` = world X, `y` = world Z).
    pub center: Point2<f64>,
    /// Half-extents along the rectangle's local axes.
    pub half: Vector2<f64>,
    /// Heading about +Y.
    pub yaw: f64,
}

impl Footprint {
    /// Create a footprint.
    #[must_use]
    pub const fn new(center: Point2<f64>, half: Vector2<f64>, yaw: f64) -> Self {
        Self { center, half, yaw }
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub fn inflated(&self, margin: f64) -> Self {
        Self {
            half: self.half.add_scalar(margin),
            ..*self
        }
    }

    /// Returns `true` if the point lies inside the rectangle (boundary included).
    #[must_use]
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        let local = to_local_2d(&self.center, self.yaw, point);
        local.x.abs() <= self.half.x && local.y.abs() <= self.half.y
    }

    /// World-axis-aligned half-extents.
    #[must_use]
    pub fn aabb_half(&self) -> Vector2<f64> {
        rotated_half_extents(&self.half, self.yaw)
    }

    /// The four corners, counter-clockwise in the local frame.
    #[must_use]
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let h = self.half;
        [
            Point2::new(-h.x, -h.y),
            Point2::new(h.x, -h.y),
            Point2::new(h.x, h.y),
            Point2::new(-h.x, h.y),
        ]
        .map(|local| to_world_2d(&self.center, self.yaw, &local))
    }

    /// Separating-axis overlap test between two rotated rectangles.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let axes = [self.yaw, self.yaw + PI / 2.0, other.yaw, other.yaw + PI / 2.0];
        let a = self.corners();
        let b = other.corners();
        axes.iter().all(|&angle| {
            // Local +X of a frame with this heading, in (x, z).
            let axis = Vector2::new(angle.cos(), -angle.sin());
            let project = |pts: &[Point2<f64>; 4]| {
                pts.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    let d = p.coords.dot(&axis);
                    (lo.min(d), hi.max(d))
                })
            };
            let (a_lo, a_hi) = project(&a);
            let (b_lo, b_hi) = project(&b);
            a_lo <= b_hi && b_lo <= a_hi
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_yaw_extraction_matches_rotation() {
        for yaw in [-2.5, -1.0, 0.0, 0.4, FRAC_PI_2, 3.0] {
            assert_relative_eq!(yaw_from_rotation(&yaw_rotation(yaw)), yaw, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_yaw_ignores_pitch_about_local_x() {
        let q = yaw_rotation(0.8) * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        assert_relative_eq!(yaw_from_rotation(&q), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-3.0 * FRAC_PI_2), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(0.25), 0.25);
    }

    #[test]
    fn test_local_world_roundtrip() {
        let origin = Point2::new(3.0, -4.0);
        let local = Point2::new(1.5, 2.0);
        let world = to_world_2d(&origin, 0.9, &local);
        assert_relative_eq!(to_local_2d(&origin, 0.9, &world), local, epsilon = 1e-12);
    }

    #[test]
    fn test_2d_transform_agrees_with_3d_rotation() {
        let yaw = 0.6;
        let v = yaw_rotation(yaw) * Vector3::new(1.0, 0.0, 2.0);
        let w = to_world_2d(&Point2::origin(), yaw, &Point2::new(1.0, 2.0));
        assert_relative_eq!(w.x, v.x, epsilon = 1e-12);
        assert_relative_eq!(w.y, v.z, epsilon = 1e-12);
    }

    #[test]
    fn test_footprint_contains_rotated() {
        let fp = Footprint::new(Point2::new(0.0, 0.0), Vector2::new(4.0, 1.0), FRAC_PI_2);
        // Long axis now runs along world Z.
        assert!(fp.contains(&Point2::new(0.0, 3.5)));
        assert!(!fp.contains(&Point2::new(3.5, 0.0)));
    }

    #[test]
    fn test_footprint_overlap() {
        let a = Footprint::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 1.0), 0.0);
        let b = Footprint::new(Point2::new(1.9, 0.0), Vector2::new(1.0, 1.0), 0.0);
        let c = Footprint::new(Point2::new(2.6, 0.0), Vector2::new(1.0, 1.0), PI / 4.0);
        let d = Footprint::new(Point2::new(2.3, 0.0), Vector2::new(1.0, 1.0), PI / 4.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.overlaps(&d));
    }

    #[test]
    fn test_half_diagonal() {
        assert_relative_eq!(half_diagonal(&Vector3::new(6.0, 1.0, 8.0)), 5.0);
    }
}
