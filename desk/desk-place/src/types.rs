//! Inputs and outputs shared by every solver.

use desk_types::{
    bounding_radius, oriented_size, yaw_rotation, ContainerGeometry, ObjectKind, Pose, Reorient,
};
use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The object to be placed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementRequest {
    /// Category of the object.
    pub kind: ObjectKind,
    /// Full size (x, y, z) in the object's upright frame.
    pub size: Vector3<f64>,
    /// Current heading, kept by tabletop placement.
    pub yaw: f64,
}

impl PlacementRequest {
    /// Create a request for an upright object with zero heading.
    #[must_use]
    pub const fn new(kind: ObjectKind, size: Vector3<f64>) -> Self {
        Self {
            kind,
            size,
            yaw: 0.0,
        }
    }

    /// Create a request using the kind's default size.
    #[must_use]
    pub fn of_kind(kind: ObjectKind) -> Self {
        Self::new(kind, kind.default_size())
    }

    /// Set the heading.
    #[must_use]
    pub const fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    /// Horizontal bounding radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        bounding_radius(self.kind, &self.size)
    }
}

/// An object already inside the target container, seen from above.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Occupant {
    /// Planar center (`y` is world Z).
    pub center: Point2<f64>,
    /// Horizontal bounding radius.
    pub radius: f64,
}

impl Occupant {
    /// Create an occupant.
    #[must_use]
    pub const fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Returns `true` if a disc of `radius` at `point` keeps `clearance` from this occupant.
    #[must_use]
    pub fn is_clear_of(&self, point: &Point2<f64>, radius: f64, clearance: f64) -> bool {
        nalgebra::distance(&self.center, point) >= self.radius + radius + clearance
    }
}

/// World pose of a container body together with its interior descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerFrame {
    /// Pose of the container body center.
    pub pose: Pose,
    /// Interior descriptor.
    pub geometry: ContainerGeometry,
}

impl ContainerFrame {
    /// Create a frame.
    #[must_use]
    pub const fn new(pose: Pose, geometry: ContainerGeometry) -> Self {
        Self { pose, geometry }
    }

    /// Planar center of the container.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        desk_types::planar(&self.pose.position)
    }

    /// Heading of the container.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.pose.yaw()
    }

    /// World height of the interior floor.
    #[must_use]
    pub fn floor_y(&self) -> f64 {
        self.pose
            .transform_point(&Point3::new(0.0, self.geometry.floor_offset, 0.0))
            .y
    }
}

/// A solved pose.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// World position of the object center.
    pub position: Point3<f64>,
    /// Heading about +Y.
    pub yaw: f64,
    /// Quarter-turn applied so the object fits.
    pub reorient: Option<Reorient>,
    /// Achieved full size after any reorientation.
    pub size: Vector3<f64>,
}

impl Placement {
    /// Create an upright placement.
    #[must_use]
    pub const fn upright(position: Point3<f64>, yaw: f64, size: Vector3<f64>) -> Self {
        Self {
            position,
            yaw,
            reorient: None,
            size,
        }
    }

    /// Full orientation: heading, then the optional quarter-turn in the object's frame.
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let heading = yaw_rotation(self.yaw);
        match self.reorient {
            Some(r) => heading * r.rotation(),
            None => heading,
        }
    }

    /// Target pose for the animator.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::from_position_rotation(self.position, self.rotation())
    }

    /// Planar center.
    #[must_use]
    pub fn planar(&self) -> Point2<f64> {
        desk_types::planar(&self.position)
    }
}

/// Size an object presents after an optional quarter-turn.
#[must_use]
pub fn achieved_size(request: &PlacementRequest, reorient: Option<Reorient>) -> Vector3<f64> {
    oriented_size(&request.size, reorient)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use desk_types::ContainerKind;

    #[test]
    fn test_occupant_clearance() {
        let occ = Occupant::new(Point2::new(0.0, 0.0), 1.0);
        assert!(occ.is_clear_of(&Point2::new(2.5, 0.0), 1.0, 0.5));
        assert!(!occ.is_clear_of(&Point2::new(2.4, 0.0), 1.0, 0.5));
    }

    #[test]
    fn test_frame_floor_height() {
        let size = Vector3::new(16.0, 6.0, 16.0);
        let frame = ContainerFrame::new(
            Pose::from_yaw(Point3::new(0.0, 3.0, 0.0), 0.4),
            ContainerKind::OpenBox.geometry(&size),
        );
        assert_relative_eq!(frame.floor_y(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(frame.yaw(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_placement_rotation_includes_reorient() {
        let p = Placement {
            position: Point3::origin(),
            yaw: 0.0,
            reorient: Some(Reorient::AboutX),
            size: Vector3::new(1.0, 3.0, 2.0),
        };
        let up = p.rotation() * Vector3::y();
        assert_relative_eq!(up.y, 0.0, epsilon = 1e-12);
    }
}
