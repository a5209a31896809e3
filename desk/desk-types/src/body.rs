//! Rigid body state types.
//!
//! This module provides the per-body state the external rigid-body simulator
//! exposes to the placement engine: pose, velocity, and the two kinematic
//! override flags (integration frozen, rotation locked).

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{yaw_from_rotation, yaw_rotation};

/// Unique identifier for a rigid body in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u64);

impl BodyId {
    /// Create a new body ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Position and orientation of a rigid body.
///
/// The desk uses a **Y-up** frame: the tabletop spans X and Z, and yaw is a
/// rotation about +Y.
///
/// # Example
///
/// ```
/// use desk_types::Pose;
/// use nalgebra::Point3;
///
/// let pose = Pose::from_yaw(Point3::new(1.0, 2.0, 3.0), std::f64::consts::FRAC_PI_2);
///
/// // Local +X points along world -Z after a quarter turn about +Y
/// let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((world.x - 1.0).abs() < 1e-10);
/// assert!((world.z - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Position in world coordinates.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create an identity pose (origin, no rotation).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pose from position only (identity rotation).
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pose from position and rotation.
    #[must_use]
    pub const fn from_position_rotation(
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self { position, rotation }
    }

    /// Create an upright pose rotated by `yaw` radians about +Y.
    #[must_use]
    pub fn from_yaw(position: Point3<f64>, yaw: f64) -> Self {
        Self {
            position,
            rotation: yaw_rotation(yaw),
        }
    }

    /// Convert to an isometry.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(self.position.coords.into(), self.rotation)
    }

    /// Heading about +Y, in radians within `(-π, π]`.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        yaw_from_rotation(&self.rotation)
    }

    /// Transform a point from local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.position + self.rotation * local.coords
    }

    /// Transform a vector from local to world coordinates (rotation only).
    #[must_use]
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * local
    }

    /// Transform a point from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation.inverse() * (world - self.position))
    }

    /// Compute the inverse pose.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            position: Point3::from(-(inv_rotation * self.position.coords)),
            rotation: inv_rotation,
        }
    }

    /// Compose two poses: self * other.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            position: self.transform_point(&other.position),
            rotation: self.rotation * other.rotation,
        }
    }

    /// Express `other` relative to this pose, so that `self.compose(&rel) == other`.
    #[must_use]
    pub fn relative(&self, other: &Self) -> Self {
        self.inverse().compose(other)
    }

    /// Check if the pose contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|x| x.is_finite())
            && self.rotation.coords.iter().all(|x| x.is_finite())
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Twist {
    /// Linear velocity in world coordinates.
    pub linear: Vector3<f64>,
    /// Angular velocity in world coordinates (rad/s).
    pub angular: Vector3<f64>,
}

impl Default for Twist {
    fn default() -> Self {
        Self::zero()
    }
}

impl Twist {
    /// Create a twist with specified linear and angular velocity.
    #[must_use]
    pub const fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }

    /// Create a zero twist (at rest).
    #[must_use]
    pub fn zero() -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
        }
    }

    /// Returns `true` if both components are below `epsilon` in magnitude.
    #[must_use]
    pub fn is_at_rest(&self, epsilon: f64) -> bool {
        self.linear.norm() < epsilon && self.angular.norm() < epsilon
    }
}

/// One rigid body as exposed by the simulator.
///
/// `frozen` suspends integration for this body (the kinematic animator writes
/// its pose directly). `rotation_locked` pins orientation while it moves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// Current pose.
    pub pose: Pose,
    /// Current velocity.
    pub twist: Twist,
    /// Integration suspended for this body.
    pub frozen: bool,
    /// Orientation pinned during kinematic moves.
    pub rotation_locked: bool,
}

impl RigidBody {
    /// Create a body at rest at the given pose.
    #[must_use]
    pub fn at_rest(pose: Pose) -> Self {
        Self {
            pose,
            twist: Twist::zero(),
            frozen: false,
            rotation_locked: false,
        }
    }

    /// Pin the body for a kinematic move: zero velocity, locked rotation.
    pub fn pin(&mut self) {
        self.twist = Twist::zero();
        self.frozen = true;
        self.rotation_locked = true;
    }

    /// Release a previously pinned body.
    pub fn release(&mut self) {
        self.twist = Twist::zero();
        self.frozen = false;
        self.rotation_locked = false;
    }
}
