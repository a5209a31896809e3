//! Core types for the tabletop placement engine.
//!
//! This crate holds the pure data shared by the placement solvers and the
//! simulation core: rigid-body state, planar geometry helpers, object and
//! container classification, the symbolic scene graph, configuration, and
//! errors.
//!
//! # Overview
//!
//! - **Bodies**: [`BodyId`], [`Pose`], [`Twist`], [`RigidBody`]
//! - **Geometry**: yaw extraction, local/world planar transforms, rotated
//!   [`Footprint`]s
//! - **Objects**: [`ObjectId`], [`ObjectKind`], [`Color`], [`Reorient`]
//! - **Containers**: [`ContainerKind`] with per-kind [`ContainerGeometry`]
//!   descriptors and tolerance bands
//! - **Scene graph**: [`Relation`], [`Edge`], [`SceneGraph`]
//! - **Configuration**: [`DeskConfig`]
//! - **Errors**: [`DeskError`], [`Rejection`]
//!
//! # Coordinate frame
//!
//! The desk is **Y-up**. The tabletop spans X and Z, yaw is a rotation about
//! +Y, and planar points ([`nalgebra::Point2`]) carry world Z in `.y`.
//!
//! # Example
//!
//! ```
//! use desk_types::{ContainerKind, Footprint, Pose};
//! use nalgebra::{Point2, Point3, Vector2, Vector3};
//!
//! let box_pose = Pose::from_yaw(Point3::new(10.0, 3.0, 0.0), 0.3);
//! let interior = ContainerKind::OpenBox.geometry(&Vector3::new(16.0, 6.0, 16.0));
//!
//! let fp = Footprint::new(Point2::new(10.0, 0.0), interior.interior_half, box_pose.yaw());
//! assert!(fp.contains(&Point2::new(12.0, 1.0)));
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for all types

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

pub mod body;
pub mod config;
pub mod container;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod object;

pub use body::{BodyId, Pose, RigidBody, Twist};
pub use config::{
    CapacityConfig, DeskConfig, PlacementConfig, RelationConfig, TableConfig, TimingConfig,
};
pub use container::{Band, ContainerGeometry, ContainerKind, ContainerTolerances};
pub use error::{DeskError, Rejection};
pub use geometry::{
    half_diagonal, planar, rotated_half_extents, to_local_2d, to_world_2d, wrap_angle,
    yaw_from_rotation, yaw_rotation, Footprint,
};
pub use graph::{decorated_node, Edge, Relation, SceneGraph, HAND, TABLE};
pub use object::{bounding_radius, oriented_size, Color, ObjectId, ObjectKind, Reorient};

// Re-export nalgebra types used throughout the public API
pub use nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};

/// Result type for desk operations.
pub type Result<T> = std::result::Result<T, DeskError>;
