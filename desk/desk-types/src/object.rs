//! Tracked object identity and classification.

use nalgebra::{UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::container::ContainerKind;
use crate::geometry::half_diagonal;

/// Stable internal key of a tracked object (`box_0`, `mug_2`,
/// `short_cabinet/drawer_low`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Create an id from any string-like key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

/// Category of a tracked object. Selects the collection it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ObjectKind {
    /// Open-top box.
    Box,
    /// Box with a hinged lid.
    LiddedBox,
    /// Mug.
    Mug,
    /// Small cube.
    Cube,
    /// Externally loaded asset (bowl, plate, cabinet, ...).
    Asset,
    /// Sliding drawer belonging to a cabinet asset.
    Drawer,
}

impl ObjectKind {
    /// Prefix used for internal keys (`box_0`).
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::LiddedBox => "lid_box",
            Self::Mug => "mug",
            Self::Cube => "cube",
            Self::Asset => "asset",
            Self::Drawer => "drawer",
        }
    }

    /// Default full size (x, y, z) for built-in primitives.
    ///
    /// Assets and drawers are sized by their descriptors instead.
    #[must_use]
    pub fn default_size(self) -> Vector3<f64> {
        match self {
            Self::Box => Vector3::new(16.0, 6.0, 16.0),
            Self::LiddedBox => Vector3::new(10.0, 6.0, 10.0),
            Self::Mug => Vector3::new(3.2, 3.6, 3.2),
            Self::Cube => Vector3::new(2.0, 2.0, 2.0),
            Self::Asset => Vector3::new(6.0, 6.0, 6.0),
            Self::Drawer => Vector3::new(22.0, 6.0, 16.0),
        }
    }

    /// Round objects use their inscribed radius rather than the half-diagonal.
    #[must_use]
    pub const fn is_round(self) -> bool {
        matches!(self, Self::Mug)
    }

    /// Objects that can never carry anything on top of them.
    #[must_use]
    pub const fn can_support(self) -> bool {
        !matches!(self, Self::Mug | Self::Cube)
    }

    /// Container behavior inherent to the kind (assets carry theirs explicitly).
    #[must_use]
    pub const fn inherent_container(self) -> Option<ContainerKind> {
        match self {
            Self::Box => Some(ContainerKind::OpenBox),
            Self::LiddedBox => Some(ContainerKind::LiddedBox),
            Self::Drawer => Some(ContainerKind::Drawer),
            Self::Mug | Self::Cube | Self::Asset => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_prefix())
    }
}

/// Horizontal bounding radius used for clearance checks.
#[must_use]
pub fn bounding_radius(kind: ObjectKind, size: &Vector3<f64>) -> f64 {
    if kind.is_round() {
        0.5 * size.x.max(size.z)
    } else {
        half_diagonal(size)
    }
}

/// Color variant of a primitive. Drives display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Color {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Yellow.
    Yellow,
    /// Purple.
    Purple,
    /// Orange.
    Orange,
    /// White.
    White,
    /// Black.
    Black,
}

impl Color {
    /// All variants in palette order.
    pub const ALL: [Self; 8] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
        Self::White,
        Self::Black,
    ];

    /// Palette lookup by variant index, wrapping.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Lowercase name used in display names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

/// Quarter-turn reorientation applied so an object fits a low drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reorient {
    /// 90 degrees about the object's local X axis (height and depth swap).
    AboutX,
    /// 90 degrees about the object's local Z axis (height and width swap).
    AboutZ,
}

impl Reorient {
    /// Size of an object of full size `size` after the reorientation.
    #[must_use]
    pub fn apply_to_size(self, size: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::AboutX => Vector3::new(size.x, size.z, size.y),
            Self::AboutZ => Vector3::new(size.y, size.x, size.z),
        }
    }

    /// The local rotation realizing the reorientation.
    #[must_use]
    pub fn rotation(self) -> UnitQuaternion<f64> {
        let quarter = std::f64::consts::FRAC_PI_2;
        match self {
            Self::AboutX => UnitQuaternion::from_axis_angle(&Vector3::x_axis(), quarter),
            Self::AboutZ => UnitQuaternion::from_axis_angle(&Vector3::z_axis(), quarter),
        }
    }
}

/// Effective size of an object, accounting for an optional reorientation.
#[must_use]
pub fn oriented_size(size: &Vector3<f64>, reorient: Option<Reorient>) -> Vector3<f64> {
    reorient.map_or(*size, |r| r.apply_to_size(size))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_radius() {
        let mug = ObjectKind::Mug.default_size();
        assert_relative_eq!(bounding_radius(ObjectKind::Mug, &mug), 1.6);

        let cube = ObjectKind::Cube.default_size();
        assert_relative_eq!(
            bounding_radius(ObjectKind::Cube, &cube),
            std::f64::consts::SQRT_2
        );
    }

    #[test]
    fn test_reorient_sizes() {
        let size = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(Reorient::AboutX.apply_to_size(&size), Vector3::new(1.0, 3.0, 2.0));
        assert_eq!(Reorient::AboutZ.apply_to_size(&size), Vector3::new(2.0, 1.0, 3.0));
        assert_eq!(oriented_size(&size, None), size);
    }

    #[test]
    fn test_reorient_rotation_matches_size_swap() {
        let size = Vector3::new(1.0, 2.0, 3.0);
        for r in [Reorient::AboutX, Reorient::AboutZ] {
            let rotated = r.rotation() * size;
            let abs = rotated.map(f64::abs);
            assert_relative_eq!(abs, r.apply_to_size(&size), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_color_palette_wraps() {
        assert_eq!(Color::from_index(0), Color::Red);
        assert_eq!(Color::from_index(10), Color::Blue);
        assert_eq!(Color::Purple.name(), "purple");
    }

    #[test]
    fn test_support_rules() {
        assert!(ObjectKind::Box.can_support());
        assert!(!ObjectKind::Cube.can_support());
        assert!(!ObjectKind::Mug.can_support());
        assert_eq!(
            ObjectKind::LiddedBox.inherent_container(),
            Some(ContainerKind::LiddedBox)
        );
    }
}
