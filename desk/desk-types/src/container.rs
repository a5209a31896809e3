//! Container kinds and their geometry descriptors.
//!
//! Each [`ContainerKind`] owns one tolerance table and one rule for deriving
//! its interior from the body's outer size. Relation tests and placement
//! solvers look the descriptor up once instead of repeating literals.

use nalgebra::{Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed set of container behaviors, attached to an object at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContainerKind {
    /// Open-top box.
    OpenBox,
    /// Box with a hinged lid; only accepts placement while open.
    LiddedBox,
    /// Cabinet drawer; accepts placement while open with every upper drawer closed.
    Drawer,
    /// Deep round vessel.
    Bowl,
    /// Shallow round vessel.
    Plate,
}

impl ContainerKind {
    /// Round vessels use cylindrical bounds instead of boxes.
    #[must_use]
    pub const fn is_round(self) -> bool {
        matches!(self, Self::Bowl | Self::Plate)
    }

    /// Containers that open and close.
    #[must_use]
    pub const fn is_toggleable(self) -> bool {
        matches!(self, Self::LiddedBox | Self::Drawer)
    }

    /// Side wall thickness.
    #[must_use]
    pub const fn wall_thickness(self) -> f64 {
        match self {
            Self::OpenBox => 0.6,
            Self::LiddedBox => 0.5,
            Self::Drawer => 1.0,
            Self::Bowl => 0.3,
            Self::Plate => 0.2,
        }
    }

    /// Floor thickness.
    #[must_use]
    pub const fn floor_thickness(self) -> f64 {
        match self {
            Self::OpenBox => 0.6,
            Self::LiddedBox => 0.5,
            Self::Drawer => 1.0,
            Self::Bowl => 0.3,
            Self::Plate => 0.2,
        }
    }

    /// Tolerance bands for the containment test.
    #[must_use]
    pub const fn tolerances(self) -> ContainerTolerances {
        match self {
            Self::OpenBox => ContainerTolerances {
                floor_band: Band::new(0.5, 1.5),
                rim_slack: 1.5,
                lateral_slack: 0.0,
            },
            Self::LiddedBox => ContainerTolerances {
                floor_band: Band::new(0.5, 1.5),
                rim_slack: 0.5,
                lateral_slack: 0.0,
            },
            Self::Drawer => ContainerTolerances {
                floor_band: Band::new(0.5, 1.0),
                rim_slack: 0.5,
                lateral_slack: 0.0,
            },
            Self::Bowl => ContainerTolerances {
                floor_band: Band::new(0.5, 2.5),
                rim_slack: 3.0,
                lateral_slack: 0.0,
            },
            Self::Plate => ContainerTolerances {
                floor_band: Band::new(0.5, 1.0),
                rim_slack: 4.0,
                lateral_slack: 0.5,
            },
        }
    }

    /// Derive the interior descriptor for a body of full outer size `size`.
    ///
    /// # Example
    ///
    /// ```
    /// use desk_types::ContainerKind;
    /// use nalgebra::Vector3;
    ///
    /// let g = ContainerKind::OpenBox.geometry(&Vector3::new(16.0, 6.0, 16.0));
    /// assert!((g.interior_half.x - 7.4).abs() < 1e-12);
    /// assert!((g.floor_offset + 2.4).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn geometry(self, size: &Vector3<f64>) -> ContainerGeometry {
        let wall = self.wall_thickness();
        let floor = self.floor_thickness();
        let interior_half = Vector2::new(
            (0.5 * size.x - wall).max(0.0),
            (0.5 * size.z - wall).max(0.0),
        );
        let radius = if self.is_round() {
            interior_half.x.min(interior_half.y)
        } else {
            0.0
        };
        ContainerGeometry {
            kind: self,
            interior_half,
            floor_offset: -0.5 * size.y + floor,
            interior_height: (size.y - floor).max(0.0),
            radius,
            tolerances: self.tolerances(),
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OpenBox => "box",
            Self::LiddedBox => "lidded box",
            Self::Drawer => "drawer",
            Self::Bowl => "bowl",
            Self::Plate => "plate",
        };
        f.write_str(name)
    }
}

/// Asymmetric window around a reference height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Band {
    /// Allowed distance below the reference.
    pub below: f64,
    /// Allowed distance above the reference.
    pub above: f64,
}

impl Band {
    /// Create a band.
    #[must_use]
    pub const fn new(below: f64, above: f64) -> Self {
        Self { below, above }
    }

    /// Returns `true` if `value` lies within the band around `reference`.
    #[must_use]
    pub fn contains(&self, reference: f64, value: f64) -> bool {
        value >= reference - self.below && value <= reference + self.above
    }
}

/// Tolerances applied by the containment test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerTolerances {
    /// Where an occupant's bottom may sit relative to the interior floor.
    pub floor_band: Band,
    /// How far an occupant's top may rise above the rim.
    pub rim_slack: f64,
    /// Extra horizontal allowance beyond the interior.
    pub lateral_slack: f64,
}

/// Interior descriptor of one container body, in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerGeometry {
    /// The container behavior.
    pub kind: ContainerKind,
    /// Interior half-extents along local X and Z.
    pub interior_half: Vector2<f64>,
    /// Height of the interior floor relative to the body center.
    pub floor_offset: f64,
    /// Floor-to-rim height.
    pub interior_height: f64,
    /// Interior radius of round vessels (zero otherwise).
    pub radius: f64,
    /// Containment tolerances.
    pub tolerances: ContainerTolerances,
}

impl ContainerGeometry {
    /// Rim height relative to the body center.
    #[must_use]
    pub fn rim_offset(&self) -> f64 {
        self.floor_offset + self.interior_height
    }
}
