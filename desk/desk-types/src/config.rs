//! Configuration for the placement engine.
//!
//! Every tunable of the desk lives here: table dimensions, placement search
//! limits, container capacities, relation tolerances, and timing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::container::ContainerKind;
use crate::error::DeskError;

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeskConfig {
    /// Tabletop dimensions.
    pub table: TableConfig,
    /// Placement search settings.
    pub placement: PlacementConfig,
    /// Occupant ceilings per container kind.
    pub capacity: CapacityConfig,
    /// Relation inference tolerances.
    pub relation: RelationConfig,
    /// Scheduler and animation timing.
    pub timing: TimingConfig,
}

impl DeskConfig {
    /// Set the table configuration.
    #[must_use]
    pub fn with_table(mut self, table: TableConfig) -> Self {
        self.table = table;
        self
    }

    /// Set the placement configuration.
    #[must_use]
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    /// Set the capacity configuration.
    #[must_use]
    pub fn with_capacity(mut self, capacity: CapacityConfig) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the timing configuration.
    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        self.table.validate()?;
        self.placement.validate()?;
        self.timing.validate()?;
        if self.relation.contact_tolerance <= 0.0 {
            return Err(DeskError::invalid_config(
                "contact_tolerance must be positive",
            ));
        }
        if !(0.0..std::f64::consts::PI).contains(&self.relation.lid_open_threshold) {
            return Err(DeskError::invalid_config(
                "lid_open_threshold must be within [0, π)",
            ));
        }
        Ok(())
    }
}

/// Tabletop rectangle, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableConfig {
    /// Half-extent along X.
    pub half_x: f64,
    /// Half-extent along Z.
    pub half_z: f64,
    /// Height of the top surface.
    pub top_y: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            half_x: 60.0,
            half_z: 40.0,
            top_y: 0.0,
        }
    }
}

impl TableConfig {
    fn validate(&self) -> crate::Result<()> {
        if self.half_x <= 0.0 || self.half_z <= 0.0 {
            return Err(DeskError::invalid_config(
                "table half-extents must be positive",
            ));
        }
        Ok(())
    }
}

/// Placement search settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlacementConfig {
    /// Rejection-sampling attempt ceiling.
    pub max_attempts: usize,
    /// Margin kept between an occupant and the container walls.
    pub safety_margin: f64,
    /// Extra distance kept between two occupants.
    pub clearance: f64,
    /// Gap left under a placed object.
    pub floor_clearance: f64,
    /// Occupancy grid cell size for table placement.
    pub grid_cell_size: f64,
    /// Inflation applied to existing footprints on the table grid.
    pub footprint_inflation: f64,
    /// Distance kept from the table edge.
    pub table_edge_margin: f64,
    /// Horizontal jitter when stacking onto a support.
    pub stack_jitter: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            safety_margin: 0.2,
            clearance: 0.3,
            floor_clearance: 0.05,
            grid_cell_size: 2.0,
            footprint_inflation: 0.5,
            table_edge_margin: 1.0,
            stack_jitter: 0.5,
        }
    }
}

impl PlacementConfig {
    /// Set the attempt ceiling.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the inter-object clearance.
    #[must_use]
    pub const fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    fn validate(&self) -> crate::Result<()> {
        if self.max_attempts == 0 {
            return Err(DeskError::invalid_config("max_attempts must be positive"));
        }
        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            return Err(DeskError::invalid_config(
                "grid_cell_size must be positive and finite",
            ));
        }
        if self.safety_margin < 0.0 || self.clearance < 0.0 || self.footprint_inflation < 0.0 {
            return Err(DeskError::invalid_config(
                "margins and clearances must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Occupant ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CapacityConfig {
    /// Open boxes.
    pub open_box: usize,
    /// Lidded boxes.
    pub lidded_box: usize,
    /// Drawers.
    pub drawer: usize,
    /// Bowls and plates.
    pub vessel: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            open_box: 7,
            lidded_box: 7,
            drawer: 8,
            vessel: 1,
        }
    }
}

impl CapacityConfig {
    /// Ceiling for a container kind.
    #[must_use]
    pub const fn for_kind(&self, kind: ContainerKind) -> usize {
        match kind {
            ContainerKind::OpenBox => self.open_box,
            ContainerKind::LiddedBox => self.lidded_box,
            ContainerKind::Drawer => self.drawer,
            ContainerKind::Bowl | ContainerKind::Plate => self.vessel,
        }
    }
}

/// Relation inference tolerances not tied to a container kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RelationConfig {
    /// Allowed gap between a support's top and the upper object's bottom.
    pub contact_tolerance: f64,
    /// Allowed sink of an object's bottom below the table top.
    pub table_band_below: f64,
    /// Allowed float of an object's bottom above the table top.
    pub table_band_above: f64,
    /// Lid rotation (radians from closed) beyond which a lid counts as open.
    pub lid_open_threshold: f64,
    /// Fraction of drawer travel beyond which a drawer counts as open.
    pub drawer_open_fraction: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            contact_tolerance: 2.0,
            table_band_below: 0.5,
            table_band_above: 1.5,
            lid_open_threshold: 30_f64.to_radians(),
            drawer_open_fraction: 0.5,
        }
    }
}

/// Scheduler and animation timing, in seconds unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Fixed tick length.
    pub tick: f64,
    /// Interval between stabilization polls.
    pub poll_interval: f64,
    /// Consecutive identical, hand-free polls required to declare stability.
    pub stable_polls: u32,
    /// Lift phase duration.
    pub lift_duration: f64,
    /// Lateral phase duration.
    pub translate_duration: f64,
    /// Descend phase duration.
    pub descend_duration: f64,
    /// Clearance above the higher endpoint during the lateral phase.
    pub lift_height: f64,
    /// Delay before physics resumes after a move.
    pub settle_delay: f64,
    /// Drawer slide duration.
    pub drawer_slide_duration: f64,
    /// Lid hinge motor speed (rad/s).
    pub hinge_speed: f64,
    /// Delay before the status line reverts to idle after a rejection.
    pub status_revert_delay: f64,
    /// Interval between scene-graph publications.
    pub publish_interval: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick: 1.0 / 60.0,
            poll_interval: 0.25,
            stable_polls: 2,
            lift_duration: 0.4,
            translate_duration: 0.8,
            descend_duration: 0.4,
            lift_height: 6.0,
            settle_delay: 0.3,
            drawer_slide_duration: 0.6,
            hinge_speed: 3.0,
            status_revert_delay: 2.0,
            publish_interval: 0.5,
        }
    }
}

impl TimingConfig {
    /// Total duration of one kinematic move.
    #[must_use]
    pub fn move_duration(&self) -> f64 {
        self.lift_duration + self.translate_duration + self.descend_duration
    }

    fn validate(&self) -> crate::Result<()> {
        if !self.tick.is_finite() || self.tick <= 0.0 {
            return Err(DeskError::invalid_config("tick must be positive and finite"));
        }
        if self.poll_interval <= 0.0 || self.publish_interval <= 0.0 {
            return Err(DeskError::invalid_config(
                "poll and publish intervals must be positive",
            ));
        }
        if self.stable_polls == 0 {
            return Err(DeskError::invalid_config("stable_polls must be at least 1"));
        }
        if self.lift_duration < 0.0
            || self.translate_duration < 0.0
            || self.descend_duration < 0.0
            || self.drawer_slide_duration < 0.0
        {
            return Err(DeskError::invalid_config("durations must be non-negative"));
        }
        if self.hinge_speed <= 0.0 {
            return Err(DeskError::invalid_config("hinge_speed must be positive"));
        }
        Ok(())
    }
}
