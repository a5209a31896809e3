//! Placement inside open and lidded boxes.
//!
//! The object keeps the box's heading and is sampled uniformly over the
//! interior shrunk by its bounding radius plus the safety margin.
//!
//! # Example
//!
//! ```
//! use desk_place::{BoxSolver, ContainerFrame, PlacementRequest};
//! use desk_types::{ContainerKind, ObjectKind, PlacementConfig, Pose};
//! use nalgebra::{Point3, Vector3};
//! use rand::SeedableRng;
//!
//! let size = Vector3::new(16.0, 6.0, 16.0);
//! let frame = ContainerFrame::new(
//!     Pose::from_position(Point3::new(0.0, 3.0, 0.0)),
//!     ContainerKind::OpenBox.geometry(&size),
//! );
//! let solver = BoxSolver::new(PlacementConfig::default());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//!
//! let placement = solver
//!     .find_placement(&PlacementRequest::of_kind(ObjectKind::Mug), &frame, &[], &mut rng)
//!     .unwrap();
//! assert!(placement.position.x.abs() < 8.0);
//! ```

use desk_types::PlacementConfig;
use nalgebra::{Point3, Vector2};
use rand::Rng;
use tracing::info;

use crate::sampler::InteriorSampler;
use crate::types::{ContainerFrame, Occupant, Placement, PlacementRequest};

/// Rejection-sampling solver for box interiors.
#[derive(Debug, Clone, Copy)]
pub struct BoxSolver {
    config: PlacementConfig,
}

impl BoxSolver {
    /// Create a solver.
    #[must_use]
    pub const fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Find a collision-free pose for `request` inside `frame`.
    ///
    /// Returns `None` when the attempt ceiling is exhausted; callers fall back
    /// to the tabletop.
    pub fn find_placement<R: Rng + ?Sized>(
        &self,
        request: &PlacementRequest,
        frame: &ContainerFrame,
        occupants: &[Occupant],
        rng: &mut R,
    ) -> Option<Placement> {
        let radius = request.radius();
        let shrink = radius + self.config.safety_margin;
        let usable = frame.geometry.interior_half - Vector2::repeat(shrink);

        let sampler = InteriorSampler::new(
            frame.center(),
            frame.yaw(),
            usable,
            radius,
            self.config.clearance,
            occupants,
        );
        let Some(spot) = sampler.sample(rng, self.config.max_attempts) else {
            info!(
                kind = %request.kind,
                occupants = occupants.len(),
                attempts = self.config.max_attempts,
                "no free spot inside box"
            );
            return None;
        };

        let y = frame.floor_y() + 0.5 * request.size.y + self.config.floor_clearance;
        Some(Placement::upright(
            Point3::new(spot.x, y, spot.y),
            frame.yaw(),
            request.size,
        ))
    }
}
