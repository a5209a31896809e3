//! Collision-free placement solvers for the tabletop benchmark.
//!
//! Given an object and a target, each solver produces a pose or reports that
//! none was found. Failure is an expected outcome, never an error: callers
//! route the object to the open tabletop instead.
//!
//! # Solvers
//!
//! | Solver | Target | Strategy |
//! |--------|--------|----------|
//! | [`BoxSolver`] | open and lidded boxes | uniform rejection sampling |
//! | [`DrawerSolver`] | cabinet drawers | orientation choice, then rejection sampling |
//! | [`TableSolver`] | open tabletop | deterministic occupancy grid, farthest free cell |
//! | [`SurfaceSolver`] | box tops, round vessels | centered with bounded jitter |
//!
//! All size and collision checks happen in the target's local horizontal
//! frame. Height is derived separately from the target's floor (or top),
//! half the achieved object height, and a small clearance.
//!
//! # Example
//!
//! ```
//! use desk_place::{ContainerFrame, DrawerSolver, Occupant, PlacementRequest};
//! use desk_types::{ContainerKind, ObjectKind, PlacementConfig, Pose};
//! use nalgebra::{Point2, Point3, Vector3};
//! use rand::SeedableRng;
//!
//! let drawer = ContainerFrame::new(
//!     Pose::from_position(Point3::new(30.0, 8.0, 0.0)),
//!     ContainerKind::Drawer.geometry(&Vector3::new(22.0, 6.0, 16.0)),
//! );
//! let occupants = [Occupant::new(Point2::new(30.0, 0.0), 1.5)];
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//!
//! let solver = DrawerSolver::new(PlacementConfig::default());
//! let p = solver
//!     .find_placement(&PlacementRequest::of_kind(ObjectKind::Cube), &drawer, &occupants, &mut rng)
//!     .unwrap();
//! assert!(occupants[0].is_clear_of(&p.planar(), 1.4, 0.3));
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

pub mod box_solver;
pub mod drawer;
pub mod sampler;
pub mod surface;
pub mod table;
pub mod types;

pub use box_solver::BoxSolver;
pub use drawer::DrawerSolver;
pub use sampler::InteriorSampler;
pub use surface::SurfaceSolver;
pub use table::{TableGrid, TableSolver};
pub use types::{achieved_size, ContainerFrame, Occupant, Placement, PlacementRequest};
