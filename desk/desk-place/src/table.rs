//! Tabletop placement over an occupancy grid.
//!
//! Unlike the container solvers, tabletop placement is deterministic: every
//! existing footprint is rasterized (rotated and inflated) onto a
//! [`TableGrid`], and the free candidate farthest from the table center wins.
//! This spreads fallback placements toward the table edges.
//!
//! # Example
//!
//! ```
//! use desk_place::{PlacementRequest, TableSolver};
//! use desk_types::{Footprint, ObjectKind, PlacementConfig, TableConfig};
//! use nalgebra::{Point2, Vector2};
//!
//! let solver = TableSolver::new(PlacementConfig::default(), TableConfig::default());
//! let red_box = Footprint::new(Point2::new(-50.0, -30.0), Vector2::new(8.0, 8.0), 0.0);
//!
//! let p = solver
//!     .find_placement(&PlacementRequest::of_kind(ObjectKind::Cube), &[red_box])
//!     .unwrap();
//! let cube = Footprint::new(p.planar(), Vector2::new(1.0, 1.0), p.yaw);
//! assert!(!cube.overlaps(&red_box));
//! ```

use std::ops::Range;

use desk_types::{Footprint, PlacementConfig, TableConfig};
use nalgebra::{Point2, Point3, Vector2};
use tracing::{debug, warn};

use crate::types::{Placement, PlacementRequest};

/// Score ties within this distance keep the earlier cell.
const TIE_EPS: f64 = 1e-9;

/// Dense boolean occupancy grid over a centered rectangle.
///
/// Cells are squares of `cell_size`; the grid covers the rectangle fully,
/// overhanging it by less than one cell where the extents are not a
/// multiple of the cell size.
#[derive(Debug, Clone)]
pub struct TableGrid {
    cell_size: f64,
    origin: Point2<f64>,
    nx: usize,
    nz: usize,
    occupied: Vec<bool>,
}

impl TableGrid {
    /// Create an empty grid covering `[-half, half]` on both axes.
    ///
    /// # Example
    ///
    /// ```
    /// use desk_place::TableGrid;
    /// use nalgebra::Vector2;
    ///
    /// let grid = TableGrid::new(Vector2::new(10.0, 5.0), 2.0);
    /// assert_eq!(grid.dims(), (10, 5));
    /// assert_eq!(grid.occupied_count(), 0);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn new(half: Vector2<f64>, cell_size: f64) -> Self {
        let cell_size = cell_size.abs().max(f64::EPSILON);
        let nx = (2.0 * half.x.max(0.0) / cell_size).ceil().max(1.0) as usize;
        let nz = (2.0 * half.y.max(0.0) / cell_size).ceil().max(1.0) as usize;
        let origin = Point2::new(
            -0.5 * nx as f64 * cell_size,
            -0.5 * nz as f64 * cell_size,
        );
        Self {
            cell_size,
            origin,
            nx,
            nz,
            occupied: vec![false; nx * nz],
        }
    }

    /// Number of cells along X and Z.
    #[must_use]
    pub const fn dims(&self) -> (usize, usize) {
        (self.nx, self.nz)
    }

    /// Edge length of one cell.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Center of cell `(i, j)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, i: usize, j: usize) -> Point2<f64> {
        Point2::new(
            self.origin.x + (i as f64 + 0.5) * self.cell_size,
            self.origin.y + (j as f64 + 0.5) * self.cell_size,
        )
    }

    /// Returns `true` if cell `(i, j)` is marked.
    #[must_use]
    pub fn is_occupied(&self, i: usize, j: usize) -> bool {
        i < self.nx && j < self.nz && self.occupied[j * self.nx + i]
    }

    /// Number of marked cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    fn cell_footprint(&self, i: usize, j: usize) -> Footprint {
        Footprint::new(
            self.cell_center(i, j),
            Vector2::repeat(0.5 * self.cell_size),
            0.0,
        )
    }

    /// Index ranges of cells touched by the footprint's bounding box.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell_range(&self, footprint: &Footprint) -> Option<(Range<usize>, Range<usize>)> {
        let aabb = footprint.aabb_half();
        let axis = |lo: f64, hi: f64, origin: f64, n: usize| -> Option<Range<usize>> {
            let a = ((lo - origin) / self.cell_size).floor();
            let b = ((hi - origin) / self.cell_size).floor();
            if b < 0.0 || a >= n as f64 {
                return None;
            }
            let a = a.max(0.0) as usize;
            let b = (b as usize).min(n - 1);
            Some(a..b + 1)
        };
        let c = footprint.center;
        let xs = axis(c.x - aabb.x, c.x + aabb.x, self.origin.x, self.nx)?;
        let zs = axis(c.y - aabb.y, c.y + aabb.y, self.origin.y, self.nz)?;
        Some((xs, zs))
    }

    /// Mark every cell the footprint overlaps.
    pub fn mark(&mut self, footprint: &Footprint) {
        let Some((xs, zs)) = self.cell_range(footprint) else {
            return;
        };
        for j in zs {
            for i in xs.clone() {
                if self.cell_footprint(i, j).overlaps(footprint) {
                    self.occupied[j * self.nx + i] = true;
                }
            }
        }
    }

    /// Returns `true` if no marked cell overlaps the footprint.
    #[must_use]
    pub fn is_region_free(&self, footprint: &Footprint) -> bool {
        let Some((xs, zs)) = self.cell_range(footprint) else {
            return true;
        };
        zs.into_iter().all(|j| {
            xs.clone().all(|i| {
                !self.occupied[j * self.nx + i] || !self.cell_footprint(i, j).overlaps(footprint)
            })
        })
    }
}

/// Deterministic tabletop solver.
#[derive(Debug, Clone, Copy)]
pub struct TableSolver {
    config: PlacementConfig,
    table: TableConfig,
}

impl TableSolver {
    /// Create a solver for the given table.
    #[must_use]
    pub const fn new(config: PlacementConfig, table: TableConfig) -> Self {
        Self { config, table }
    }

    /// Usable half-extents after the edge margin.
    #[must_use]
    pub fn usable_half(&self) -> Vector2<f64> {
        Vector2::new(
            self.table.half_x - self.config.table_edge_margin,
            self.table.half_z - self.config.table_edge_margin,
        )
    }

    /// Rasterize `obstacles`, inflated by the footprint margin.
    #[must_use]
    pub fn build_grid(&self, obstacles: &[Footprint]) -> TableGrid {
        let mut grid = TableGrid::new(self.usable_half(), self.config.grid_cell_size);
        for fp in obstacles {
            grid.mark(&fp.inflated(self.config.footprint_inflation));
        }
        grid
    }

    /// Find the free tabletop pose farthest from the table center.
    ///
    /// `obstacles` are the footprints of everything already on the table.
    /// Returns `None` only if no cell can hold the object.
    #[must_use]
    pub fn find_placement(
        &self,
        request: &PlacementRequest,
        obstacles: &[Footprint],
    ) -> Option<Placement> {
        let grid = self.build_grid(obstacles);
        let usable = self.usable_half();
        let half = Vector2::new(0.5 * request.size.x, 0.5 * request.size.z);
        let (nx, nz) = grid.dims();

        let mut best: Option<(Point2<f64>, f64)> = None;
        for j in 0..nz {
            for i in 0..nx {
                if grid.is_occupied(i, j) {
                    continue;
                }
                let center = grid.cell_center(i, j);
                let candidate = Footprint::new(center, half, request.yaw);
                let aabb = candidate.aabb_half();
                if center.x.abs() + aabb.x > usable.x || center.y.abs() + aabb.y > usable.y {
                    continue;
                }
                if !grid.is_region_free(&candidate) {
                    continue;
                }
                let score = center.coords.norm();
                if best.map_or(true, |(_, s)| score > s + TIE_EPS) {
                    best = Some((center, score));
                }
            }
        }

        let Some((spot, score)) = best else {
            warn!(
                kind = %request.kind,
                obstacles = obstacles.len(),
                occupied = grid.occupied_count(),
                "no free tabletop cell"
            );
            return None;
        };
        debug!(x = spot.x, z = spot.y, score, "tabletop cell chosen");

        let y = self.table.top_y + 0.5 * request.size.y + self.config.floor_clearance;
        Some(Placement::upright(
            Point3::new(spot.x, y, spot.y),
            request.yaw,
            request.size,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use desk_types::ObjectKind;
    use nalgebra::Vector3;

    fn solver() -> TableSolver {
        TableSolver::new(PlacementConfig::default(), TableConfig::default())
    }

    #[test]
    fn test_grid_mark_rotated() {
        let mut grid = TableGrid::new(Vector2::new(10.0, 10.0), 1.0);
        let fp = Footprint::new(Point2::origin(), Vector2::new(3.0, 0.4), std::f64::consts::FRAC_PI_2);
        grid.mark(&fp);
        // Long axis along Z: cells at z = +-2.5 are hit, x = +-2.5 are not.
        assert!(grid.is_occupied(10, 12));
        assert!(!grid.is_occupied(12, 10));
        assert!(grid.occupied_count() > 0);
    }

    #[test]
    fn test_grid_ignores_out_of_bounds() {
        let mut grid = TableGrid::new(Vector2::new(5.0, 5.0), 1.0);
        grid.mark(&Footprint::new(Point2::new(50.0, 0.0), Vector2::new(1.0, 1.0), 0.0));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_empty_table_picks_farthest_corner() {
        let request = PlacementRequest::of_kind(ObjectKind::Cube);
        let p = solver().find_placement(&request, &[]).unwrap();
        // Raster order keeps the first of four equidistant corners.
        assert_relative_eq!(p.position.x, -58.0, epsilon = 1e-9);
        assert_relative_eq!(p.position.z, -38.0, epsilon = 1e-9);
        assert_relative_eq!(p.position.y, 1.05, epsilon = 1e-12);
    }

    #[test]
    fn test_placement_avoids_obstacles() {
        let obstacles: Vec<Footprint> = [(-50.0, -30.0), (50.0, -30.0), (-50.0, 30.0), (50.0, 30.0)]
            .iter()
            .map(|&(x, z)| Footprint::new(Point2::new(x, z), Vector2::new(9.0, 9.0), 0.3))
            .collect();
        let request = PlacementRequest::new(ObjectKind::Mug, Vector3::new(3.2, 3.6, 3.2));
        let p = solver().find_placement(&request, &obstacles).unwrap();
        let placed = Footprint::new(p.planar(), Vector2::new(1.6, 1.6), p.yaw);
        for o in &obstacles {
            assert!(!placed.overlaps(&o.inflated(0.5)));
        }
        assert!(p.position.x.abs() + 1.6 <= 59.0);
        assert!(p.position.z.abs() + 1.6 <= 39.0);
    }

    #[test]
    fn test_deterministic() {
        let obstacles = [Footprint::new(Point2::new(-58.0, -38.0), Vector2::new(2.0, 2.0), 0.0)];
        let request = PlacementRequest::of_kind(ObjectKind::Cube);
        let a = solver().find_placement(&request, &obstacles).unwrap();
        let b = solver().find_placement(&request, &obstacles).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_covered_table_returns_none() {
        let cover = Footprint::new(Point2::origin(), Vector2::new(60.0, 40.0), 0.0);
        let request = PlacementRequest::of_kind(ObjectKind::Cube);
        assert!(solver().find_placement(&request, &[cover]).is_none());
    }
}
