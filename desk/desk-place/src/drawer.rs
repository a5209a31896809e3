//! Placement inside cabinet drawers.
//!
//! Drawers are shallow, so before sampling the solver picks an orientation
//! scheme: keep the object upright, or lay it on its side with a quarter turn
//! about its local X or Z axis. The scheme with the lowest resulting height
//! that still clears the drawer wins; ties go to upright, then X, then Z.

use desk_types::{half_diagonal, ContainerGeometry, PlacementConfig, Reorient};
use nalgebra::{Point3, Vector2, Vector3};
use rand::Rng;
use tracing::{debug, info};

use crate::sampler::InteriorSampler;
use crate::types::{achieved_size, ContainerFrame, Occupant, Placement, PlacementRequest};

/// Orientation schemes in tie-break order.
const SCHEMES: [Option<Reorient>; 3] = [None, Some(Reorient::AboutX), Some(Reorient::AboutZ)];

/// Rejection-sampling solver for drawer interiors.
#[derive(Debug, Clone, Copy)]
pub struct DrawerSolver {
    config: PlacementConfig,
}

impl DrawerSolver {
    /// Create a solver.
    #[must_use]
    pub const fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Choose the orientation scheme for `request` in a drawer with `geometry`.
    ///
    /// Returns the scheme and the achieved size, or `None` if no scheme fits
    /// both the vertical clearance and the interior footprint.
    ///
    /// # Example
    ///
    /// ```
    /// use desk_place::{DrawerSolver, PlacementRequest};
    /// use desk_types::{ContainerKind, ObjectKind, PlacementConfig, Reorient};
    /// use nalgebra::Vector3;
    ///
    /// let drawer = ContainerKind::Drawer.geometry(&Vector3::new(22.0, 6.0, 16.0));
    /// let solver = DrawerSolver::new(PlacementConfig::default());
    ///
    /// // A tall bottle must be laid down.
    /// let bottle = PlacementRequest::new(ObjectKind::Asset, Vector3::new(3.0, 9.0, 3.0));
    /// let (scheme, size) = solver.choose_orientation(&bottle, &drawer).unwrap();
    /// assert_eq!(scheme, Some(Reorient::AboutX));
    /// assert!((size.y - 3.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn choose_orientation(
        &self,
        request: &PlacementRequest,
        geometry: &ContainerGeometry,
    ) -> Option<(Option<Reorient>, Vector3<f64>)> {
        let mut best: Option<(Option<Reorient>, Vector3<f64>)> = None;
        for scheme in SCHEMES {
            let size = achieved_size(request, scheme);
            if !self.fits(&size, geometry) {
                continue;
            }
            // Strict comparison keeps the earlier scheme on ties.
            if best.map_or(true, |(_, b)| size.y < b.y) {
                best = Some((scheme, size));
            }
        }
        best
    }

    fn fits(&self, size: &Vector3<f64>, geometry: &ContainerGeometry) -> bool {
        let margin = self.config.safety_margin;
        size.y + self.config.floor_clearance <= geometry.interior_height
            && 0.5 * size.x + margin <= geometry.interior_half.x
            && 0.5 * size.z + margin <= geometry.interior_half.y
    }

    /// Find a collision-free pose for `request` inside the drawer at `frame`.
    pub fn find_placement<R: Rng + ?Sized>(
        &self,
        request: &PlacementRequest,
        frame: &ContainerFrame,
        occupants: &[Occupant],
        rng: &mut R,
    ) -> Option<Placement> {
        let Some((reorient, size)) = self.choose_orientation(request, &frame.geometry) else {
            info!(kind = %request.kind, height = request.size.y, "object does not fit drawer in any orientation");
            return None;
        };
        debug!(?reorient, height = size.y, "drawer orientation chosen");

        let half = Vector2::new(0.5 * size.x, 0.5 * size.z);
        let usable = frame.geometry.interior_half - half.add_scalar(self.config.safety_margin);
        let radius = half_diagonal(&size);

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
                "no free spot inside drawer"
            );
            return None;
        };

        let y = frame.floor_y() + 0.5 * size.y + self.config.floor_clearance;
        Some(Placement {
            position: Point3::new(spot.x, y, spot.y),
            yaw: frame.yaw(),
            reorient,
            size,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use desk_types::{ContainerKind, ObjectKind, Pose};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn drawer_geometry() -> ContainerGeometry {
        ContainerKind::Drawer.geometry(&Vector3::new(22.0, 6.0, 16.0))
    }

    #[test]
    fn test_upright_preferred_when_it_fits() {
        let solver = DrawerSolver::new(PlacementConfig::default());
        let cube = PlacementRequest::of_kind(ObjectKind::Cube);
        let (scheme, size) = solver.choose_orientation(&cube, &drawer_geometry()).unwrap();
        assert_eq!(scheme, None);
        assert_eq!(size, cube.size);
    }

    #[test]
    fn test_lowest_height_wins() {
        let solver = DrawerSolver::new(PlacementConfig::default());
        // Upright 4.5 fits, but laying about Z gives 2.0.
        let slab = PlacementRequest::new(ObjectKind::Asset, Vector3::new(2.0, 4.5, 3.0));
        let (scheme, size) = solver.choose_orientation(&slab, &drawer_geometry()).unwrap();
        assert_eq!(scheme, Some(Reorient::AboutZ));
        assert_relative_eq!(size.y, 2.0);
    }

    #[test]
    fn test_nothing_fits() {
        let solver = DrawerSolver::new(PlacementConfig::default());
        let big = PlacementRequest::new(ObjectKind::Asset, Vector3::new(8.0, 8.0, 8.0));
        assert!(solver.choose_orientation(&big, &drawer_geometry()).is_none());
    }

    #[test]
    fn test_placement_rests_on_drawer_floor() {
        let solver = DrawerSolver::new(PlacementConfig::default());
        let frame = ContainerFrame::new(
            Pose::from_position(Point3::new(30.0, 10.0, 5.0)),
            drawer_geometry(),
        );
        let mut rng = StdRng::seed_from_u64(9);
        let bottle = PlacementRequest::new(ObjectKind::Asset, Vector3::new(3.0, 9.0, 3.0));
        let p = solver.find_placement(&bottle, &frame, &[], &mut rng).unwrap();

        assert_eq!(p.reorient, Some(Reorient::AboutX));
        // Floor at 10 - 2 = 8, laid-down height 3.
        assert_relative_eq!(p.position.y, 8.0 + 1.5 + 0.05, epsilon = 1e-12);
        assert!((p.position.x - 30.0).abs() <= 10.0 - 1.5);
        assert!((p.position.z - 5.0).abs() <= 7.0 - 4.5);
    }

    #[test]
    fn test_eight_cubes_collision_free() {
        let solver = DrawerSolver::new(PlacementConfig::default());
        let frame = ContainerFrame::new(Pose::from_yaw(Point3::new(0.0, 5.0, 0.0), 0.2), drawer_geometry());
        let cube = PlacementRequest::of_kind(ObjectKind::Cube);
        let mut rng = StdRng::seed_from_u64(11);
        let mut occupants: Vec<Occupant> = Vec::new();
        let r = half_diagonal(&cube.size);

        for _ in 0..8 {
            let p = solver.find_placement(&cube, &frame, &occupants, &mut rng).unwrap();
            for o in &occupants {
                assert!(nalgebra::distance(&o.center, &p.planar()) >= o.radius + r + 0.3);
            }
            occupants.push(Occupant::new(p.planar(), r));
        }
    }
}
