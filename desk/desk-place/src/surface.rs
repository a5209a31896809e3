//! Placement on top of a support and into round vessels.

use desk_types::{to_world_2d, PlacementConfig, Pose};
use nalgebra::{Point2, Point3, Vector3};
use rand::Rng;

use crate::types::{ContainerFrame, Placement, PlacementRequest};

/// Solver for stacking and for single-occupant vessels.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSolver {
    config: PlacementConfig,
}

impl SurfaceSolver {
    /// Create a solver.
    #[must_use]
    pub const fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Rest the object on the top face of a support, near its center.
    ///
    /// The horizontal offset is jittered by up to the configured amount,
    /// limited so the object stays over the support.
    pub fn place_on_top<R: Rng + ?Sized>(
        &self,
        request: &PlacementRequest,
        support: &Pose,
        support_size: &Vector3<f64>,
        rng: &mut R,
    ) -> Placement {
        let jitter_x = (0.5 * (support_size.x - request.size.x))
            .min(self.config.stack_jitter)
            .max(0.0);
        let jitter_z = (0.5 * (support_size.z - request.size.z))
            .min(self.config.stack_jitter)
            .max(0.0);
        let local = Point2::new(
            rng.gen_range(-jitter_x..=jitter_x),
            rng.gen_range(-jitter_z..=jitter_z),
        );
        let yaw = support.yaw();
        let spot = to_world_2d(&desk_types::planar(&support.position), yaw, &local);

        let top = support.position.y + 0.5 * support_size.y;
        let y = top + 0.5 * request.size.y + self.config.floor_clearance;
        Placement::upright(Point3::new(spot.x, y, spot.y), yaw, request.size)
    }

    /// Center the object on a round vessel's floor.
    #[must_use]
    pub fn place_in_vessel(&self, request: &PlacementRequest, frame: &ContainerFrame) -> Placement {
        let center = frame.center();
        let y = frame.floor_y() + 0.5 * request.size.y + self.config.floor_clearance;
        Placement::upright(Point3::new(center.x, y, center.y), request.yaw, request.size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use desk_types::{ContainerKind, ObjectKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stack_on_box_top() {
        let solver = SurfaceSolver::new(PlacementConfig::default());
        let support = Pose::from_yaw(Point3::new(10.0, 3.0, -4.0), 0.5);
        let size = Vector3::new(16.0, 6.0, 16.0);
        let request = PlacementRequest::of_kind(ObjectKind::Box);
        let mut rng = StdRng::seed_from_u64(3);

        let p = solver.place_on_top(&request, &support, &size, &mut rng);
        assert_relative_eq!(p.position.y, 6.0 + 3.0 + 0.05, epsilon = 1e-12);
        // Same footprint: no room to jitter.
        assert_relative_eq!(p.position.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.position.z, -4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stack_jitter_bounded() {
        let solver = SurfaceSolver::new(PlacementConfig::default());
        let support = Pose::from_position(Point3::new(0.0, 3.0, 0.0));
        let size = Vector3::new(16.0, 6.0, 16.0);
        let request = PlacementRequest::of_kind(ObjectKind::Cube);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let p = solver.place_on_top(&request, &support, &size, &mut rng);
            assert!(p.position.x.abs() <= 0.5 + 1e-12);
            assert!(p.position.z.abs() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_vessel_centered() {
        let solver = SurfaceSolver::new(PlacementConfig::default());
        let frame = ContainerFrame::new(
            Pose::from_position(Point3::new(-7.0, 1.5, 2.0)),
            ContainerKind::Bowl.geometry(&Vector3::new(8.0, 3.0, 8.0)),
        );
        let p = solver.place_in_vessel(&PlacementRequest::of_kind(ObjectKind::Cube), &frame);
        assert_relative_eq!(p.position.x, -7.0);
        assert_relative_eq!(p.position.z, 2.0);
        // Floor at 0.3 above the base.
        assert_relative_eq!(p.position.y, 0.3 + 1.0 + 0.05, epsilon = 1e-12);
    }
}
