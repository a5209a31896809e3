//! Rejection sampling inside a rectangular interior.

use desk_types::{to_local_2d, to_world_2d};
use nalgebra::{Point2, Vector2};
use rand::Rng;
use tracing::debug;

use crate::types::Occupant;

/// Slack for the rotated re-check.
const EPS: f64 = 1e-9;

/// Uniform sampler over the usable part of a container interior.
///
/// `usable` is the half-extent left for the object's *center*, already
/// shrunk by the object's own extent and the safety margin.
#[derive(Debug, Clone, Copy)]
pub struct InteriorSampler<'a> {
    center: Point2<f64>,
    yaw: f64,
    usable: Vector2<f64>,
    radius: f64,
    clearance: f64,
    occupants: &'a [Occupant],
}

impl<'a> InteriorSampler<'a> {
    /// Create a sampler for a frame at `center` with heading `yaw`.
    #[must_use]
    pub const fn new(
        center: Point2<f64>,
        yaw: f64,
        usable: Vector2<f64>,
        radius: f64,
        clearance: f64,
        occupants: &'a [Occupant],
    ) -> Self {
        Self {
            center,
            yaw,
            usable,
            radius,
            clearance,
            occupants,
        }
    }

    /// Returns `true` if the interior has room for the object's center at all.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.usable.x >= 0.0 && self.usable.y >= 0.0
    }

    /// Accept or reject one world-frame candidate.
    #[must_use]
    pub fn accepts(&self, candidate: &Point2<f64>) -> bool {
        let local = to_local_2d(&self.center, self.yaw, candidate);
        if local.x.abs() > self.usable.x + EPS || local.y.abs() > self.usable.y + EPS {
            return false;
        }
        self.occupants
            .iter()
            .all(|o| o.is_clear_of(candidate, self.radius, self.clearance))
    }

    /// Draw up to `max_attempts` candidates and return the first accepted one.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, max_attempts: usize) -> Option<Point2<f64>> {
        if !self.has_room() {
            debug!(usable_x = self.usable.x, usable_z = self.usable.y, "interior too small");
            return None;
        }
        for attempt in 0..max_attempts {
            let local = Point2::new(
                rng.gen_range(-self.usable.x..=self.usable.x),
                rng.gen_range(-self.usable.y..=self.usable.y),
            );
            let candidate = to_world_2d(&self.center, self.yaw, &local);
            if self.accepts(&candidate) {
                debug!(attempt, x = candidate.x, z = candidate.y, "candidate accepted");
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_stays_in_usable_region() {
        let sampler = InteriorSampler::new(
            Point2::new(5.0, -3.0),
            0.7,
            Vector2::new(2.0, 1.0),
            0.5,
            0.1,
            &[],
        );
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let p = sampler.sample(&mut rng, 10).unwrap();
            let local = to_local_2d(&Point2::new(5.0, -3.0), 0.7, &p);
            assert!(local.x.abs() <= 2.0 + EPS);
            assert!(local.y.abs() <= 1.0 + EPS);
        }
    }

    #[test]
    fn test_negative_usable_has_no_room() {
        let sampler =
            InteriorSampler::new(Point2::origin(), 0.0, Vector2::new(-0.1, 1.0), 1.0, 0.1, &[]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!sampler.has_room());
        assert!(sampler.sample(&mut rng, 100).is_none());
    }

    #[test]
    fn test_zero_usable_samples_center() {
        let sampler =
            InteriorSampler::new(Point2::new(1.0, 2.0), 0.0, Vector2::zeros(), 1.0, 0.1, &[]);
        let mut rng = StdRng::seed_from_u64(1);
        let p = sampler.sample(&mut rng, 1).unwrap();
        assert!((p - Point2::new(1.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_blocked_interior_exhausts() {
        let occupants = [Occupant::new(Point2::origin(), 5.0)];
        let sampler =
            InteriorSampler::new(Point2::origin(), 0.0, Vector2::new(1.0, 1.0), 1.0, 0.1, &occupants);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(sampler.sample(&mut rng, 200).is_none());
    }
}
