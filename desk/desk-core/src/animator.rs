//! Kinematic pick-and-place animation.
//!
//! A move runs in three phases, each interpolated over a fixed duration:
//!
//! ```text
//!        apex ──── translate ────► apex
//!         ▲                          │
//!   lift  │                          │ descend
//!         │                          ▼
//!       start                      target
//! ```
//!
//! The apex is `lift_height` above the higher endpoint. Vertical phases use
//! cubic easing, the lateral phase quadratic easing, and orientation slerps
//! alongside the lateral motion. Nested contents ride along at their
//! relative pose. Physics is frozen globally for the whole move.

use desk_types::{DeskError, ObjectId, Pose, Rejection, TimingConfig};
use nalgebra::Point3;
use tracing::debug;

use crate::world::World;

/// Quadratic ease-in-out on `[0, 1]`.
#[must_use]
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-in-out on `[0, 1]`.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Phase of an in-flight move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Rising straight up from the start.
    Lift,
    /// Moving across at the apex.
    Translate,
    /// Lowering onto the target.
    Descend,
}

#[derive(Debug, Clone)]
struct Rider {
    id: ObjectId,
    relative: Pose,
}

#[derive(Debug, Clone)]
struct Track {
    object: ObjectId,
    start: Pose,
    target: Pose,
    apex: f64,
    elapsed: f64,
    lift: f64,
    translate: f64,
    descend: f64,
    riders: Vec<Rider>,
}

impl Track {
    fn total(&self) -> f64 {
        self.lift + self.translate + self.descend
    }

    fn phase(&self) -> (Phase, f64) {
        let ratio = |t: f64, d: f64| if d > 0.0 { (t / d).min(1.0) } else { 1.0 };
        let t = self.elapsed;
        if t < self.lift {
            (Phase::Lift, ratio(t, self.lift))
        } else if t < self.lift + self.translate {
            (Phase::Translate, ratio(t - self.lift, self.translate))
        } else {
            (
                Phase::Descend,
                ratio(t - self.lift - self.translate, self.descend),
            )
        }
    }

    fn pose_now(&self) -> Pose {
        let (phase, t) = self.phase();
        let s = self.start.position;
        let e = self.target.position;
        let up = Point3::new(s.x, self.apex, s.z);
        let over = Point3::new(e.x, self.apex, e.z);
        match phase {
            Phase::Lift => {
                let k = ease_in_out_cubic(t);
                Pose::from_position_rotation(s + (up - s) * k, self.start.rotation)
            }
            Phase::Translate => {
                let k = ease_in_out_quad(t);
                let rotation = self
                    .start
                    .rotation
                    .try_slerp(&self.target.rotation, k, 1e-9)
                    .unwrap_or(if k < 0.5 {
                        self.start.rotation
                    } else {
                        self.target.rotation
                    });
                Pose::from_position_rotation(up + (over - up) * k, rotation)
            }
            Phase::Descend => {
                let k = ease_in_out_cubic(t);
                Pose::from_position_rotation(over + (e - over) * k, self.target.rotation)
            }
        }
    }
}

/// Drives kinematic moves and reports when they finish.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    tracks: Vec<Track>,
}

impl Animator {
    /// Create an idle animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is moving.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Returns `true` if `object` is the subject of an in-flight move.
    #[must_use]
    pub fn is_moving(&self, object: &ObjectId) -> bool {
        self.tracks.iter().any(|t| t.object == *object)
    }

    /// Current phase of `object`'s move.
    #[must_use]
    pub fn phase_of(&self, object: &ObjectId) -> Option<Phase> {
        self.tracks
            .iter()
            .find(|t| t.object == *object)
            .map(|t| t.phase().0)
    }

    /// Begin moving `object` (and `riders` with it) to `target`.
    ///
    /// Pins every body involved, marks the object as held, and freezes the
    /// world. Returns the freeze token.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::AlreadyAnimating`] if the object or any rider is
    /// already moving, or [`DeskError::UnknownObject`] for an untracked key.
    pub fn start(
        &mut self,
        world: &mut World,
        object: &ObjectId,
        target: Pose,
        riders: &[ObjectId],
        timing: &TimingConfig,
    ) -> crate::Result<u64> {
        let start = world
            .pose_of(object)
            .ok_or_else(|| DeskError::UnknownObject(object.to_string()))?;
        for key in std::iter::once(object).chain(riders) {
            let busy = world
                .object(key)
                .ok_or_else(|| DeskError::UnknownObject(key.to_string()))?
                .animating;
            if busy {
                return Err(Rejection::AlreadyAnimating(key.to_string()).into());
            }
        }

        let mut mounted = Vec::with_capacity(riders.len());
        for key in riders {
            let Some(pose) = world.pose_of(key) else {
                continue;
            };
            mounted.push(Rider {
                id: key.clone(),
                relative: start.relative(&pose),
            });
        }

        for key in std::iter::once(object).chain(riders) {
            if let Some(o) = world.object_mut(key) {
                o.animating = true;
                let body = o.body;
                if let Some(b) = world.body_mut(body) {
                    b.pin();
                }
            }
        }
        if let Some(o) = world.object_mut(object) {
            o.in_hand = true;
        }
        let token = world.freeze();

        let track = Track {
            object: object.clone(),
            start,
            target,
            apex: start.position.y.max(target.position.y) + timing.lift_height,
            elapsed: 0.0,
            lift: timing.lift_duration,
            translate: timing.translate_duration,
            descend: timing.descend_duration,
            riders: mounted,
        };
        debug!(
            object = %object,
            riders = track.riders.len(),
            duration = track.total(),
            "kinematic move started"
        );
        self.tracks.push(track);
        Ok(token)
    }

    /// Advance every move by `dt`. Returns the objects whose move finished.
    pub fn tick(&mut self, world: &mut World, dt: f64) -> Vec<ObjectId> {
        let mut finished = Vec::new();
        for track in &mut self.tracks {
            track.elapsed += dt;
            let done = track.elapsed >= track.total();
            let pose = if done { track.target } else { track.pose_now() };
            if let Err(e) = world.set_pose(&track.object, pose) {
                debug!(object = %track.object, error = %e, "move pose not applied");
            }
            for rider in &track.riders {
                if let Err(e) = world.set_pose(&rider.id, pose.compose(&rider.relative)) {
                    debug!(object = %rider.id, error = %e, "rider pose not applied");
                }
            }
            if done {
                finished.push(track.object.clone());
            }
        }

        self.tracks.retain(|track| {
            if track.elapsed < track.total() {
                return true;
            }
            let keys = std::iter::once(&track.object).chain(track.riders.iter().map(|r| &r.id));
            for key in keys {
                if let Some(o) = world.object_mut(key) {
                    o.animating = false;
                    o.in_hand = false;
                    let body = o.body;
                    if let Some(b) = world.body_mut(body) {
                        b.release();
                    }
                }
            }
            debug!(object = %track.object, "kinematic move finished");
            false
        });
        finished
    }
}
