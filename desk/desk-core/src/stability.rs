//! Stabilization monitor.
//!
//! After a command cycle the monitor polls the scene graph until it has been
//! identical for a number of consecutive polls with nothing held and no
//! actuator moving. Each wait is tagged with a generation id; bumping the
//! generation invalidates every poll still scheduled under an older one, so
//! a superseded chain dies quietly instead of firing a second trigger.
//!
//! At most one wait is active at a time. A request made while a wait is
//! running is dropped.

use desk_types::SceneGraph;
use tracing::debug;

/// Verdict of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll belongs to a superseded wait; drop it.
    Stale,
    /// Not yet stable; poll again.
    Pending,
    /// Stable; the wait is over.
    Stable,
}

/// Single-flight stabilization tracker.
#[derive(Debug, Clone, Default)]
pub struct StabilityMonitor {
    active: bool,
    generation: u64,
    last: Option<SceneGraph>,
    streak: u32,
}

impl StabilityMonitor {
    /// Create an idle monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a wait is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current generation id.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin a wait. Returns its generation, or `None` if one is already running.
    pub fn request(&mut self) -> Option<u64> {
        if self.active {
            debug!(generation = self.generation, "stabilization wait already active");
            return None;
        }
        self.generation += 1;
        self.active = true;
        self.last = None;
        self.streak = 0;
        debug!(generation = self.generation, "stabilization wait started");
        Some(self.generation)
    }

    /// Abandon the running wait, if any, invalidating its pending polls.
    pub fn cancel(&mut self) {
        if self.active {
            debug!(generation = self.generation, "stabilization wait cancelled");
        }
        self.generation += 1;
        self.active = false;
        self.last = None;
        self.streak = 0;
    }

    /// Evaluate one poll of wait `generation`.
    ///
    /// `busy` reports in-flight animation or actuator motion; `required` is
    /// the number of consecutive identical, quiet snapshots needed.
    pub fn poll(
        &mut self,
        generation: u64,
        graph: &SceneGraph,
        busy: bool,
        required: u32,
    ) -> PollOutcome {
        if !self.active || generation != self.generation {
            return PollOutcome::Stale;
        }
        let quiet = !busy && !graph.has_held_objects();
        let same = self.last.as_ref() == Some(graph);
        self.streak = match (quiet, same) {
            (false, _) => 0,
            (true, true) => self.streak + 1,
            (true, false) => 1,
        };
        self.last = Some(graph.clone());

        if self.streak >= required {
            self.active = false;
            debug!(generation, "scene stabilized");
            PollOutcome::Stable
        } else {
            PollOutcome::Pending
        }
    }
}
