//! The simulation context and its cooperative scheduler.
//!
//! [`Simulation`] owns every piece of mutable state: the world, the name
//! map, the animator, the stabilization monitor, the RNG, and the outbound
//! channel. Subsystems receive it by reference; there is no global state.
//!
//! Time advances only through [`Simulation::tick`]. Each tick:
//!
//! 1. advances in-flight kinematic moves and lands the finished ones
//! 2. steps the world (a no-op while frozen)
//! 3. fires due timers in `(due, insertion)` order
//! 4. publishes the scene graph when the publish interval has elapsed
//!
//! Timers carry the token or generation they were scheduled under, so a
//! superseded unfreeze, status revert, or stabilization poll does nothing.

use std::collections::VecDeque;

use desk_types::{DeskConfig, DeskError, ObjectId, Rejection, SceneGraph};
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::analyzer::{analyze_scene, SceneAnalysis};
use crate::animator::Animator;
use crate::command::parse_command;
use crate::executor::{MovePlan, Plan, Planner};
use crate::names::NameMap;
use crate::stability::{PollOutcome, StabilityMonitor};
use crate::world::{ObjectSpec, World};

/// Status line shown while waiting for the next instruction.
pub const IDLE_STATUS: &str = "Thinking...";

/// Timer slack when comparing due times.
const TIME_EPS: f64 = 1e-9;

/// Message on the outbound channel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "data", rename_all = "snake_case")
)]
pub enum Outbound {
    /// Acknowledgement or informational status.
    Status(String),
    /// Rejection reason.
    Error(String),
    /// End of a command cycle; `false` if the command was rejected.
    AgentTrigger(bool),
    /// Periodic scene-graph publication.
    SceneGraph(SceneGraph),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    StabilityPoll(u64),
    Unfreeze(u64),
    StatusRevert(u64),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: f64,
    seq: u64,
    kind: TimerKind,
}

#[derive(Debug, Clone)]
struct Landing {
    bind_to: Option<ObjectId>,
    freeze_token: u64,
}

/// Single-owner simulation context.
#[derive(Debug)]
pub struct Simulation {
    config: DeskConfig,
    world: World,
    names: NameMap,
    animator: Animator,
    monitor: StabilityMonitor,
    rng: StdRng,
    time: f64,
    timers: Vec<Timer>,
    timer_seq: u64,
    landings: HashMap<ObjectId, Landing>,
    outbound: VecDeque<Outbound>,
    status: String,
    status_token: u64,
    next_publish: f64,
}

impl Simulation {
    /// Create an empty simulation with an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: DeskConfig) -> crate::Result<Self> {
        Self::build(config, StdRng::from_entropy())
    }

    /// Create an empty simulation with a fixed RNG seed.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::InvalidConfig`] if the configuration is invalid.
    pub fn with_seed(config: DeskConfig, seed: u64) -> crate::Result<Self> {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: DeskConfig, rng: StdRng) -> crate::Result<Self> {
        config.validate()?;
        let world = World::new(config.table);
        Ok(Self {
            names: NameMap::build(&world),
            next_publish: config.timing.publish_interval,
            config,
            world,
            animator: Animator::new(),
            monitor: StabilityMonitor::new(),
            rng,
            time: 0.0,
            timers: Vec::new(),
            timer_seq: 0,
            landings: HashMap::new(),
            outbound: VecDeque::new(),
            status: IDLE_STATUS.to_owned(),
            status_token: 0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for scene setup.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Simulated seconds elapsed.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Current status line.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns `true` while a stabilization wait is running.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.monitor.is_active()
    }

    /// Returns `true` if nothing is moving, frozen, or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.animator.is_idle()
            && self.world.actuators_idle()
            && !self.world.is_frozen()
            && !self.monitor.is_active()
    }

    /// Display name of an object.
    pub fn display_name(&mut self, key: &ObjectId) -> String {
        self.names.refresh(&self.world);
        self.names.display(key)
    }

    /// Resolve a user-visible name.
    pub fn resolve(&mut self, name: &str) -> Option<ObjectId> {
        self.names.refresh(&self.world);
        self.names.resolve(&self.world, name)
    }

    // ========================================================================
    // Scene
    // ========================================================================

    /// Create an object.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if the spec references a missing object.
    pub fn spawn(&mut self, spec: ObjectSpec) -> crate::Result<ObjectId> {
        let key = self.world.spawn(spec)?;
        self.names.refresh(&self.world);
        Ok(key)
    }

    /// Analyze the current scene.
    pub fn analyze(&mut self) -> SceneAnalysis {
        self.names.refresh(&self.world);
        analyze_scene(
            &mut self.world,
            &self.names,
            &self.config.relation,
            &self.config.table,
        )
    }

    /// The current scene graph.
    pub fn scene_graph(&mut self) -> SceneGraph {
        self.analyze().graph
    }

    /// Take every pending outbound message.
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        self.outbound.drain(..).collect()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Run one command through parse, resolve, precondition and search.
    ///
    /// On success the move or toggle is under way and its completion trigger
    /// will follow once the scene stabilizes. A rejection is reported on the
    /// outbound channel as well as returned.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Rejected`] if the command is refused.
    pub fn submit(&mut self, text: &str) -> crate::Result<()> {
        self.monitor.cancel();
        let analysis = self.analyze();
        let planned = parse_command(text).and_then(|command| {
            Planner::new(&self.world, &self.names, &analysis, &self.config)
                .plan(&command, &mut self.rng)
        });
        let plan = match planned {
            Ok(plan) => plan,
            Err(rejection) => return Err(self.reject(rejection)),
        };

        match plan {
            Plan::Move(m) => self.begin_move(m),
            Plan::Toggle { object, name, open } => {
                if open {
                    self.set_status(format!("opening {name}"));
                } else {
                    self.set_status(format!("closing {name}"));
                }
                if self.world.lid(&object).is_some() {
                    self.world.drive_lid(&object, open)?;
                } else {
                    let duration = self.config.timing.drawer_slide_duration;
                    self.world.drive_drawer(&object, open, duration)?;
                }
                self.request_stabilization_wait();
                Ok(())
            }
            Plan::NoOp { message } => {
                self.set_status(message);
                self.request_stabilization_wait();
                Ok(())
            }
        }
    }

    fn begin_move(&mut self, m: MovePlan) -> crate::Result<()> {
        match &m.fallback {
            Some(note) => {
                info!(object = %m.object, "{note}");
                self.set_status(note.clone());
            }
            None => self.set_status(format!("moving {} to {}", m.object_name, m.destination)),
        }

        let token = match self.animator.start(
            &mut self.world,
            &m.object,
            m.placement.pose(),
            &m.riders,
            &self.config.timing,
        ) {
            Ok(token) => token,
            Err(DeskError::Rejected(r)) => return Err(self.reject(r)),
            Err(e) => return Err(e),
        };
        self.world.unbind(&m.object);
        if let Some(o) = self.world.object_mut(&m.object) {
            o.reorient = m.placement.reorient;
        }
        self.landings.insert(
            m.object,
            Landing {
                bind_to: m.bind_to,
                freeze_token: token,
            },
        );
        Ok(())
    }

    fn reject(&mut self, rejection: Rejection) -> DeskError {
        let reason = rejection.to_string();
        debug!(%reason, "command rejected");
        self.outbound.push_back(Outbound::Error(reason.clone()));
        self.status = reason;
        self.status_token += 1;
        let delay = self.config.timing.status_revert_delay;
        self.schedule(delay, TimerKind::StatusRevert(self.status_token));
        self.outbound.push_back(Outbound::AgentTrigger(false));
        DeskError::Rejected(rejection)
    }

    fn set_status(&mut self, status: String) {
        self.status_token += 1;
        self.outbound.push_back(Outbound::Status(status.clone()));
        self.status = status;
    }

    /// Start a stabilization wait unless one is already running.
    ///
    /// Returns the generation of the new wait.
    pub fn request_stabilization_wait(&mut self) -> Option<u64> {
        let generation = self.monitor.request()?;
        let interval = self.config.timing.poll_interval;
        self.schedule(interval, TimerKind::StabilityPoll(generation));
        Some(generation)
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    fn schedule(&mut self, delay: f64, kind: TimerKind) {
        self.timer_seq += 1;
        self.timers.push(Timer {
            due: self.time + delay,
            seq: self.timer_seq,
            kind,
        });
        self.timers
            .sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
    }

    /// Advance the simulation by one configured tick.
    pub fn tick(&mut self) {
        let dt = self.config.timing.tick;
        self.time += dt;

        for object in self.animator.tick(&mut self.world, dt) {
            self.land(&object);
        }
        self.world.step(dt, self.config.timing.hinge_speed);

        while self
            .timers
            .first()
            .is_some_and(|t| t.due <= self.time + TIME_EPS)
        {
            let timer = self.timers.remove(0);
            self.fire(timer.kind);
        }

        if self.time + TIME_EPS >= self.next_publish {
            self.next_publish += self.config.timing.publish_interval;
            let graph = self.scene_graph();
            self.outbound.push_back(Outbound::SceneGraph(graph));
        }
    }

    fn land(&mut self, object: &ObjectId) {
        let Some(landing) = self.landings.remove(object) else {
            return;
        };
        if let Some(container) = &landing.bind_to {
            if let Err(e) = self.world.bind(object, container) {
                debug!(error = %e, "binding skipped");
            }
        }
        let delay = self.config.timing.settle_delay;
        self.schedule(delay, TimerKind::Unfreeze(landing.freeze_token));
        self.request_stabilization_wait();
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Unfreeze(token) => {
                if self.world.unfreeze(token) {
                    debug!(token, "physics resumed");
                }
            }
            TimerKind::StatusRevert(token) => {
                if token == self.status_token {
                    self.status = IDLE_STATUS.to_owned();
                    self.outbound
                        .push_back(Outbound::Status(IDLE_STATUS.to_owned()));
                }
            }
            TimerKind::StabilityPoll(generation) => {
                let busy = !self.animator.is_idle()
                    || !self.world.actuators_idle()
                    || self.world.is_frozen();
                let graph = self.scene_graph();
                let required = self.config.timing.stable_polls;
                match self.monitor.poll(generation, &graph, busy, required) {
                    PollOutcome::Stale => {}
                    PollOutcome::Pending => {
                        let interval = self.config.timing.poll_interval;
                        self.schedule(interval, TimerKind::StabilityPoll(generation));
                    }
                    PollOutcome::Stable => {
                        self.status_token += 1;
                        self.status = IDLE_STATUS.to_owned();
                        self.outbound.push_back(Outbound::AgentTrigger(true));
                    }
                }
            }
        }
    }

    /// Tick until idle or until `max_seconds` of simulated time pass.
    ///
    /// Returns `true` if the simulation went idle.
    pub fn run_until_idle(&mut self, max_seconds: f64) -> bool {
        let deadline = self.time + max_seconds;
        while self.time < deadline {
            self.tick();
            if self.is_idle() {
                return true;
            }
        }
        self.is_idle()
    }
}
