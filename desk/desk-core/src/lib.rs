//! Tabletop manipulation engine.
//!
//! This crate ties the desk together: a [`World`] snapshot of bodies, lids
//! and drawers; a display-name map; the scene-graph analyzer; the kinematic
//! animator; the command executor; and the stabilization monitor, all owned
//! by one [`Simulation`] context and driven by its tick.
//!
//! # Command cycle
//!
//! ```text
//! submit ─► parse ─► resolve ─► preconditions ─► search ─► animate ─► wait stable ─► trigger
//!              │         │             │             │
//!              └─────────┴─────────────┴──► reject   └──► tabletop fallback
//! ```
//!
//! Rejections are synchronous and carry a human-readable reason. Search
//! failures and full containers never reject; the object lands on the
//! tabletop instead.
//!
//! # Example
//!
//! ```
//! use desk_core::{ObjectSpec, Outbound, Simulation};
//! use desk_types::{Color, DeskConfig, ObjectKind, Relation};
//!
//! let mut sim = Simulation::with_seed(DeskConfig::default(), 42).unwrap();
//! sim.spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_table(-20.0, 0.0)).unwrap();
//! sim.spawn(ObjectSpec::new(ObjectKind::Mug).with_color(Color::Red).on_table(20.0, 10.0)).unwrap();
//!
//! sim.submit("move red_mug into red_box").unwrap();
//! assert!(sim.run_until_idle(10.0));
//!
//! assert!(sim.scene_graph().contains("red_mug", Relation::In, "red_box"));
//! assert!(sim.drain_outbound().contains(&Outbound::AgentTrigger(true)));
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: serialization for spawn specs and outbound messages

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod animator;
pub mod command;
pub mod executor;
pub mod names;
pub mod sim;
pub mod stability;
pub mod world;

pub use analyzer::{analyze_scene, classify, ObjectRelation, SceneAnalysis, Target};
pub use animator::{ease_in_out_cubic, ease_in_out_quad, Animator, Phase};
pub use command::{parse_command, Command, Preposition};
pub use executor::{MovePlan, Plan, Planner};
pub use names::NameMap;
pub use sim::{Outbound, Simulation, IDLE_STATUS};
pub use stability::{PollOutcome, StabilityMonitor};
pub use world::{
    lid_pose, Binding, BodySet, DrawerSlide, DrawerSpec, Lid, ObjectSpec, Site, SlideMotion,
    TrackedObject, World, LID_OPEN_ANGLE,
};

pub use desk_types::{DeskError, Rejection};

/// Result type for desk operations.
pub type Result<T> = std::result::Result<T, DeskError>;
