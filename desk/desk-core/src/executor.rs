//! Command planning: name resolution, precondition checks, solver dispatch.
//!
//! [`Planner::plan`] turns a parsed [`Command`] into a [`Plan`] without
//! touching the world. Every refusal is a [`Rejection`] raised before
//! anything moves. Capacity overflow and solver exhaustion are not
//! refusals: the object is routed to the open tabletop instead and the plan
//! carries an informational note.
//!
//! # Move preconditions
//!
//! | Check | Rejection |
//! |-------|-----------|
//! | source is a drawer or cabinet | `NotMovable` |
//! | source is mid-move | `AlreadyAnimating` |
//! | target is the source or inside it | `SelfTarget` |
//! | something rests on the source | `SourceBlocked` |
//! | source sits in a closed container | `SourceContainerClosed` |
//! | source drawer has an open drawer above | `UpperDrawerOpen` |
//! | target is a mug or cube | `UnsupportedTarget` |
//! | container moved into a container | `NestedContainer` |
//! | target lid or drawer closed, any relation word | `LidClosed`, `DrawerClosed` |
//! | target drawer has an open drawer above | `UpperDrawerOpen` |
//! | something rests on the target | `TargetBlocked` |

use desk_types::{
    bounding_radius, planar, ContainerKind, DeskConfig, Footprint, ObjectId, ObjectKind, Relation,
    Rejection,
};
use desk_place::{
    BoxSolver, ContainerFrame, DrawerSolver, Occupant, Placement, PlacementRequest,
    SurfaceSolver, TableSolver,
};
use nalgebra::Vector2;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::analyzer::{SceneAnalysis, Target};
use crate::command::{Command, Preposition};
use crate::names::NameMap;
use crate::world::{TrackedObject, World};

/// A committed move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// Object to move.
    pub object: ObjectId,
    /// Its display name.
    pub object_name: String,
    /// Display name of where it ends up.
    pub destination: String,
    /// Solved pose.
    pub placement: Placement,
    /// Contents that travel with the object.
    pub riders: Vec<ObjectId>,
    /// Container to bind to once the move lands.
    pub bind_to: Option<ObjectId>,
    /// Set when the object was routed to the tabletop instead of its target.
    pub fallback: Option<String>,
}

/// Outcome of planning one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Animate an object to a new pose.
    Move(MovePlan),
    /// Drive a lid or drawer.
    Toggle {
        /// Lidded box or drawer.
        object: ObjectId,
        /// Its display name.
        name: String,
        /// `true` to open.
        open: bool,
    },
    /// Nothing to do; report the message and complete the cycle.
    NoOp {
        /// Human-readable explanation.
        message: String,
    },
}

/// How a move relates to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Into(ContainerKind),
    Stack,
}

/// Read-only view used to plan one command.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    world: &'a World,
    names: &'a NameMap,
    analysis: &'a SceneAnalysis,
    config: &'a DeskConfig,
}

impl<'a> Planner<'a> {
    /// Create a planner over a freshly analyzed world.
    #[must_use]
    pub const fn new(
        world: &'a World,
        names: &'a NameMap,
        analysis: &'a SceneAnalysis,
        config: &'a DeskConfig,
    ) -> Self {
        Self {
            world,
            names,
            analysis,
            config,
        }
    }

    /// Plan a parsed command.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] for the first failed precondition.
    pub fn plan<R: Rng + ?Sized>(&self, command: &Command, rng: &mut R) -> Result<Plan, Rejection> {
        match command {
            Command::Toggle { open, name } => self.plan_toggle(name, *open),
            Command::Move {
                object,
                preposition,
                target,
            } => self.plan_move(object, *preposition, target, rng),
        }
    }

    fn object(&self, key: &ObjectId) -> Result<&'a TrackedObject, Rejection> {
        self.world
            .object(key)
            .ok_or_else(|| Rejection::UnknownObject(key.to_string()))
    }

    fn name(&self, key: &ObjectId) -> String {
        self.names.display(key)
    }

    fn drawer_fraction(&self) -> f64 {
        self.config.relation.drawer_open_fraction
    }

    // ------------------------------------------------------------------
    // Toggle
    // ------------------------------------------------------------------

    fn plan_toggle(&self, name: &str, open: bool) -> Result<Plan, Rejection> {
        let key = self
            .names
            .resolve(self.world, name)
            .ok_or_else(|| Rejection::UnknownObject(name.to_owned()))?;
        let display = self.name(&key);

        let commanded_open = if let Some(lid) = self.world.lid(&key) {
            lid.target > 0.0
        } else if let Some(slide) = self.world.drawer(&key) {
            let offset = slide.motion.map_or(slide.offset, |m| m.to);
            offset > slide.travel * self.drawer_fraction()
        } else {
            return Err(Rejection::NotToggleable(display));
        };

        if commanded_open == open {
            let state = if open { "open" } else { "closed" };
            return Ok(Plan::NoOp {
                message: format!("{display} is already {state}"),
            });
        }
        debug!(object = %key, open, "toggle planned");
        Ok(Plan::Toggle {
            object: key,
            name: display,
            open,
        })
    }

    // ------------------------------------------------------------------
    // Move
    // ------------------------------------------------------------------

    fn plan_move<R: Rng + ?Sized>(
        &self,
        object_name: &str,
        preposition: Preposition,
        target_name: &str,
        rng: &mut R,
    ) -> Result<Plan, Rejection> {
        let key = self
            .names
            .resolve(self.world, object_name)
            .ok_or_else(|| Rejection::UnknownObject(object_name.to_owned()))?;
        let source = self.object(&key)?;
        let source_name = self.name(&key);

        if source.kind == ObjectKind::Drawer || self.world.is_cabinet(&key) {
            return Err(Rejection::NotMovable(source_name));
        }
        if source.animating {
            return Err(Rejection::AlreadyAnimating(source_name));
        }

        let target = if target_name == desk_types::TABLE {
            None
        } else {
            Some(
                self.names
                    .resolve(self.world, target_name)
                    .ok_or_else(|| Rejection::UnknownTarget(target_name.to_owned()))?,
            )
        };

        let riders = self.analysis.nested_in(&key);
        if let Some(t) = &target {
            if *t == key || riders.contains(t) {
                return Err(Rejection::SelfTarget {
                    object: source_name,
                    target: self.name(t),
                });
            }
        }

        self.check_source(&key, &source_name)?;

        let Some(target_key) = target else {
            return self.plan_table(source, &source_name, riders, None);
        };
        let host = self.object(&target_key)?;
        let host_name = self.name(&target_key);
        if matches!(host.kind, ObjectKind::Mug | ObjectKind::Cube) {
            return Err(Rejection::UnsupportedTarget(host_name));
        }

        let mode = match (host.container, preposition) {
            (Some(kind @ ContainerKind::Drawer), _) => Mode::Into(kind),
            (Some(kind), _) if kind.is_round() => Mode::Into(kind),
            (Some(kind), Preposition::In) => Mode::Into(kind),
            (Some(_), Preposition::On) | (None, _) => Mode::Stack,
        };

        match mode {
            Mode::Into(kind) => {
                self.check_into(source, &source_name, &target_key, &host_name, kind)?;
                let relation = self.analysis.relation_of(&key);
                if relation.is_some_and(|r| r.is(Relation::In, &target_key)) {
                    return Ok(Plan::NoOp {
                        message: format!("{source_name} is already in {host_name}"),
                    });
                }
                self.plan_into(source, &source_name, riders, &target_key, &host_name, kind, rng)
            }
            Mode::Stack => {
                self.check_target_access(&target_key, &host_name, host.container)?;
                self.check_target_clear(&target_key, &host_name)?;
                let relation = self.analysis.relation_of(&key);
                if relation.is_some_and(|r| r.is(Relation::On, &target_key)) {
                    return Ok(Plan::NoOp {
                        message: format!("{source_name} is already on {host_name}"),
                    });
                }
                let pose = self
                    .world
                    .pose_of(&target_key)
                    .ok_or_else(|| Rejection::UnknownTarget(host_name.clone()))?;
                let request = self.request_for(source);
                let placement = SurfaceSolver::new(self.config.placement).place_on_top(
                    &request,
                    &pose,
                    &host.effective_size(),
                    rng,
                );
                Ok(Plan::Move(MovePlan {
                    object: key,
                    object_name: source_name,
                    destination: host_name,
                    placement,
                    riders,
                    bind_to: None,
                    fallback: None,
                }))
            }
        }
    }

    fn check_source(&self, key: &ObjectId, name: &str) -> Result<(), Rejection> {
        if let Some(blocker) = self.analysis.resting_on(key).first() {
            return Err(Rejection::SourceBlocked {
                object: name.to_owned(),
                blocker: self.name(blocker),
            });
        }
        let Some(relation) = self.analysis.relation_of(key) else {
            return Ok(());
        };
        let Target::Object(container) = &relation.target else {
            return Ok(());
        };
        if relation.relation != Relation::In {
            return Ok(());
        }
        if !self.world.is_open(container, self.drawer_fraction()) {
            return Err(Rejection::SourceContainerClosed {
                object: name.to_owned(),
                container: self.name(container),
            });
        }
        self.check_upper_drawers(container)
    }

    fn check_upper_drawers(&self, drawer: &ObjectId) -> Result<(), Rejection> {
        let above = self
            .world
            .open_drawers_above(drawer, self.drawer_fraction());
        match above.first() {
            Some(upper) => Err(Rejection::UpperDrawerOpen {
                drawer: self.name(drawer),
                upper: self.name(upper),
            }),
            None => Ok(()),
        }
    }

    fn check_target_clear(&self, target: &ObjectId, name: &str) -> Result<(), Rejection> {
        let blockers = self.analysis.resting_on(target);
        if blockers.is_empty() {
            return Ok(());
        }
        Err(Rejection::TargetBlocked {
            target: name.to_owned(),
            blockers: blockers
                .iter()
                .map(|b| self.name(b))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn check_into(
        &self,
        source: &TrackedObject,
        source_name: &str,
        target: &ObjectId,
        target_name: &str,
        kind: ContainerKind,
    ) -> Result<(), Rejection> {
        if source.container.is_some() || self.world.is_cabinet(&source.id) {
            return Err(Rejection::NestedContainer {
                object: source_name.to_owned(),
                target: target_name.to_owned(),
            });
        }
        self.check_target_access(target, target_name, Some(kind))?;
        if kind == ContainerKind::Drawer {
            self.check_upper_drawers(target)?;
        }
        self.check_target_clear(target, target_name)
    }

    fn check_target_access(
        &self,
        target: &ObjectId,
        target_name: &str,
        kind: Option<ContainerKind>,
    ) -> Result<(), Rejection> {
        if self.world.is_open(target, self.drawer_fraction()) {
            return Ok(());
        }
        match kind {
            Some(ContainerKind::LiddedBox) => Err(Rejection::LidClosed(target_name.to_owned())),
            Some(ContainerKind::Drawer) => Err(Rejection::DrawerClosed(target_name.to_owned())),
            _ => Ok(()),
        }
    }

    fn request_for(&self, source: &TrackedObject) -> PlacementRequest {
        let yaw = self.world.pose_of(&source.id).map_or(0.0, |p| p.yaw());
        PlacementRequest::new(source.kind, source.size).with_yaw(yaw)
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_into<R: Rng + ?Sized>(
        &self,
        source: &TrackedObject,
        source_name: &str,
        riders: Vec<ObjectId>,
        target: &ObjectId,
        target_name: &str,
        kind: ContainerKind,
        rng: &mut R,
    ) -> Result<Plan, Rejection> {
        let host = self.object(target)?;
        let pose = self
            .world
            .pose_of(target)
            .ok_or_else(|| Rejection::UnknownTarget(target_name.to_owned()))?;

        let residents: Vec<ObjectId> = self
            .analysis
            .occupants_of(target)
            .into_iter()
            .filter(|k| *k != source.id && !riders.contains(k))
            .collect();
        let capacity = self.config.capacity.for_kind(kind);
        if residents.len() >= capacity {
            info!(
                container = %target,
                occupants = residents.len(),
                capacity,
                "container full, routing to table"
            );
            let note = format!("{target_name} is full; placed {source_name} on the table");
            return self.plan_table(source, source_name, riders, Some(note));
        }

        let occupants: Vec<Occupant> = residents
            .iter()
            .filter_map(|k| {
                let o = self.world.object(k)?;
                let p = self.world.pose_of(k)?;
                Some(Occupant::new(
                    planar(&p.position),
                    bounding_radius(o.kind, &o.effective_size()),
                ))
            })
            .collect();

        let frame = ContainerFrame::new(pose, kind.geometry(&host.effective_size()));
        let request = self.request_for(source);
        let placement = match kind {
            ContainerKind::OpenBox | ContainerKind::LiddedBox => {
                BoxSolver::new(self.config.placement).find_placement(&request, &frame, &occupants, rng)
            }
            ContainerKind::Drawer => DrawerSolver::new(self.config.placement)
                .find_placement(&request, &frame, &occupants, rng),
            ContainerKind::Bowl | ContainerKind::Plate => {
                Some(SurfaceSolver::new(self.config.placement).place_in_vessel(&request, &frame))
            }
        };

        let Some(placement) = placement else {
            let note = format!("no room in {target_name}; placed {source_name} on the table");
            return self.plan_table(source, source_name, riders, Some(note));
        };

        Ok(Plan::Move(MovePlan {
            object: source.id.clone(),
            object_name: source_name.to_owned(),
            destination: target_name.to_owned(),
            placement,
            riders,
            bind_to: kind.is_toggleable().then(|| target.clone()),
            fallback: None,
        }))
    }

    fn plan_table(
        &self,
        source: &TrackedObject,
        source_name: &str,
        riders: Vec<ObjectId>,
        fallback: Option<String>,
    ) -> Result<Plan, Rejection> {
        if fallback.is_none() {
            let relation = self.analysis.relation_of(&source.id);
            if relation.is_some_and(|r| r.relation == Relation::On && r.target == Target::Table) {
                return Ok(Plan::NoOp {
                    message: format!("{source_name} is already on the table"),
                });
            }
        }

        let obstacles: Vec<Footprint> = self
            .world
            .objects()
            .filter(|o| o.id != source.id && !riders.contains(&o.id))
            // A drawer at rest sits inside its cabinet's footprint.
            .filter(|o| {
                self.world
                    .drawer(&o.id)
                    .map_or(true, |d| d.offset > 0.0 || d.motion.is_some())
            })
            .filter_map(|o| {
                let p = self.world.pose_of(&o.id)?;
                let size = o.effective_size();
                Some(Footprint::new(
                    planar(&p.position),
                    Vector2::new(0.5 * size.x, 0.5 * size.z),
                    p.yaw(),
                ))
            })
            .collect();

        let request = self.request_for(source);
        let solver = TableSolver::new(self.config.placement, self.config.table);
        let Some(placement) = solver.find_placement(&request, &obstacles) else {
            warn!(object = %source.id, "no free space on the table");
            return Ok(Plan::NoOp {
                message: format!("no free space on the table for {source_name}"),
            });
        };

        Ok(Plan::Move(MovePlan {
            object: source.id.clone(),
            object_name: source_name.to_owned(),
            destination: desk_types::TABLE.to_owned(),
            placement,
            riders,
            bind_to: None,
            fallback,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_scene;
    use crate::command::parse_command;
    use crate::world::ObjectSpec;
    use desk_types::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        world: World,
        config: DeskConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::default(),
                config: DeskConfig::default(),
            }
        }

        fn plan(&mut self, text: &str) -> Result<Plan, Rejection> {
            let names = NameMap::build(&self.world);
            let analysis =
                analyze_scene(&mut self.world, &names, &self.config.relation, &self.config.table);
            let mut rng = StdRng::seed_from_u64(7);
            Planner::new(&self.world, &names, &analysis, &self.config)
                .plan(&parse_command(text)?, &mut rng)
        }
    }

    #[test]
    fn test_move_into_open_box() {
        let mut f = Fixture::new();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_table(-20.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Mug).with_color(Color::Red).on_table(20.0, 0.0))
            .unwrap();

        let Plan::Move(m) = f.plan("move red_mug into red_box").unwrap() else {
            panic!("expected move");
        };
        assert_eq!(m.destination, "red_box");
        assert!(m.fallback.is_none());
        assert!(m.bind_to.is_none());
        assert!((m.placement.position.x + 20.0).abs() <= 7.4);
        assert!(m.placement.position.y < 6.0);

        // `to` stacks, like `on`.
        let Plan::Move(m) = f.plan("put red_mug to red_box").unwrap() else {
            panic!("expected move");
        };
        assert!(m.placement.position.y > 6.0);
    }

    #[test]
    fn test_rejections() {
        let mut f = Fixture::new();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::LiddedBox).on_table(0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).on_table(20.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Mug).on_table(-20.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Blue).on_table(20.0, 20.0))
            .unwrap();

        assert_eq!(
            f.plan("move cube_0 into lid_box_0"),
            Err(Rejection::LidClosed("lid_box_0".into()))
        );
        assert_eq!(
            f.plan("move mug_0 on cube_0"),
            Err(Rejection::UnsupportedTarget("cube_0".into()))
        );
        assert_eq!(
            f.plan("move cube_0 on cube_0"),
            Err(Rejection::SelfTarget {
                object: "cube_0".into(),
                target: "cube_0".into()
            })
        );
        assert_eq!(
            f.plan("move ghost on table"),
            Err(Rejection::UnknownObject("ghost".into()))
        );
        assert_eq!(
            f.plan("move cube_0 into ghost"),
            Err(Rejection::UnknownTarget("ghost".into()))
        );
        assert_eq!(
            f.plan("open cube_0"),
            Err(Rejection::NotToggleable("cube_0".into()))
        );
        assert!(matches!(
            f.plan("move blue_box into lid_box_0"),
            Err(Rejection::NestedContainer { .. })
        ));
        // A closed lid refuses stacking as well.
        assert_eq!(
            f.plan("move blue_box on lid_box_0"),
            Err(Rejection::LidClosed("lid_box_0".into()))
        );
        assert_eq!(
            f.plan("move cube_0 to lid_box_0"),
            Err(Rejection::LidClosed("lid_box_0".into()))
        );
    }

    #[test]
    fn test_stack_on_open_lidded_box() {
        let mut f = Fixture::new();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::LiddedBox).opened().on_table(0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Blue).on_table(20.0, 20.0))
            .unwrap();
        let Plan::Move(m) = f.plan("move blue_box on lid_box_0").unwrap() else {
            panic!("expected move");
        };
        assert_eq!(m.destination, "lid_box_0");
        assert!(m.bind_to.is_none());
    }

    #[test]
    fn test_table_avoids_open_drawers() {
        let mut f = Fixture::new();
        let cab = f
            .world
            .spawn(
                ObjectSpec::short_cabinet()
                    .opened()
                    .with_yaw(-std::f64::consts::FRAC_PI_2)
                    .on_table(-40.0, -28.0),
            )
            .unwrap();
        let red_box = f
            .world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_table(0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(red_box, 0.0, 0.0))
            .unwrap();

        let Plan::Move(m) = f.plan("move cube_0 to table").unwrap() else {
            panic!("expected move");
        };
        let spot = Footprint::new(
            planar(&m.placement.position),
            Vector2::new(1.0, 1.0),
            m.placement.yaw,
        );
        for drawer in f.world.drawers_of(&cab) {
            let size = f.world.object(&drawer).unwrap().effective_size();
            let pose = f.world.pose_of(&drawer).unwrap();
            let body = Footprint::new(
                planar(&pose.position),
                Vector2::new(0.5 * size.x, 0.5 * size.z),
                pose.yaw(),
            );
            assert!(!spot.overlaps(&body), "{drawer} at {:?}", m.placement.position);
        }
    }

    #[test]
    fn test_source_and_target_blocked() {
        let mut f = Fixture::new();
        let base = f
            .world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Green).on_table(0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_top_of(base, 0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).on_table(30.0, 0.0))
            .unwrap();

        assert_eq!(
            f.plan("move green_box to table"),
            Err(Rejection::SourceBlocked {
                object: "green_box".into(),
                blocker: "red_box".into()
            })
        );
        assert_eq!(
            f.plan("move cube_0 into green_box"),
            Err(Rejection::TargetBlocked {
                target: "green_box".into(),
                blockers: "red_box".into()
            })
        );
    }

    #[test]
    fn test_drawer_rules() {
        let mut f = Fixture::new();
        let cab = f
            .world
            .spawn(ObjectSpec::short_cabinet().on_table(30.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).on_table(-30.0, 0.0))
            .unwrap();
        let drawers = f.world.drawers_of(&cab);

        assert_eq!(
            f.plan("move cube_0 into drawer_low"),
            Err(Rejection::DrawerClosed("short_cabinet/drawer_low".into()))
        );
        assert_eq!(
            f.plan("move short_cabinet to table"),
            Err(Rejection::NotMovable("short_cabinet".into()))
        );

        f.world.drive_drawer(&drawers[0], true, 0.0).unwrap();
        f.world.drive_drawer(&drawers[1], true, 0.0).unwrap();
        f.world.step(0.01, 3.0);
        assert_eq!(
            f.plan("move cube_0 into short_cabinet/drawer_low"),
            Err(Rejection::UpperDrawerOpen {
                drawer: "short_cabinet/drawer_low".into(),
                upper: "short_cabinet/drawer_middle".into()
            })
        );
        let Plan::Move(m) = f.plan("move cube_0 into short_cabinet/drawer_middle").unwrap() else {
            panic!("expected move");
        };
        assert_eq!(m.bind_to, Some(drawers[1].clone()));
    }

    #[test]
    fn test_toggle_idempotent() {
        let mut f = Fixture::new();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::LiddedBox).opened())
            .unwrap();
        assert_eq!(
            f.plan("open lid_box_0").unwrap(),
            Plan::NoOp {
                message: "lid_box_0 is already open".into()
            }
        );
        assert!(matches!(
            f.plan("close lid_box_0").unwrap(),
            Plan::Toggle { open: false, .. }
        ));
    }

    #[test]
    fn test_already_satisfied_and_table() {
        let mut f = Fixture::new();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).on_table(0.0, 0.0))
            .unwrap();
        assert_eq!(
            f.plan("move cube_0 to table").unwrap(),
            Plan::NoOp {
                message: "cube_0 is already on the table".into()
            }
        );
    }

    #[test]
    fn test_full_vessel_falls_back() {
        let mut f = Fixture::new();
        let bowl = f
            .world
            .spawn(ObjectSpec::vessel(ContainerKind::Bowl).on_table(0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(bowl, 0.0, 0.0))
            .unwrap();
        f.world
            .spawn(ObjectSpec::new(ObjectKind::Cube).on_table(20.0, 0.0))
            .unwrap();
        let Plan::Move(m) = f.plan("move cube_1 in bowl").unwrap() else {
            panic!("expected move");
        };
        assert_eq!(m.destination, "table");
        assert_eq!(m.fallback.as_deref(), Some("bowl is full; placed cube_1 on the table"));
    }
}
