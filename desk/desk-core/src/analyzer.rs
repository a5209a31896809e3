//! Scene-graph analysis.
//!
//! Every query rebuilds the graph from the current world state; nothing is
//! patched incrementally. Each object gets exactly one relation, chosen by a
//! fixed priority:
//!
//! 1. held by the manipulator: `(in)hand`, and nothing else
//! 2. bound to a closed lidded box or drawer: `(in)` that container
//! 3. geometrically inside an open drawer, then an open box (nearest center wins)
//! 4. inside a round vessel (radial test)
//! 5. resting on top of a support (smallest vertical gap wins)
//! 6. on the tabletop when inside its rectangle and height band, else `(out)table`
//!
//! Containment is tested in the container's local frame using the per-kind
//! [`ContainerGeometry`](desk_types::ContainerGeometry) descriptor.
//!
//! Analysis also refreshes each lid's memoized open state from its hinge
//! angle, which later precondition checks read.

use desk_types::{
    decorated_node, planar, ContainerKind, Edge, Footprint, ObjectId, ObjectKind, Pose, Relation,
    RelationConfig, SceneGraph, TableConfig, HAND, TABLE,
};
use hashbrown::HashMap;
use nalgebra::{Vector2, Vector3};

use crate::names::NameMap;
use crate::world::{TrackedObject, World};

/// What an object relates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The tabletop.
    Table,
    /// The manipulator.
    Hand,
    /// Another tracked object.
    Object(ObjectId),
}

/// The single relation chosen for one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRelation {
    /// The relation.
    pub relation: Relation,
    /// Its target.
    pub target: Target,
}

impl ObjectRelation {
    const fn new(relation: Relation, target: Target) -> Self {
        Self { relation, target }
    }

    /// Returns `true` if this is `relation` to the object `key`.
    #[must_use]
    pub fn is(&self, relation: Relation, key: &ObjectId) -> bool {
        self.relation == relation && self.target == Target::Object(key.clone())
    }
}

/// Result of one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct SceneAnalysis {
    /// Wire-form graph.
    pub graph: SceneGraph,
    relations: HashMap<ObjectId, ObjectRelation>,
    order: Vec<ObjectId>,
}

impl SceneAnalysis {
    /// Relation chosen for an object.
    #[must_use]
    pub fn relation_of(&self, key: &ObjectId) -> Option<&ObjectRelation> {
        self.relations.get(key)
    }

    /// Objects whose relation is `relation` to `target`, in creation order.
    #[must_use]
    pub fn related_to(&self, relation: Relation, target: &ObjectId) -> Vec<ObjectId> {
        self.order
            .iter()
            .filter(|k| self.relations.get(*k).is_some_and(|r| r.is(relation, target)))
            .cloned()
            .collect()
    }

    /// Objects inside a container.
    #[must_use]
    pub fn occupants_of(&self, container: &ObjectId) -> Vec<ObjectId> {
        self.related_to(Relation::In, container)
    }

    /// Objects resting on top of a support.
    #[must_use]
    pub fn resting_on(&self, support: &ObjectId) -> Vec<ObjectId> {
        self.related_to(Relation::On, support)
    }

    /// Everything carried along with `root`: its contents, what rests on it,
    /// and so on transitively. `root` itself is excluded.
    #[must_use]
    pub fn nested_in(&self, root: &ObjectId) -> Vec<ObjectId> {
        let mut found: Vec<ObjectId> = Vec::new();
        let mut frontier = vec![root.clone()];
        while let Some(host) = frontier.pop() {
            for key in &self.order {
                if found.contains(key) || key == root {
                    continue;
                }
                let Some(r) = self.relations.get(key) else {
                    continue;
                };
                if r.is(Relation::In, &host) || r.is(Relation::On, &host) {
                    found.push(key.clone());
                    frontier.push(key.clone());
                }
            }
        }
        found
    }
}

/// Rebuild the scene graph from the world.
pub fn analyze_scene(
    world: &mut World,
    names: &NameMap,
    config: &RelationConfig,
    table: &TableConfig,
) -> SceneAnalysis {
    world.refresh_lid_states(config.lid_open_threshold);
    let world: &World = world;

    let mut analysis = SceneAnalysis::default();
    analysis.graph.push_node(TABLE);
    for object in world.objects() {
        let name = names.display(&object.id);
        if matches!(object.kind, ObjectKind::LiddedBox | ObjectKind::Drawer) {
            let open = world.is_open(&object.id, config.drawer_open_fraction);
            analysis.graph.push_node(decorated_node(&name, open));
        } else {
            analysis.graph.push_node(name);
        }
    }

    for object in world.objects().filter(|o| o.kind != ObjectKind::Drawer) {
        let relation = classify(world, object, config, table);
        let name = names.display(&object.id);
        let edge = match &relation.target {
            Target::Hand => Edge::in_hand(name),
            Target::Table => Edge::new(name, relation.relation, TABLE),
            Target::Object(key) => Edge::new(name, relation.relation, names.display(key)),
        };
        analysis.graph.push_edge(&edge);
        analysis.order.push(object.id.clone());
        analysis.relations.insert(object.id.clone(), relation);
    }
    analysis
}

/// Choose the single relation for one object.
#[must_use]
pub fn classify(
    world: &World,
    object: &TrackedObject,
    config: &RelationConfig,
    table: &TableConfig,
) -> ObjectRelation {
    if object.in_hand {
        return ObjectRelation::new(Relation::InHand, Target::Hand);
    }
    let Some(pose) = world.pose_of(&object.id) else {
        return ObjectRelation::new(Relation::Out, Target::Table);
    };
    let size = object.effective_size();

    if let Some(binding) = &object.binding {
        if world.object(&binding.container).is_some()
            && !world.is_open(&binding.container, config.drawer_open_fraction)
        {
            return ObjectRelation::new(Relation::In, Target::Object(binding.container.clone()));
        }
    }

    let hosts: Vec<(&TrackedObject, Pose, ContainerKind)> = world
        .objects()
        .filter(|h| h.id != object.id && world.is_open(&h.id, config.drawer_open_fraction))
        .filter_map(|h| Some((h, world.pose_of(&h.id)?, h.container?)))
        .collect();

    let tiers: [&dyn Fn(ContainerKind) -> bool; 3] = [
        &|k: ContainerKind| k == ContainerKind::Drawer,
        &|k: ContainerKind| matches!(k, ContainerKind::OpenBox | ContainerKind::LiddedBox),
        &ContainerKind::is_round,
    ];
    for tier in tiers {
        let nearest = hosts
            .iter()
            .filter(|(_, _, kind)| tier(*kind))
            .filter_map(|(h, host_pose, kind)| {
                containment_distance(host_pose, *kind, &h.effective_size(), &pose, &size)
                    .map(|d| (d, &h.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, key)) = nearest {
            return ObjectRelation::new(Relation::In, Target::Object(key.clone()));
        }
    }

    let bottom = pose.position.y - 0.5 * size.y;
    let support = world
        .objects()
        .filter(|s| s.id != object.id && !s.in_hand && s.kind.can_support())
        .filter_map(|s| {
            let sp = world.pose_of(&s.id)?;
            let ss = s.effective_size();
            let top = sp.position.y + 0.5 * ss.y;
            let gap = (bottom - top).abs();
            let footprint = Footprint::new(
                planar(&sp.position),
                Vector2::new(0.5 * ss.x, 0.5 * ss.z),
                sp.yaw(),
            );
            (gap <= config.contact_tolerance
                && pose.position.y > sp.position.y
                && footprint.contains(&planar(&pose.position)))
            .then_some((gap, &s.id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((_, key)) = support {
        return ObjectRelation::new(Relation::On, Target::Object(key.clone()));
    }

    let p = pose.position;
    let within_rect = p.x.abs() <= table.half_x && p.z.abs() <= table.half_z;
    let within_band = bottom >= table.top_y - config.table_band_below
        && bottom <= table.top_y + config.table_band_above;
    if within_rect && within_band {
        ObjectRelation::new(Relation::On, Target::Table)
    } else {
        ObjectRelation::new(Relation::Out, Target::Table)
    }
}

/// Planar distance from the container center if the object is inside.
fn containment_distance(
    host: &Pose,
    kind: ContainerKind,
    host_size: &Vector3<f64>,
    pose: &Pose,
    size: &Vector3<f64>,
) -> Option<f64> {
    let geometry = kind.geometry(host_size);
    let tol = geometry.tolerances;
    let local = host.inverse_transform_point(&pose.position);
    let bottom = local.y - 0.5 * size.y;
    let top = local.y + 0.5 * size.y;
    let lateral = local.x.hypot(local.z);

    let inside = if kind.is_round() {
        lateral <= geometry.radius + tol.lateral_slack
    } else {
        local.x.abs() <= geometry.interior_half.x + tol.lateral_slack
            && local.z.abs() <= geometry.interior_half.y + tol.lateral_slack
    };
    let seated = tol.floor_band.contains(geometry.floor_offset, bottom)
        && top <= geometry.rim_offset() + tol.rim_slack;
    (inside && seated).then_some(lateral)
}

/// Display name of a relation target.
#[must_use]
pub fn target_name(names: &NameMap, target: &Target) -> String {
    match target {
        Target::Table => TABLE.to_owned(),
        Target::Hand => HAND.to_owned(),
        Target::Object(key) => names.display(key),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::world::ObjectSpec;
    use desk_types::{Color, DeskConfig};
    use nalgebra::Point3;

    fn analyze(world: &mut World) -> SceneAnalysis {
        let config = DeskConfig::default();
        let names = NameMap::build(world);
        analyze_scene(world, &names, &config.relation, &config.table)
    }

    #[test]
    fn test_table_and_containment() {
        let mut world = World::default();
        let red_box = world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_table(-20.0, 0.0))
            .unwrap();
        world
            .spawn(ObjectSpec::new(ObjectKind::Mug).with_color(Color::Red).inside(red_box, 2.0, -1.0))
            .unwrap();
        world
            .spawn(ObjectSpec::new(ObjectKind::Cube).with_color(Color::Blue).on_table(10.0, 5.0))
            .unwrap();

        let a = analyze(&mut world);
        assert_eq!(a.graph.nodes, vec!["table", "red_box", "red_mug", "blue_cube"]);
        assert_eq!(
            a.graph.edges,
            vec!["red_box(on)table", "red_mug(in)red_box", "blue_cube(on)table"]
        );
    }

    #[test]
    fn test_one_edge_per_object() {
        let mut world = World::default();
        let base = world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Green).on_table(0.0, 0.0))
            .unwrap();
        let top = world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_top_of(base, 0.0, 0.0))
            .unwrap();
        world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(top, 0.0, 0.0))
            .unwrap();
        world.spawn(ObjectSpec::short_cabinet().on_table(30.0, 0.0)).unwrap();

        let a = analyze(&mut world);
        for name in ["green_box", "red_box", "cube_0", "short_cabinet"] {
            assert_eq!(a.graph.edges_of(name).len(), 1, "{name}");
        }
        assert!(a.graph.contains("red_box", Relation::On, "green_box"));
        assert!(a.graph.contains("cube_0", Relation::In, "red_box"));
        assert!(a.graph.edges_of("short_cabinet/drawer_low").is_empty());
        assert!(a
            .graph
            .nodes
            .contains(&"short_cabinet/drawer_low(closed)".to_owned()));
    }

    #[test]
    fn test_held_object_only_in_hand() {
        let mut world = World::default();
        let cube = world.spawn(ObjectSpec::new(ObjectKind::Cube)).unwrap();
        world.object_mut(&cube).unwrap().in_hand = true;
        let a = analyze(&mut world);
        assert_eq!(a.graph.edges, vec!["cube_0(in)hand"]);
        assert!(a.graph.has_held_objects());
    }

    #[test]
    fn test_off_table_is_out() {
        let mut world = World::default();
        world
            .spawn(ObjectSpec::new(ObjectKind::Cube).at(Point3::new(80.0, -5.0, 0.0)))
            .unwrap();
        let a = analyze(&mut world);
        assert_eq!(a.graph.edges, vec!["cube_0(out)table"]);
    }

    #[test]
    fn test_closed_lidded_box_keeps_bound_contents() {
        let mut world = World::default();
        let lid_box = world
            .spawn(ObjectSpec::new(ObjectKind::LiddedBox).on_table(0.0, 0.0))
            .unwrap();
        let cube = world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(lid_box.clone(), 0.0, 0.0))
            .unwrap();
        // Even displaced, a bound object stays in while the lid is closed.
        let mut pose = world.pose_of(&cube).unwrap();
        pose.position.y += 10.0;
        world.set_pose(&cube, pose).unwrap();

        let a = analyze(&mut world);
        assert!(a.relation_of(&cube).unwrap().is(Relation::In, &lid_box));
        assert_eq!(a.graph.nodes[1], "lid_box_0(closed)");
    }

    #[test]
    fn test_vessel_and_nested() {
        let mut world = World::default();
        let bowl = world
            .spawn(ObjectSpec::vessel(ContainerKind::Bowl).on_table(-10.0, 10.0))
            .unwrap();
        let cube = world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(bowl.clone(), 0.0, 0.0))
            .unwrap();
        let a = analyze(&mut world);
        assert!(a.graph.contains("cube_0", Relation::In, "bowl"));
        assert_eq!(a.occupants_of(&bowl), vec![cube.clone()]);
        assert_eq!(a.nested_in(&bowl), vec![cube]);
    }

    #[test]
    fn test_drawer_contents_follow_open_drawer() {
        let mut world = World::default();
        let cab = world
            .spawn(ObjectSpec::short_cabinet().opened().on_table(30.0, 0.0))
            .unwrap();
        let low = world.drawers_of(&cab)[0].clone();
        world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(low, 0.0, 0.0))
            .unwrap();
        let a = analyze(&mut world);
        assert!(a.graph.contains("cube_0", Relation::In, "short_cabinet/drawer_low"));
        assert!(a
            .graph
            .nodes
            .contains(&"short_cabinet/drawer_low(open)".to_owned()));
    }
}
