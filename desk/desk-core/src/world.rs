//! The world snapshot: tracked objects, their bodies, lids, and drawers.
//!
//! [`World`] owns every rigid body on the desk together with the
//! bookkeeping the placement engine needs on top of raw physics:
//!
//! - tracked objects in creation order, each with a category, optional color,
//!   outer size and optional [`ContainerKind`]
//! - hinged lids for lidded boxes (motorized hinge angle)
//! - drawer slides for cabinets (timed linear motion along a local axis)
//! - bindings that keep contents attached to lidded boxes and drawers
//! - the global "frozen" flag that suspends integration during kinematic moves
//!
//! [`World::step`] stands in for the external physics engine's tick.

use std::f64::consts::PI;

use desk_types::{
    oriented_size, BodyId, Color, ContainerKind, DeskError, ObjectId, ObjectKind,
    Pose, Reorient, RigidBody, TableConfig,
};
use hashbrown::HashMap;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hinge angle of a fully opened lid.
pub const LID_OPEN_ANGLE: f64 = 100.0 * PI / 180.0;

/// Thickness of a box lid.
pub const LID_THICKNESS: f64 = 0.5;

/// Full size of the standard short cabinet.
pub const CABINET_SIZE: Vector3<f64> = Vector3::new(24.0, 21.0, 18.0);

/// Full size of one standard cabinet drawer.
pub const CABINET_DRAWER_SIZE: Vector3<f64> = Vector3::new(22.0, 6.0, 16.0);

/// Distance a standard drawer slides out when open.
pub const CABINET_DRAWER_TRAVEL: f64 = 12.0;

// ============================================================================
// Bodies
// ============================================================================

/// All rigid bodies, indexed by ID.
#[derive(Debug, Clone, Default)]
pub struct BodySet {
    bodies: HashMap<BodyId, RigidBody>,
    next_id: u64,
}

impl BodySet {
    /// Add a body and return its ID.
    pub fn insert(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId::new(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, body);
        id
    }

    /// Get a body by ID.
    #[must_use]
    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    /// Get a mutable reference to a body by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    /// Remove a body.
    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        self.bodies.remove(&id)
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if there are no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over all bodies mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&BodyId, &mut RigidBody)> {
        self.bodies.iter_mut()
    }
}

// ============================================================================
// Tracked objects
// ============================================================================

/// Persisted attachment of an object to a toggleable container.
///
/// Recorded when the object is placed; keeps the `in` relation alive while
/// the container is closed and carries the object along with a sliding drawer.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// The container.
    pub container: ObjectId,
    /// Object pose relative to the container body.
    pub relative: Pose,
}

/// One movable item on the desk.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    /// Internal key.
    pub id: ObjectId,
    /// Category.
    pub kind: ObjectKind,
    /// Color variant, driving the display name.
    pub color: Option<Color>,
    /// Asset name (`bowl`, `short_cabinet`) or drawer short name (`drawer_low`).
    pub label: Option<String>,
    /// Rigid-body handle.
    pub body: BodyId,
    /// Full upright size.
    pub size: Vector3<f64>,
    /// Quarter-turn currently applied, if the object was laid down.
    pub reorient: Option<Reorient>,
    /// Container behavior, fixed at creation.
    pub container: Option<ContainerKind>,
    /// Held by the manipulator.
    pub in_hand: bool,
    /// Being moved kinematically.
    pub animating: bool,
    /// Attachment recorded at placement time.
    pub binding: Option<Binding>,
}

impl TrackedObject {
    /// Size after the current reorientation.
    #[must_use]
    pub fn effective_size(&self) -> Vector3<f64> {
        oriented_size(&self.size, self.reorient)
    }
}

/// Motorized hinge of a lidded box.
#[derive(Debug, Clone, PartialEq)]
pub struct Lid {
    /// Lid rigid body.
    pub body: BodyId,
    /// Current angle from closed (radians).
    pub angle: f64,
    /// Motor target angle.
    pub target: f64,
    /// Open state memoized by the last scene analysis.
    pub is_open: bool,
}

impl Lid {
    /// Returns `true` if the motor has reached its target.
    #[must_use]
    pub fn at_rest(&self) -> bool {
        (self.angle - self.target).abs() < 1e-9
    }
}

/// Timed linear motion of a drawer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideMotion {
    /// Offset at the start.
    pub from: f64,
    /// Offset at the end.
    pub to: f64,
    /// Time spent so far.
    pub elapsed: f64,
    /// Total duration.
    pub duration: f64,
}

/// A cabinet drawer's slide.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawerSlide {
    /// Owning cabinet.
    pub cabinet: ObjectId,
    /// Drawer center in the cabinet frame when closed.
    pub rest: Vector3<f64>,
    /// Slide direction in the cabinet frame (unit).
    pub axis: Vector3<f64>,
    /// Maximum slide distance.
    pub travel: f64,
    /// Current slide distance.
    pub offset: f64,
    /// In-flight motion.
    pub motion: Option<SlideMotion>,
}

impl DrawerSlide {
    /// Returns `true` if the drawer is out past `fraction` of its travel.
    #[must_use]
    pub fn is_open(&self, fraction: f64) -> bool {
        self.offset > self.travel * fraction
    }

    /// Drawer pose in the cabinet frame.
    #[must_use]
    pub fn local_pose(&self) -> Pose {
        Pose::from_position(Point3::from(self.rest + self.axis * self.offset))
    }
}

// ============================================================================
// Spawning
// ============================================================================

/// Where a new object appears.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Site {
    /// Resting on the tabletop at planar `(x, z)`.
    Table {
        /// World X.
        x: f64,
        /// World Z.
        z: f64,
    },
    /// Body center at an explicit world position.
    At {
        /// Center position.
        position: Point3<f64>,
    },
    /// On the floor of a container, at local planar offset `(x, z)`.
    Inside {
        /// Container key.
        container: ObjectId,
        /// Local X offset.
        x: f64,
        /// Local Z offset.
        z: f64,
    },
    /// On the top face of a support, at local planar offset `(x, z)`.
    OnTop {
        /// Support key.
        support: ObjectId,
        /// Local X offset.
        x: f64,
        /// Local Z offset.
        z: f64,
    },
}

/// A drawer attached to a spawned cabinet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawerSpec {
    /// Short name (`drawer_low`).
    pub name: String,
    /// Closed center in the cabinet frame.
    pub rest: Vector3<f64>,
    /// Full size.
    pub size: Vector3<f64>,
    /// Slide direction in the cabinet frame.
    pub axis: Vector3<f64>,
    /// Slide distance when open.
    pub travel: f64,
    /// Spawn open.
    #[cfg_attr(feature = "serde", serde(default))]
    pub open: bool,
}

impl DrawerSpec {
    /// A standard drawer at local height `y`, sliding out along +Z.
    #[must_use]
    pub fn standard(name: impl Into<String>, y: f64) -> Self {
        Self {
            name: name.into(),
            rest: Vector3::new(0.0, y, 1.0),
            size: CABINET_DRAWER_SIZE,
            axis: Vector3::z(),
            travel: CABINET_DRAWER_TRAVEL,
            open: false,
        }
    }
}

/// Description of an object to create.
///
/// # Example
///
/// ```
/// use desk_core::{ObjectSpec, World};
/// use desk_types::{Color, ObjectKind, TableConfig};
///
/// let mut world = World::new(TableConfig::default());
/// let red_box = world
///     .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Red).on_table(-20.0, 0.0))
///     .unwrap();
/// let mug = world
///     .spawn(ObjectSpec::new(ObjectKind::Mug).with_color(Color::Red).inside(red_box.clone(), 2.0, 0.0))
///     .unwrap();
/// assert_eq!(mug.as_str(), "mug_0");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectSpec {
    /// Category.
    pub kind: ObjectKind,
    /// Color variant.
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Option<Color>,
    /// Asset name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    /// Where it appears.
    pub site: Site,
    /// Heading about +Y (ignored inside containers, which impose theirs).
    #[cfg_attr(feature = "serde", serde(default))]
    pub yaw: f64,
    /// Full size; defaults to the kind's size.
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: Option<Vector3<f64>>,
    /// Container behavior; defaults to the kind's inherent one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub container: Option<ContainerKind>,
    /// Spawn a lidded box open.
    #[cfg_attr(feature = "serde", serde(default))]
    pub open: bool,
    /// Drawers, for cabinets.
    #[cfg_attr(feature = "serde", serde(default))]
    pub drawers: Vec<DrawerSpec>,
}

impl ObjectSpec {
    /// Create a spec at the table center.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            color: None,
            label: None,
            site: Site::Table { x: 0.0, z: 0.0 },
            yaw: 0.0,
            size: None,
            container: None,
            open: false,
            drawers: Vec::new(),
        }
    }

    /// A loaded asset with the given name.
    #[must_use]
    pub fn asset(label: impl Into<String>, size: Vector3<f64>) -> Self {
        Self::new(ObjectKind::Asset)
            .with_label(label)
            .with_size(size)
    }

    /// A round vessel asset.
    #[must_use]
    pub fn vessel(kind: ContainerKind) -> Self {
        let (label, size) = match kind {
            ContainerKind::Plate => ("plate", Vector3::new(9.0, 1.2, 9.0)),
            _ => ("bowl", Vector3::new(8.0, 3.0, 8.0)),
        };
        Self::asset(label, size).with_container(kind)
    }

    /// The standard three-drawer short cabinet.
    #[must_use]
    pub fn short_cabinet() -> Self {
        let mut spec = Self::asset("short_cabinet", CABINET_SIZE);
        spec.drawers = vec![
            DrawerSpec::standard("drawer_low", -6.5),
            DrawerSpec::standard("drawer_middle", 0.0),
            DrawerSpec::standard("drawer_high", 6.5),
        ];
        spec
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the asset name.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, size: Vector3<f64>) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the container behavior.
    #[must_use]
    pub fn with_container(mut self, kind: ContainerKind) -> Self {
        self.container = Some(kind);
        self
    }

    /// Set the heading.
    #[must_use]
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    /// Spawn a lidded box open, or every drawer of a cabinet open.
    #[must_use]
    pub fn opened(mut self) -> Self {
        self.open = true;
        for d in &mut self.drawers {
            d.open = true;
        }
        self
    }

    /// Rest on the tabletop.
    #[must_use]
    pub fn on_table(mut self, x: f64, z: f64) -> Self {
        self.site = Site::Table { x, z };
        self
    }

    /// Place the body center at an explicit position.
    #[must_use]
    pub fn at(mut self, position: Point3<f64>) -> Self {
        self.site = Site::At { position };
        self
    }

    /// Rest on a container's floor.
    #[must_use]
    pub fn inside(mut self, container: ObjectId, x: f64, z: f64) -> Self {
        self.site = Site::Inside { container, x, z };
        self
    }

    /// Rest on a support's top face.
    #[must_use]
    pub fn on_top_of(mut self, support: ObjectId, x: f64, z: f64) -> Self {
        self.site = Site::OnTop { support, x, z };
        self
    }
}

// ============================================================================
// World
// ============================================================================

/// Read/write snapshot of everything on the desk.
#[derive(Debug, Clone)]
pub struct World {
    table: TableConfig,
    bodies: BodySet,
    objects: HashMap<ObjectId, TrackedObject>,
    order: Vec<ObjectId>,
    lids: HashMap<ObjectId, Lid>,
    drawers: HashMap<ObjectId, DrawerSlide>,
    counters: HashMap<ObjectKind, usize>,
    frozen: bool,
    freeze_token: u64,
    composition: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl World {
    /// Create an empty desk.
    #[must_use]
    pub fn new(table: TableConfig) -> Self {
        Self {
            table,
            bodies: BodySet::default(),
            objects: HashMap::new(),
            order: Vec::new(),
            lids: HashMap::new(),
            drawers: HashMap::new(),
            counters: HashMap::new(),
            frozen: false,
            freeze_token: 0,
            composition: 0,
        }
    }

    /// The tabletop.
    #[must_use]
    pub const fn table(&self) -> &TableConfig {
        &self.table
    }

    /// Counter bumped whenever objects are created or removed.
    #[must_use]
    pub const fn composition(&self) -> u64 {
        self.composition
    }

    /// Number of tracked objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.order.len()
    }

    /// Number of rigid bodies, lids included.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // ------------------------------------------------------------------
    // Creation and removal
    // ------------------------------------------------------------------

    fn next_key(&mut self, kind: ObjectKind) -> ObjectId {
        let n = self.counters.entry(kind).or_insert(0);
        let key = ObjectId::new(format!("{}_{n}", kind.key_prefix()));
        *n += 1;
        key
    }

    /// Create an object (and its lid or drawers) and return its key.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if the site references a missing
    /// container or support, or [`DeskError::DuplicateObject`] if two drawers
    /// share a name.
    pub fn spawn(&mut self, spec: ObjectSpec) -> crate::Result<ObjectId> {
        for (i, drawer) in spec.drawers.iter().enumerate() {
            if spec.drawers[..i].iter().any(|d| d.name == drawer.name) {
                return Err(DeskError::DuplicateObject(drawer.name.clone()));
            }
        }
        let size = spec.size.unwrap_or_else(|| spec.kind.default_size());
        let container = spec.container.or_else(|| spec.kind.inherent_container());

        let (pose, binding_target) = self.resolve_site(&spec.site, spec.yaw, &size)?;
        let id = self.next_key(spec.kind);
        let body = self.bodies.insert(RigidBody::at_rest(pose));

        let object = TrackedObject {
            id: id.clone(),
            kind: spec.kind,
            color: spec.color,
            label: spec.label,
            body,
            size,
            reorient: None,
            container,
            in_hand: false,
            animating: false,
            binding: None,
        };
        self.objects.insert(id.clone(), object);
        self.order.push(id.clone());

        if container == Some(ContainerKind::LiddedBox) {
            let angle = if spec.open { LID_OPEN_ANGLE } else { 0.0 };
            let lid_pose = lid_pose(&pose, &size, angle);
            let lid_body = self.bodies.insert(RigidBody::at_rest(lid_pose));
            self.lids.insert(
                id.clone(),
                Lid {
                    body: lid_body,
                    angle,
                    target: angle,
                    is_open: spec.open,
                },
            );
        }

        for drawer in spec.drawers {
            self.spawn_drawer(&id, &pose, drawer);
        }

        if let Some(container) = binding_target {
            self.bind(&id, &container)?;
        }

        self.composition += 1;
        debug!(object = %id, kind = %spec.kind, "spawned object");
        Ok(id)
    }

    fn spawn_drawer(&mut self, cabinet: &ObjectId, cabinet_pose: &Pose, spec: DrawerSpec) {
        let id = ObjectId::new(format!("{cabinet}/{}", spec.name));
        let slide = DrawerSlide {
            cabinet: cabinet.clone(),
            rest: spec.rest,
            axis: spec.axis.normalize(),
            travel: spec.travel,
            offset: if spec.open { spec.travel } else { 0.0 },
            motion: None,
        };
        let pose = cabinet_pose.compose(&slide.local_pose());
        let body = self.bodies.insert(RigidBody::at_rest(pose));
        self.objects.insert(
            id.clone(),
            TrackedObject {
                id: id.clone(),
                kind: ObjectKind::Drawer,
                color: None,
                label: Some(spec.name),
                body,
                size: spec.size,
                reorient: None,
                container: Some(ContainerKind::Drawer),
                in_hand: false,
                animating: false,
                binding: None,
            },
        );
        self.order.push(id.clone());
        self.drawers.insert(id, slide);
    }

    fn resolve_site(
        &self,
        site: &Site,
        yaw: f64,
        size: &Vector3<f64>,
    ) -> crate::Result<(Pose, Option<ObjectId>)> {
        let half_h = 0.5 * size.y;
        match site {
            Site::Table { x, z } => Ok((
                Pose::from_yaw(Point3::new(*x, self.table.top_y + half_h, *z), yaw),
                None,
            )),
            Site::At { position } => Ok((Pose::from_yaw(*position, yaw), None)),
            Site::Inside { container, x, z } => {
                let host = self.require(container)?;
                let frame = self.require_pose(container)?;
                let floor = host
                    .container
                    .map_or(-0.5 * host.size.y, |k| k.geometry(&host.size).floor_offset);
                let local = Point3::new(*x, floor + half_h, *z);
                let pose = Pose::from_position_rotation(
                    frame.transform_point(&local),
                    frame.rotation,
                );
                let bind = host
                    .container
                    .filter(|k| k.is_toggleable())
                    .map(|_| container.clone());
                Ok((pose, bind))
            }
            Site::OnTop { support, x, z } => {
                let host = self.require(support)?;
                let frame = self.require_pose(support)?;
                let local = Point3::new(*x, 0.5 * host.effective_size().y + half_h, *z);
                Ok((
                    Pose::from_position_rotation(frame.transform_point(&local), frame.rotation),
                    None,
                ))
            }
        }
    }

    /// Remove an object together with its lid, its drawers, and any bindings to it.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if the key is not tracked.
    pub fn remove(&mut self, id: &ObjectId) -> crate::Result<()> {
        let object = self
            .objects
            .remove(id)
            .ok_or_else(|| DeskError::UnknownObject(id.to_string()))?;
        self.bodies.remove(object.body);
        self.order.retain(|k| k != id);
        if let Some(lid) = self.lids.remove(id) {
            self.bodies.remove(lid.body);
        }
        self.drawers.remove(id);
        let drawers: Vec<ObjectId> = self
            .drawers
            .iter()
            .filter(|(_, d)| d.cabinet == *id)
            .map(|(k, _)| k.clone())
            .collect();
        for drawer in drawers {
            self.remove(&drawer)?;
        }
        for o in self.objects.values_mut() {
            if o.binding.as_ref().is_some_and(|b| b.container == *id) {
                o.binding = None;
            }
        }
        self.composition += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Get an object by key.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&TrackedObject> {
        self.objects.get(id)
    }

    /// Get a mutable reference to an object by key.
    #[must_use]
    pub fn object_mut(&mut self, id: &ObjectId) -> Option<&mut TrackedObject> {
        self.objects.get_mut(id)
    }

    fn require(&self, id: &ObjectId) -> crate::Result<&TrackedObject> {
        self.objects
            .get(id)
            .ok_or_else(|| DeskError::UnknownObject(id.to_string()))
    }

    fn require_pose(&self, id: &ObjectId) -> crate::Result<Pose> {
        self.pose_of(id)
            .ok_or_else(|| DeskError::UnknownObject(id.to_string()))
    }

    /// Iterate over objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = &TrackedObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Objects of one category, in creation order.
    pub fn objects_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &TrackedObject> {
        self.objects().filter(move |o| o.kind == kind)
    }

    /// Get a body by ID.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    /// Get a mutable reference to a body by ID.
    #[must_use]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    /// Current pose of an object's body.
    #[must_use]
    pub fn pose_of(&self, id: &ObjectId) -> Option<Pose> {
        let object = self.objects.get(id)?;
        self.bodies.get(object.body).map(|b| b.pose)
    }

    /// Write an object's pose, keeping its lid attached.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if the key is not tracked, or
    /// [`DeskError::UnknownBody`] if its body (or its lid's) is gone.
    pub fn set_pose(&mut self, id: &ObjectId, pose: Pose) -> crate::Result<()> {
        let object = self.require(id)?;
        let (body, size) = (object.body, object.size);
        self.bodies
            .get_mut(body)
            .ok_or(DeskError::UnknownBody(body.raw()))?
            .pose = pose;
        if let Some(lid) = self.lids.get(id) {
            let (lid_body, angle) = (lid.body, lid.angle);
            self.bodies
                .get_mut(lid_body)
                .ok_or(DeskError::UnknownBody(lid_body.raw()))?
                .pose = lid_pose(&pose, &size, angle);
        }
        Ok(())
    }

    /// Hinge of a lidded box.
    #[must_use]
    pub fn lid(&self, id: &ObjectId) -> Option<&Lid> {
        self.lids.get(id)
    }

    /// Slide of a drawer.
    #[must_use]
    pub fn drawer(&self, id: &ObjectId) -> Option<&DrawerSlide> {
        self.drawers.get(id)
    }

    /// Drawers of a cabinet, in creation order.
    #[must_use]
    pub fn drawers_of(&self, cabinet: &ObjectId) -> Vec<ObjectId> {
        self.order
            .iter()
            .filter(|id| self.drawers.get(*id).is_some_and(|d| d.cabinet == *cabinet))
            .cloned()
            .collect()
    }

    /// Returns `true` if the object hosts drawers.
    #[must_use]
    pub fn is_cabinet(&self, id: &ObjectId) -> bool {
        self.drawers.values().any(|d| d.cabinet == *id)
    }

    /// Open drawers stacked above `drawer` in the same cabinet, lowest first.
    #[must_use]
    pub fn open_drawers_above(&self, drawer: &ObjectId, fraction: f64) -> Vec<ObjectId> {
        let Some(slide) = self.drawers.get(drawer) else {
            return Vec::new();
        };
        let mut above: Vec<(f64, ObjectId)> = self
            .drawers
            .iter()
            .filter(|(k, d)| {
                *k != drawer
                    && d.cabinet == slide.cabinet
                    && d.rest.y > slide.rest.y
                    && d.is_open(fraction)
            })
            .map(|(k, d)| (d.rest.y, k.clone()))
            .collect();
        above.sort_by(|a, b| a.0.total_cmp(&b.0));
        above.into_iter().map(|(_, k)| k).collect()
    }

    /// Whether a container currently accepts placement.
    ///
    /// Lidded boxes read the memoized lid state; drawers read their slide.
    /// Open boxes and vessels are always open.
    #[must_use]
    pub fn is_open(&self, id: &ObjectId, drawer_fraction: f64) -> bool {
        if let Some(lid) = self.lids.get(id) {
            return lid.is_open;
        }
        if let Some(slide) = self.drawers.get(id) {
            return slide.is_open(drawer_fraction);
        }
        true
    }

    /// Recompute each lid's open flag from its hinge angle.
    pub fn refresh_lid_states(&mut self, threshold: f64) {
        for lid in self.lids.values_mut() {
            lid.is_open = lid.angle.abs() > threshold;
        }
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    /// Attach an object to a container at its current relative pose.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if either key is not tracked.
    pub fn bind(&mut self, object: &ObjectId, container: &ObjectId) -> crate::Result<()> {
        let host = self.require_pose(container)?;
        let pose = self.require_pose(object)?;
        let relative = host.relative(&pose);
        if let Some(o) = self.objects.get_mut(object) {
            o.binding = Some(Binding {
                container: container.clone(),
                relative,
            });
        }
        Ok(())
    }

    /// Drop an object's attachment.
    pub fn unbind(&mut self, object: &ObjectId) {
        if let Some(o) = self.objects.get_mut(object) {
            o.binding = None;
        }
    }

    // ------------------------------------------------------------------
    // Actuation
    // ------------------------------------------------------------------

    /// Drive a lid's hinge motor toward open or closed.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if the key has no lid.
    pub fn drive_lid(&mut self, id: &ObjectId, open: bool) -> crate::Result<()> {
        let lid = self
            .lids
            .get_mut(id)
            .ok_or_else(|| DeskError::UnknownObject(id.to_string()))?;
        lid.target = if open { LID_OPEN_ANGLE } else { 0.0 };
        Ok(())
    }

    /// Start a timed slide of a drawer toward open or closed.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::UnknownObject`] if the key is not a drawer.
    pub fn drive_drawer(&mut self, id: &ObjectId, open: bool, duration: f64) -> crate::Result<()> {
        let slide = self
            .drawers
            .get_mut(id)
            .ok_or_else(|| DeskError::UnknownObject(id.to_string()))?;
        let to = if open { slide.travel } else { 0.0 };
        slide.motion = Some(SlideMotion {
            from: slide.offset,
            to,
            elapsed: 0.0,
            duration,
        });
        Ok(())
    }

    /// Returns `true` if no hinge or slide is in motion.
    #[must_use]
    pub fn actuators_idle(&self) -> bool {
        self.lids.values().all(Lid::at_rest) && self.drawers.values().all(|d| d.motion.is_none())
    }

    // ------------------------------------------------------------------
    // Freezing
    // ------------------------------------------------------------------

    /// Returns `true` while integration is globally suspended.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Suspend integration and return a token for the matching [`World::unfreeze`].
    pub fn freeze(&mut self) -> u64 {
        self.frozen = true;
        self.freeze_token += 1;
        self.freeze_token
    }

    /// Resume integration if `token` is the latest freeze. Returns whether it did.
    pub fn unfreeze(&mut self, token: u64) -> bool {
        if token != self.freeze_token {
            return false;
        }
        self.frozen = false;
        true
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Advance the physics stand-in by `dt` seconds.
    ///
    /// Does nothing while frozen. Otherwise moves hinge motors at
    /// `hinge_speed`, advances drawer slides (carrying bound contents), and
    /// integrates free bodies.
    pub fn step(&mut self, dt: f64, hinge_speed: f64) {
        if self.frozen {
            return;
        }

        let moving_lids: Vec<ObjectId> = self
            .lids
            .iter()
            .filter(|(_, l)| !l.at_rest())
            .map(|(k, _)| k.clone())
            .collect();
        for id in moving_lids {
            if let Some(lid) = self.lids.get_mut(&id) {
                let delta = lid.target - lid.angle;
                let stride = hinge_speed * dt;
                lid.angle = if delta.abs() <= stride {
                    lid.target
                } else {
                    lid.angle + stride.copysign(delta)
                };
            }
            if let Some(pose) = self.pose_of(&id) {
                // Re-seat the lid body at the new angle.
                if let Err(e) = self.set_pose(&id, pose) {
                    debug!(object = %id, error = %e, "lid re-seat skipped");
                }
            }
        }

        let moving_drawers: Vec<ObjectId> = self
            .drawers
            .iter()
            .filter(|(_, d)| d.motion.is_some())
            .map(|(k, _)| k.clone())
            .collect();
        for id in moving_drawers {
            if let Some(slide) = self.drawers.get_mut(&id) {
                if let Some(mut m) = slide.motion {
                    m.elapsed += dt;
                    let t = if m.duration > 0.0 {
                        (m.elapsed / m.duration).min(1.0)
                    } else {
                        1.0
                    };
                    slide.offset = m.from + (m.to - m.from) * crate::animator::ease_in_out_quad(t);
                    slide.motion = if t >= 1.0 {
                        slide.offset = m.to;
                        None
                    } else {
                        Some(m)
                    };
                }
            }
            self.sync_drawer(&id);
        }

        for (_, body) in self.bodies.iter_mut() {
            if body.frozen {
                continue;
            }
            body.pose.position += body.twist.linear * dt;
            if !body.rotation_locked && body.twist.angular.norm() > 0.0 {
                body.pose.rotation =
                    UnitQuaternion::from_scaled_axis(body.twist.angular * dt) * body.pose.rotation;
            }
        }
    }

    /// Re-seat a drawer body from its cabinet and carry bound contents along.
    pub fn sync_drawer(&mut self, id: &ObjectId) {
        let Some(slide) = self.drawers.get(id) else {
            return;
        };
        let Some(cabinet_pose) = self.pose_of(&slide.cabinet) else {
            return;
        };
        let pose = cabinet_pose.compose(&slide.local_pose());
        if let Err(e) = self.set_pose(id, pose) {
            debug!(drawer = %id, error = %e, "drawer sync skipped");
            return;
        }

        let carried: Vec<(ObjectId, Pose)> = self
            .objects
            .values()
            .filter_map(|o| {
                let b = o.binding.as_ref()?;
                (b.container == *id && !o.animating).then(|| (o.id.clone(), pose.compose(&b.relative)))
            })
            .collect();
        for (object, p) in carried {
            if let Err(e) = self.set_pose(&object, p) {
                debug!(object = %object, error = %e, "bound content sync skipped");
            }
        }
    }
}

/// Pose of a lid body hinged along the back top edge of its box.
#[must_use]
pub fn lid_pose(box_pose: &Pose, box_size: &Vector3<f64>, angle: f64) -> Pose {
    let hinge = Point3::new(0.0, 0.5 * box_size.y, -0.5 * box_size.z);
    let arm = Vector3::new(0.0, 0.5 * LID_THICKNESS, 0.5 * box_size.z);
    // Negative rotation about local X lifts the front edge.
    let swing = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -angle);
    let local = Pose::from_position_rotation(hinge + swing * arm, swing);
    box_pose.compose(&local)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spawn_keys_per_kind() {
        let mut world = World::default();
        let a = world.spawn(ObjectSpec::new(ObjectKind::Mug)).unwrap();
        let b = world.spawn(ObjectSpec::new(ObjectKind::Mug)).unwrap();
        let c = world.spawn(ObjectSpec::new(ObjectKind::Box)).unwrap();
        assert_eq!(a.as_str(), "mug_0");
        assert_eq!(b.as_str(), "mug_1");
        assert_eq!(c.as_str(), "box_0");
        assert_eq!(world.object_count(), 3);
    }

    #[test]
    fn test_table_site_rests_on_top() {
        let mut world = World::default();
        let id = world
            .spawn(ObjectSpec::new(ObjectKind::Box).on_table(5.0, -3.0))
            .unwrap();
        let pose = world.pose_of(&id).unwrap();
        assert_relative_eq!(pose.position, Point3::new(5.0, 3.0, -3.0));
    }

    #[test]
    fn test_inside_site_binds_toggleable() {
        let mut world = World::default();
        let lid_box = world
            .spawn(ObjectSpec::new(ObjectKind::LiddedBox).on_table(0.0, 0.0))
            .unwrap();
        let cube = world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(lid_box.clone(), 1.0, 0.0))
            .unwrap();
        let o = world.object(&cube).unwrap();
        assert_eq!(o.binding.as_ref().unwrap().container, lid_box);
        // Floor at 0.5 above the table, cube half-height 1.
        assert_relative_eq!(world.pose_of(&cube).unwrap().position.y, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cabinet_spawns_drawers() {
        let mut world = World::default();
        let cab = world
            .spawn(ObjectSpec::short_cabinet().on_table(30.0, 0.0))
            .unwrap();
        let drawers = world.drawers_of(&cab);
        assert_eq!(drawers.len(), 3);
        assert_eq!(drawers[0].as_str(), "asset_0/drawer_low");
        assert!(world.is_cabinet(&cab));

        let low = world.pose_of(&drawers[0]).unwrap();
        assert_relative_eq!(low.position.y, 10.5 - 6.5, epsilon = 1e-12);
    }

    #[test]
    fn test_upper_drawer_detection() {
        let mut world = World::default();
        let cab = world
            .spawn(ObjectSpec::short_cabinet().on_table(30.0, 0.0))
            .unwrap();
        let drawers = world.drawers_of(&cab);
        world.drive_drawer(&drawers[2], true, 0.0).unwrap();
        world.step(0.01, 3.0);

        assert!(world.is_open(&drawers[2], 0.5));
        assert_eq!(world.open_drawers_above(&drawers[0], 0.5), vec![drawers[2].clone()]);
        assert!(world.open_drawers_above(&drawers[2], 0.5).is_empty());
    }

    #[test]
    fn test_drawer_slide_carries_bound_contents() {
        let mut world = World::default();
        let cab = world
            .spawn(ObjectSpec::short_cabinet().opened().on_table(30.0, 0.0))
            .unwrap();
        let low = world.drawers_of(&cab)[0].clone();
        let cube = world
            .spawn(ObjectSpec::new(ObjectKind::Cube).inside(low.clone(), 0.0, 0.0))
            .unwrap();
        let before = world.pose_of(&cube).unwrap().position;

        world.drive_drawer(&low, false, 0.6).unwrap();
        for _ in 0..60 {
            world.step(1.0 / 60.0, 3.0);
        }
        assert!(world.actuators_idle());
        let after = world.pose_of(&cube).unwrap().position;
        assert_relative_eq!(before.z - after.z, CABINET_DRAWER_TRAVEL, epsilon = 1e-9);
    }

    #[test]
    fn test_hinge_motor_and_freeze() {
        let mut world = World::default();
        let id = world
            .spawn(ObjectSpec::new(ObjectKind::LiddedBox).on_table(0.0, 0.0))
            .unwrap();
        world.drive_lid(&id, true).unwrap();

        let token = world.freeze();
        world.step(0.1, 3.0);
        assert_eq!(world.lid(&id).unwrap().angle, 0.0);

        assert!(!world.unfreeze(token + 1));
        assert!(world.unfreeze(token));
        world.step(0.1, 3.0);
        assert_relative_eq!(world.lid(&id).unwrap().angle, 0.3, epsilon = 1e-12);

        world.refresh_lid_states(30_f64.to_radians());
        assert!(!world.is_open(&id, 0.5));
        for _ in 0..10 {
            world.step(0.1, 3.0);
        }
        world.refresh_lid_states(30_f64.to_radians());
        assert!(world.is_open(&id, 0.5));
        assert!(world.actuators_idle());
    }

    #[test]
    fn test_lid_pose_closed_sits_on_rim() {
        let pose = lid_pose(&Pose::identity(), &Vector3::new(10.0, 6.0, 10.0), 0.0);
        assert_relative_eq!(pose.position, Point3::new(0.0, 3.25, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_remove_cabinet_removes_drawers() {
        let mut world = World::default();
        let cab = world.spawn(ObjectSpec::short_cabinet()).unwrap();
        assert_eq!(world.object_count(), 4);
        world.remove(&cab).unwrap();
        assert_eq!(world.object_count(), 0);
        assert_eq!(world.body_count(), 0);
        assert!(world.remove(&cab).is_err());
    }

    #[test]
    fn test_duplicate_drawer_names_rejected() {
        let mut world = World::default();
        let mut spec = ObjectSpec::short_cabinet();
        spec.drawers.push(DrawerSpec::standard("drawer_low", 9.0));
        assert_eq!(
            world.spawn(spec),
            Err(DeskError::DuplicateObject("drawer_low".into()))
        );
        assert_eq!(world.object_count(), 0);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_set_pose_moves_lid_and_reports_lost_body() {
        let mut world = World::default();
        let id = world.spawn(ObjectSpec::new(ObjectKind::LiddedBox)).unwrap();
        assert_eq!(world.body_count(), 2);

        let target = Pose::from_position(Point3::new(10.0, 3.0, 0.0));
        world.set_pose(&id, target).unwrap();
        let lid_body = world.lid(&id).unwrap().body;
        let size = world.object(&id).unwrap().size;
        assert_relative_eq!(
            world.body(lid_body).unwrap().pose.position,
            lid_pose(&target, &size, 0.0).position,
            epsilon = 1e-12
        );

        let body = world.object(&id).unwrap().body;
        world.bodies.remove(body);
        assert_eq!(
            world.set_pose(&id, Pose::identity()),
            Err(DeskError::UnknownBody(body.raw()))
        );
    }
}
