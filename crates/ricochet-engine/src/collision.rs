//! Circle-circle collision detection, response and pair-state callbacks.
//!
//! Each collision pass:
//!
//! 1. drops tracked pairs whose entities no longer exist,
//! 2. generates candidate pairs (full pairwise scan or the spatial grid),
//!    keeping only layer-compatible ones,
//! 3. runs the narrow phase (circles only, closed boundary),
//! 4. for every overlapping pair resolves the contact (non-trigger bodies
//!    that both carry [`Physics`]) and dispatches `Start`+`Stay` or `Stay`,
//! 5. dispatches `End` for pairs that stopped overlapping.
//!
//! Both broad phases report the same pairs; the grid only prunes candidates.
//!
//! Callbacks come from two independent sources and both fire: tag-pair
//! callbacks registered in the [`CollisionCallbacks`] resource, and phase
//! hooks stored on each entity's [`Collider`].
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use ricochet_engine::collision::{collision_pass, CollisionCallbacks, CollisionPhase, CollisionSettings};
//! use ricochet_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let starts = Rc::new(Cell::new(0));
//! let seen = Rc::clone(&starts);
//! let mut callbacks = CollisionCallbacks::new();
//! callbacks.on("ball", "brick", move |_world, _ball, _brick, phase| {
//!     if phase == CollisionPhase::Start {
//!         seen.set(seen.get() + 1);
//!     }
//! });
//! world.insert_resource(callbacks);
//!
//! let ball = world.spawn(EntityTemplate::new()
//!     .with(Transform::new(0.0, 0.0))
//!     .with(Collider::circle(5.0))
//!     .with_tag("ball"));
//! let brick = world.spawn(EntityTemplate::new()
//!     .with(Transform::new(8.0, 0.0))
//!     .with(Collider::circle(5.0))
//!     .with_tag("brick"));
//!
//! collision_pass(&mut world, &CollisionSettings::default());
//! assert_eq!(starts.get(), 1);
//! # let _ = (ball, brick);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use ricochet_ecs::prelude::*;

use crate::spatial::SpatialGrid;

/// Name under which the collision system is registered.
pub const COLLISION_SYSTEM_NAME: &str = "collision";

/// Name of the destroy listener that drops dead entities from the pair map
/// and the spatial grid.
pub const PAIR_PURGE_LISTENER: &str = "collision_purge";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// How candidate pairs are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhase {
    /// Every collider against every other collider.
    Pairwise,
    /// Only colliders sharing a spatial grid cell.
    #[default]
    Grid,
}

/// Parameters of one collision pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSettings {
    pub broad_phase: BroadPhase,
    /// Share of the overlap depth removed per pass, in `[0, 1]`.
    pub correction_percent: f64,
    /// Grid extent and cell size, used when no [`SpatialGrid`] resource
    /// exists yet.
    pub width: f64,
    pub height: f64,
    pub cell_size: f64,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            broad_phase: BroadPhase::Grid,
            correction_percent: 0.5,
            width: 800.0,
            height: 600.0,
            cell_size: 64.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Pair keys
// ---------------------------------------------------------------------------

/// Transition reported to collision callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionPhase {
    Start,
    Stay,
    End,
}

/// Order-independent entity pair, smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: EntityId,
    high: EntityId,
}

impl PairKey {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn first(&self) -> EntityId {
        self.low
    }

    pub fn second(&self) -> EntityId {
        self.high
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.low == entity || self.high == entity
    }

    /// The partner of `entity`, or `None` if it is not in the pair.
    pub fn other(&self, entity: EntityId) -> Option<EntityId> {
        if entity == self.low {
            Some(self.high)
        } else if entity == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Order-independent pair of tag strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagPair {
    low: String,
    high: String,
}

impl TagPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                low: a.to_owned(),
                high: b.to_owned(),
            }
        } else {
            Self {
                low: b.to_owned(),
                high: a.to_owned(),
            }
        }
    }

    pub fn tags(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }
}

// ---------------------------------------------------------------------------
// CollisionCallbacks
// ---------------------------------------------------------------------------

/// Callback invoked with `(world, entity_for_first_tag, entity_for_second_tag, phase)`.
pub type CollisionCallback = Rc<dyn Fn(&mut World, EntityId, EntityId, CollisionPhase)>;

#[derive(Clone)]
struct TagCallback {
    first_tag: String,
    callback: CollisionCallback,
}

/// Tag-pair keyed collision callbacks. Lives in the world as a resource.
#[derive(Clone, Default)]
pub struct CollisionCallbacks {
    by_pair: BTreeMap<TagPair, Vec<TagCallback>>,
}

impl CollisionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for collisions between an entity tagged
    /// `first_tag` and one tagged `second_tag`. The callback receives the
    /// entities in that order. Several callbacks may share a tag pair; they
    /// run in registration order.
    ///
    /// While callbacks run, the [`CollisionPairs`] resource still holds the
    /// pairs of the previous pass minus any destroyed entity. It takes this
    /// pass's pairs once every callback has fired.
    pub fn on(
        &mut self,
        first_tag: &str,
        second_tag: &str,
        callback: impl Fn(&mut World, EntityId, EntityId, CollisionPhase) + 'static,
    ) {
        self.by_pair
            .entry(TagPair::new(first_tag, second_tag))
            .or_default()
            .push(TagCallback {
                first_tag: first_tag.to_owned(),
                callback: Rc::new(callback),
            });
    }

    /// Drop every callback registered for the tag pair, in either order.
    pub fn remove(&mut self, tag_a: &str, tag_b: &str) -> bool {
        self.by_pair.remove(&TagPair::new(tag_a, tag_b)).is_some()
    }

    pub fn contains(&self, tag_a: &str, tag_b: &str) -> bool {
        self.by_pair.contains_key(&TagPair::new(tag_a, tag_b))
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.by_pair.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_pair.clear();
    }
}

impl fmt::Debug for CollisionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_pair.iter().map(|(k, v)| (k.tags(), v.len())))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CollisionPairs / CollisionStats
// ---------------------------------------------------------------------------

/// Pairs overlapping at the end of the last pass. Absence means not
/// colliding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionPairs {
    active: BTreeSet<PairKey>,
    /// Pairs dropped by [`forget`](Self::forget) since the last pass.
    forgotten: usize,
}

impl CollisionPairs {
    pub fn is_colliding(&self, a: EntityId, b: EntityId) -> bool {
        self.active.contains(&PairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active pairs in key order.
    pub fn pairs(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.active.iter().copied()
    }

    /// Every entity currently overlapping `entity`.
    pub fn partners_of(&self, entity: EntityId) -> Vec<EntityId> {
        self.active.iter().filter_map(|p| p.other(entity)).collect()
    }

    /// Drop every pair involving `entity`. Returns how many were dropped.
    pub fn forget(&mut self, entity: EntityId) -> usize {
        let before = self.active.len();
        self.active.retain(|p| !p.contains(entity));
        let dropped = before - self.active.len();
        self.forgotten += dropped;
        dropped
    }

    /// Drop pairs involving entities that no longer exist. Returns how many
    /// were dropped.
    pub fn purge_dead(&mut self, world: &World) -> usize {
        let before = self.active.len();
        self.active
            .retain(|p| world.is_alive(p.first()) && world.is_alive(p.second()));
        before - self.active.len()
    }
}

/// Counters from the last pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Layer-compatible pairs produced by the broad phase.
    pub candidates: usize,
    /// Pairs reported overlapping by the narrow phase.
    pub colliding: usize,
    pub started: usize,
    pub ended: usize,
    /// Pairs dropped since the previous pass because an entity was
    /// destroyed.
    pub purged: usize,
}

// ---------------------------------------------------------------------------
// Narrow phase
// ---------------------------------------------------------------------------

/// Whether two circles overlap. Touching circles count.
pub fn circles_overlap(ax: f64, ay: f64, ar: f64, bx: f64, by: f64, br: f64) -> bool {
    let dx = bx - ax;
    let dy = by - ay;
    let reach = ar + br;
    dx * dx + dy * dy <= reach * reach
}

/// World-space centre of an entity's collider.
pub fn collider_center(world: &World, entity: EntityId) -> Option<(f64, f64)> {
    let t = world.get::<Transform>(entity)?;
    let c = world.get::<Collider>(entity)?;
    Some((t.x + c.offset_x, t.y + c.offset_y))
}

/// Narrow-phase test between two entities, ignoring layers. `false` if either
/// lacks a `Transform` or a circular `Collider`.
pub fn check_collision(world: &World, a: EntityId, b: EntityId) -> bool {
    let (Some(ra), Some(rb)) = (
        world.get::<Collider>(a).and_then(Collider::radius),
        world.get::<Collider>(b).and_then(Collider::radius),
    ) else {
        return false;
    };
    let (Some((ax, ay)), Some((bx, by))) = (collider_center(world, a), collider_center(world, b))
    else {
        return false;
    };
    circles_overlap(ax, ay, ra, bx, by, rb)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Contact between two overlapping circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first body to the second.
    pub normal_x: f64,
    pub normal_y: f64,
    /// Overlap depth along the normal.
    pub depth: f64,
}

impl Contact {
    /// Contact for two circles, or `None` if they do not overlap or their
    /// centres coincide (no usable normal).
    pub fn between(ax: f64, ay: f64, ar: f64, bx: f64, by: f64, br: f64) -> Option<Self> {
        let dx = bx - ax;
        let dy = by - ay;
        let distance = dx.hypot(dy);
        if distance == 0.0 || distance > ar + br {
            return None;
        }
        Some(Self {
            normal_x: dx / distance,
            normal_y: dy / distance,
            depth: ar + br - distance,
        })
    }
}

/// Combined restitution of two bodies: the weaker bounce wins.
pub fn pair_restitution(a: &Physics, b: &Physics) -> f64 {
    a.restitution().min(b.restitution())
}

/// Exchange an impulse along the contact normal. Does nothing if the bodies
/// are already separating.
pub fn apply_impulse(a: &mut Physics, b: &mut Physics, contact: &Contact) {
    let rel_normal =
        (b.vx - a.vx) * contact.normal_x + (b.vy - a.vy) * contact.normal_y;
    if rel_normal > 0.0 {
        return;
    }
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }
    let restitution = pair_restitution(a, b);
    let j = -(1.0 + restitution) * rel_normal / inv_sum;
    a.vx -= j * inv_a * contact.normal_x;
    a.vy -= j * inv_a * contact.normal_y;
    b.vx += j * inv_b * contact.normal_x;
    b.vy += j * inv_b * contact.normal_y;
}

/// Push the bodies apart by `percent` of the overlap, split inversely to
/// mass.
pub fn correct_positions(
    ta: &mut Transform,
    tb: &mut Transform,
    inv_mass_a: f64,
    inv_mass_b: f64,
    contact: &Contact,
    percent: f64,
) {
    let inv_sum = inv_mass_a + inv_mass_b;
    if inv_sum <= 0.0 {
        return;
    }
    let magnitude = contact.depth * percent / inv_sum;
    ta.x -= contact.normal_x * magnitude * inv_mass_a;
    ta.y -= contact.normal_y * magnitude * inv_mass_a;
    tb.x += contact.normal_x * magnitude * inv_mass_b;
    tb.y += contact.normal_y * magnitude * inv_mass_b;
}

/// Full physical response for one pair. Skipped for triggers, for pairs
/// where either side has no `Physics`, and for coincident centres.
fn resolve_pair(world: &mut World, a: EntityId, b: EntityId, correction_percent: f64) {
    let (Some(ca), Some(cb)) = (world.get::<Collider>(a), world.get::<Collider>(b)) else {
        return;
    };
    if ca.trigger || cb.trigger {
        return;
    }
    let (Some(ra), Some(rb)) = (ca.radius(), cb.radius()) else {
        return;
    };
    let (offset_a, offset_b) = ((ca.offset_x, ca.offset_y), (cb.offset_x, cb.offset_y));
    let (Some(mut pa), Some(mut pb)) = (
        world.get::<Physics>(a).cloned(),
        world.get::<Physics>(b).cloned(),
    ) else {
        return;
    };
    let (Some(mut ta), Some(mut tb)) = (
        world.get::<Transform>(a).cloned(),
        world.get::<Transform>(b).cloned(),
    ) else {
        return;
    };
    let Some(contact) = Contact::between(
        ta.x + offset_a.0,
        ta.y + offset_a.1,
        ra,
        tb.x + offset_b.0,
        tb.y + offset_b.1,
        rb,
    ) else {
        return;
    };

    apply_impulse(&mut pa, &mut pb, &contact);
    correct_positions(
        &mut ta,
        &mut tb,
        pa.inverse_mass(),
        pb.inverse_mass(),
        &contact,
        correction_percent,
    );

    write_back(world, a, ta, pa);
    write_back(world, b, tb, pb);
}

fn write_back(world: &mut World, entity: EntityId, transform: Transform, physics: Physics) {
    if let Some(slot) = world.get_mut::<Transform>(entity) {
        *slot = transform;
    }
    if let Some(slot) = world.get_mut::<Physics>(entity) {
        *slot = physics;
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Fire every tag-pair callback and collider hook for one pair and phase.
fn dispatch(world: &mut World, a: EntityId, b: EntityId, phase: CollisionPhase) {
    trace!(a = ?a, b = ?b, phase = ?phase, "collision transition");

    let hook_a = collider_hook(world, a, phase);
    let hook_b = collider_hook(world, b, phase);

    for (first, second, callback) in tag_callbacks(world, a, b) {
        callback(world, first, second, phase);
    }
    if let Some(hook) = hook_a {
        hook(world, a, b);
    }
    if let Some(hook) = hook_b {
        hook(world, b, a);
    }
}

fn collider_hook(world: &World, entity: EntityId, phase: CollisionPhase) -> Option<ColliderHook> {
    let hooks = &world.get::<Collider>(entity)?.hooks;
    match phase {
        CollisionPhase::Start => hooks.on_start.clone(),
        CollisionPhase::Stay => hooks.on_stay.clone(),
        CollisionPhase::End => hooks.on_end.clone(),
    }
}

/// Resolve the tag cross product of `a` and `b` into callbacks with their
/// entity arguments ordered to match the registered tag order. Each tag pair
/// key appears once.
fn tag_callbacks(
    world: &World,
    a: EntityId,
    b: EntityId,
) -> Vec<(EntityId, EntityId, CollisionCallback)> {
    let Some(registry) = world.resource::<CollisionCallbacks>() else {
        return Vec::new();
    };
    if registry.is_empty() {
        return Vec::new();
    }
    let tags_a = world.tags_of(a);
    let tags_b = world.tags_of(b);

    let mut keys = BTreeSet::new();
    for ta in &tags_a {
        for tb in &tags_b {
            keys.insert(TagPair::new(ta, tb));
        }
    }

    let mut out = Vec::new();
    for key in keys {
        let Some(entries) = registry.by_pair.get(&key) else {
            continue;
        };
        for entry in entries {
            let second_tag = if entry.first_tag == key.low {
                &key.high
            } else {
                &key.low
            };
            let a_first = tags_a.contains(&entry.first_tag) && tags_b.contains(second_tag);
            let (first, second) = if a_first { (a, b) } else { (b, a) };
            out.push((first, second, Rc::clone(&entry.callback)));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

struct Body {
    entity: EntityId,
    x: f64,
    y: f64,
    radius: Option<f64>,
    bounding: f64,
    collider: Collider,
}

fn gather_bodies(world: &World, entities: &[EntityId]) -> Vec<Body> {
    entities
        .iter()
        .filter_map(|&entity| {
            let t = world.get::<Transform>(entity)?;
            let c = world.get::<Collider>(entity)?;
            Some(Body {
                entity,
                x: t.x + c.offset_x,
                y: t.y + c.offset_y,
                radius: c.radius(),
                bounding: c.bounding_radius(),
                collider: c.clone(),
            })
        })
        .collect()
}

/// Layer-compatible candidate pairs as body indices, `i < j` by entity id.
fn candidates(
    world: &mut World,
    bodies: &[Body],
    settings: &CollisionSettings,
) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    match settings.broad_phase {
        BroadPhase::Pairwise => {
            for i in 0..bodies.len() {
                for j in (i + 1)..bodies.len() {
                    if bodies[i].collider.layers_compatible(&bodies[j].collider) {
                        out.push((i, j));
                    }
                }
            }
        }
        BroadPhase::Grid => {
            let mut grid = world
                .remove_resource::<SpatialGrid>()
                .unwrap_or_else(|| {
                    SpatialGrid::new(settings.width, settings.height, settings.cell_size)
                });
            grid.clear();
            let mut index_of = BTreeMap::new();
            for (i, body) in bodies.iter().enumerate() {
                grid.insert(body.entity, body.x, body.y, body.bounding);
                index_of.insert(body.entity, i);
            }
            for (a, b) in grid.candidate_pairs() {
                let (Some(&i), Some(&j)) = (index_of.get(&a), index_of.get(&b)) else {
                    continue;
                };
                if bodies[i].collider.layers_compatible(&bodies[j].collider) {
                    out.push((i.min(j), i.max(j)));
                }
            }
            world.insert_resource(grid);
        }
    }
    out
}

/// Register the destroy listener that removes a destroyed entity from the
/// [`CollisionPairs`] and [`SpatialGrid`] resources. Idempotent.
pub fn install_destroy_purge(world: &mut World) {
    if world.has_destroy_listener(PAIR_PURGE_LISTENER) {
        return;
    }
    world.on_destroy(PAIR_PURGE_LISTENER, |world, entity| {
        if let Some(pairs) = world.resource_mut::<CollisionPairs>() {
            pairs.forget(entity);
        }
        if let Some(grid) = world.resource_mut::<SpatialGrid>() {
            grid.remove(entity);
        }
    });
}

/// Detect, resolve and dispatch for `entities`. Entities without a
/// `Transform` and `Collider` are ignored.
pub fn run_pass(world: &mut World, entities: &[EntityId], settings: &CollisionSettings) -> CollisionStats {
    install_destroy_purge(world);
    let mut stats = CollisionStats::default();
    let mut pairs = world.remove_resource::<CollisionPairs>().unwrap_or_default();
    stats.purged = std::mem::take(&mut pairs.forgotten) + pairs.purge_dead(world);
    let previous = pairs.active.clone();
    world.insert_resource(pairs);

    let bodies = gather_bodies(world, entities);
    let candidate_pairs = candidates(world, &bodies, settings);
    stats.candidates = candidate_pairs.len();

    let mut overlapping = BTreeSet::new();
    for (i, j) in candidate_pairs {
        let (a, b) = (&bodies[i], &bodies[j]);
        let (Some(ra), Some(rb)) = (a.radius, b.radius) else {
            continue;
        };
        if circles_overlap(a.x, a.y, ra, b.x, b.y, rb) {
            overlapping.insert(PairKey::new(a.entity, b.entity));
        }
    }
    stats.colliding = overlapping.len();

    let mut current = BTreeSet::new();
    for key in &overlapping {
        let (a, b) = (key.first(), key.second());
        if !world.is_alive(a) || !world.is_alive(b) {
            continue;
        }
        resolve_pair(world, a, b, settings.correction_percent);
        if previous.contains(key) {
            dispatch(world, a, b, CollisionPhase::Stay);
        } else {
            stats.started += 1;
            dispatch(world, a, b, CollisionPhase::Start);
            if world.is_alive(a) && world.is_alive(b) {
                dispatch(world, a, b, CollisionPhase::Stay);
            }
        }
        current.insert(*key);
    }

    for key in previous.difference(&overlapping) {
        let (a, b) = (key.first(), key.second());
        if world.is_alive(a) && world.is_alive(b) {
            stats.ended += 1;
            dispatch(world, a, b, CollisionPhase::End);
        }
    }

    current.retain(|p: &PairKey| world.is_alive(p.first()) && world.is_alive(p.second()));
    // callbacks may have replaced or removed the resource
    let mut pairs = world.remove_resource::<CollisionPairs>().unwrap_or_default();
    pairs.active = current;
    world.insert_resource(pairs);
    world.insert_resource(stats);
    stats
}

/// One collision pass over every `Transform + Collider` entity.
pub fn collision_pass(world: &mut World, settings: &CollisionSettings) -> CollisionStats {
    let entities = world.query(&[ComponentKind::Transform, ComponentKind::Collider]);
    run_pass(world, &entities, settings)
}

// ---------------------------------------------------------------------------
// CollisionSystem
// ---------------------------------------------------------------------------

/// Runs [`run_pass`] once per frame.
#[derive(Debug, Clone)]
pub struct CollisionSystem {
    priority: i32,
    settings: CollisionSettings,
}

impl CollisionSystem {
    pub fn new(priority: i32, settings: CollisionSettings) -> Self {
        Self { priority, settings }
    }

    pub fn settings(&self) -> &CollisionSettings {
        &self.settings
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new(300, CollisionSettings::default())
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &str {
        COLLISION_SYSTEM_NAME
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn requires(&self) -> &[ComponentKind] {
        &[ComponentKind::Transform, ComponentKind::Collider]
    }

    fn on_attach(&mut self, world: &mut World) {
        install_destroy_purge(world);
        if !world.has_resource::<CollisionPairs>() {
            world.insert_resource(CollisionPairs::default());
        }
        if !world.has_resource::<CollisionCallbacks>() {
            world.insert_resource(CollisionCallbacks::new());
        }
    }

    fn update(&mut self, world: &mut World, entities: &[EntityId], _dt: f64) {
        run_pass(world, entities, &self.settings);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
