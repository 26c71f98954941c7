//! The [`World`] is the top-level container for the ECS. It owns the entity
//! allocator, the component arenas, the reverse indices, world resources, the
//! system schedule and the command queue.
//!
//! Every structural mutation (attach, detach, destroy, tag changes) goes
//! through one helper that updates the forward map and the reverse index
//! together, so a query never observes the two out of sync.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::command::{apply_batch, ApplyReport, CommandQueue, CommandSender, EntityTemplate};
use crate::component::{Component, ComponentData, ComponentKind, ComponentStore};
use crate::components::{Collider, Lifetime, Physics, Renderer, ScriptedBehavior, Transform};
use crate::entity::{EntityAllocator, EntityId};
use crate::system::{Schedule, System, SystemId};

// ---------------------------------------------------------------------------
// UpdateReport
// ---------------------------------------------------------------------------

/// Wall time spent in one system during a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemTiming {
    pub name: String,
    pub entities: usize,
    pub elapsed: Duration,
}

/// What happened during one [`World::update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    /// One entry per system that ran, in execution order.
    pub systems: Vec<SystemTiming>,
    /// Result of draining the command queue at the end of the frame.
    pub commands: ApplyReport,
    /// Set when the call was refused because the world was already updating.
    pub refused: bool,
}

/// Called with the id of every destroyed entity, after the id is retired.
pub type DestroyListener = Rc<dyn Fn(&mut World, EntityId)>;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Entities, their components and tags, resources and systems.
pub struct World {
    entities: EntityAllocator,
    store: ComponentStore,
    component_index: HashMap<ComponentKind, BTreeSet<EntityId>>,
    tag_index: HashMap<String, BTreeSet<EntityId>>,
    entity_tags: HashMap<EntityId, BTreeSet<String>>,
    resources: HashMap<TypeId, Box<dyn Any>>,
    destroy_listeners: BTreeMap<String, DestroyListener>,
    schedule: Schedule,
    disabled: HashSet<SystemId>,
    /// Ids of the systems taken out of the schedule for the running pass.
    in_pass: Vec<SystemId>,
    pending_removals: Vec<SystemId>,
    updating: bool,
    commands: CommandQueue,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            store: ComponentStore::new(),
            component_index: HashMap::new(),
            tag_index: HashMap::new(),
            entity_tags: HashMap::new(),
            resources: HashMap::new(),
            destroy_listeners: BTreeMap::new(),
            schedule: Schedule::default(),
            disabled: HashSet::new(),
            in_pass: Vec::new(),
            pending_removals: Vec::new(),
            updating: false,
            commands: CommandQueue::new(),
        }
    }

    // -- entities -----------------------------------------------------------

    /// Allocate a fresh entity with no components and no tags.
    pub fn create_entity(&mut self) -> EntityId {
        let entity = self.entities.allocate();
        trace!(entity = ?entity, "entity created");
        entity
    }

    /// Create an entity and attach everything in `template`.
    pub fn spawn(&mut self, template: EntityTemplate) -> EntityId {
        let entity = self.create_entity();
        for component in template.components {
            self.attach_component(entity, component);
        }
        for tag in &template.tags {
            self.add_tag(entity, tag);
        }
        entity
    }

    /// Destroy an entity: detach every component (firing detach hooks),
    /// drop every tag membership, retire the id for good, then notify the
    /// destroy listeners so indices outside the world drop it too.
    ///
    /// Returns `false` if the entity was already gone. Destroying twice is
    /// harmless and fires no hook the second time.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        for kind in ComponentKind::ALL {
            if self.store.contains(entity, kind) {
                self.detach_component(entity, kind);
            }
        }
        if let Some(tags) = self.entity_tags.remove(&entity) {
            for tag in tags {
                self.unindex_tag(entity, &tag);
            }
        }
        self.entities.retire(entity);
        trace!(entity = ?entity, "entity destroyed");

        let listeners: Vec<DestroyListener> = self.destroy_listeners.values().cloned().collect();
        for listener in listeners {
            listener(self, entity);
        }
        true
    }

    /// Register `listener` under `name`, replacing any listener already
    /// registered under that name. Listeners run in name order on every
    /// [`destroy_entity`](Self::destroy_entity) that actually destroys.
    ///
    /// Returns `true` if a listener was replaced.
    pub fn on_destroy(
        &mut self,
        name: &str,
        listener: impl Fn(&mut World, EntityId) + 'static,
    ) -> bool {
        self.destroy_listeners
            .insert(name.to_owned(), Rc::new(listener))
            .is_some()
    }

    pub fn remove_destroy_listener(&mut self, name: &str) -> bool {
        self.destroy_listeners.remove(name).is_some()
    }

    pub fn has_destroy_listener(&self, name: &str) -> bool {
        self.destroy_listeners.contains_key(name)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Every live entity in ascending id order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.entities.iter().collect()
    }

    // -- components ---------------------------------------------------------

    /// Attach `component` to `entity`. An existing component of the same kind
    /// is detached first (its detach hook fires) and a warning is logged.
    ///
    /// Returns `false` and does nothing if the entity is not alive.
    pub fn attach<C: ComponentData>(&mut self, entity: EntityId, mut component: C) -> bool {
        if !self.entities.is_alive(entity) {
            warn!(entity = ?entity, kind = ?C::KIND, "attach on destroyed entity ignored");
            return false;
        }
        if self.store.contains(entity, C::KIND) {
            warn!(entity = ?entity, kind = ?C::KIND, "replacing existing component");
            self.detach::<C>(entity);
        }
        component.set_owner(Some(entity));
        self.store.insert(entity, component);
        self.component_index
            .entry(C::KIND)
            .or_default()
            .insert(entity);
        if let Some(stored) = self.store.get_mut::<C>(entity) {
            stored.on_attach(entity);
        }
        true
    }

    /// Detach the component of type `C`. Returns the detached value with its
    /// owner cleared, or `None` if the entity did not hold one.
    pub fn detach<C: ComponentData>(&mut self, entity: EntityId) -> Option<C> {
        if !self.entities.is_alive(entity) {
            warn!(entity = ?entity, kind = ?C::KIND, "detach on destroyed entity ignored");
            return None;
        }
        let mut component = self.store.remove::<C>(entity)?;
        self.unindex_component(entity, C::KIND);
        component.on_detach(entity);
        component.set_owner(None);
        Some(component)
    }

    /// Attach a component whose kind is only known at runtime.
    pub fn attach_component(&mut self, entity: EntityId, component: Component) -> bool {
        match component {
            Component::Transform(c) => self.attach(entity, c),
            Component::Physics(c) => self.attach(entity, c),
            Component::Collider(c) => self.attach(entity, c),
            Component::Renderer(c) => self.attach(entity, c),
            Component::Lifetime(c) => self.attach(entity, c),
            Component::ScriptedBehavior(c) => self.attach(entity, c),
        }
    }

    /// Detach by kind. No-op returning `None` if the component is absent.
    pub fn detach_component(&mut self, entity: EntityId, kind: ComponentKind) -> Option<Component> {
        match kind {
            ComponentKind::Transform => self.detach::<Transform>(entity).map(Component::from),
            ComponentKind::Physics => self.detach::<Physics>(entity).map(Component::from),
            ComponentKind::Collider => self.detach::<Collider>(entity).map(Component::from),
            ComponentKind::Renderer => self.detach::<Renderer>(entity).map(Component::from),
            ComponentKind::Lifetime => self.detach::<Lifetime>(entity).map(Component::from),
            ComponentKind::ScriptedBehavior => {
                self.detach::<ScriptedBehavior>(entity).map(Component::from)
            }
        }
    }

    pub fn get<C: ComponentData>(&self, entity: EntityId) -> Option<&C> {
        self.store.get(entity)
    }

    pub fn get_mut<C: ComponentData>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.store.get_mut(entity)
    }

    pub fn has(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.store.contains(entity, kind)
    }

    /// Kinds currently attached to `entity`, in declaration order.
    pub fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|&k| self.store.contains(entity, k))
            .collect()
    }

    /// Read-only access to the arenas.
    pub fn components(&self) -> &ComponentStore {
        &self.store
    }

    fn unindex_component(&mut self, entity: EntityId, kind: ComponentKind) {
        if let Some(holders) = self.component_index.get_mut(&kind) {
            holders.remove(&entity);
            if holders.is_empty() {
                self.component_index.remove(&kind);
            }
        }
    }

    // -- queries ------------------------------------------------------------

    /// Entities holding every kind in `kinds`, in ascending id order.
    ///
    /// An empty list matches every live entity. If any kind has no holders at
    /// all the result is empty without scanning the others.
    pub fn query(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        if kinds.is_empty() {
            return self.entities();
        }
        let mut sets = Vec::with_capacity(kinds.len());
        for kind in kinds {
            match self.component_index.get(kind) {
                Some(holders) => sets.push(holders),
                None => {
                    debug!(kind = ?kind, "query matched nothing: kind has no holders");
                    return Vec::new();
                }
            }
        }
        sets.sort_by_key(|s| s.len());
        let Some((smallest, rest)) = sets.split_first() else {
            return Vec::new();
        };
        smallest
            .iter()
            .copied()
            .filter(|e| rest.iter().all(|s| s.contains(e)))
            .collect()
    }

    /// Holders of one component kind, straight from the reverse index.
    pub fn entities_with(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.component_index
            .get(&kind)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of kinds that currently have an index entry. Kinds with no
    /// holders have no entry.
    pub fn indexed_kind_count(&self) -> usize {
        self.component_index.len()
    }

    // -- tags ---------------------------------------------------------------

    /// Add `tag` to `entity`. Returns `true` if it was newly added.
    pub fn add_tag(&mut self, entity: EntityId, tag: &str) -> bool {
        if !self.entities.is_alive(entity) {
            warn!(entity = ?entity, tag, "tag on destroyed entity ignored");
            return false;
        }
        let added = self
            .entity_tags
            .entry(entity)
            .or_default()
            .insert(tag.to_owned());
        if added {
            self.tag_index
                .entry(tag.to_owned())
                .or_default()
                .insert(entity);
        }
        added
    }

    /// Remove `tag` from `entity`. Returns `true` if it was present.
    pub fn remove_tag(&mut self, entity: EntityId, tag: &str) -> bool {
        if !self.entities.is_alive(entity) {
            warn!(entity = ?entity, tag, "untag on destroyed entity ignored");
            return false;
        }
        let Some(tags) = self.entity_tags.get_mut(&entity) else {
            return false;
        };
        if !tags.remove(tag) {
            return false;
        }
        if tags.is_empty() {
            self.entity_tags.remove(&entity);
        }
        self.unindex_tag(entity, tag);
        true
    }

    pub fn has_tag(&self, entity: EntityId, tag: &str) -> bool {
        self.entity_tags
            .get(&entity)
            .is_some_and(|tags| tags.contains(tag))
    }

    /// Tags of `entity`, sorted.
    pub fn tags_of(&self, entity: EntityId) -> Vec<String> {
        self.entity_tags
            .get(&entity)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Members of `tag`.
    pub fn query_by_tag(&self, tag: &str) -> BTreeSet<EntityId> {
        self.tag_index.get(tag).cloned().unwrap_or_default()
    }

    /// Number of tags with at least one member.
    pub fn tag_count(&self) -> usize {
        self.tag_index.len()
    }

    fn unindex_tag(&mut self, entity: EntityId, tag: &str) {
        if let Some(members) = self.tag_index.get_mut(tag) {
            members.remove(&entity);
            if members.is_empty() {
                self.tag_index.remove(tag);
            }
        }
    }

    // -- resources ----------------------------------------------------------

    /// Store a singleton value, returning the one it replaced.
    pub fn insert_resource<R: 'static>(&mut self, resource: R) -> Option<R> {
        self.resources
            .insert(TypeId::of::<R>(), Box::new(resource))
            .and_then(|old| old.downcast::<R>().ok())
            .map(|old| *old)
    }

    pub fn resource<R: 'static>(&self) -> Option<&R> {
        self.resources
            .get(&TypeId::of::<R>())
            .and_then(|r| r.downcast_ref::<R>())
    }

    pub fn resource_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.resources
            .get_mut(&TypeId::of::<R>())
            .and_then(|r| r.downcast_mut::<R>())
    }

    pub fn remove_resource<R: 'static>(&mut self) -> Option<R> {
        self.resources
            .remove(&TypeId::of::<R>())
            .and_then(|r| r.downcast::<R>().ok())
            .map(|r| *r)
    }

    pub fn has_resource<R: 'static>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<R>())
    }

    /// Take `R` out, run `f` with both the world and the resource, then put
    /// the resource back. Returns `None` if `R` was not present.
    ///
    /// While `f` runs the resource is absent from the world. If `f` inserts a
    /// new `R`, the taken one still overwrites it on return.
    pub fn with_resource<R: 'static, T>(
        &mut self,
        f: impl FnOnce(&mut World, &mut R) -> T,
    ) -> Option<T> {
        let mut resource = self.remove_resource::<R>()?;
        let out = f(self, &mut resource);
        self.insert_resource(resource);
        Some(out)
    }

    // -- systems ------------------------------------------------------------

    /// Register a system. Its `on_attach` hook runs immediately; it first
    /// executes on the next pass (a system added mid-frame waits for the next
    /// frame).
    pub fn add_system(&mut self, system: impl System + 'static) -> SystemId {
        self.add_boxed_system(Box::new(system))
    }

    pub fn add_boxed_system(&mut self, mut system: Box<dyn System>) -> SystemId {
        let id = self.schedule.allocate_id();
        system.on_attach(self);
        debug!(
            system = system.name(),
            priority = system.priority(),
            "system added"
        );
        self.schedule.insert(id, system);
        id
    }

    /// Remove a system, firing its `on_detach` hook. Removal requested while
    /// the world is updating takes effect at the end of the current pass;
    /// the system does not run again after the request.
    ///
    /// Returns `false` for an unknown id.
    pub fn remove_system(&mut self, id: SystemId) -> bool {
        if self.updating {
            let known = self.in_pass.contains(&id) || self.schedule.contains(id);
            if known && !self.pending_removals.contains(&id) {
                self.pending_removals.push(id);
            }
            return known;
        }
        match self.schedule.remove(id) {
            Some(mut system) => {
                self.disabled.remove(&id);
                system.on_detach(self);
                debug!(system = system.name(), "system removed");
                true
            }
            None => false,
        }
    }

    /// Enable or disable a system without removing it. Returns `false` for an
    /// unknown id.
    pub fn set_system_enabled(&mut self, id: SystemId, enabled: bool) -> bool {
        if !self.schedule.contains(id) && !self.in_pass.contains(&id) {
            return false;
        }
        if enabled {
            self.disabled.remove(&id);
        } else {
            self.disabled.insert(id);
        }
        true
    }

    pub fn is_system_enabled(&self, id: SystemId) -> bool {
        !self.disabled.contains(&id)
    }

    /// System names in execution order.
    pub fn system_names(&self) -> Vec<String> {
        self.schedule.names()
    }

    pub fn system_count(&self) -> usize {
        self.schedule.len() + self.in_pass.len()
    }

    /// Whether a frame pass is running.
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Run one frame: every enabled system in priority order, then deferred
    /// system removals, then the command queue.
    ///
    /// Each system receives a snapshot of its query taken right before it
    /// runs, so entities destroyed by earlier systems are already excluded
    /// and entities destroyed mid-system only disappear from lookups.
    ///
    /// Calling `update` from inside a system is refused.
    pub fn update(&mut self, dt: f64) -> UpdateReport {
        if self.updating {
            warn!("re-entrant World::update refused");
            return UpdateReport {
                refused: true,
                ..UpdateReport::default()
            };
        }
        self.updating = true;
        let mut pass = self.schedule.take_all();
        self.in_pass = pass.iter().map(|e| e.id).collect();

        let mut timings = Vec::with_capacity(pass.len());
        for entry in pass.iter_mut() {
            if self.disabled.contains(&entry.id) || self.pending_removals.contains(&entry.id) {
                continue;
            }
            let entities = self.query(entry.system.requires());
            let started = Instant::now();
            entry.system.update(self, &entities, dt);
            timings.push(SystemTiming {
                name: entry.system.name().to_owned(),
                entities: entities.len(),
                elapsed: started.elapsed(),
            });
        }

        self.in_pass.clear();
        self.schedule.extend(pass);
        self.updating = false;

        for id in std::mem::take(&mut self.pending_removals) {
            self.remove_system(id);
        }

        let commands = self.apply_commands();
        UpdateReport {
            systems: timings,
            commands,
            refused: false,
        }
    }

    /// Remove every system (firing detach hooks) and then destroy every
    /// entity. Resources are kept.
    pub fn clear(&mut self) {
        let ids: Vec<SystemId> = self
            .in_pass
            .iter()
            .copied()
            .chain(self.schedule.ids())
            .collect();
        for id in ids {
            self.remove_system(id);
        }
        self.destroy_all_entities();
        debug!("world cleared");
    }

    /// Destroy every live entity. Systems are kept.
    pub fn destroy_all_entities(&mut self) -> usize {
        let all = self.entities();
        for &entity in &all {
            self.destroy_entity(entity);
        }
        all.len()
    }

    // -- commands -----------------------------------------------------------

    /// A producer handle for this world's command queue.
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Number of queued, unapplied commands.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Apply every queued command now. [`update`](Self::update) does this at
    /// the end of each frame; call it directly during setup.
    pub fn apply_commands(&mut self) -> ApplyReport {
        let batch = self.commands.take_pending();
        apply_batch(self, batch)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.alive_count())
            .field("components", &self.store.total())
            .field("tags", &self.tag_index.len())
            .field("resources", &self.resources.len())
            .field("destroy_listeners", &self.destroy_listeners.len())
            .field("systems", &self.system_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
