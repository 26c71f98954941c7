//! Deferred world mutations.
//!
//! Code running outside the frame loop (spawn timers, UI handlers) never
//! touches the [`World`] directly. It holds a [`CommandSender`] and enqueues
//! [`Command`]s; the world drains the queue at one fixed point of
//! [`World::update`], after every system has run. Commands apply in FIFO
//! order.
//!
//! # Example
//!
//! ```
//! use ricochet_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let sender = world.command_sender();
//!
//! sender.spawn(
//!     EntityTemplate::new()
//!         .with(Transform::new(10.0, 20.0))
//!         .with_tag("asteroid"),
//! );
//! assert_eq!(world.entity_count(), 0);
//!
//! world.update(1.0 / 60.0);
//! assert_eq!(world.query_by_tag("asteroid").len(), 1);
//! ```

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::component::{Component, ComponentKind};
use crate::entity::EntityId;
use crate::world::World;
use crate::EcsError;

// ---------------------------------------------------------------------------
// EntityTemplate
// ---------------------------------------------------------------------------

/// Components and tags for an entity that does not exist yet.
#[derive(Debug, Clone, Default)]
pub struct EntityTemplate {
    pub components: Vec<Component>,
    pub tags: Vec<String>,
}

impl EntityTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_owned());
        self
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single deferred mutation.
#[derive(Debug, Clone)]
pub enum Command {
    Spawn(EntityTemplate),
    Destroy(EntityId),
    Attach(EntityId, Component),
    Detach(EntityId, ComponentKind),
    AddTag(EntityId, String),
    RemoveTag(EntityId, String),
}

impl Command {
    /// Apply to the world. A destroy of an already-destroyed entity succeeds
    /// (destroy is idempotent); every other command against a dead entity
    /// fails.
    fn apply(self, world: &mut World) -> Result<(), EcsError> {
        match self {
            Command::Spawn(template) => {
                world.spawn(template);
                Ok(())
            }
            Command::Destroy(entity) => {
                world.destroy_entity(entity);
                Ok(())
            }
            Command::Attach(entity, component) => {
                ensure_alive(world, entity)?;
                world.attach_component(entity, component);
                Ok(())
            }
            Command::Detach(entity, kind) => {
                ensure_alive(world, entity)?;
                world
                    .detach_component(entity, kind)
                    .map(|_| ())
                    .ok_or(EcsError::MissingComponent { entity, kind })
            }
            Command::AddTag(entity, tag) => {
                ensure_alive(world, entity)?;
                world.add_tag(entity, &tag);
                Ok(())
            }
            Command::RemoveTag(entity, tag) => {
                ensure_alive(world, entity)?;
                world.remove_tag(entity, &tag);
                Ok(())
            }
        }
    }
}

fn ensure_alive(world: &World, entity: EntityId) -> Result<(), EcsError> {
    if world.is_alive(entity) {
        Ok(())
    } else {
        Err(EcsError::DeadEntity { entity })
    }
}

// ---------------------------------------------------------------------------
// CommandSender
// ---------------------------------------------------------------------------

/// Cloneable producer handle for a world's command queue.
///
/// Sending never blocks. If the world has been dropped the command is
/// discarded with a warning.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    pub fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("command dropped: world no longer exists");
        }
    }

    pub fn spawn(&self, template: EntityTemplate) {
        self.send(Command::Spawn(template));
    }

    pub fn destroy(&self, entity: EntityId) {
        self.send(Command::Destroy(entity));
    }

    pub fn attach(&self, entity: EntityId, component: impl Into<Component>) {
        self.send(Command::Attach(entity, component.into()));
    }

    pub fn detach(&self, entity: EntityId, kind: ComponentKind) {
        self.send(Command::Detach(entity, kind));
    }

    pub fn add_tag(&self, entity: EntityId, tag: &str) {
        self.send(Command::AddTag(entity, tag.to_owned()));
    }

    pub fn remove_tag(&self, entity: EntityId, tag: &str) {
        self.send(Command::RemoveTag(entity, tag.to_owned()));
    }
}

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

/// Summary of one queue drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of commands that applied successfully.
    pub success_count: usize,
    /// Number of commands that failed to apply.
    pub failed_count: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// The receiving side, owned by the world.
#[derive(Debug)]
pub(crate) struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub(crate) fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    /// Take everything queued right now. Commands sent while the batch is
    /// being applied wait for the next drain.
    pub(crate) fn take_pending(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }
}

/// Apply a batch in FIFO order, logging every failure.
pub(crate) fn apply_batch(world: &mut World, commands: Vec<Command>) -> ApplyReport {
    let mut report = ApplyReport::default();
    for (index, command) in commands.into_iter().enumerate() {
        match command.apply(world) {
            Ok(()) => report.success_count += 1,
            Err(e) => {
                report.failed_count += 1;
                warn!(command_index = index, error = %e, "command application failed");
            }
        }
    }
    if report.total() > 0 {
        debug!(
            success = report.success_count,
            failed = report.failed_count,
            "applied queued commands"
        );
    }
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
