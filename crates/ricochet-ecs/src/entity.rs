//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is an opaque 64-bit handle drawn from a monotonic counter.
//! Ids are never recycled: once an entity is destroyed its id is retired, so a
//! stale handle can never alias a newer entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// An opaque entity identifier.
///
/// Ordering follows allocation order, which makes `BTreeSet<EntityId>` iterate
/// oldest-first. Pair keys rely on this ordering to put the smaller id first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    ///
    /// The result only refers to a live entity if the raw value came from
    /// [`to_raw`](Self::to_raw) on a live id of the same world.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Allocates [`EntityId`]s and tracks which ones are alive.
///
/// Retired ids are simply absent from the live set; the counter only moves
/// forward.
#[derive(Debug)]
pub struct EntityAllocator {
    next: u64,
    alive: BTreeSet<EntityId>,
}

impl EntityAllocator {
    /// Create a new, empty allocator. The first id handed out is `1`.
    pub fn new() -> Self {
        Self {
            next: 1,
            alive: BTreeSet::new(),
        }
    }

    /// Allocate a fresh [`EntityId`]. Never fails.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        self.alive.insert(id);
        id
    }

    /// Retire an id.
    ///
    /// Returns `true` if the entity was alive, `false` if it was already
    /// retired or never allocated.
    pub fn retire(&mut self, id: EntityId) -> bool {
        self.alive.remove(&id)
    }

    /// Returns `true` if `id` refers to a currently alive entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.contains(&id)
    }

    /// Total number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Iterate live ids in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    /// The id that the next call to [`allocate`](Self::allocate) returns.
    pub fn peek_next(&self) -> EntityId {
        EntityId(self.next)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
