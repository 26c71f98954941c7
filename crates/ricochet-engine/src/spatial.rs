//! Uniform-grid spatial index.
//!
//! The world is cut into square cells of `cell_size`. An entity is inserted
//! into every cell its bounding circle overlaps (clamped to the grid extent),
//! and the list of those cells is remembered so removal touches exactly the
//! cells it was put in. Empty buckets are deleted.
//!
//! The grid is rebuilt from scratch once per frame before collision queries
//! run; there is no incremental update.
//!
//! ```
//! use ricochet_engine::spatial::SpatialGrid;
//! use ricochet_ecs::prelude::*;
//!
//! let mut grid = SpatialGrid::new(200.0, 200.0, 50.0);
//! let a = EntityId::from_raw(1);
//! let b = EntityId::from_raw(2);
//! grid.insert(a, 10.0, 10.0, 5.0);
//! grid.insert(b, 30.0, 30.0, 5.0);
//! assert_eq!(grid.nearby(a), vec![b]);
//! ```

use std::collections::{BTreeSet, HashMap};

use ricochet_ecs::prelude::*;

/// Integer `(column, row)` of a grid cell.
pub type CellKey = (i32, i32);

/// Bucketed positions for neighbour queries.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    columns: i32,
    rows: i32,
    cells: HashMap<CellKey, BTreeSet<EntityId>>,
    occupancy: HashMap<EntityId, Vec<CellKey>>,
}

impl SpatialGrid {
    /// A grid covering `width` x `height` world units. A non-positive or
    /// non-finite `cell_size` falls back to `1.0`.
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let mut grid = Self {
            cell_size,
            columns: 1,
            rows: 1,
            cells: HashMap::new(),
            occupancy: HashMap::new(),
        };
        grid.resize(width, height);
        grid
    }

    /// Recompute the column and row counts for a new world extent and drop
    /// every bucket. Entities must be reinserted afterwards.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.columns = cells_for(width, self.cell_size);
        self.rows = cells_for(height, self.cell_size);
        self.clear();
    }

    /// Remove every entity.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.occupancy.clear();
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// `(columns, rows)`.
    pub fn dimensions(&self) -> (i32, i32) {
        (self.columns, self.rows)
    }

    /// The cell containing `(x, y)`, clamped to the grid.
    pub fn cell_of(&self, x: f64, y: f64) -> CellKey {
        (
            self.clamp_column(x / self.cell_size),
            self.clamp_row(y / self.cell_size),
        )
    }

    fn clamp_column(&self, v: f64) -> i32 {
        (v.floor() as i32).clamp(0, self.columns - 1)
    }

    fn clamp_row(&self, v: f64) -> i32 {
        (v.floor() as i32).clamp(0, self.rows - 1)
    }

    /// Every cell overlapped by the circle's bounding square, clamped to the
    /// grid extent.
    pub fn cells_for_circle(&self, x: f64, y: f64, radius: f64) -> Vec<CellKey> {
        let r = radius.max(0.0);
        let (c0, r0) = self.cell_of(x - r, y - r);
        let (c1, r1) = self.cell_of(x + r, y + r);
        let mut keys = Vec::with_capacity(((c1 - c0 + 1) * (r1 - r0 + 1)) as usize);
        for row in r0..=r1 {
            for col in c0..=c1 {
                keys.push((col, row));
            }
        }
        keys
    }

    /// Insert `entity` with a bounding circle. Re-inserting an entity first
    /// removes its previous placement.
    pub fn insert(&mut self, entity: EntityId, x: f64, y: f64, radius: f64) {
        self.remove(entity);
        let keys = self.cells_for_circle(x, y, radius);
        for &key in &keys {
            self.cells.entry(key).or_default().insert(entity);
        }
        self.occupancy.insert(entity, keys);
    }

    /// Insert an entity using its `Transform` and `Collider`. Returns `false`
    /// if either is missing.
    pub fn insert_entity(&mut self, world: &World, entity: EntityId) -> bool {
        let (Some(t), Some(c)) = (world.get::<Transform>(entity), world.get::<Collider>(entity))
        else {
            return false;
        };
        self.insert(entity, t.x + c.offset_x, t.y + c.offset_y, c.bounding_radius());
        true
    }

    /// Remove `entity` from every cell it occupies. Returns `false` if it was
    /// not in the grid.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(keys) = self.occupancy.remove(&entity) else {
            return false;
        };
        for key in keys {
            if let Some(bucket) = self.cells.get_mut(&key) {
                bucket.remove(&entity);
                if bucket.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
        true
    }

    /// Clear and insert every `Transform + Collider` entity of `world`.
    pub fn rebuild(&mut self, world: &World) {
        self.clear();
        for entity in world.query(&[ComponentKind::Transform, ComponentKind::Collider]) {
            self.insert_entity(world, entity);
        }
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.occupancy.contains_key(&entity)
    }

    /// Cells `entity` was inserted into.
    pub fn cells_of(&self, entity: EntityId) -> &[CellKey] {
        self.occupancy
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Entities in one cell.
    pub fn bucket(&self, key: CellKey) -> Option<&BTreeSet<EntityId>> {
        self.cells.get(&key)
    }

    /// Number of non-empty buckets.
    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    /// Every entity sharing at least one cell with `entity`, without
    /// duplicates and excluding `entity` itself. Sorted by id.
    pub fn nearby(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = BTreeSet::new();
        for key in self.cells_of(entity) {
            if let Some(bucket) = self.cells.get(key) {
                out.extend(bucket.iter().copied().filter(|&e| e != entity));
            }
        }
        out.into_iter().collect()
    }

    /// [`nearby`](Self::nearby) restricted to members of `tag`.
    pub fn nearby_tagged(&self, world: &World, entity: EntityId, tag: &str) -> Vec<EntityId> {
        self.nearby(entity)
            .into_iter()
            .filter(|&e| world.has_tag(e, tag))
            .collect()
    }

    /// Entities in every cell overlapped by a circle. Candidates only: no
    /// distance test is done.
    pub fn query_circle(&self, x: f64, y: f64, radius: f64) -> Vec<EntityId> {
        let mut out = BTreeSet::new();
        for key in self.cells_for_circle(x, y, radius) {
            if let Some(bucket) = self.cells.get(&key) {
                out.extend(bucket.iter().copied());
            }
        }
        out.into_iter().collect()
    }

    /// Every unordered pair sharing a cell, smaller id first.
    pub fn candidate_pairs(&self) -> BTreeSet<(EntityId, EntityId)> {
        let mut pairs = BTreeSet::new();
        for bucket in self.cells.values() {
            let members: Vec<EntityId> = bucket.iter().copied().collect();
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    pairs.insert((a, b));
                }
            }
        }
        pairs
    }
}

fn cells_for(extent: f64, cell_size: f64) -> i32 {
    if extent.is_finite() && extent > 0.0 {
        ((extent / cell_size).ceil() as i32).max(1)
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
