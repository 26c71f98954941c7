//! Travel budget for projectiles.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Distance-limited lifetime. The pruning system updates `traveled` from the
/// transform each frame and destroys the entity once it exceeds
/// `max_distance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub origin_x: f64,
    pub origin_y: f64,
    pub max_distance: f64,
    pub traveled: f64,
    #[serde(skip)]
    pub(crate) owner: Option<EntityId>,
}

impl Lifetime {
    pub fn new(origin_x: f64, origin_y: f64, max_distance: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            max_distance: max_distance.max(0.0),
            traveled: 0.0,
            owner: None,
        }
    }

    /// The entity this lifetime is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Whether the travel budget has been used up.
    pub fn expired(&self) -> bool {
        self.traveled > self.max_distance
    }
}
