//! Named per-entity behaviour closures.
//!
//! [`ScriptedBehavior`] is the one open extension point of the component
//! model: gameplay code attaches arbitrary closures under a name instead of
//! inventing new component kinds. The [`ScriptSystem`](crate::system::ScriptSystem)
//! runs every script of every holder once per frame, in name order.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::entity::EntityId;
use crate::world::World;

/// A script: `(world, owning_entity, delta_time)`.
pub type ScriptFn = Rc<dyn Fn(&mut World, EntityId, f64)>;

/// Lifecycle hook receiving the owning entity.
pub type ScriptHook = Rc<dyn Fn(EntityId)>;

/// String-keyed bag of behaviour closures.
#[derive(Clone, Default)]
pub struct ScriptedBehavior {
    scripts: BTreeMap<String, ScriptFn>,
    on_attach: Option<ScriptHook>,
    on_detach: Option<ScriptHook>,
    pub(crate) owner: Option<EntityId>,
}

impl ScriptedBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script under `name`, replacing any script already there.
    pub fn with(mut self, name: &str, script: impl Fn(&mut World, EntityId, f64) + 'static) -> Self {
        self.insert(name, script);
        self
    }

    /// Called when the component is attached to an entity.
    pub fn with_on_attach(mut self, hook: impl Fn(EntityId) + 'static) -> Self {
        self.on_attach = Some(Rc::new(hook));
        self
    }

    /// Called when the component is detached, including on entity destroy.
    pub fn with_on_detach(mut self, hook: impl Fn(EntityId) + 'static) -> Self {
        self.on_detach = Some(Rc::new(hook));
        self
    }

    /// Insert a script. Returns `true` if a script with that name was replaced.
    pub fn insert(
        &mut self,
        name: &str,
        script: impl Fn(&mut World, EntityId, f64) + 'static,
    ) -> bool {
        self.scripts
            .insert(name.to_owned(), Rc::new(script))
            .is_some()
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.scripts.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<ScriptFn> {
        self.scripts.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Script names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Clone out every script so they can run against `&mut World`.
    pub fn snapshot(&self) -> Vec<(String, ScriptFn)> {
        self.scripts
            .iter()
            .map(|(name, f)| (name.clone(), Rc::clone(f)))
            .collect()
    }

    /// The entity this behaviour is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub(crate) fn fire_attach(&self, owner: EntityId) {
        if let Some(hook) = &self.on_attach {
            hook(owner);
        }
    }

    pub(crate) fn fire_detach(&self, owner: EntityId) {
        if let Some(hook) = &self.on_detach {
            hook(owner);
        }
    }
}

impl fmt::Debug for ScriptedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedBehavior")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_keyed_by_name() {
        let mut s = ScriptedBehavior::new()
            .with("spin", |_, _, _| {})
            .with("blink", |_, _, _| {});
        assert_eq!(s.names().collect::<Vec<_>>(), vec!["blink", "spin"]);
        assert!(s.insert("spin", |_, _, _| {}));
        assert_eq!(s.len(), 2);
        assert!(s.remove("blink"));
        assert!(!s.contains("blink"));
        assert!(!s.remove("blink"));
    }

    #[test]
    fn debug_lists_names_only() {
        let s = ScriptedBehavior::new().with("spin", |_, _, _| {});
        assert!(format!("{s:?}").contains("spin"));
    }
}
