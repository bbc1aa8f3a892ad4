//! Entity identity and typed component access

use std::fmt;

use serde::{Deserialize, Serialize};

use super::component::{Component, ComponentStore};

/// Stable entity handle. Ids grow monotonically and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out entity ids
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}

#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    tag: String,
    alive: bool,
    components: ComponentStore,
}

impl Entity {
    pub(crate) fn new(id: EntityId, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
            alive: true,
            components: ComponentStore::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Flags the entity dead. It stays reachable until the next sweep.
    pub fn destroy(&mut self) {
        self.alive = false;
    }

    pub fn add<C: Component>(&mut self, component: C) -> &mut C {
        self.components.insert(component)
    }

    pub fn has<C: Component>(&self) -> bool {
        self.components.has::<C>()
    }

    /// Required component access.
    ///
    /// # Panics
    /// If the entity does not carry `C`. Systems must only ask for
    /// components their entities are guaranteed to have.
    #[track_caller]
    pub fn get<C: Component>(&self) -> &C {
        match self.components.get::<C>() {
            Some(component) => component,
            None => missing_component::<C>(self.id, &self.tag),
        }
    }

    /// Mutable variant of [`Entity::get`], with the same panic contract.
    #[track_caller]
    pub fn get_mut<C: Component>(&mut self) -> &mut C {
        let (id, tag) = (self.id, &self.tag);
        match self.components.get_mut::<C>() {
            Some(component) => component,
            None => missing_component::<C>(id, tag),
        }
    }

    pub fn try_get<C: Component>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    pub fn try_get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.components.remove::<C>()
    }
}

#[track_caller]
fn missing_component<C: Component>(id: EntityId, tag: &str) -> ! {
    panic!("entity {id} ('{tag}') has no {} component", C::KIND)
}
