//! Entity manager - owns every entity and the tag index
//!
//! Structural changes are two-phase: [`EntityManager::add_entity`] and
//! [`Entity::destroy`] only queue work, and [`EntityManager::update`] applies
//! it. Id slices handed out by queries therefore stay valid for the whole
//! frame even while systems spawn or destroy entities.

use std::collections::HashMap;

use tracing::trace;

use super::entity::{Entity, EntityAllocator, EntityId};

#[derive(Debug, Default)]
pub struct EntityManager {
    allocator: EntityAllocator,
    arena: HashMap<EntityId, Entity>,
    entities: Vec<EntityId>,
    pending: Vec<EntityId>,
    by_tag: HashMap<String, Vec<EntityId>>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity. It can take components right away but stays out of
    /// query results until the next [`EntityManager::update`].
    pub fn add_entity(&mut self, tag: &str) -> EntityId {
        let id = self.allocator.allocate();
        self.arena.insert(id, Entity::new(id, tag));
        self.pending.push(id);
        id
    }

    /// Flush pending entities, then sweep dead ones out of every container.
    pub fn update(&mut self) {
        let added = self.pending.len();
        for id in self.pending.drain(..) {
            if let Some(entity) = self.arena.get(&id) {
                self.entities.push(id);
                self.by_tag
                    .entry(entity.tag().to_string())
                    .or_default()
                    .push(id);
            }
        }

        let before = self.entities.len();
        let arena = &self.arena;
        let is_alive = |id: &EntityId| arena.get(id).map_or(false, Entity::is_alive);
        self.entities.retain(is_alive);
        for bucket in self.by_tag.values_mut() {
            bucket.retain(is_alive);
        }
        self.arena.retain(|_, entity| entity.is_alive());

        trace!(
            added,
            removed = before - self.entities.len(),
            live = self.entities.len(),
            "entity manager update"
        );
    }

    /// Every visible entity, in insertion order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Visible entities with the given tag, in insertion order.
    pub fn entities_with_tag(&self, tag: &str) -> &[EntityId] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate visible entities
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter_map(|id| self.arena.get(id))
    }

    /// # Panics
    /// If `id` was never created or has already been swept.
    #[track_caller]
    pub fn get(&self, id: EntityId) -> &Entity {
        match self.arena.get(&id) {
            Some(entity) => entity,
            None => panic!("entity {id} does not exist"),
        }
    }

    /// # Panics
    /// If `id` was never created or has already been swept.
    #[track_caller]
    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        match self.arena.get_mut(&id) {
            Some(entity) => entity,
            None => panic!("entity {id} does not exist"),
        }
    }

    pub fn try_get(&self, id: EntityId) -> Option<&Entity> {
        self.arena.get(&id)
    }

    pub fn try_get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.arena.get_mut(&id)
    }

    /// Whether the entity still exists (pending, visible, or dead but unswept)
    pub fn contains(&self, id: EntityId) -> bool {
        self.arena.contains_key(&id)
    }

    /// Flag an entity dead; a no-op for ids that are already gone.
    pub fn destroy(&mut self, id: EntityId) {
        if let Some(entity) = self.arena.get_mut(&id) {
            entity.destroy();
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.arena.get(&id).map_or(false, Entity::is_alive)
    }

    /// Number of visible entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn total_created(&self) -> u64 {
        self.allocator.allocated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Transform;
    use crate::math::Vec2;

    fn sorted_ids(ids: impl IntoIterator<Item = EntityId>) -> Vec<EntityId> {
        let mut ids: Vec<_> = ids.into_iter().collect();
        ids.sort();
        ids
    }

    #[test]
    fn added_entities_are_hidden_until_update() {
        let mut manager = EntityManager::new();
        let tile = manager.add_entity("tile");

        assert!(manager.entities().is_empty());
        assert!(manager.entities_with_tag("tile").is_empty());
        assert_eq!(manager.pending_len(), 1);

        manager.update();
        assert_eq!(manager.entities(), &[tile]);
        assert_eq!(manager.entities_with_tag("tile"), &[tile]);
        assert_eq!(manager.pending_len(), 0);
    }

    #[test]
    fn components_attach_before_visibility() {
        let mut manager = EntityManager::new();
        let id = manager.add_entity("bullet");
        manager
            .get_mut(id)
            .add(Transform::new(Vec2::new(3.0, 4.0), 1.0));
        manager.update();
        assert_eq!(manager.get(id).get::<Transform>().pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn ids_are_monotonic() {
        let mut manager = EntityManager::new();
        let a = manager.add_entity("tile");
        let b = manager.add_entity("dec");
        manager.update();
        manager.destroy(a);
        manager.update();
        let c = manager.add_entity("tile");
        assert!(a < b && b < c);
        assert_eq!(manager.total_created(), 3);
    }

    #[test]
    fn dead_entities_are_swept_everywhere() {
        let mut manager = EntityManager::new();
        let a = manager.add_entity("tile");
        let b = manager.add_entity("tile");
        let c = manager.add_entity("bullet");
        manager.update();

        manager.destroy(b);
        // still inspectable until the sweep
        assert!(manager.contains(b));
        assert!(!manager.is_alive(b));
        assert_eq!(manager.entities().len(), 3);

        manager.update();
        assert_eq!(manager.entities(), &[a, c]);
        assert_eq!(manager.entities_with_tag("tile"), &[a]);
        assert!(!manager.contains(b));

        manager.update();
        assert!(!manager.entities().contains(&b));
    }

    #[test]
    fn entity_destroyed_while_pending_never_appears() {
        let mut manager = EntityManager::new();
        let id = manager.add_entity("bullet");
        manager.destroy(id);
        manager.update();
        assert!(manager.is_empty());
        assert!(manager.entities_with_tag("bullet").is_empty());
    }

    #[test]
    fn tag_buckets_partition_canonical_list() {
        let mut manager = EntityManager::new();
        let tags = ["tile", "dec", "player", "tile", "bullet", "dec", "tile"];
        let ids: Vec<_> = tags.iter().map(|tag| manager.add_entity(tag)).collect();
        manager.update();
        manager.destroy(ids[0]);
        manager.destroy(ids[4]);
        manager.add_entity("bullet");
        manager.update();

        let mut from_buckets = Vec::new();
        for tag in ["tile", "dec", "player", "bullet"] {
            from_buckets.extend_from_slice(manager.entities_with_tag(tag));
        }
        assert_eq!(
            sorted_ids(from_buckets),
            sorted_ids(manager.entities().iter().copied())
        );
    }

    #[test]
    fn unknown_tag_yields_empty_slice() {
        let manager = EntityManager::new();
        assert!(manager.entities_with_tag("goomba").is_empty());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut manager = EntityManager::new();
        let ids: Vec<_> = (0..5).map(|_| manager.add_entity("tile")).collect();
        manager.update();
        manager.destroy(ids[2]);
        manager.update();
        assert_eq!(
            manager.entities_with_tag("tile"),
            &[ids[0], ids[1], ids[3], ids[4]]
        );
        let tags: Vec<_> = manager.iter().map(|e| e.id()).collect();
        assert_eq!(tags, vec![ids[0], ids[1], ids[3], ids[4]]);
    }
}
