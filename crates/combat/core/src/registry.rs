//! Entity arena with sparse component stores.
//!
//! Each entity owns at most one [`Vitals`] and one [`ModifierEngine`].
//! Capability checks are presence checks in the per-component maps, and
//! iteration follows id order so turn aging is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::entity::EntityId;
use crate::status::ModifierEngine;
use crate::vitals::Vitals;

#[derive(Debug, Default)]
pub struct EntityRegistry {
    next_id: u32,
    entities: BTreeSet<EntityId>,
    vitals: BTreeMap<EntityId, Vitals>,
    modifiers: BTreeMap<EntityId, ModifierEngine>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an entity with no components.
    pub fn spawn_empty(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id);
        id
    }

    /// Allocates a combatant with full vitals and an empty modifier engine.
    pub fn spawn(&mut self, max_health: u32) -> EntityId {
        let id = self.spawn_empty();
        self.vitals.insert(id, Vitals::new(id, max_health));
        self.modifiers.insert(id, ModifierEngine::new(id));
        debug!(entity = %id, max_health, "combatant spawned");
        id
    }

    /// Attaches (or replaces) vitals on an existing entity.
    /// Returns false if the entity is unknown.
    pub fn attach_vitals(&mut self, id: EntityId, max_health: u32) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.vitals.insert(id, Vitals::new(id, max_health));
        true
    }

    /// Attaches (or replaces) a modifier engine on an existing entity.
    /// Returns false if the entity is unknown.
    pub fn attach_modifiers(&mut self, id: EntityId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.modifiers.insert(id, ModifierEngine::new(id));
        true
    }

    /// Removes the entity and every component it owns.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let existed = self.entities.remove(&id);
        self.vitals.remove(&id);
        self.modifiers.remove(&id);
        existed
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ========================================================================
    // Component access
    // ========================================================================

    pub fn vitals(&self, id: EntityId) -> Option<&Vitals> {
        self.vitals.get(&id)
    }

    pub fn vitals_mut(&mut self, id: EntityId) -> Option<&mut Vitals> {
        self.vitals.get_mut(&id)
    }

    pub fn modifiers(&self, id: EntityId) -> Option<&ModifierEngine> {
        self.modifiers.get(&id)
    }

    pub fn modifiers_mut(&mut self, id: EntityId) -> Option<&mut ModifierEngine> {
        self.modifiers.get_mut(&id)
    }

    /// True if the entity has vitals and they report dead.
    pub fn is_dead(&self, id: EntityId) -> bool {
        self.vitals(id).is_some_and(Vitals::is_dead)
    }

    /// Damage-taken multiplier of `id`; neutral when it has no modifier engine.
    pub fn damage_taken_multiplier(&self, id: EntityId) -> f64 {
        self.modifiers(id)
            .map_or(1.0, ModifierEngine::damage_taken_multiplier)
    }

    /// Ages every modifier engine by one turn, in id order.
    /// Returns the total number of purged effects.
    pub fn advance_turn_all(&mut self) -> usize {
        self.modifiers
            .values_mut()
            .map(ModifierEngine::advance_turn)
            .sum()
    }
}
