//! Target resolution collaborators.

use super::definition::TargetKind;
use crate::entity::EntityId;
use crate::registry::EntityRegistry;

/// Maps a [`TargetKind`] to concrete entities.
///
/// Injected into the executor; roster bookkeeping lives behind this trait.
pub trait TargetResolver {
    fn resolve(
        &self,
        kind: TargetKind,
        source: EntityId,
        registry: &EntityRegistry,
    ) -> Vec<EntityId>;
}

/// Reference resolver over explicit player / enemy / ally lists.
///
/// Despawned ids are filtered out; dead ones are kept (the executor decides
/// per effect whether the dead are valid targets), except for
/// [`TargetKind::Enemy`], which picks the first living enemy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    pub player: Option<EntityId>,
    pub enemies: Vec<EntityId>,
    pub allies: Vec<EntityId>,
}

impl Roster {
    pub fn new(player: EntityId) -> Self {
        Self {
            player: Some(player),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_enemy(mut self, enemy: EntityId) -> Self {
        self.enemies.push(enemy);
        self
    }

    #[must_use]
    pub fn with_ally(mut self, ally: EntityId) -> Self {
        self.allies.push(ally);
        self
    }
}

impl TargetResolver for Roster {
    fn resolve(
        &self,
        kind: TargetKind,
        source: EntityId,
        registry: &EntityRegistry,
    ) -> Vec<EntityId> {
        let known = |id: &EntityId| registry.contains(*id);

        match kind {
            TargetKind::Player => self.player.into_iter().filter(known).collect(),
            TargetKind::Enemy => self
                .enemies
                .iter()
                .copied()
                .find(|id| known(id) && !registry.is_dead(*id))
                .into_iter()
                .collect(),
            TargetKind::AllEnemies => self.enemies.iter().copied().filter(known).collect(),
            TargetKind::Caster => Some(source).into_iter().filter(known).collect(),
            TargetKind::AllAllies => self.allies.iter().copied().filter(known).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_kind() {
        let mut registry = EntityRegistry::new();
        let player = registry.spawn(100);
        let ally = registry.spawn(50);
        let first = registry.spawn(10);
        let second = registry.spawn(10);
        let roster = Roster::new(player)
            .with_ally(ally)
            .with_enemy(first)
            .with_enemy(second);

        assert_eq!(roster.resolve(TargetKind::Player, ally, &registry), vec![player]);
        assert_eq!(roster.resolve(TargetKind::Caster, ally, &registry), vec![ally]);
        assert_eq!(roster.resolve(TargetKind::AllAllies, player, &registry), vec![ally]);
        assert_eq!(
            roster.resolve(TargetKind::AllEnemies, player, &registry),
            vec![first, second]
        );
        assert_eq!(roster.resolve(TargetKind::Enemy, player, &registry), vec![first]);

        registry.vitals_mut(first).unwrap().take_damage(10.0);
        assert_eq!(roster.resolve(TargetKind::Enemy, player, &registry), vec![second]);

        registry.despawn(second);
        assert!(roster.resolve(TargetKind::Enemy, player, &registry).is_empty());
        assert_eq!(roster.resolve(TargetKind::AllEnemies, player, &registry), vec![first]);
    }
}
