//! Ability dispatch onto target vitals and modifier engines.

use tracing::{debug, warn};

use super::definition::{AbilityDefinition, AbilityEffect};
use super::error::AbilityError;
use super::target::TargetResolver;
use crate::config::CombatConfig;
use crate::entity::EntityId;
use crate::hit::SkipReason;
use crate::registry::EntityRegistry;
use crate::vitals::Vitals;

/// One effect that landed on one target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppliedEffect {
    Damage {
        target: EntityId,
        health_lost: f64,
        died: bool,
    },
    Heal {
        target: EntityId,
        healed: u32,
    },
    Status {
        target: EntityId,
    },
}

/// Everything one ability execution did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbilityReport {
    pub applied: Vec<AppliedEffect>,
    pub skipped: Vec<(EntityId, SkipReason)>,
    /// Set when the ability as a whole had no effect.
    pub error: Option<AbilityError>,
}

impl AbilityReport {
    fn rejected(error: AbilityError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn deaths(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.applied.iter().filter_map(|effect| match effect {
            AppliedEffect::Damage {
                target, died: true, ..
            } => Some(*target),
            _ => None,
        })
    }
}

/// Stateless dispatcher from ability definitions to component mutations.
///
/// `DirectDamage` lands unmodified unless
/// [`CombatConfig::ability_damage_uses_modifiers`] is set; pipeline hits
/// always go through the target's damage-taken multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbilityExecutor {
    apply_taken_modifiers: bool,
}

impl AbilityExecutor {
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            apply_taken_modifiers: config.ability_damage_uses_modifiers,
        }
    }

    pub fn execute(
        &self,
        ability: &AbilityDefinition,
        source: EntityId,
        resolver: &(impl TargetResolver + ?Sized),
        registry: &mut EntityRegistry,
    ) -> AbilityReport {
        if let AbilityEffect::Custom { key } = &ability.effect {
            warn!(ability = %ability.name, %key, "custom ability has no dispatch; ignored");
            return AbilityReport::rejected(AbilityError::UnsupportedCustom { key: key.clone() });
        }

        let targets = resolver.resolve(ability.target, source, registry);
        if targets.is_empty() {
            debug!(ability = %ability.name, target = %ability.target, "no targets resolved");
            return AbilityReport::rejected(AbilityError::NoTargets {
                ability: ability.name.clone(),
            });
        }

        let mut report = AbilityReport::default();
        for target in targets {
            match self.apply(&ability.effect, target, registry) {
                Ok(effect) => report.applied.push(effect),
                Err(reason) => {
                    warn!(ability = %ability.name, %target, %reason, "ability target skipped");
                    report.skipped.push((target, reason));
                }
            }
        }

        debug!(
            ability = %ability.name,
            %source,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "ability executed"
        );
        report
    }

    fn apply(
        &self,
        effect: &AbilityEffect,
        target: EntityId,
        registry: &mut EntityRegistry,
    ) -> Result<AppliedEffect, SkipReason> {
        match effect {
            AbilityEffect::DirectDamage { amount } => {
                let multiplier = if self.apply_taken_modifiers {
                    registry.damage_taken_multiplier(target)
                } else {
                    1.0
                };
                let vitals = living_vitals(registry, target)?;
                let report = vitals.try_take_damage(amount * multiplier).unwrap_or_default();
                Ok(AppliedEffect::Damage {
                    target,
                    health_lost: report.health_lost,
                    died: report.died,
                })
            }
            AbilityEffect::Heal { amount } => {
                let vitals = living_vitals(registry, target)?;
                let amount = amount.round().max(0.0) as u32;
                Ok(AppliedEffect::Heal {
                    target,
                    healed: vitals.heal(amount),
                })
            }
            AbilityEffect::AddStatusEffect(status) => {
                let modifiers = registry
                    .modifiers_mut(target)
                    .ok_or(SkipReason::NoModifiers)?;
                modifiers.insert(status);
                Ok(AppliedEffect::Status { target })
            }
            AbilityEffect::Custom { .. } => Err(SkipReason::Unsupported),
        }
    }
}

fn living_vitals(
    registry: &mut EntityRegistry,
    target: EntityId,
) -> Result<&mut Vitals, SkipReason> {
    let vitals = registry.vitals_mut(target).ok_or(SkipReason::NoVitals)?;
    if vitals.is_dead() {
        return Err(SkipReason::TargetDead);
    }
    Ok(vitals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityTrigger, Roster, TargetKind};
    use crate::status::{EffectDuration, StatusEffect, StatusEffectKind};

    struct Setup {
        registry: EntityRegistry,
        roster: Roster,
        player: EntityId,
        enemies: [EntityId; 2],
    }

    fn setup() -> Setup {
        let mut registry = EntityRegistry::new();
        let player = registry.spawn(100);
        let enemies = [registry.spawn(40), registry.spawn(40)];
        let roster = Roster::new(player).with_enemy(enemies[0]).with_enemy(enemies[1]);
        Setup {
            registry,
            roster,
            player,
            enemies,
        }
    }

    fn ability(target: TargetKind, effect: AbilityEffect) -> AbilityDefinition {
        AbilityDefinition::new("test", AbilityTrigger::Manual, target, effect)
    }

    #[test]
    fn direct_damage_hits_every_enemy_unmodified() {
        let mut s = setup();
        for enemy in s.enemies {
            s.registry.modifiers_mut(enemy).unwrap().add_effect(
                "guard",
                StatusEffectKind::DamageTakenReduction,
                0.5,
                EffectDuration::Permanent,
            );
        }

        let report = AbilityExecutor::default().execute(
            &ability(TargetKind::AllEnemies, AbilityEffect::DirectDamage { amount: 15.0 }),
            s.player,
            &s.roster,
            &mut s.registry,
        );

        assert_eq!(report.applied.len(), 2);
        for enemy in s.enemies {
            assert_eq!(s.registry.vitals(enemy).unwrap().health(), 25);
        }
    }

    #[test]
    fn direct_damage_can_opt_into_modifiers() {
        let mut s = setup();
        s.registry.modifiers_mut(s.enemies[0]).unwrap().add_effect(
            "exposed",
            StatusEffectKind::DamageTakenIncrease,
            2.0,
            EffectDuration::Permanent,
        );
        let executor = AbilityExecutor::new(&CombatConfig::default().with_ability_modifiers(true));

        let report = executor.execute(
            &ability(TargetKind::Enemy, AbilityEffect::DirectDamage { amount: 20.0 }),
            s.player,
            &s.roster,
            &mut s.registry,
        );

        assert_eq!(report.deaths().collect::<Vec<_>>(), vec![s.enemies[0]]);
        assert!(s.registry.is_dead(s.enemies[0]));
    }

    #[test]
    fn heal_rounds_amount_and_skips_dead() {
        let mut s = setup();
        s.registry.vitals_mut(s.player).unwrap().take_damage(30.0);
        let caster = s.enemies[0];
        s.registry.vitals_mut(caster).unwrap().take_damage(40.0);

        let heal = ability(TargetKind::Caster, AbilityEffect::Heal { amount: 9.6 });
        let report = AbilityExecutor::default().execute(&heal, caster, &s.roster, &mut s.registry);
        assert_eq!(report.skipped, vec![(caster, SkipReason::TargetDead)]);
        assert!(report.is_noop());

        let heal = ability(TargetKind::Player, AbilityEffect::Heal { amount: 9.6 });
        let report = AbilityExecutor::default().execute(&heal, caster, &s.roster, &mut s.registry);
        assert_eq!(
            report.applied,
            vec![AppliedEffect::Heal {
                target: s.player,
                healed: 10
            }]
        );
    }

    #[test]
    fn add_status_stores_independent_copies() {
        let mut s = setup();
        let effect = StatusEffect::new(
            "ward",
            StatusEffectKind::DamageTakenReduction,
            0.8,
            EffectDuration::Turns(2),
        );
        let ward = ability(TargetKind::Player, AbilityEffect::AddStatusEffect(effect.clone()));
        let executor = AbilityExecutor::default();

        executor.execute(&ward, s.player, &s.roster, &mut s.registry);
        executor.execute(&ward, s.player, &s.roster, &mut s.registry);
        s.registry.advance_turn_all();

        let engine = s.registry.modifiers(s.player).unwrap();
        assert_eq!(engine.count_by_name("ward"), 2);
        assert_eq!(engine.effects()[0].duration, EffectDuration::Turns(1));
        assert_eq!(ward.effect, AbilityEffect::AddStatusEffect(effect));
    }

    #[test]
    fn add_status_skips_targets_without_modifiers() {
        let mut s = setup();
        let bare = s.registry.spawn_empty();
        assert!(s.registry.attach_vitals(bare, 10));
        let roster = Roster::new(bare);

        let report = AbilityExecutor::default().execute(
            &ability(
                TargetKind::Player,
                AbilityEffect::AddStatusEffect(StatusEffect::permanent(
                    "ward",
                    StatusEffectKind::DamageTakenReduction,
                    0.5,
                )),
            ),
            s.player,
            &roster,
            &mut s.registry,
        );

        assert_eq!(report.skipped, vec![(bare, SkipReason::NoModifiers)]);
    }

    #[test]
    fn custom_abilities_fail_closed() {
        let mut s = setup();
        let report = AbilityExecutor::default().execute(
            &ability(
                TargetKind::AllEnemies,
                AbilityEffect::Custom {
                    key: "summon".into(),
                },
            ),
            s.player,
            &s.roster,
            &mut s.registry,
        );

        assert_eq!(
            report.error,
            Some(AbilityError::UnsupportedCustom {
                key: "summon".into()
            })
        );
        assert!(report.skipped.is_empty());
        assert_eq!(s.registry.vitals(s.enemies[0]).unwrap().health(), 40);
    }

    #[test]
    fn no_targets_is_reported() {
        let mut s = setup();
        let report = AbilityExecutor::default().execute(
            &ability(TargetKind::AllAllies, AbilityEffect::Heal { amount: 5.0 }),
            s.player,
            &s.roster,
            &mut s.registry,
        );

        assert!(matches!(report.error, Some(AbilityError::NoTargets { .. })));
    }
}
