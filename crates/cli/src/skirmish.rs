//! A fixed squad-versus-pack fight.
use std::io::{self, Write};

use anyhow::Result;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use combat_core::{
    AbilityDefinition, AbilityEffect, AbilityTrigger, EffectDuration, EntityId, ModifierEngine,
    PeakHit, Roster, StatusEffect, StatusEffectKind, TargetKind,
};
use combat_runtime::{CombatHandle, Event, RuntimeConfig, Topic};

pub const DEFAULT_TURNS: u32 = 3;

struct Squad {
    player: EntityId,
    ally: EntityId,
    pack: Vec<EntityId>,
}

pub async fn run(config: RuntimeConfig, turns: u32) -> Result<()> {
    let handle = CombatHandle::new(config, Roster::default());
    let mut feed = Feed::new(&handle);

    let squad = assemble(&handle);
    handle.start()?;
    feed.flush()?;

    for _ in 0..turns {
        if living(&handle, &squad.pack).is_empty() {
            info!("pack defeated");
            break;
        }
        if is_dead(&handle, squad.player) {
            info!("player defeated");
            break;
        }

        handle.play_hits(&squad_volley(&handle, &squad)).await?;
        feed.flush()?;
        handle.play_hits(&pack_volley(&handle, &squad)).await?;
        feed.flush()?;

        let report = handle.end_turn()?;
        info!(
            turn = handle.with_battle(|battle| battle.turn_number()),
            abilities = report.abilities.len(),
            expired = report.expired_effects,
            "turn advanced"
        );
        feed.flush()?;
    }

    Ok(())
}

fn assemble(handle: &CombatHandle) -> Squad {
    let player = handle.spawn(120);
    let ally = handle.spawn(80);
    let pack = vec![handle.spawn(90), handle.spawn(60)];

    handle.with_battle_mut(|battle| {
        let roster = battle.resolver_mut();
        roster.player = Some(player);
        roster.allies.push(ally);
        roster.enemies.extend(&pack);
    });

    handle.register_ability(
        player,
        AbilityDefinition::new(
            "opening volley",
            AbilityTrigger::CombatStart,
            TargetKind::AllEnemies,
            AbilityEffect::DirectDamage { amount: 12.0 },
        ),
    );
    handle.register_ability(
        ally,
        AbilityDefinition::new(
            "bulwark",
            AbilityTrigger::TurnStart,
            TargetKind::Player,
            AbilityEffect::AddStatusEffect(StatusEffect::new(
                "bulwark",
                StatusEffectKind::DamageTakenReduction,
                0.6,
                EffectDuration::Turns(1),
            )),
        ),
    );
    handle.register_ability(
        pack[0],
        AbilityDefinition::new(
            "frenzy",
            AbilityTrigger::TurnEnd,
            TargetKind::Caster,
            AbilityEffect::AddStatusEffect(StatusEffect::new(
                "frenzy",
                StatusEffectKind::DamageDealtIncrease,
                1.25,
                EffectDuration::Turns(2),
            )),
        ),
    );
    handle.register_ability(
        pack[1],
        AbilityDefinition::new(
            "mend",
            AbilityTrigger::TurnStart,
            TargetKind::Caster,
            AbilityEffect::Heal { amount: 6.0 },
        ),
    );

    Squad { player, ally, pack }
}

/// Player combo plus one ally follow-up, all on the first living enemy.
fn squad_volley(handle: &CombatHandle, squad: &Squad) -> Vec<PeakHit> {
    let Some(&target) = living(handle, &squad.pack).first() else {
        return Vec::new();
    };

    let player = dealt_multiplier(handle, squad.player);
    let mut hits: Vec<PeakHit> = [14.0, 14.0, 22.0]
        .into_iter()
        .zip(0..)
        .map(|(damage, order)| {
            PeakHit::new(target, damage * player, order).with_attacker(squad.player)
        })
        .collect();

    if !is_dead(handle, squad.ally) {
        let ally = dealt_multiplier(handle, squad.ally);
        hits.push(PeakHit::new(target, 10.0 * ally, 3).with_attacker(squad.ally));
    }
    hits
}

fn pack_volley(handle: &CombatHandle, squad: &Squad) -> Vec<PeakHit> {
    living(handle, &squad.pack)
        .into_iter()
        .zip(0..)
        .map(|(enemy, order)| {
            PeakHit::new(squad.player, 9.0 * dealt_multiplier(handle, enemy), order)
                .with_attacker(enemy)
        })
        .collect()
}

fn living(handle: &CombatHandle, ids: &[EntityId]) -> Vec<EntityId> {
    handle.with_battle(|battle| {
        ids.iter()
            .copied()
            .filter(|&id| !battle.registry().is_dead(id))
            .collect()
    })
}

fn is_dead(handle: &CombatHandle, id: EntityId) -> bool {
    handle.with_battle(|battle| battle.registry().is_dead(id))
}

fn dealt_multiplier(handle: &CombatHandle, id: EntityId) -> f64 {
    handle.with_battle(|battle| {
        battle
            .registry()
            .modifiers(id)
            .map_or(1.0, ModifierEngine::damage_dealt_multiplier)
    })
}

/// Drains every bus topic to stdout, one JSON object per event.
struct Feed {
    receivers: Vec<(Topic, broadcast::Receiver<Event>)>,
}

impl Feed {
    fn new(handle: &CombatHandle) -> Self {
        Self {
            receivers: Topic::ALL
                .into_iter()
                .map(|topic| (topic, handle.subscribe(topic)))
                .collect(),
        }
    }

    fn flush(&mut self) -> Result<()> {
        let mut out = io::stdout().lock();
        for (topic, rx) in &mut self.receivers {
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        let line = serde_json::json!({ "topic": topic, "event": event });
                        serde_json::to_writer(&mut out, &line)?;
                        writeln!(out)?;
                    }
                    Err(TryRecvError::Lagged(missed)) => {
                        warn!(?topic, missed, "event feed lagged");
                    }
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}
