//! Battle loop orchestration.
//!
//! [`Battle`] owns the registry, the phase machine and the hit pipeline, and
//! reacts to every phase a transition enters, in entry order:
//!
//! | phase       | reaction                                              |
//! |-------------|-------------------------------------------------------|
//! | GameStart   | `CombatStart` abilities                               |
//! | TurnStart   | `TurnStart` abilities                                 |
//! | TurnPlaying | nothing; hits are settled until `end_turn`            |
//! | TurnEnd     | `TurnEnd` abilities, then one turn of status aging    |
//!
//! Aging runs after the turn-end abilities and before the next turn-start
//! abilities, so an effect added at turn end with `Turns(1)` never reaches
//! the next turn. The machine is stepped one phase at a time, so a phase's
//! reaction has landed before subscribers hear about the following phase.

use std::time::Duration;

use tracing::{debug, info};

use crate::ability::{
    AbilityDefinition, AbilityExecutor, AbilityReport, AbilityTrigger, Roster, TargetResolver,
};
use crate::config::CombatConfig;
use crate::entity::EntityId;
use crate::hit::{HitPipeline, HitPlayback, HitSummary, PeakHit, StepOutcome};
use crate::registry::EntityRegistry;
use crate::turn::{PhaseError, PhaseTransition, TurnPhase, TurnPhaseMachine};

/// An ability owned by a squad member (or enemy), fired by phase triggers.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberAbility {
    pub source: EntityId,
    pub ability: AbilityDefinition,
}

/// Ability outcome tagged with its source.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggeredAbility {
    pub phase: TurnPhase,
    pub source: EntityId,
    pub ability: String,
    pub report: AbilityReport,
}

/// Everything one phase transition caused.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseReport {
    pub transition: PhaseTransition,
    pub abilities: Vec<TriggeredAbility>,
    /// Status effects purged by turn-end aging.
    pub expired_effects: usize,
}

pub struct Battle<R = Roster> {
    config: CombatConfig,
    registry: EntityRegistry,
    phases: TurnPhaseMachine,
    pipeline: HitPipeline,
    executor: AbilityExecutor,
    resolver: R,
    abilities: Vec<MemberAbility>,
}

impl<R: TargetResolver> Battle<R> {
    pub fn new(config: CombatConfig, resolver: R) -> Self {
        let executor = AbilityExecutor::new(&config);
        Self {
            config,
            registry: EntityRegistry::new(),
            phases: TurnPhaseMachine::new(),
            pipeline: HitPipeline::new(),
            executor,
            resolver,
            abilities: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn phases(&self) -> &TurnPhaseMachine {
        &self.phases
    }

    pub fn phases_mut(&mut self) -> &mut TurnPhaseMachine {
        &mut self.phases
    }

    pub fn pipeline(&self) -> &HitPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut HitPipeline {
        &mut self.pipeline
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn phase(&self) -> TurnPhase {
        self.phases.phase()
    }

    pub fn turn_number(&self) -> u32 {
        self.phases.turn_number()
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    pub fn register_ability(&mut self, source: EntityId, ability: AbilityDefinition) {
        debug!(%source, ability = %ability.name, trigger = %ability.trigger, "ability registered");
        self.abilities.push(MemberAbility { source, ability });
    }

    /// Drops every ability owned by `source`. Returns how many were removed.
    pub fn unregister_abilities(&mut self, source: EntityId) -> usize {
        let before = self.abilities.len();
        self.abilities.retain(|entry| entry.source != source);
        before - self.abilities.len()
    }

    pub fn abilities(&self) -> &[MemberAbility] {
        &self.abilities
    }

    /// Runs one ability right now, regardless of its trigger.
    pub fn execute_ability(
        &mut self,
        source: EntityId,
        ability: &AbilityDefinition,
    ) -> AbilityReport {
        self.executor
            .execute(ability, source, &self.resolver, &mut self.registry)
    }

    // ========================================================================
    // Turn loop
    // ========================================================================

    /// GameStart → TurnStart → TurnPlaying, firing combat-start and
    /// turn-start abilities.
    pub fn start(&mut self) -> Result<PhaseReport, PhaseError> {
        self.phases.request_start_game()?;
        Ok(self.run_cascade())
    }

    /// TurnPlaying → TurnEnd → TurnStart → TurnPlaying, firing turn-end
    /// abilities, aging status effects, then firing turn-start abilities.
    pub fn end_turn(&mut self) -> Result<PhaseReport, PhaseError> {
        self.phases.request_end_turn()?;
        Ok(self.run_cascade())
    }

    /// Enters the requested phases one at a time, finishing each phase's
    /// reaction before the next phase-entry notification goes out.
    fn run_cascade(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();

        while let Some(phase) = self.phases.enter_next() {
            report.transition.entered.push(phase);
            if let Some(trigger) = AbilityTrigger::for_phase(phase) {
                self.fire(trigger, phase, &mut report.abilities);
            }
            if phase == TurnPhase::TurnEnd {
                report.expired_effects += self.registry.advance_turn_all();
            }
        }

        report
    }

    fn fire(&mut self, trigger: AbilityTrigger, phase: TurnPhase, out: &mut Vec<TriggeredAbility>) {
        // Abilities may kill their own sources mid-phase, so liveness is
        // checked per ability.
        for index in 0..self.abilities.len() {
            let MemberAbility { source, ability } = &self.abilities[index];
            if ability.trigger != trigger {
                continue;
            }
            let source = *source;
            if !self.registry.contains(source) || self.registry.is_dead(source) {
                debug!(%source, ability = %ability.name, "source gone; ability not fired");
                continue;
            }

            let report = self
                .executor
                .execute(ability, source, &self.resolver, &mut self.registry);
            out.push(TriggeredAbility {
                phase,
                source,
                ability: ability.name.clone(),
                report,
            });
        }
    }

    // ========================================================================
    // Hits
    // ========================================================================

    /// Settles a hit sequence immediately.
    pub fn resolve_hits(&mut self, hits: &[PeakHit]) -> HitSummary {
        let summary = self.pipeline.resolve(&mut self.registry, hits);
        if summary.deaths > 0 {
            info!(deaths = summary.deaths, turn = self.turn_number(), "casualties this sequence");
        }
        summary
    }

    /// Starts a paced hit sequence using the configured interval.
    pub fn begin_hits(&mut self, hits: &[PeakHit]) -> HitPlayback {
        self.pipeline.begin(hits, self.config.hit_interval)
    }

    /// Starts a paced hit sequence with an explicit interval.
    pub fn begin_hits_with_interval(
        &mut self,
        hits: &[PeakHit],
        interval: Duration,
    ) -> HitPlayback {
        self.pipeline.begin(hits, interval)
    }

    pub fn step_hits(&mut self, playback: &mut HitPlayback) -> StepOutcome {
        self.pipeline.step(playback, &mut self.registry)
    }

    pub fn advance_hits(&mut self, playback: &mut HitPlayback, elapsed: Duration) -> usize {
        self.pipeline.advance(playback, &mut self.registry, elapsed)
    }
}
