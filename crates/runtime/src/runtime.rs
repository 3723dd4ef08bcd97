//! Cloneable battle handle with timer-paced hit playback.
//!
//! Design: the handle owns a [`Battle`] behind a short-lived lock that is
//! never held across an await point, so clones can inspect state while a
//! paced playback sleeps between hits. At most one hit sequence plays at a
//! time; a second request is rejected with [`RuntimeError::PlaybackInFlight`].
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use combat_core::{
    AbilityDefinition, AbilityReport, Battle, EntityId, HitPlayback, HitSummary, PeakHit,
    PhaseReport, Roster, StepOutcome, TargetResolver,
};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};

/// Client-facing handle to a running battle.
pub struct CombatHandle<R = Roster> {
    shared: Arc<Shared<R>>,
}

struct Shared<R> {
    battle: Mutex<Battle<R>>,
    bus: EventBus,
    config: RuntimeConfig,
    playing: AtomicBool,
}

impl<R> Clone for CombatHandle<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: TargetResolver> CombatHandle<R> {
    /// Builds the battle and bridges its hit and phase notifications onto a
    /// fresh event bus.
    pub fn new(config: RuntimeConfig, resolver: R) -> Self {
        let bus = EventBus::with_capacity(config.event_buffer_size);
        let mut battle = Battle::new(config.combat.clone(), resolver);

        let hits = bus.clone();
        battle
            .pipeline_mut()
            .subscribe(move |event| hits.publish(Event::Hit(event.clone())));
        let phases = bus.clone();
        battle
            .phases_mut()
            .subscribe(move |event| phases.publish(Event::Phase(*event)));

        Self {
            shared: Arc::new(Shared {
                battle: Mutex::new(battle),
                bus,
                config,
                playing: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.shared.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe(topic)
    }

    /// Spawns an entity with vitals and a modifier engine, bridging both
    /// components' notifications onto the bus.
    ///
    /// Entities created directly through [`with_battle_mut`](Self::with_battle_mut)
    /// are not bridged.
    pub fn spawn(&self, max_health: u32) -> EntityId {
        let mut battle = self.lock();
        let registry = battle.registry_mut();
        let id = registry.spawn(max_health);

        if let Some(vitals) = registry.vitals_mut(id) {
            let bus = self.shared.bus.clone();
            vitals.subscribe(move |event| bus.publish(Event::Vitals(event.clone())));
        }
        if let Some(engine) = registry.modifiers_mut(id) {
            let bus = self.shared.bus.clone();
            engine.subscribe(move |event| bus.publish(Event::Status(event.clone())));
        }

        debug!(entity = %id, max_health, "entity spawned");
        id
    }

    /// Read access to the battle. Do not call other handle methods from `f`.
    pub fn with_battle<T>(&self, f: impl FnOnce(&Battle<R>) -> T) -> T {
        f(&self.lock())
    }

    /// Write access to the battle. Do not call other handle methods from `f`.
    pub fn with_battle_mut<T>(&self, f: impl FnOnce(&mut Battle<R>) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn register_ability(&self, source: EntityId, ability: AbilityDefinition) {
        self.lock().register_ability(source, ability);
    }

    pub fn execute_ability(&self, source: EntityId, ability: &AbilityDefinition) -> AbilityReport {
        self.lock().execute_ability(source, ability)
    }

    pub fn start(&self) -> Result<PhaseReport> {
        Ok(self.lock().start()?)
    }

    pub fn end_turn(&self) -> Result<PhaseReport> {
        Ok(self.lock().end_turn()?)
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }

    /// Settles a hit sequence without pauses.
    pub fn resolve_hits(&self, hits: &[PeakHit]) -> Result<HitSummary> {
        let _flight = self.claim()?;
        Ok(self.lock().resolve_hits(hits))
    }

    /// Settles a hit sequence, sleeping the configured hit interval after
    /// each settled hit that has more hits behind it.
    ///
    /// Dropping the returned future mid-sequence cancels the remaining hits;
    /// the completion notification still fires with `cancelled` set.
    pub async fn play_hits(&self, hits: &[PeakHit]) -> Result<HitSummary> {
        let mut flight = self.claim()?;
        let interval = self.shared.config.combat.hit_interval;
        let playback = flight.playback.insert(self.lock().begin_hits(hits));

        loop {
            let outcome = self.lock().step_hits(playback);
            match outcome {
                StepOutcome::Finished(summary) => return Ok(summary),
                StepOutcome::Resolved(_) if playback.remaining() > 0 && !interval.is_zero() => {
                    tokio::time::sleep(interval).await;
                }
                StepOutcome::Resolved(_) | StepOutcome::Skipped { .. } => {}
            }
        }
    }

    fn claim(&self) -> Result<Flight<'_, R>> {
        if self.shared.playing.swap(true, Ordering::AcqRel) {
            warn!("hit sequence rejected: another sequence is still playing");
            return Err(RuntimeError::PlaybackInFlight);
        }
        Ok(Flight {
            handle: self,
            playback: None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Battle<R>> {
        self.shared
            .battle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the single-flight claim for the duration of a sequence.
struct Flight<'a, R: TargetResolver> {
    handle: &'a CombatHandle<R>,
    playback: Option<HitPlayback>,
}

impl<R: TargetResolver> Drop for Flight<'_, R> {
    fn drop(&mut self) {
        if let Some(mut playback) = self.playback.take()
            && !playback.is_finished()
        {
            info!(
                remaining = playback.remaining(),
                "hit playback dropped mid-sequence; cancelling"
            );
            playback.cancel();
            self.handle.lock().step_hits(&mut playback);
        }
        self.handle.shared.playing.store(false, Ordering::Release);
    }
}
