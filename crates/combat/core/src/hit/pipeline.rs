//! Sequential hit settlement against entity vitals.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::descriptor::{HitResolution, HitSummary, PeakHit, SkipReason};
use super::playback::HitPlayback;
use crate::entity::EntityId;
use crate::observer::{Observers, SubscriptionId};
use crate::registry::EntityRegistry;

/// Notifications emitted by the [`HitPipeline`], in emission order for one
/// sequence: optional `SequenceReordered`, `SequenceStarted`, then per hit
/// `HitResolved` (and `TargetDied` when lethal), then `SequenceCompleted`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitEvent {
    /// The input was not ascending by `order` and a sorted copy is used.
    SequenceReordered { hits: usize },
    SequenceStarted { hits: Vec<PeakHit> },
    HitResolved {
        hit: PeakHit,
        health: u32,
        shield: u32,
    },
    TargetDied { target: EntityId },
    SequenceCompleted { summary: HitSummary },
}

/// Result of a single [`HitPipeline::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Resolved(HitResolution),
    Skipped { hit: PeakHit, reason: SkipReason },
    /// The sequence is over; carries the final counts.
    Finished(HitSummary),
}

/// Settles hit sequences one hit at a time.
///
/// The pipeline keeps no per-entity state and tracks at most one sequence in
/// flight. Beginning a sequence while another is unfinished closes the stale
/// one first (its `SequenceCompleted` fires with `cancelled` set), so a
/// playback that was dropped mid-sequence never leaves the pipeline stuck in
/// [`is_processing`](Self::is_processing).
#[derive(Debug, Default)]
pub struct HitPipeline {
    observers: Observers<HitEvent>,
    in_flight: Option<InFlight>,
    last_sequence: u64,
}

/// Progress of the current sequence, mirrored from its playback.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    sequence: u64,
    summary: HitSummary,
    remaining: usize,
}

impl HitPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&HitEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// True while a started sequence has not emitted its completion.
    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Closes the in-flight sequence, if any, as cancelled. Its playback
    /// finishes without settling anything further.
    pub fn abandon(&mut self) -> Option<HitSummary> {
        let stale = self.in_flight.take()?;
        let summary = HitSummary {
            cancelled: stale.remaining > 0,
            ..stale.summary
        };
        warn!(
            sequence = stale.sequence,
            remaining = stale.remaining,
            "hit sequence abandoned before completion"
        );
        self.notify(HitEvent::SequenceCompleted { summary });
        Some(summary)
    }

    /// Settles the whole sequence immediately.
    ///
    /// An empty sequence is a no-op returning zero counts without any
    /// notification.
    pub fn resolve(&mut self, registry: &mut EntityRegistry, hits: &[PeakHit]) -> HitSummary {
        let mut playback = self.begin(hits, Duration::ZERO);
        loop {
            if let StepOutcome::Finished(summary) = self.step(&mut playback, registry) {
                return summary;
            }
        }
    }

    /// Starts a sequence and returns its cursor.
    ///
    /// Out-of-order input is stably sorted into a copy and reported with
    /// [`HitEvent::SequenceReordered`]. `interval` is the pause
    /// [`advance`](Self::advance) inserts between settled hits. An unfinished
    /// earlier sequence is [abandoned](Self::abandon) first.
    pub fn begin(&mut self, hits: &[PeakHit], interval: Duration) -> HitPlayback {
        if hits.is_empty() {
            return HitPlayback::new(0, Vec::new(), interval);
        }

        self.abandon();

        let mut sorted = hits.to_vec();
        if !hits.is_sorted_by_key(|hit| hit.order) {
            warn!(
                hits = hits.len(),
                "hit sequence not ascending by order; settling a sorted copy"
            );
            sorted.sort_by_key(|hit| hit.order);
            self.notify(HitEvent::SequenceReordered { hits: hits.len() });
        }

        self.last_sequence += 1;
        let sequence = self.last_sequence;
        debug!(sequence, hits = sorted.len(), "hit sequence started");
        self.in_flight = Some(InFlight {
            sequence,
            summary: HitSummary::default(),
            remaining: sorted.len(),
        });
        self.notify(HitEvent::SequenceStarted {
            hits: sorted.clone(),
        });

        HitPlayback::new(sequence, sorted, interval)
    }

    /// Settles (or skips) the next hit. Once no hit is left, emits the
    /// completion notification and returns [`StepOutcome::Finished`]; further
    /// calls keep returning the same summary.
    ///
    /// A playback superseded by a later [`begin`](Self::begin) finishes as
    /// cancelled without another notification; its completion was already
    /// reported when it was abandoned.
    pub fn step(
        &mut self,
        playback: &mut HitPlayback,
        registry: &mut EntityRegistry,
    ) -> StepOutcome {
        if playback.finished {
            return StepOutcome::Finished(playback.summary);
        }

        if !self.is_current(playback) {
            playback.finished = true;
            playback.summary.cancelled = playback.remaining() > 0;
            debug!(sequence = playback.sequence, "superseded hit playback stepped; finishing");
            return StepOutcome::Finished(playback.summary);
        }

        let Some(hit) = playback.next_hit() else {
            return self.finish(playback);
        };

        let outcome = match self.resolve_hit(registry, &hit) {
            Ok(resolution) => {
                playback.summary.hits += 1;
                if resolution.died {
                    playback.summary.deaths += 1;
                }
                StepOutcome::Resolved(resolution)
            }
            Err(reason) => {
                playback.summary.skipped += 1;
                StepOutcome::Skipped { hit, reason }
            }
        };

        if let Some(current) = self.in_flight.as_mut() {
            current.summary = playback.summary;
            current.remaining = playback.remaining();
        }
        outcome
    }

    /// Frame-driven pacing: spends `elapsed` on the playback, settling a hit
    /// whenever the pause since the previous settled hit has run out.
    ///
    /// The first hit settles on the first call. Skipped hits do not consume
    /// an interval. Returns the number of steps taken during this call.
    pub fn advance(
        &mut self,
        playback: &mut HitPlayback,
        registry: &mut EntityRegistry,
        elapsed: Duration,
    ) -> usize {
        let mut budget = elapsed;
        let mut steps = 0;

        while !playback.finished {
            if playback.pending_delay > budget {
                playback.pending_delay -= budget;
                break;
            }
            budget -= playback.pending_delay;
            playback.pending_delay = Duration::ZERO;

            let outcome = self.step(playback, registry);
            steps += 1;
            if matches!(outcome, StepOutcome::Resolved(_)) && playback.remaining() > 0 {
                playback.pending_delay = playback.interval;
            }
        }

        steps
    }

    fn is_current(&self, playback: &HitPlayback) -> bool {
        self.in_flight.is_some_and(|current| current.sequence == playback.sequence)
    }

    fn finish(&mut self, playback: &mut HitPlayback) -> StepOutcome {
        playback.finished = true;
        playback.summary.cancelled = playback.cancel_requested && playback.remaining() > 0;
        self.in_flight = None;

        let summary = playback.summary;
        info!(
            hits = summary.hits,
            deaths = summary.deaths,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "hit sequence completed"
        );
        self.notify(HitEvent::SequenceCompleted { summary });
        StepOutcome::Finished(summary)
    }

    /// Settles one hit. The target is re-checked for every hit because an
    /// earlier hit of the same sequence may have killed it.
    fn resolve_hit(
        &mut self,
        registry: &mut EntityRegistry,
        hit: &PeakHit,
    ) -> Result<HitResolution, SkipReason> {
        let target = match hit.target {
            Some(target) if registry.contains(target) => target,
            _ => {
                warn!(order = hit.order, target = ?hit.target, "hit skipped: no resolvable target");
                return Err(SkipReason::NoTarget);
            }
        };

        let multiplier = registry.damage_taken_multiplier(target);

        let Some(vitals) = registry.vitals_mut(target) else {
            warn!(order = hit.order, %target, "hit skipped: target has no vitals");
            return Err(SkipReason::NoVitals);
        };

        if vitals.is_dead() {
            debug!(order = hit.order, %target, "hit skipped: target already dead");
            return Err(SkipReason::TargetDead);
        }

        let damage = hit.damage * multiplier;
        let died = vitals
            .try_take_damage(damage)
            .map(|report| report.died)
            .unwrap_or(false);

        let resolution = HitResolution {
            hit: hit.clone(),
            damage,
            health: vitals.health(),
            shield: vitals.shield(),
            died,
        };

        debug!(
            order = hit.order,
            %target,
            raw = hit.damage,
            damage,
            health = resolution.health,
            shield = resolution.shield,
            "hit resolved"
        );

        self.notify(HitEvent::HitResolved {
            hit: hit.clone(),
            health: resolution.health,
            shield: resolution.shield,
        });
        if died {
            self.notify(HitEvent::TargetDied { target });
        }

        Ok(resolution)
    }

    fn notify(&mut self, event: HitEvent) {
        self.observers.notify(&event);
    }
}
