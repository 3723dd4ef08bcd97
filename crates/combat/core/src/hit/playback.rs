//! Cursor over a hit sequence being settled.

use std::time::Duration;

use super::descriptor::{HitSummary, PeakHit};

/// In-flight hit sequence.
///
/// Holds a sorted copy of the caller's hits, so the caller's collection is
/// never reordered. Created by [`HitPipeline::begin`](super::HitPipeline::begin)
/// and driven by the pipeline's `step`/`advance`. A playback only advances
/// while it is the pipeline's current sequence; once superseded it finishes
/// as cancelled on its next step.
#[derive(Clone, Debug)]
pub struct HitPlayback {
    /// Pipeline-assigned id; 0 for the empty sequence, which is never in flight.
    pub(super) sequence: u64,
    pub(super) hits: Vec<PeakHit>,
    pub(super) cursor: usize,
    pub(super) summary: HitSummary,
    pub(super) interval: Duration,
    pub(super) pending_delay: Duration,
    pub(super) cancel_requested: bool,
    pub(super) finished: bool,
}

impl HitPlayback {
    pub(super) fn new(sequence: u64, hits: Vec<PeakHit>, interval: Duration) -> Self {
        let finished = hits.is_empty();
        Self {
            sequence,
            hits,
            cursor: 0,
            summary: HitSummary::default(),
            interval,
            pending_delay: Duration::ZERO,
            cancel_requested: false,
            finished,
        }
    }

    /// Hits in settlement order.
    pub fn hits(&self) -> &[PeakHit] {
        &self.hits
    }

    /// Hits not yet settled or skipped.
    pub fn remaining(&self) -> usize {
        self.hits.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Counts so far; final once the playback is finished.
    pub fn summary(&self) -> HitSummary {
        self.summary
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the sequence before its next hit. The completion notification
    /// still fires, with `cancelled` set.
    pub fn cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub(super) fn next_hit(&mut self) -> Option<PeakHit> {
        if self.cancel_requested {
            return None;
        }
        let hit = self.hits.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(hit)
    }
}
