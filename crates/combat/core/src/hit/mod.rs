//! Ordered peak-hit settlement.
//!
//! An external wave layer produces [`PeakHit`]s; the [`HitPipeline`] settles
//! them one at a time against entity vitals, applying each target's
//! damage-taken multiplier on the way in.
//!
//! # Playback
//!
//! - **Immediate**: [`HitPipeline::resolve`] runs the whole sequence now
//! - **Step-driven**: [`HitPipeline::begin`] returns a [`HitPlayback`] cursor
//!   that [`HitPipeline::step`] advances one hit at a time, or that
//!   [`HitPipeline::advance`] paces against elapsed frame time
//!
//! Both modes share the same per-hit routine, so they emit identical
//! notification sequences and counts.

mod descriptor;
mod pipeline;
mod playback;

pub use descriptor::{HitResolution, HitSummary, PeakHit, SkipReason};
pub use pipeline::{HitEvent, HitPipeline, StepOutcome};
pub use playback::HitPlayback;
