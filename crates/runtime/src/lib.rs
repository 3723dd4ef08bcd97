//! Async runtime around the deterministic combat core.
//!
//! [`CombatHandle`] owns a [`combat_core::Battle`] behind a cloneable façade,
//! forwards every component notification onto a topic-based [`EventBus`], and
//! paces hit playback against tokio timers.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the handle and paced playback
//! - [`events`] provides the topic-based event bus
//! - [`config`] and [`logging`] cover process-level setup
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod runtime;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, Topic};
pub use runtime::CombatHandle;
