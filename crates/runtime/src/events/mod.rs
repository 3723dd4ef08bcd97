//! Topic-based event bus for combat notifications.
//!
//! Every observer list in the core (hit pipeline, phase machine, and each
//! entity's vitals and modifier engine) is bridged onto one of the bus
//! topics, so consumers subscribe only to the streams they render.

mod bus;

pub use bus::{Event, EventBus, Topic};
