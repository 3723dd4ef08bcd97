//! Turn/phase state machine driving the combat loop.
//!
//! ```text
//! GameStart ──start_game──▶ TurnStart ─(auto)─▶ TurnPlaying
//!                              ▲                    │
//!                              └──(auto)── TurnEnd ◀┘ end_turn
//! ```
//!
//! Every guarded transition returns the phases it entered, in order. The
//! battle loop instead steps the cascade (`request_*` then `enter_next`) so it
//! can react to each phase before the next one is announced.

mod error;
mod machine;

pub use error::PhaseError;
pub use machine::{PhaseEvent, PhaseTransition, TurnPhase, TurnPhaseMachine};
