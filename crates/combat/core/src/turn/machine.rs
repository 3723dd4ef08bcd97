use arrayvec::ArrayVec;
use tracing::{debug, warn};

use super::error::PhaseError;
use crate::config::CombatConfig;
use crate::observer::{Observers, SubscriptionId};

/// One stage of the turn loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    GameStart,
    TurnStart,
    TurnPlaying,
    TurnEnd,
}

/// Phase-entry notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseEvent {
    pub phase: TurnPhase,
    /// Turn number at the time of entry; 0 before the first turn starts.
    pub turn: u32,
}

/// Phases entered by one trigger, in entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseTransition {
    pub entered: ArrayVec<TurnPhase, { CombatConfig::MAX_PHASE_CASCADE }>,
}

impl PhaseTransition {
    pub fn iter(&self) -> impl Iterator<Item = TurnPhase> + '_ {
        self.entered.iter().copied()
    }

    /// Phase the machine rests in after the cascade.
    pub fn last(&self) -> Option<TurnPhase> {
        self.entered.last().copied()
    }
}

/// Drives GameStart → TurnStart → TurnPlaying → TurnEnd → TurnStart … with no
/// terminal state. Out-of-guard calls are rejected and leave the state as is.
///
/// A guarded transition can be run in one call (`start_game`, `end_turn`, …)
/// or stepped: the `request_*` form validates and queues the cascade, and
/// each [`enter_next`](Self::enter_next) enters exactly one phase. Stepping
/// lets an owner react to a phase before the machine moves past it.
#[derive(Debug, Default)]
pub struct TurnPhaseMachine {
    phase: TurnPhase,
    turn: u32,
    /// Phases the current cascade has yet to enter, next one last.
    pending: ArrayVec<TurnPhase, { CombatConfig::MAX_PHASE_CASCADE }>,
    observers: Observers<PhaseEvent>,
}

impl TurnPhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PhaseEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of turns started so far.
    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    /// A requested cascade still has phases to enter.
    pub fn is_cascading(&self) -> bool {
        !self.pending.is_empty()
    }

    // ========================================================================
    // Guarded transitions
    // ========================================================================

    /// GameStart → TurnStart → TurnPlaying. Only valid in `GameStart`.
    pub fn start_game(&mut self) -> Result<PhaseTransition, PhaseError> {
        self.request_start_game()?;
        Ok(self.run_cascade())
    }

    /// TurnStart → TurnPlaying, from `GameStart`, `TurnStart` or `TurnEnd`.
    pub fn start_turn(&mut self) -> Result<PhaseTransition, PhaseError> {
        self.request_start_turn()?;
        Ok(self.run_cascade())
    }

    /// TurnStart → TurnPlaying without the turn-start cascade. Only reachable
    /// after [`force_phase`](Self::force_phase) parked the machine in
    /// `TurnStart`.
    pub fn begin_play(&mut self) -> Result<PhaseTransition, PhaseError> {
        self.request_begin_play()?;
        Ok(self.run_cascade())
    }

    /// TurnPlaying → TurnEnd → TurnStart → TurnPlaying.
    pub fn end_turn(&mut self) -> Result<PhaseTransition, PhaseError> {
        self.request_end_turn()?;
        Ok(self.run_cascade())
    }

    // ========================================================================
    // Stepped transitions
    // ========================================================================

    pub fn request_start_game(&mut self) -> Result<(), PhaseError> {
        self.guard(TurnPhase::GameStart, &[TurnPhase::GameStart])?;
        self.queue(&[TurnPhase::GameStart, TurnPhase::TurnStart, TurnPhase::TurnPlaying]);
        Ok(())
    }

    pub fn request_start_turn(&mut self) -> Result<(), PhaseError> {
        self.guard(
            TurnPhase::TurnStart,
            &[TurnPhase::GameStart, TurnPhase::TurnStart, TurnPhase::TurnEnd],
        )?;
        self.queue(&[TurnPhase::TurnStart, TurnPhase::TurnPlaying]);
        Ok(())
    }

    pub fn request_begin_play(&mut self) -> Result<(), PhaseError> {
        self.guard(TurnPhase::TurnPlaying, &[TurnPhase::TurnStart])?;
        self.queue(&[TurnPhase::TurnPlaying]);
        Ok(())
    }

    pub fn request_end_turn(&mut self) -> Result<(), PhaseError> {
        self.guard(TurnPhase::TurnEnd, &[TurnPhase::TurnPlaying])?;
        self.queue(&[TurnPhase::TurnEnd, TurnPhase::TurnStart, TurnPhase::TurnPlaying]);
        Ok(())
    }

    /// Enters the next phase of the requested cascade and notifies
    /// subscribers. Returns `None` once the cascade is done.
    pub fn enter_next(&mut self) -> Option<TurnPhase> {
        let phase = self.pending.pop()?;
        if phase == TurnPhase::TurnStart {
            self.turn += 1;
        }
        self.enter(phase);
        Some(phase)
    }

    /// Debug override: jumps to `phase` without guards or cascades, dropping
    /// any cascade still pending. Still fires the phase-entry notification.
    pub fn force_phase(&mut self, phase: TurnPhase) {
        warn!(from = %self.phase, to = %phase, "phase forced");
        self.pending.clear();
        self.enter(phase);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn guard(&self, to: TurnPhase, allowed_from: &[TurnPhase]) -> Result<(), PhaseError> {
        if self.pending.is_empty() && allowed_from.contains(&self.phase) {
            return Ok(());
        }
        warn!(
            from = %self.phase,
            %to,
            cascading = !self.pending.is_empty(),
            "illegal phase transition rejected"
        );
        Err(PhaseError::IllegalTransition {
            from: self.phase,
            to,
        })
    }

    fn queue(&mut self, cascade: &[TurnPhase]) {
        self.pending.clear();
        for &phase in cascade.iter().rev() {
            self.pending.push(phase);
        }
    }

    fn run_cascade(&mut self) -> PhaseTransition {
        let mut transition = PhaseTransition::default();
        while let Some(phase) = self.enter_next() {
            transition.entered.push(phase);
        }
        transition
    }

    fn enter(&mut self, phase: TurnPhase) {
        self.phase = phase;
        debug!(%phase, turn = self.turn, "phase entered");
        self.observers.notify(&PhaseEvent {
            phase,
            turn: self.turn,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use strum::IntoEnumIterator;

    use TurnPhase::*;

    fn recorder(machine: &mut TurnPhaseMachine) -> Arc<Mutex<Vec<PhaseEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        machine.subscribe(move |event| sink.lock().unwrap().push(*event));
        log
    }

    fn phases(log: &Arc<Mutex<Vec<PhaseEvent>>>) -> Vec<TurnPhase> {
        log.lock().unwrap().iter().map(|event| event.phase).collect()
    }

    #[test]
    fn start_game_cascades_into_play() {
        let mut machine = TurnPhaseMachine::new();
        let log = recorder(&mut machine);

        let transition = machine.start_game().unwrap();

        assert_eq!(transition.entered.as_slice(), &[GameStart, TurnStart, TurnPlaying]);
        assert_eq!(phases(&log), vec![GameStart, TurnStart, TurnPlaying]);
        assert_eq!(machine.phase(), TurnPlaying);
        assert_eq!(machine.turn_number(), 1);
    }

    #[test]
    fn end_turn_loops_back_to_play() {
        let mut machine = TurnPhaseMachine::new();
        machine.start_game().unwrap();
        let log = recorder(&mut machine);

        for _ in 0..3 {
            let transition = machine.end_turn().unwrap();
            assert_eq!(transition.last(), Some(TurnPlaying));
        }

        assert_eq!(machine.turn_number(), 4);
        assert_eq!(phases(&log), [TurnEnd, TurnStart, TurnPlaying].repeat(3));
        let turns: Vec<_> = log.lock().unwrap().iter().map(|event| event.turn).collect();
        assert_eq!(turns, vec![1, 2, 2, 2, 3, 3, 3, 4, 4]);
    }

    #[test]
    fn guarded_transitions_reject_wrong_phase() {
        let mut machine = TurnPhaseMachine::new();
        let log = recorder(&mut machine);

        assert_eq!(
            machine.end_turn(),
            Err(PhaseError::IllegalTransition {
                from: GameStart,
                to: TurnEnd
            })
        );
        assert!(machine.begin_play().is_err());
        assert!(log.lock().unwrap().is_empty());

        machine.start_game().unwrap();
        assert!(machine.start_game().is_err());
        assert!(machine.start_turn().is_err());
        assert_eq!(machine.phase(), TurnPlaying);
    }

    #[test]
    fn start_turn_allowed_from_game_start_without_game_start_event() {
        let mut machine = TurnPhaseMachine::new();
        let log = recorder(&mut machine);

        machine.start_turn().unwrap();

        assert_eq!(phases(&log), vec![TurnStart, TurnPlaying]);
    }

    #[test]
    fn stepped_end_turn_enters_one_phase_per_call() {
        let mut machine = TurnPhaseMachine::new();
        machine.start_game().unwrap();
        let log = recorder(&mut machine);

        machine.request_end_turn().unwrap();
        assert!(log.lock().unwrap().is_empty());
        assert!(machine.is_cascading());

        assert_eq!(machine.enter_next(), Some(TurnEnd));
        assert_eq!(phases(&log), vec![TurnEnd]);
        assert_eq!(machine.turn_number(), 1);

        assert_eq!(machine.enter_next(), Some(TurnStart));
        assert_eq!(machine.turn_number(), 2);
        assert_eq!(machine.enter_next(), Some(TurnPlaying));
        assert_eq!(machine.enter_next(), None);
        assert!(!machine.is_cascading());
    }

    #[test]
    fn requests_are_rejected_while_a_cascade_is_pending() {
        let mut machine = TurnPhaseMachine::new();
        machine.request_start_game().unwrap();
        machine.enter_next();

        assert!(machine.request_start_turn().is_err());
        assert!(machine.end_turn().is_err());

        machine.enter_next();
        machine.enter_next();
        assert!(machine.end_turn().is_ok());
    }

    #[test]
    fn force_phase_bypasses_guards() {
        let mut machine = TurnPhaseMachine::new();
        let log = recorder(&mut machine);

        for phase in TurnPhase::iter() {
            machine.force_phase(phase);
            assert_eq!(machine.phase(), phase);
        }
        assert_eq!(phases(&log), vec![GameStart, TurnStart, TurnPlaying, TurnEnd]);

        machine.force_phase(TurnStart);
        assert_eq!(machine.begin_play().unwrap().entered.as_slice(), &[TurnPlaying]);
    }
}
