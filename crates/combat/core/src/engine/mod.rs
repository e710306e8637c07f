//! Action execution pipeline and the round/turn state machine.
//!
//! The [`CombatEngine`] is the authoritative reducer for [`CombatState`].
//! Every mutation, player actions and lifecycle phases alike, flows through
//! the same three-phase pipeline, increments the event nonce, and yields a
//! [`StateDelta`] describing what changed. The engine never schedules on its
//! own: phase chaining is the caller's job, fed by
//! [`PhaseOutcome::next`](phase::PhaseOutcome::next).

mod errors;
pub mod phase;
mod transition;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
pub use phase::{Phase, PhaseAction, PhaseError, PhaseOutcome};

use crate::action::{Action, AttackReport, WalkOutcome};
use crate::env::CombatEnv;
use crate::state::{CombatState, StateDelta};

/// Action-specific payload of an executed event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionResult {
    Walk(WalkOutcome),
    Attack(AttackReport),
    SkillSelected,
    Standby,
    Phase(PhaseOutcome),
}

/// Complete outcome of one executed event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionOutcome {
    /// State change metadata (which fields changed, for whom).
    pub delta: StateDelta,

    /// Event-specific payload: strike reports, phase follow-ups, and so on.
    pub result: ActionResult,
}

/// Authoritative reducer driving all combat state mutation.
///
/// Player and AI actions go through [`execute`](Self::execute); lifecycle
/// phases through [`execute_phase`](Self::execute_phase). Both paths share
/// the pre_validate → apply → post_validate pipeline, so a passing event is
/// fully applied and a failing one leaves the state untouched.
pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    /// Executes a submitted action.
    ///
    /// The actor must own the currently active turn slot; the engine checks
    /// this before the action's own validation runs.
    pub fn execute(
        &mut self,
        env: &CombatEnv<'_>,
        action: &Action,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        self.validate_actor(action)?;

        let before = self.state.clone();
        let result = transition::execute_action(action, self.state, env)?;
        self.state.nonce += 1;

        Ok(ExecutionOutcome {
            delta: StateDelta::from_states(&before, self.state),
            result,
        })
    }

    /// Executes a round/turn lifecycle phase.
    pub fn execute_phase(
        &mut self,
        env: &CombatEnv<'_>,
        phase: Phase,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let before = self.state.clone();
        let result = transition::execute_phase(phase, self.state, env)?;
        self.state.nonce += 1;

        Ok(ExecutionOutcome {
            delta: StateDelta::from_states(&before, self.state),
            result,
        })
    }

    /// Rejects actions submitted out of turn before any pipeline work.
    fn validate_actor(&self, action: &Action) -> Result<(), ExecuteError> {
        let current = self.state.active_actor();
        if current != Some(action.actor()) {
            return Err(ExecuteError::ActorNotCurrent {
                actor: action.actor(),
                current,
            });
        }
        Ok(())
    }
}
