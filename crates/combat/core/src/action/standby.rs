//! Turn forfeiture.

use thiserror::Error;

use crate::action::ActionTransition;
use crate::env::CombatEnv;
use crate::rules::RuleViolation;
use crate::state::{ActorId, CombatState};

/// End the actor's turn without further input.
///
/// Unlike walking and attacking this is open to stunned actors: passing is
/// the one thing a stunned actor can still do, and the phase machine issues
/// it on their behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandbyAction {
    pub actor: ActorId,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandbyError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl ActionTransition for StandbyAction {
    type Error = StandbyError;
    type Outcome = ();

    fn actor(&self) -> ActorId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        let actor = state
            .actor(self.actor)
            .ok_or(RuleViolation::UnknownActor(self.actor))?;
        if !actor.is_alive() {
            return Err(RuleViolation::Defeated(self.actor).into());
        }
        if state.active_actor() != Some(self.actor) {
            return Err(RuleViolation::NotActorsTurn(self.actor).into());
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        _env: &CombatEnv<'_>,
    ) -> Result<Self::Outcome, Self::Error> {
        let turn = state
            .round
            .turn_of_mut(self.actor)
            .ok_or(RuleViolation::NotActorsTurn(self.actor))?;
        turn.finish();
        Ok(())
    }

    fn post_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        debug_assert_ne!(state.active_actor(), Some(self.actor));
        Ok(())
    }
}
