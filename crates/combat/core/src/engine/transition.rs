//! Transition dispatch and the three-phase execution pipeline.

use crate::action::{Action, ActionTransition};
use crate::env::CombatEnv;
use crate::state::CombatState;

use super::ActionResult;
use super::errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
use super::phase::{Phase, PhaseAction};

/// Runs a transition through the three-phase pipeline.
///
/// Phases:
/// 1. `pre_validate` - check preconditions before mutation
/// 2. `apply` - mutate the combat state and return the outcome
/// 3. `post_validate` - verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut CombatState,
    env: &CombatEnv<'_>,
) -> Result<T::Outcome, TransitionPhaseError<T::Error>>
where
    T: ActionTransition,
{
    transition
        .pre_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let outcome = transition
        .apply(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(outcome)
}

/// Routes an action to its transition and wraps the outcome.
pub(super) fn execute_action(
    action: &Action,
    state: &mut CombatState,
    env: &CombatEnv<'_>,
) -> Result<ActionResult, ExecuteError> {
    match action {
        Action::Walk(transition) => {
            let outcome = drive_transition(transition, state, env).map_err(ExecuteError::Walk)?;
            Ok(ActionResult::Walk(outcome))
        }
        Action::Attack(transition) => {
            let report = drive_transition(transition, state, env).map_err(ExecuteError::Attack)?;
            Ok(ActionResult::Attack(report))
        }
        Action::SelectSkill(transition) => {
            drive_transition(transition, state, env).map_err(ExecuteError::SelectSkill)?;
            Ok(ActionResult::SkillSelected)
        }
        Action::Standby(transition) => {
            drive_transition(transition, state, env).map_err(ExecuteError::Standby)?;
            Ok(ActionResult::Standby)
        }
    }
}

/// Runs a lifecycle phase through the same pipeline as actions.
pub(super) fn execute_phase(
    phase: Phase,
    state: &mut CombatState,
    env: &CombatEnv<'_>,
) -> Result<ActionResult, ExecuteError> {
    let transition = PhaseAction::new(phase);
    let outcome = drive_transition(&transition, state, env).map_err(ExecuteError::Phase)?;
    Ok(ActionResult::Phase(outcome))
}
