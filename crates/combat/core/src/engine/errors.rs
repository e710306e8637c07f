//! Error types for the action execution pipeline.

use crate::action::{
    ActionTransition, AttackAction, SelectSkillAction, StandbyAction, WalkAction,
};
use crate::state::ActorId;

use super::phase::PhaseAction;

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while executing an event through the combat engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("walk action failed: {0}")]
    Walk(TransitionPhaseError<<WalkAction as ActionTransition>::Error>),

    #[error("attack action failed: {0}")]
    Attack(TransitionPhaseError<<AttackAction as ActionTransition>::Error>),

    #[error("select skill action failed: {0}")]
    SelectSkill(TransitionPhaseError<<SelectSkillAction as ActionTransition>::Error>),

    #[error("standby action failed: {0}")]
    Standby(TransitionPhaseError<<StandbyAction as ActionTransition>::Error>),

    #[error("phase transition failed: {0}")]
    Phase(TransitionPhaseError<<PhaseAction as ActionTransition>::Error>),

    #[error(
        "invalid actor: action actor {actor} does not match current turn actor {current:?}"
    )]
    ActorNotCurrent {
        actor: ActorId,
        current: Option<ActorId>,
    },
}
