//! Player- and AI-issued combat actions.
//!
//! Every mutation of [`CombatState`] during an actor's turn flows through an
//! [`ActionTransition`]: a three-phase pipeline of `pre_validate` (rules
//! checked against the untouched state), `apply` (the mutation itself), and
//! `post_validate` (consistency checks on the result). The engine drives the
//! pipeline; actions never run themselves.
//!
//! Four actions exist:
//!
//! - [`WalkAction`]: move within this turn's reachable cells.
//! - [`AttackAction`]: strike or cast at an enemy, basic or skill-based.
//! - [`SelectSkillAction`]: pick the skill a later attack this turn will use.
//! - [`StandbyAction`]: end the turn without further input.

pub mod attack;
pub mod select;
pub mod standby;
pub mod walk;

pub use attack::{AttackAction, AttackError, AttackReport};
pub use select::{SelectSkillAction, SelectSkillError};
pub use standby::{StandbyAction, StandbyError};
pub use walk::{WalkAction, WalkError, WalkOutcome};

use crate::env::CombatEnv;
use crate::state::{ActorId, CombatState, Position, SkillId};

/// Defines how a concrete action variant mutates combat state.
///
/// `pre_validate` sees the state **before** mutation, `post_validate` the
/// state **after**. `apply` must either complete fully or leave the state as
/// it found it; a half-applied action is a bug the engine cannot repair.
pub trait ActionTransition {
    type Error;
    type Outcome;

    /// The actor performing this action.
    fn actor(&self) -> ActorId;

    /// Validates pre-conditions against the unmutated state.
    fn pre_validate(&self, _state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the action by mutating the combat state.
    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
    ) -> Result<Self::Outcome, Self::Error>;

    /// Validates post-conditions against the mutated state.
    fn post_validate(&self, _state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Union of every submittable action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Walk(WalkAction),
    Attack(AttackAction),
    SelectSkill(SelectSkillAction),
    Standby(StandbyAction),
}

impl Action {
    /// Walk `actor` to `to`.
    pub fn walk(actor: ActorId, to: Position) -> Self {
        Self::Walk(WalkAction { actor, to })
    }

    /// Basic attack on `target`, or through the turn's selected skill if one
    /// was picked earlier.
    pub fn attack(actor: ActorId, target: ActorId) -> Self {
        Self::Attack(AttackAction {
            actor,
            target,
            skill: None,
        })
    }

    /// Attack `target` through a specific skill.
    pub fn cast(actor: ActorId, target: ActorId, skill: SkillId) -> Self {
        Self::Attack(AttackAction {
            actor,
            target,
            skill: Some(skill),
        })
    }

    /// Record the skill a later [`Action::attack`] this turn should use.
    pub fn select_skill(actor: ActorId, skill: Option<SkillId>) -> Self {
        Self::SelectSkill(SelectSkillAction { actor, skill })
    }

    /// End the turn.
    pub fn standby(actor: ActorId) -> Self {
        Self::Standby(StandbyAction { actor })
    }

    /// The actor performing this action.
    pub fn actor(&self) -> ActorId {
        match self {
            Self::Walk(action) => action.actor,
            Self::Attack(action) => action.actor,
            Self::SelectSkill(action) => action.actor,
            Self::Standby(action) => action.actor,
        }
    }
}
