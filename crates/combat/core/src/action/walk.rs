//! Movement within the actor's reachable cells.

use thiserror::Error;

use crate::action::ActionTransition;
use crate::env::CombatEnv;
use crate::rules::{self, RuleViolation};
use crate::state::{ActorId, CombatState, Facing, Position};

/// Move the actor to an open cell inside this turn's move range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkAction {
    pub actor: ActorId,
    pub to: Position,
}

/// Where the walk started and ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkOutcome {
    pub actor: ActorId,
    pub from: Position,
    pub to: Position,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    /// The occupancy table had no entry for the actor's recorded position.
    #[error("occupancy entry for actor {actor} at {position} is missing")]
    OccupancyDesync { actor: ActorId, position: Position },
}

impl ActionTransition for WalkAction {
    type Error = WalkError;
    type Outcome = WalkOutcome;

    fn actor(&self) -> ActorId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        rules::can_walk(state, env, self.actor, self.to)?;
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        _env: &CombatEnv<'_>,
    ) -> Result<Self::Outcome, Self::Error> {
        let from = state
            .actor(self.actor)
            .ok_or(RuleViolation::UnknownActor(self.actor))?
            .position;

        if !state.occupancy.remove_occupant(&from, self.actor) {
            return Err(WalkError::OccupancyDesync {
                actor: self.actor,
                position: from,
            });
        }
        if !state.occupancy.add_occupant(self.to, self.actor) {
            // Put the source entry back; a failed walk must not leave the
            // actor absent from the occupancy table.
            state.occupancy.add_occupant(from, self.actor);
            return Err(RuleViolation::DestinationBlocked(self.to).into());
        }

        let actor = state
            .actor_mut(self.actor)
            .ok_or(RuleViolation::UnknownActor(self.actor))?;
        actor.position = self.to;
        if self.to.x != from.x {
            actor.facing = if self.to.x < from.x {
                Facing::Left
            } else {
                Facing::Right
            };
        }

        if let Some(turn) = state.round.turn_of_mut(self.actor) {
            turn.moved = true;
        }

        Ok(WalkOutcome {
            actor: self.actor,
            from,
            to: self.to,
        })
    }

    fn post_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        debug_assert_eq!(state.occupancy.position_of(self.actor), Some(self.to));
        debug_assert_eq!(
            state.actor(self.actor).map(|actor| actor.position),
            Some(self.to)
        );
        Ok(())
    }
}
