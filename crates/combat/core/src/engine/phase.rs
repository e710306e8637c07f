//! Round and turn lifecycle, expressed as system transitions.
//!
//! The scheduler never mutates the state by hand: each lifecycle step is a
//! [`PhaseAction`] pushed through the same three-phase pipeline as player
//! actions, so every turn activation and effect tick advances the nonce and
//! produces a delta. A resolver reports the follow-up phase to enqueue;
//! chaining happens in the runtime's queue, never by recursion here.

use thiserror::Error;

use crate::action::ActionTransition;
use crate::effect::{TickOutcome, tick_effects};
use crate::env::CombatEnv;
use crate::rules;
use crate::state::{ActorId, CombatState, Round, RoundStatus, TurnStatus};

/// One step of the round/turn lifecycle.
///
/// `GameInit` runs once per combat; the rest cycle per round and per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Build the first round from the living roster.
    GameInit,
    /// Order the turn list and activate the first turn.
    RoundStart,
    /// Tick the actor's effects and open the turn for input.
    TurnStart(ActorId),
    /// Post-attack window: the actor may still take the short step.
    TurnSecond(ActorId),
    /// Tick cooldowns, close the turn, activate the next one.
    TurnEnd(ActorId),
    /// Close the round and stage the next one unless the fight is over.
    RoundEnd,
}

impl Phase {
    /// Actor this phase concerns, for the per-turn phases.
    pub fn actor(self) -> Option<ActorId> {
        match self {
            Self::TurnStart(actor) | Self::TurnSecond(actor) | Self::TurnEnd(actor) => Some(actor),
            Self::GameInit | Self::RoundStart | Self::RoundEnd => None,
        }
    }
}

/// What a phase resolver did and what should run next.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseOutcome {
    pub phase: Phase,
    /// Follow-up phase for the scheduler to enqueue. `None` while the
    /// machine waits for an action, or once the fight is decided.
    pub next: Option<Phase>,
    /// Periodic effect results from a start-of-turn tick.
    pub tick: Option<TickOutcome>,
    /// Actor a start-of-turn effect removed from the board.
    pub defeated: Option<ActorId>,
}

impl PhaseOutcome {
    fn new(phase: Phase, next: Option<Phase>) -> Self {
        Self {
            phase,
            next,
            tick: None,
            defeated: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseError {
    #[error("actor {0} is not part of this combat")]
    UnknownActor(ActorId),

    /// The phase was delivered against a round or turn in the wrong state,
    /// e.g. a turn start for a turn that is already done.
    #[error("{phase} does not apply to the current combat state")]
    OutOfOrder { phase: Phase },
}

/// System transition advancing the round/turn lifecycle by one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseAction {
    pub phase: Phase,
}

impl PhaseAction {
    pub fn new(phase: Phase) -> Self {
        Self { phase }
    }

    fn out_of_order(&self) -> PhaseError {
        PhaseError::OutOfOrder { phase: self.phase }
    }

    fn game_init(&self, state: &mut CombatState) -> PhaseOutcome {
        let round = Round::ordered(state.round.number, state.living_actors());
        state.round = round;
        PhaseOutcome::new(self.phase, Some(Phase::RoundStart))
    }

    fn round_start(&self, state: &mut CombatState) -> PhaseOutcome {
        // Reorder from the living roster at start time; deaths between
        // staging and starting drop out here.
        let mut round = Round::ordered(state.round.number, state.living_actors());
        round.status = RoundStatus::InProgress;

        let next = match round.next_pending_mut() {
            Some(turn) => {
                turn.activate();
                Some(Phase::TurnStart(turn.actor))
            }
            None => Some(Phase::RoundEnd),
        };
        state.round = round;
        PhaseOutcome::new(self.phase, next)
    }

    fn turn_start(
        &self,
        state: &mut CombatState,
        actor: ActorId,
    ) -> Result<PhaseOutcome, PhaseError> {
        let actor_state = state
            .actor_mut(actor)
            .ok_or(PhaseError::UnknownActor(actor))?;
        let was_alive = actor_state.is_alive();
        let tick = tick_effects(actor_state);
        let survived = actor_state.is_alive();
        let position = actor_state.position;

        if let Some(turn) = state.round.turn_of_mut(actor) {
            turn.acted = false;
            turn.moved = false;
            turn.selected_skill = None;
        }

        let mut outcome = if survived {
            // Turn is open; the next event is whatever the actor decides.
            PhaseOutcome::new(self.phase, None)
        } else {
            // The dead take no turns: chain straight to the turn end. Only a
            // death caused by this tick is reported; an actor killed earlier
            // was swept off the board back then.
            let mut outcome = PhaseOutcome::new(self.phase, Some(Phase::TurnEnd(actor)));
            if was_alive {
                state.occupancy.remove_occupant(&position, actor);
                outcome.defeated = Some(actor);
            }
            outcome
        };
        outcome.tick = Some(tick);
        Ok(outcome)
    }

    fn turn_second(&self, state: &CombatState, actor: ActorId) -> PhaseOutcome {
        // Pure window marker. If the turn closed while this phase was in
        // flight, chain straight to the turn end.
        let done = state
            .round
            .turn_of(actor)
            .is_some_and(|turn| turn.status == TurnStatus::Done);
        let next = done.then_some(Phase::TurnEnd(actor));
        PhaseOutcome::new(self.phase, next)
    }

    fn turn_end(
        &self,
        state: &mut CombatState,
        actor: ActorId,
    ) -> Result<PhaseOutcome, PhaseError> {
        if let Some(actor_state) = state.actor_mut(actor) {
            actor_state.tick_cooldowns();
        }
        state
            .round
            .turn_of_mut(actor)
            .ok_or(self.out_of_order())?
            .finish();

        let next = match state.round.next_pending_mut() {
            Some(turn) => {
                turn.activate();
                Phase::TurnStart(turn.actor)
            }
            None => Phase::RoundEnd,
        };
        Ok(PhaseOutcome::new(self.phase, Some(next)))
    }

    fn round_end(&self, state: &mut CombatState) -> PhaseOutcome {
        state.round.status = RoundStatus::Complete;
        if rules::is_game_over(state) {
            return PhaseOutcome::new(self.phase, None);
        }

        let staged = Round::ordered(state.round.number + 1, state.living_actors());
        state.round = staged;
        PhaseOutcome::new(self.phase, Some(Phase::RoundStart))
    }
}

impl ActionTransition for PhaseAction {
    type Error = PhaseError;
    type Outcome = PhaseOutcome;

    fn actor(&self) -> ActorId {
        ActorId::SYSTEM
    }

    fn pre_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        match self.phase {
            Phase::GameInit => {
                if state.round.status != RoundStatus::Pending || !state.round.turns.is_empty() {
                    return Err(self.out_of_order());
                }
            }
            Phase::RoundStart => {
                if state.round.status != RoundStatus::Pending {
                    return Err(self.out_of_order());
                }
            }
            Phase::TurnStart(actor) => {
                if state.actor(actor).is_none() {
                    return Err(PhaseError::UnknownActor(actor));
                }
                let active = state
                    .round
                    .turn_of(actor)
                    .is_some_and(|turn| turn.status == TurnStatus::Active);
                if !active {
                    return Err(self.out_of_order());
                }
            }
            Phase::TurnSecond(actor) | Phase::TurnEnd(actor) => {
                if state.round.turn_of(actor).is_none() {
                    return Err(self.out_of_order());
                }
            }
            Phase::RoundEnd => {
                if state.round.status != RoundStatus::InProgress {
                    return Err(self.out_of_order());
                }
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        _env: &CombatEnv<'_>,
    ) -> Result<Self::Outcome, Self::Error> {
        match self.phase {
            Phase::GameInit => Ok(self.game_init(state)),
            Phase::RoundStart => Ok(self.round_start(state)),
            Phase::TurnStart(actor) => self.turn_start(state, actor),
            Phase::TurnSecond(actor) => Ok(self.turn_second(state, actor)),
            Phase::TurnEnd(actor) => self.turn_end(state, actor),
            Phase::RoundEnd => Ok(self.round_end(state)),
        }
    }

    fn post_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        match self.phase {
            Phase::RoundStart => debug_assert_eq!(state.round.status, RoundStatus::InProgress),
            Phase::TurnEnd(actor) => debug_assert!(
                state
                    .round
                    .turn_of(actor)
                    .is_none_or(|turn| turn.status == TurnStatus::Done),
                "turn end must close the turn"
            ),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectSpec;
    use crate::env::Env;
    use crate::state::{
        ActiveEffect, ActorState, CombatStats, EffectId, OwnerId, Position, SkillId,
    };

    fn runner(id: u32, owner: u32, speed: u32, position: Position) -> ActorState {
        ActorState::builder(ActorId(id), OwnerId(owner))
            .position(position)
            .hp(60)
            .stats(CombatStats {
                speed,
                ..CombatStats::default()
            })
            .build()
    }

    fn fresh_state() -> CombatState {
        let mut state = CombatState::new(3);
        state
            .add_actor(runner(1, 0, 4, Position::new(0, 0)))
            .unwrap();
        state
            .add_actor(runner(2, 1, 9, Position::new(4, 0)))
            .unwrap();
        state
    }

    fn resolve(state: &mut CombatState, phase: Phase) -> PhaseOutcome {
        let env = Env::empty();
        let action = PhaseAction::new(phase);
        action.pre_validate(state, &env).unwrap();
        let outcome = action.apply(state, &env).unwrap();
        action.post_validate(state, &env).unwrap();
        outcome
    }

    #[test]
    fn lifecycle_walks_init_to_first_turn() {
        let mut state = fresh_state();

        let init = resolve(&mut state, Phase::GameInit);
        assert_eq!(init.next, Some(Phase::RoundStart));
        assert_eq!(state.round.turns.len(), 2);

        let start = resolve(&mut state, Phase::RoundStart);
        // Fastest actor opens the round.
        assert_eq!(start.next, Some(Phase::TurnStart(ActorId(2))));
        assert_eq!(state.round.status, RoundStatus::InProgress);
        assert_eq!(state.active_actor(), Some(ActorId(2)));

        let turn = resolve(&mut state, Phase::TurnStart(ActorId(2)));
        // Nothing ticking, turn stays open for input.
        assert_eq!(turn.next, None);
        assert_eq!(turn.tick, Some(TickOutcome::default()));
    }

    #[test]
    fn turn_end_activates_the_next_turn_then_the_round_closes() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);
        resolve(&mut state, Phase::RoundStart);

        let end = resolve(&mut state, Phase::TurnEnd(ActorId(2)));
        assert_eq!(end.next, Some(Phase::TurnStart(ActorId(1))));
        assert_eq!(state.active_actor(), Some(ActorId(1)));

        let last = resolve(&mut state, Phase::TurnEnd(ActorId(1)));
        assert_eq!(last.next, Some(Phase::RoundEnd));

        let round_end = resolve(&mut state, Phase::RoundEnd);
        assert_eq!(round_end.next, Some(Phase::RoundStart));
        // The next round is staged pending with a fresh turn list.
        assert_eq!(state.round.number, 2);
        assert_eq!(state.round.status, RoundStatus::Pending);
        assert_eq!(state.round.turns.len(), 2);
    }

    #[test]
    fn turn_start_ticks_effects_and_skips_the_dead() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);
        resolve(&mut state, Phase::RoundStart);

        // A DOT worth more than the actor's remaining hp.
        state
            .actor_mut(ActorId(2))
            .unwrap()
            .effects
            .insert(ActiveEffect::new(EffectSpec::dot(EffectId(7), 80, 2)));

        let outcome = resolve(&mut state, Phase::TurnStart(ActorId(2)));
        assert_eq!(outcome.next, Some(Phase::TurnEnd(ActorId(2))));
        assert_eq!(outcome.defeated, Some(ActorId(2)));
        assert_eq!(outcome.tick.unwrap().dot_damage, 80);
        assert!(!state.actor(ActorId(2)).unwrap().is_alive());
        assert_eq!(state.occupancy.position_of(ActorId(2)), None);
    }

    #[test]
    fn round_end_stops_chaining_once_a_side_is_wiped() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);
        resolve(&mut state, Phase::RoundStart);
        state.actor_mut(ActorId(2)).unwrap().hp.deplete(60);
        resolve(&mut state, Phase::TurnEnd(ActorId(2)));
        resolve(&mut state, Phase::TurnEnd(ActorId(1)));

        let outcome = resolve(&mut state, Phase::RoundEnd);
        assert_eq!(outcome.next, None);
        assert_eq!(state.round.status, RoundStatus::Complete);
    }

    #[test]
    fn cooldowns_tick_at_turn_end() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);
        resolve(&mut state, Phase::RoundStart);
        state
            .actor_mut(ActorId(2))
            .unwrap()
            .set_cooldown(SkillId(4), 2);

        resolve(&mut state, Phase::TurnEnd(ActorId(2)));
        assert_eq!(
            state
                .actor(ActorId(2))
                .unwrap()
                .cooldown_remaining(SkillId(4)),
            1
        );
    }

    #[test]
    fn phases_out_of_order_are_rejected() {
        let mut state = fresh_state();
        let env = Env::empty();

        // Round start before init ordered the turns: the round is pending
        // and empty, which round start tolerates, but a turn start is not.
        assert!(matches!(
            PhaseAction::new(Phase::TurnStart(ActorId(1))).pre_validate(&state, &env),
            Err(PhaseError::OutOfOrder { .. })
        ));

        resolve(&mut state, Phase::GameInit);
        assert!(matches!(
            PhaseAction::new(Phase::GameInit).pre_validate(&state, &env),
            Err(PhaseError::OutOfOrder { .. })
        ));
        assert!(matches!(
            PhaseAction::new(Phase::RoundEnd).pre_validate(&state, &env),
            Err(PhaseError::OutOfOrder { .. })
        ));

        resolve(&mut state, Phase::RoundStart);
        assert!(matches!(
            PhaseAction::new(Phase::TurnStart(ActorId(1))).pre_validate(&state, &env),
            Err(PhaseError::OutOfOrder { .. })
        ));
        assert!(matches!(
            PhaseAction::new(Phase::TurnStart(ActorId(99))).pre_validate(&state, &env),
            Err(PhaseError::UnknownActor(ActorId(99)))
        ));
    }

    #[test]
    fn second_window_chains_to_turn_end_when_the_turn_is_done() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);
        resolve(&mut state, Phase::RoundStart);

        let open = resolve(&mut state, Phase::TurnSecond(ActorId(2)));
        assert_eq!(open.next, None);

        state.round.turn_of_mut(ActorId(2)).unwrap().finish();
        let closed = resolve(&mut state, Phase::TurnSecond(ActorId(2)));
        assert_eq!(closed.next, Some(Phase::TurnEnd(ActorId(2))));
    }

    #[test]
    fn stale_round_state_never_survives_round_start() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);

        // Kill one actor after staging; the started round must drop them.
        state.actor_mut(ActorId(1)).unwrap().hp.deplete(60);
        let outcome = resolve(&mut state, Phase::RoundStart);
        assert_eq!(state.round.turns.len(), 1);
        assert_eq!(outcome.next, Some(Phase::TurnStart(ActorId(2))));
    }

    #[test]
    fn empty_lifecycle_declares_the_round_over() {
        let mut state = fresh_state();
        resolve(&mut state, Phase::GameInit);
        state.actor_mut(ActorId(1)).unwrap().hp.deplete(60);
        state.actor_mut(ActorId(2)).unwrap().hp.deplete(60);

        let outcome = resolve(&mut state, Phase::RoundStart);
        assert_eq!(outcome.next, Some(Phase::RoundEnd));

        let ended = resolve(&mut state, Phase::RoundEnd);
        assert_eq!(ended.next, None);
    }
}
