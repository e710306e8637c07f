//! Skill selection for the current turn.

use thiserror::Error;

use crate::action::ActionTransition;
use crate::env::CombatEnv;
use crate::rules::{self, RuleViolation};
use crate::state::{ActorId, CombatState, SkillId};

/// Record which skill a later attack this turn should use.
///
/// `None` reverts to the basic attack. The selection is advisory until an
/// [`AttackAction`](crate::action::AttackAction) without an explicit skill
/// consumes it; selecting never spends resources or cooldowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectSkillAction {
    pub actor: ActorId,
    pub skill: Option<SkillId>,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectSkillError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl ActionTransition for SelectSkillAction {
    type Error = SelectSkillError;
    type Outcome = ();

    fn actor(&self) -> ActorId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        match self.skill {
            Some(skill) => rules::can_select_skill(state, env, self.actor, skill)?,
            // Clearing back to the basic attack only needs an active turn.
            None => {
                let active = state.active_actor() == Some(self.actor);
                if !active {
                    return Err(RuleViolation::NotActorsTurn(self.actor).into());
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
        let turn = state
            .round
            .turn_of_mut(self.actor)
            .ok_or(RuleViolation::NotActorsTurn(self.actor))?;
        turn.selected_skill = self.skill;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::effect::{DamageType, EffectSpec};
    use crate::env::{
        Env, MapDimensions, MapOracle, SkillCategory, SkillOracle, SkillRange, SkillSpec, Terrain,
        Tile,
    };
    use crate::state::{ActorState, EffectId, OwnerId, Position, Round};

    struct FieldMap;

    impl MapOracle for FieldMap {
        fn dimensions(&self) -> MapDimensions {
            MapDimensions::new(6, 4)
        }

        fn tile(&self, position: Position) -> Option<Tile> {
            self.dimensions()
                .contains(position)
                .then_some(Tile::new(Terrain::Field))
        }
    }

    struct OneSkill(SkillSpec);

    impl SkillOracle for OneSkill {
        fn skill(&self, id: SkillId) -> Option<SkillSpec> {
            (self.0.id == id).then(|| self.0.clone())
        }
    }

    fn zap() -> SkillSpec {
        SkillSpec::new(SkillId(4), SkillCategory::Active, SkillRange::single(1, 3))
            .with_effect(EffectSpec::damage(EffectId(1), 12, DamageType::Magical))
    }

    fn lone_caster() -> CombatState {
        let mut state = CombatState::new(3);
        state
            .add_actor(
                ActorState::builder(ActorId(1), OwnerId(0))
                    .position(Position::new(1, 1))
                    .hp(30)
                    .skill(SkillId(4))
                    .build(),
            )
            .unwrap();
        state.round = Round::ordered(1, state.actors.iter());
        state.round.turns[0].activate();
        state
    }

    #[test]
    fn selection_lands_on_the_turn_slot() {
        let mut state = lone_caster();
        let map = FieldMap;
        let skills = OneSkill(zap());
        let config = CombatConfig::new();
        let env: CombatEnv<'_> = Env::new(Some(&map), Some(&skills), Some(&config), None);

        let action = SelectSkillAction {
            actor: ActorId(1),
            skill: Some(SkillId(4)),
        };
        action.pre_validate(&state, &env).unwrap();
        action.apply(&mut state, &env).unwrap();
        assert_eq!(state.round.turns[0].selected_skill, Some(SkillId(4)));

        // Clearing the selection needs no skill checks at all.
        let clear = SelectSkillAction {
            actor: ActorId(1),
            skill: None,
        };
        clear.pre_validate(&state, &env).unwrap();
        clear.apply(&mut state, &env).unwrap();
        assert_eq!(state.round.turns[0].selected_skill, None);
    }

    #[test]
    fn unknown_skills_cannot_be_selected() {
        let state = lone_caster();
        let map = FieldMap;
        let skills = OneSkill(zap());
        let config = CombatConfig::new();
        let env: CombatEnv<'_> = Env::new(Some(&map), Some(&skills), Some(&config), None);

        let action = SelectSkillAction {
            actor: ActorId(1),
            skill: Some(SkillId(77)),
        };
        assert!(matches!(
            action.pre_validate(&state, &env),
            Err(SelectSkillError::Rule(RuleViolation::SkillNotKnown(
                SkillId(77)
            )))
        ));
    }
}
