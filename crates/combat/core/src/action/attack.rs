//! Attacks and skill casts.

use thiserror::Error;

use crate::action::ActionTransition;
use crate::effect::{
    AreaShape, DamageOutcome, DamageType, EffectError, EffectKind, EffectSpec, StrikeOutcome,
    apply_damage, apply_effect, check_crit, check_hit, compute_damage, compute_effect_value,
};
use crate::env::{CombatEnv, SeedDomain, SkillSpec, compute_seed};
use crate::grid::{GridView, hex_distance, neighbors, straight_line};
use crate::rules::{self, RuleViolation};
use crate::state::{ActorId, CombatState, EffectId, Facing, Position, SkillId, TurnStatus};

/// Effect id reserved for the weapon swing every actor has without a skill.
pub const BASIC_ATTACK_EFFECT: EffectId = EffectId(0);

/// Strike an enemy, either with the basic attack or through a skill.
///
/// `skill: None` falls back to the skill recorded on the turn by an earlier
/// [`SelectSkillAction`](crate::action::SelectSkillAction), and to the basic
/// attack when nothing was selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackAction {
    pub actor: ActorId,
    pub target: ActorId,
    pub skill: Option<SkillId>,
}

/// Everything observable about one resolved attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    pub attacker: ActorId,
    pub target: ActorId,
    /// Skill the attack resolved through; `None` for the basic attack.
    pub skill: Option<SkillId>,
    pub outcome: StrikeOutcome,
    /// Damage split per struck actor; area effects list every victim.
    pub damage: Vec<(ActorId, DamageOutcome)>,
    /// Actors this attack removed from the board.
    pub defeated: Vec<ActorId>,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error(transparent)]
    Effect(#[from] EffectError),

    /// The occupancy table disagreed with an actor's recorded position.
    #[error("occupancy entry for actor {actor} is missing")]
    OccupancyDesync { actor: ActorId },
}

impl AttackAction {
    /// Skill this attack resolves through, folding in the turn's selection.
    fn effective_skill(&self, state: &CombatState) -> Option<SkillId> {
        self.skill.or_else(|| {
            state
                .round
                .turn_of(self.actor)
                .and_then(|turn| turn.selected_skill)
        })
    }

    /// Actors a single effect lands on, given its area shape.
    ///
    /// The attacker is never caught in their own blast; allies of the
    /// target are.
    fn victims(
        &self,
        state: &CombatState,
        effect: &EffectSpec,
        attacker_position: Position,
        impact: Position,
    ) -> Vec<ActorId> {
        match effect.area {
            None | Some(AreaShape::Single) => vec![self.target],
            Some(AreaShape::Circle { radius }) => state
                .living_actors()
                .filter(|actor| actor.id != self.actor)
                .filter(|actor| hex_distance(actor.position, impact) <= radius)
                .map(|actor| actor.id)
                .collect(),
            Some(AreaShape::Line { length }) => {
                let lane: Vec<Position> = straight_line(attacker_position, impact)
                    .into_iter()
                    .skip(1)
                    .take(length as usize)
                    .collect();
                state
                    .living_actors()
                    .filter(|actor| actor.id != self.actor)
                    .filter(|actor| lane.contains(&actor.position))
                    .map(|actor| actor.id)
                    .collect()
            }
        }
    }

    /// Teleport resolution: the caster blinks to the nearest open cell
    /// adjacent to the impact point. With nowhere to land the effect
    /// fizzles silently.
    fn close_distance(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
        impact: Position,
    ) -> Result<(), AttackError> {
        let map = env.map().map_err(RuleViolation::from)?;
        let origin = state
            .actor(self.actor)
            .ok_or(RuleViolation::UnknownActor(self.actor))?
            .position;

        let grid = GridView::new(map, &state.occupancy);
        let landing = neighbors(impact)
            .into_iter()
            .filter(|cell| grid.is_open(*cell))
            .min_by_key(|cell| (hex_distance(origin, *cell), cell.y, cell.x));
        let Some(landing) = landing else {
            return Ok(());
        };

        if !state.relocate_occupant(self.actor, origin, landing) {
            return Err(AttackError::OccupancyDesync { actor: self.actor });
        }
        if let Some(actor) = state.actor_mut(self.actor) {
            actor.position = landing;
        }
        Ok(())
    }
}

impl ActionTransition for AttackAction {
    type Error = AttackError;
    type Outcome = AttackReport;

    fn actor(&self) -> ActorId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        rules::can_attack(
            state,
            env,
            self.actor,
            self.target,
            self.effective_skill(state),
        )?;
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
    ) -> Result<Self::Outcome, Self::Error> {
        let config = env.combat_config().map_err(RuleViolation::from)?;
        let rng = env.rng().map_err(RuleViolation::from)?;

        let skill_id = self.effective_skill(state);
        let skill: Option<SkillSpec> = match skill_id {
            Some(id) => Some(
                env.skills()
                    .map_err(RuleViolation::from)?
                    .skill(id)
                    .ok_or(RuleViolation::SkillNotKnown(id))?,
            ),
            None => None,
        };

        // Attacker snapshot for the pure math; mutations only touch victims.
        let attacker = state
            .actor(self.actor)
            .ok_or(RuleViolation::UnknownActor(self.actor))?
            .clone();
        let target = state
            .actor(self.target)
            .ok_or(RuleViolation::UnknownActor(self.target))?;
        let impact = target.position;
        let target_evasion = target.stats.evasion;

        // Rolls are drawn up front; nothing after this point can fail in a
        // way that would leave the roll stream desynced from the nonce.
        let hit_seed = compute_seed(state.game_seed, state.nonce, self.actor, SeedDomain::HitRoll);
        let crit_seed =
            compute_seed(state.game_seed, state.nonce, self.actor, SeedDomain::CritRoll);
        let landed = check_hit(target_evasion, rng.roll_d100(hit_seed), config);
        let critical = check_crit(attacker.stats.crit_rate, rng.roll_d100(crit_seed));

        // The attempt is spent whether or not it lands.
        if let Some(attacker_mut) = state.actor_mut(self.actor) {
            if let Some(spec) = &skill {
                attacker_mut.pay(&spec.cost);
                attacker_mut.set_cooldown(spec.id, spec.cooldown);
            }
            if impact.x != attacker_mut.position.x {
                attacker_mut.facing = if impact.x < attacker_mut.position.x {
                    Facing::Left
                } else {
                    Facing::Right
                };
            }
        }
        if let Some(turn) = state.round.turn_of_mut(self.actor) {
            turn.acted = true;
            // Attacking re-opens the short post-attack step.
            turn.moved = false;
            if turn.status == TurnStatus::Active {
                turn.begin_acting();
            }
        }

        let mut report = AttackReport {
            attacker: self.actor,
            target: self.target,
            skill: skill_id,
            outcome: if !landed {
                StrikeOutcome::Miss
            } else if critical {
                StrikeOutcome::Critical
            } else {
                StrikeOutcome::Hit
            },
            damage: Vec::new(),
            defeated: Vec::new(),
        };
        if !landed {
            return Ok(report);
        }

        let effects: Vec<EffectSpec> = match &skill {
            Some(spec) => spec.effects.iter().copied().collect(),
            None => vec![EffectSpec::damage(
                BASIC_ATTACK_EFFECT,
                config.basic_attack_value,
                DamageType::Physical,
            )],
        };

        for effect in effects {
            if effect.kind == EffectKind::Teleport {
                self.close_distance(state, env, impact)?;
                continue;
            }

            for victim_id in self.victims(state, &effect, attacker.position, impact) {
                let Some(victim) = state.actor(victim_id) else {
                    continue;
                };
                if !victim.is_alive() {
                    continue;
                }
                let range = hex_distance(attacker.position, victim.position);
                let adjusted = compute_effect_value(&attacker, victim, &effect, range, config);

                if adjusted.kind == EffectKind::Damage {
                    let total = compute_damage(&attacker, victim, &adjusted, critical, config);
                    let Some(victim_mut) = state.actor_mut(victim_id) else {
                        continue;
                    };
                    let outcome = apply_damage(victim_mut, total);
                    report.damage.push((victim_id, outcome));
                } else {
                    let Some(victim_mut) = state.actor_mut(victim_id) else {
                        continue;
                    };
                    match apply_effect(victim_mut, adjusted) {
                        Ok(_) => {}
                        // A full status table drops the rider, not the attack.
                        Err(EffectError::SlotsFull(_)) => {}
                        Err(error) => return Err(error.into()),
                    }
                }
            }
        }

        // Sweep the fallen off the board so corpses stop blocking cells.
        let fallen: Vec<(ActorId, Position)> = state
            .actors
            .iter()
            .filter(|actor| !actor.is_alive())
            .map(|actor| (actor.id, actor.position))
            .collect();
        for (id, position) in fallen {
            if state.occupancy.remove_occupant(&position, id) {
                report.defeated.push(id);
            }
        }

        Ok(report)
    }

    fn post_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        debug_assert!(
            state
                .round
                .turn_of(self.actor)
                .is_none_or(|turn| turn.acted),
            "attack must leave the turn marked as acted"
        );
        Ok(())
    }
}
