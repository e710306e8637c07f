//! Stateless legality predicates over the combat state.
//!
//! Every action and AI decision funnels through these checks before any
//! mutation happens. Failure is a typed verdict naming the first violated
//! rule, never a panic; callers surface or log the reason and move on.

use thiserror::Error;

use crate::config::CombatConfig;
use crate::env::{CombatEnv, OracleError, ResourceCost, SkillSpec};
use crate::grid::GridView;
use crate::state::{ActorId, ActorState, CombatState, OwnerId, Position, SkillId};

/// Resource pool named by an affordability violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum ResourcePool {
    Hp,
    Mp,
    Stamina,
}

/// First rule an attempted action ran afoul of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleViolation {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("actor {0} is not part of this combat")]
    UnknownActor(ActorId),

    #[error("it is not actor {0}'s turn")]
    NotActorsTurn(ActorId),

    #[error("actor {0} is stunned")]
    Stunned(ActorId),

    #[error("actor {0} is defeated")]
    Defeated(ActorId),

    #[error("destination {0} is blocked")]
    DestinationBlocked(Position),

    #[error("destination {0} is beyond this turn's move range")]
    DestinationOutOfReach(Position),

    #[error("actor {0} has already moved this turn")]
    MovementExhausted(ActorId),

    #[error("{attacker} and {target} fight on the same side")]
    SameSide { attacker: ActorId, target: ActorId },

    #[error("target {0} is already defeated")]
    TargetDefeated(ActorId),

    #[error("target {0} cannot be reached")]
    TargetUnreachable(ActorId),

    #[error("skill {0} is not known to this actor")]
    SkillNotKnown(SkillId),

    #[error("skill {skill} is on cooldown for {remaining} more turns")]
    OnCooldown { skill: SkillId, remaining: u32 },

    #[error("not enough {pool}")]
    InsufficientResource { pool: ResourcePool },
}

/// Outcome of a rule check: `Ok(())` or the first violation found.
pub type Verdict = Result<(), RuleViolation>;

/// Move range available to `actor` at this point of its turn.
///
/// Full range before the actor acts; the short post-attack allowance
/// afterwards.
pub fn effective_move_range(state: &CombatState, config: &CombatConfig, actor: &ActorState) -> u32 {
    let acted = state.round.turn_of(actor.id).is_some_and(|turn| turn.acted);
    if acted {
        config.post_attack_move_range
    } else {
        actor.move_range
    }
}

/// May `actor` end a movement on `destination` right now?
pub fn can_walk(
    state: &CombatState,
    env: &CombatEnv<'_>,
    actor: ActorId,
    destination: Position,
) -> Verdict {
    let actor_state = acting_actor(state, actor)?;
    let map = env.map()?;
    let config = env.combat_config()?;

    let moved = state.round.turn_of(actor).is_some_and(|turn| turn.moved);
    if moved {
        return Err(RuleViolation::MovementExhausted(actor));
    }

    let grid = GridView::new(map, &state.occupancy);
    if !grid.is_open(destination) {
        return Err(RuleViolation::DestinationBlocked(destination));
    }

    let range = effective_move_range(state, config, actor_state);
    let reachable = grid
        .walkable_nodes(actor_state.position, range, actor_state.flying)
        .iter()
        .any(|node| node.position == destination);
    if !reachable {
        return Err(RuleViolation::DestinationOutOfReach(destination));
    }

    Ok(())
}

/// May `attacker` strike `target`, optionally through a skill?
///
/// A stunned target is still a legal target; only the attacker's stun
/// matters here.
pub fn can_attack(
    state: &CombatState,
    env: &CombatEnv<'_>,
    attacker: ActorId,
    target: ActorId,
    skill: Option<SkillId>,
) -> Verdict {
    let attacker_state = acting_actor(state, attacker)?;
    let target_state = state
        .actor(target)
        .ok_or(RuleViolation::UnknownActor(target))?;

    if attacker_state.owner == target_state.owner {
        return Err(RuleViolation::SameSide { attacker, target });
    }
    if !target_state.is_alive() {
        return Err(RuleViolation::TargetDefeated(target));
    }

    let spec = match skill {
        Some(id) => {
            let spec = lookup_known_skill(env, attacker_state, id)?;
            check_skill_ready(attacker_state, &spec)?;
            Some(spec)
        }
        None => None,
    };

    let map = env.map()?;
    let grid = GridView::new(map, &state.occupancy);
    let in_reach = grid
        .attackable_nodes(
            attacker_state,
            state.enemies_of(attacker_state.owner),
            spec.as_ref(),
        )
        .iter()
        .any(|node| node.target == target);
    if !in_reach {
        return Err(RuleViolation::TargetUnreachable(target));
    }

    Ok(())
}

/// May `actor` commit to casting `skill` this turn?
pub fn can_select_skill(
    state: &CombatState,
    env: &CombatEnv<'_>,
    actor: ActorId,
    skill: SkillId,
) -> Verdict {
    let actor_state = acting_actor(state, actor)?;
    let spec = lookup_known_skill(env, actor_state, skill)?;
    check_skill_ready(actor_state, &spec)
}

/// True once every actor on some side is defeated.
pub fn is_game_over(state: &CombatState) -> bool {
    let sides = state.sides();
    sides.is_empty() || sides.iter().any(|side| state.is_side_defeated(*side))
}

/// The sole surviving side, if the fight has resolved to one.
pub fn winner(state: &CombatState) -> Option<OwnerId> {
    let sides = state.sides();
    let mut survivors = sides
        .iter()
        .copied()
        .filter(|side| !state.is_side_defeated(*side));
    let winner = survivors.next()?;
    survivors.next().is_none().then_some(winner)
}

/// Resolves `actor` and runs the gates shared by every acting rule: the
/// actor exists, is alive, owns the active turn slot, and is not stunned.
fn acting_actor(state: &CombatState, actor: ActorId) -> Result<&ActorState, RuleViolation> {
    let actor_state = state
        .actor(actor)
        .ok_or(RuleViolation::UnknownActor(actor))?;
    if !actor_state.is_alive() {
        return Err(RuleViolation::Defeated(actor));
    }
    if state.active_actor() != Some(actor) {
        return Err(RuleViolation::NotActorsTurn(actor));
    }
    if actor_state.is_stunned() {
        return Err(RuleViolation::Stunned(actor));
    }
    Ok(actor_state)
}

fn lookup_known_skill(
    env: &CombatEnv<'_>,
    actor: &ActorState,
    skill: SkillId,
) -> Result<SkillSpec, RuleViolation> {
    if !actor.knows_skill(skill) {
        return Err(RuleViolation::SkillNotKnown(skill));
    }
    env.skills()?
        .skill(skill)
        .ok_or(RuleViolation::SkillNotKnown(skill))
}

fn check_skill_ready(actor: &ActorState, spec: &SkillSpec) -> Verdict {
    let remaining = actor.cooldown_remaining(spec.id);
    if remaining > 0 {
        return Err(RuleViolation::OnCooldown {
            skill: spec.id,
            remaining,
        });
    }
    check_affordable(actor, &spec.cost)
}

fn check_affordable(actor: &ActorState, cost: &ResourceCost) -> Verdict {
    if !actor.hp.can_afford(cost.hp) {
        return Err(RuleViolation::InsufficientResource {
            pool: ResourcePool::Hp,
        });
    }
    if !actor.mp.can_afford(cost.mp) {
        return Err(RuleViolation::InsufficientResource {
            pool: ResourcePool::Mp,
        });
    }
    if !actor.stamina.can_afford(cost.stamina) {
        return Err(RuleViolation::InsufficientResource {
            pool: ResourcePool::Stamina,
        });
    }
    Ok(())
}
