//! Scripted decision-making for NPC actors.
//!
//! The policy is a pure function of the combat state and its oracles, so a
//! client can run it ahead of the authoritative source and later check the
//! two outcomes against each other with [`is_decision_consistent`]. The only
//! randomness is the axis coin used when a closing step has no dominant
//! direction, and that coin is derived from `(game_seed, nonce, actor)`, so
//! both sides land on the same branch.

use crate::env::{CombatEnv, MapOracle, SeedDomain, SkillSpec, compute_seed};
use crate::grid::{AttackableNode, GridView, HexDirection, hex_distance};
use crate::rules::RuleViolation;
use crate::state::{ActorId, ActorState, CombatState, Position, SkillId};

/// One turn's worth of intent for an NPC actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// Strike `target`, through `skill` when one is ready and in range.
    Attack {
        target: ActorId,
        skill: Option<SkillId>,
    },
    /// Take a single step to `to`.
    Move { to: Position },
    /// Nothing useful to do.
    Standby,
}

/// Slack granted when a predicted decision is checked against the
/// authoritative one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    /// Accept a different target when the predicted one is dead by the time
    /// the authoritative decision arrives.
    pub allow_target_change: bool,
}

/// Choose what `actor` does with the current turn.
///
/// Strikes the nearest attackable enemy, spending the first ready skill when
/// it reaches; otherwise takes one step toward the nearest living enemy;
/// otherwise stands by. Distance ties go to the lowest actor id. Dead or
/// stunned actors always stand by, as does an actor whose turn has already
/// spent the relevant budget.
pub fn decide(
    state: &CombatState,
    env: &CombatEnv<'_>,
    actor: ActorId,
) -> Result<Decision, RuleViolation> {
    let actor_state = state
        .actor(actor)
        .ok_or(RuleViolation::UnknownActor(actor))?;
    if !actor_state.is_alive() || actor_state.is_stunned() {
        return Ok(Decision::Standby);
    }

    let turn = state.round.turn_of(actor);
    let acted = turn.is_some_and(|turn| turn.acted);
    let moved = turn.is_some_and(|turn| turn.moved);

    let map = env.map()?;
    let grid = GridView::new(map, &state.occupancy);

    if !acted {
        if let Some((target, skill)) = best_strike(state, env, &grid, actor_state)? {
            return Ok(Decision::Attack { target, skill });
        }
    }
    if !moved {
        if let Some(to) = closing_step(state, env, &grid, actor_state)? {
            return Ok(Decision::Move { to });
        }
    }
    Ok(Decision::Standby)
}

/// Did a predicted decision survive authoritative resolution?
///
/// Compares the action type, the struck target or destination, and the skill
/// spent. `tolerance.allow_target_change` forgives a swapped target when the
/// predicted one is no longer alive, covering the window where a kill lands
/// between prediction and confirmation.
pub fn is_decision_consistent(
    state: &CombatState,
    predicted: &Decision,
    authoritative: &Decision,
    tolerance: Tolerance,
) -> bool {
    match (predicted, authoritative) {
        (
            Decision::Attack {
                target: predicted_target,
                skill: predicted_skill,
            },
            Decision::Attack { target, skill },
        ) => {
            if predicted_skill != skill {
                return false;
            }
            if predicted_target == target {
                return true;
            }
            tolerance.allow_target_change
                && state
                    .actor(*predicted_target)
                    .is_none_or(|lost| !lost.is_alive())
        }
        (Decision::Move { to: predicted_to }, Decision::Move { to }) => predicted_to == to,
        (Decision::Standby, Decision::Standby) => true,
        _ => false,
    }
}

/// First learned skill that is castable, off cooldown, and affordable.
fn ready_skill(
    env: &CombatEnv<'_>,
    actor: &ActorState,
) -> Result<Option<SkillSpec>, RuleViolation> {
    let skills = env.skills()?;
    Ok(actor.skills.iter().copied().find_map(|id| {
        let spec = skills.skill(id)?;
        let ready = spec.is_castable()
            && actor.cooldown_remaining(id) == 0
            && actor.can_afford(&spec.cost);
        ready.then_some(spec)
    }))
}

/// Nearest enemy plus the weapon that reaches it.
///
/// Skill reach and basic reach are queried separately; the nearer target by
/// `(distance, id)` wins, and the skill is preferred on an exact tie so a
/// ready cast is never wasted on a plain swing.
fn best_strike(
    state: &CombatState,
    env: &CombatEnv<'_>,
    grid: &GridView<'_, dyn MapOracle + '_>,
    actor: &ActorState,
) -> Result<Option<(ActorId, Option<SkillId>)>, RuleViolation> {
    let skill = ready_skill(env, actor)?;
    let cast = skill
        .as_ref()
        .and_then(|spec| nearest_strike(grid, state, actor, Some(spec)));
    let swing = nearest_strike(grid, state, actor, None);

    Ok(match (cast, swing) {
        (Some(cast), Some(swing))
            if (swing.distance, swing.target) < (cast.distance, cast.target) =>
        {
            Some((swing.target, None))
        }
        (Some(cast), _) => Some((cast.target, skill.map(|spec| spec.id))),
        (None, Some(swing)) => Some((swing.target, None)),
        (None, None) => None,
    })
}

fn nearest_strike(
    grid: &GridView<'_, dyn MapOracle + '_>,
    state: &CombatState,
    actor: &ActorState,
    skill: Option<&SkillSpec>,
) -> Option<AttackableNode> {
    grid.attackable_nodes(actor, state.enemies_of(actor.owner), skill)
        .into_iter()
        .min_by_key(|node| (node.distance, node.target))
}

/// One open cell that brings `actor` closer to the nearest living enemy.
///
/// Candidates follow the x/y deltas toward the enemy, dominant axis first,
/// and are mirrored for maps authored right-to-left. A cell only qualifies
/// if it actually shortens the hex distance, so a blocked approach degrades
/// to standing by rather than wandering.
fn closing_step(
    state: &CombatState,
    env: &CombatEnv<'_>,
    grid: &GridView<'_, dyn MapOracle + '_>,
    actor: &ActorState,
) -> Result<Option<Position>, RuleViolation> {
    let Some(enemy) = state
        .enemies_of(actor.owner)
        .min_by_key(|enemy| (hex_distance(actor.position, enemy.position), enemy.id))
    else {
        return Ok(None);
    };

    let dx = enemy.position.x - actor.position.x;
    let dy = enemy.position.y - actor.position.y;
    let horizontal = if dx >= 0 {
        HexDirection::East
    } else {
        HexDirection::West
    };
    let vertical = match (dx >= 0, dy >= 0) {
        (true, true) => HexDirection::SouthEast,
        (false, true) => HexDirection::SouthWest,
        (true, false) => HexDirection::NorthEast,
        (false, false) => HexDirection::NorthWest,
    };

    let horizontal_first = if dx.abs() == dy.abs() {
        // No dominant axis; the seeded coin keeps predictor and authority
        // on the same branch.
        let seed = compute_seed(state.game_seed, state.nonce, actor.id, SeedDomain::Decision);
        env.rng()?.next_u32(seed) & 1 == 0
    } else {
        dx.abs() > dy.abs()
    };
    let mut order = if horizontal_first {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    if env.map()?.mirrored() {
        for direction in &mut order {
            *direction = direction.mirrored();
        }
    }

    let before = hex_distance(actor.position, enemy.position);
    Ok(order
        .into_iter()
        .map(|direction| direction.step(actor.position))
        .find(|cell| grid.is_open(*cell) && hex_distance(*cell, enemy.position) < before))
}
