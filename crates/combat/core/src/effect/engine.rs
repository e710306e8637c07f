//! Stateful effect application and per-turn ticking.
//!
//! [`apply_effect`] is the single entry point for landing a non-damage
//! effect on an actor. Instant kinds resolve on the spot; timed kinds occupy
//! a status slot and are later unwound by [`tick_effects`] or
//! [`remove_effect`]. An effect id already present on the target is
//! refreshed in place rather than stacked.

use thiserror::Error;

use crate::state::{ActiveEffect, ActorId, ActorState, EffectId};

use super::kinds::{EffectKind, EffectSpec, ModifierOp, StatModifier};

/// Why an effect could not be applied.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectError {
    /// Every status slot on the target is occupied.
    #[error("actor {0} has no free status slot")]
    SlotsFull(ActorId),
    /// Damage effects resolve through the damage pipeline, not here.
    #[error("{0} effects resolve through the damage pipeline")]
    NeedsDamagePipeline(EffectKind),
    /// Teleports relocate the target, which only the action layer can do.
    #[error("{0} effects are resolved by the action layer")]
    NeedsActionContext(EffectKind),
}

/// What applying an effect did to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectOutcome {
    /// A new timed instance now occupies a status slot.
    Attached(EffectId),
    /// The same id was already present; its value and duration were reset.
    Refreshed(EffectId),
    /// An instant effect resolved without occupying a slot.
    Resolved(EffectKind),
}

/// Aggregate result of one [`tick_effects`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickOutcome {
    /// Total hp lost to DOT ticks. Ticks bypass the shield pool.
    pub dot_damage: u32,
    /// Total hp restored by HOT ticks.
    pub hot_heal: u32,
    /// Effects removed this pass, expired or fully consumed.
    pub expired: Vec<EffectId>,
}

/// Apply one effect to `target`.
///
/// Instant kinds (heal, mp drain, mp restore) change the relevant meter and
/// return [`EffectOutcome::Resolved`]. Timed kinds attach an
/// [`ActiveEffect`]: modifiers shift the touched attribute immediately and
/// record the actual delta so expiry can restore it exactly even when
/// clamping trimmed the shift; shields grant into the absorb pool.
///
/// Damage and teleport effects are rejected: the former goes through
/// [`super::damage`], the latter needs board access.
pub fn apply_effect(
    target: &mut ActorState,
    effect: EffectSpec,
) -> Result<EffectOutcome, EffectError> {
    match effect.kind {
        EffectKind::Damage => Err(EffectError::NeedsDamagePipeline(effect.kind)),
        EffectKind::Teleport => Err(EffectError::NeedsActionContext(effect.kind)),
        EffectKind::Heal => {
            target.hp.restore(effect.value);
            Ok(EffectOutcome::Resolved(effect.kind))
        }
        EffectKind::MpDrain => {
            target.mp.deplete(effect.value);
            Ok(EffectOutcome::Resolved(effect.kind))
        }
        EffectKind::MpRestore => {
            target.mp.restore(effect.value);
            Ok(EffectOutcome::Resolved(effect.kind))
        }
        EffectKind::Shield => attach_shield(target, effect),
        EffectKind::Buff | EffectKind::Debuff | EffectKind::Movement => {
            attach_modifier(target, effect)
        }
        EffectKind::Dot | EffectKind::Hot | EffectKind::Stun => attach(target, effect),
    }
}

/// Remove one effect, restoring whatever it changed on application.
///
/// Modifier deltas are shifted back; dropping the last shield effect clears
/// any remaining pool, since the pool exists only while a shield is active.
pub fn remove_effect(target: &mut ActorState, id: EffectId) -> Option<ActiveEffect> {
    let removed = target.effects.remove(id)?;
    if let Some(modifier) = removed.spec.modifier {
        target.shift_attribute(modifier.attribute, -removed.applied);
    }
    if removed.kind() == EffectKind::Shield && !target.effects.has_kind(EffectKind::Shield) {
        target.shield.clear();
    }
    Some(removed)
}

/// Advance every effect on `actor` by one turn.
///
/// Each pass decrements remaining durations, deals DOT damage and HOT
/// healing at their raw values, then removes anything that reached zero
/// duration along with shields whose pool is spent. An effect still deals
/// its tick on the turn it expires. DOT ticks go straight to hp; the shield
/// pool only guards against attacks.
pub fn tick_effects(actor: &mut ActorState) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    for id in actor.effects.ids() {
        let Some(effect) = actor.effects.get_mut(id) else {
            continue;
        };
        effect.remaining = effect.remaining.saturating_sub(1);
        let kind = effect.kind();
        let value = effect.spec.value;

        match kind {
            EffectKind::Dot => {
                actor.hp.deplete(value);
                outcome.dot_damage += value;
            }
            EffectKind::Hot => {
                actor.hp.restore(value);
                outcome.hot_heal += value;
            }
            _ => {}
        }
    }

    let shield_spent = actor.shield.is_depleted();
    let finished: Vec<EffectId> = actor
        .effects
        .iter()
        .filter(|effect| {
            effect.is_expired() || (effect.kind() == EffectKind::Shield && shield_spent)
        })
        .map(|effect| effect.id())
        .collect();

    for id in finished {
        if remove_effect(actor, id).is_some() {
            outcome.expired.push(id);
        }
    }

    outcome
}

fn attach(target: &mut ActorState, effect: EffectSpec) -> Result<EffectOutcome, EffectError> {
    if let Some(existing) = target.effects.get_mut(effect.id) {
        existing.remaining = effect.duration;
        existing.spec = effect;
        return Ok(EffectOutcome::Refreshed(effect.id));
    }
    insert_new(target, ActiveEffect::new(effect))
}

fn attach_shield(
    target: &mut ActorState,
    effect: EffectSpec,
) -> Result<EffectOutcome, EffectError> {
    if let Some(existing) = target.effects.get_mut(effect.id) {
        existing.remaining = effect.duration;
        existing.spec = effect;
        target.shield.grant(effect.value);
        return Ok(EffectOutcome::Refreshed(effect.id));
    }
    insert_new(target, ActiveEffect::new(effect))?;
    target.shield.grant(effect.value);
    Ok(EffectOutcome::Attached(effect.id))
}

fn attach_modifier(
    target: &mut ActorState,
    effect: EffectSpec,
) -> Result<EffectOutcome, EffectError> {
    let Some(modifier) = effect.modifier else {
        // A modifier kind without a payload occupies a slot but shifts nothing.
        return attach(target, effect);
    };

    let refreshed = if let Some(previous) = target.effects.remove(effect.id) {
        if let Some(previous_modifier) = previous.spec.modifier {
            target.shift_attribute(previous_modifier.attribute, -previous.applied);
        }
        true
    } else {
        false
    };

    let delta = modifier_delta(target, effect.kind, modifier);
    let applied = target.shift_attribute(modifier.attribute, delta);

    let mut instance = ActiveEffect::new(effect);
    instance.applied = applied;
    if !target.effects.insert(instance) {
        // A full slot table must not leak the attribute shift.
        target.shift_attribute(modifier.attribute, -applied);
        return Err(EffectError::SlotsFull(target.id));
    }

    Ok(if refreshed {
        EffectOutcome::Refreshed(effect.id)
    } else {
        EffectOutcome::Attached(effect.id)
    })
}

fn insert_new(
    target: &mut ActorState,
    instance: ActiveEffect,
) -> Result<EffectOutcome, EffectError> {
    let id = instance.id();
    if target.effects.insert(instance) {
        Ok(EffectOutcome::Attached(id))
    } else {
        Err(EffectError::SlotsFull(target.id))
    }
}

/// Signed attribute change for a modifier effect.
///
/// Additive debuffs subtract their value; multiplicative debuffs scale by
/// `100 - value` percent (capped so the attribute cannot invert). Buff and
/// movement kinds apply the same ops with a positive sign.
fn modifier_delta(target: &ActorState, kind: EffectKind, modifier: StatModifier) -> i32 {
    let current = i64::from(target.attribute(modifier.attribute));
    let value = i64::from(modifier.value);
    let next = match (modifier.op, kind) {
        (ModifierOp::Add, EffectKind::Debuff) => current - value,
        (ModifierOp::Add, _) => current + value,
        (ModifierOp::Multiply, EffectKind::Debuff) => {
            (current * (100 - value.min(100)) + 50) / 100
        }
        (ModifierOp::Multiply, _) => (current * (100 + value) + 50) / 100,
    };
    (next - current) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Attribute, DamageType};
    use crate::state::{CombatStats, OwnerId, Position};

    fn subject() -> ActorState {
        ActorState::builder(ActorId(1), OwnerId(0))
            .position(Position::new(0, 0))
            .hp(100)
            .mp(50)
            .stats(CombatStats {
                defense: 30,
                speed: 10,
                ..CombatStats::default()
            })
            .build()
    }

    #[test]
    fn dot_burns_every_turn_and_expires_at_zero() {
        let mut actor = subject();
        apply_effect(&mut actor, EffectSpec::dot(EffectId(1), 30, 3)).unwrap();

        // Application itself deals nothing.
        assert_eq!(actor.hp.current, 100);

        let first = tick_effects(&mut actor);
        assert_eq!(first.dot_damage, 30);
        assert!(first.expired.is_empty());

        tick_effects(&mut actor);
        let last = tick_effects(&mut actor);

        // The final tick still deals damage before removal.
        assert_eq!(actor.hp.current, 10);
        assert_eq!(last.expired, vec![EffectId(1)]);
        assert!(actor.effects.is_empty());
    }

    #[test]
    fn hot_restores_until_it_runs_out() {
        let mut actor = subject();
        actor.hp.deplete(60);
        apply_effect(&mut actor, EffectSpec::hot(EffectId(2), 10, 2)).unwrap();

        tick_effects(&mut actor);
        let last = tick_effects(&mut actor);

        assert_eq!(actor.hp.current, 60);
        assert_eq!(last.hot_heal, 10);
        assert_eq!(last.expired, vec![EffectId(2)]);
    }

    #[test]
    fn expired_modifiers_restore_the_attribute_exactly() {
        let mut actor = subject();
        // Subtracting 50 from defense 30 clamps at zero.
        let debuff = EffectSpec::modifier(
            EffectId(3),
            EffectKind::Debuff,
            StatModifier::add(Attribute::Defense, 50),
            2,
        );
        apply_effect(&mut actor, debuff).unwrap();
        assert_eq!(actor.attribute(Attribute::Defense), 0);

        tick_effects(&mut actor);
        tick_effects(&mut actor);

        // Reversal uses the recorded delta, not the nominal value.
        assert_eq!(actor.attribute(Attribute::Defense), 30);
        assert!(actor.effects.is_empty());
    }

    #[test]
    fn multiplicative_debuff_scales_and_reverts() {
        let mut actor = subject();
        let slow = EffectSpec::modifier(
            EffectId(4),
            EffectKind::Debuff,
            StatModifier::multiply(Attribute::Speed, 50),
            1,
        );
        apply_effect(&mut actor, slow).unwrap();
        assert_eq!(actor.attribute(Attribute::Speed), 5);

        tick_effects(&mut actor);
        assert_eq!(actor.attribute(Attribute::Speed), 10);
    }

    #[test]
    fn reapplying_an_effect_refreshes_instead_of_stacking() {
        let mut actor = subject();
        apply_effect(&mut actor, EffectSpec::dot(EffectId(5), 10, 3)).unwrap();
        tick_effects(&mut actor);

        let outcome = apply_effect(&mut actor, EffectSpec::dot(EffectId(5), 10, 3)).unwrap();
        assert_eq!(outcome, EffectOutcome::Refreshed(EffectId(5)));
        assert_eq!(actor.effects.len(), 1);
        assert_eq!(actor.effects.get(EffectId(5)).unwrap().remaining, 3);
    }

    #[test]
    fn refreshing_a_buff_rebases_the_attribute_shift() {
        let mut actor = subject();
        let small = EffectSpec::modifier(
            EffectId(6),
            EffectKind::Buff,
            StatModifier::add(Attribute::Attack, 5),
            2,
        );
        apply_effect(&mut actor, small).unwrap();
        assert_eq!(actor.attribute(Attribute::Attack), 5);

        let big = EffectSpec::modifier(
            EffectId(6),
            EffectKind::Buff,
            StatModifier::add(Attribute::Attack, 20),
            2,
        );
        let outcome = apply_effect(&mut actor, big).unwrap();
        assert_eq!(outcome, EffectOutcome::Refreshed(EffectId(6)));
        // Old +5 reverted before the +20 landed.
        assert_eq!(actor.attribute(Attribute::Attack), 20);

        tick_effects(&mut actor);
        tick_effects(&mut actor);
        assert_eq!(actor.attribute(Attribute::Attack), 0);
    }

    #[test]
    fn shields_guard_until_spent_or_expired() {
        let mut actor = subject();
        apply_effect(&mut actor, EffectSpec::shield(EffectId(7), 20, 3)).unwrap();
        assert_eq!(actor.shield.pool, 20);

        // Partial absorption keeps the effect alive.
        actor.shield.absorb(12);
        let pass = tick_effects(&mut actor);
        assert!(pass.expired.is_empty());

        // Draining the pool removes the shield on the next tick.
        actor.shield.absorb(8);
        let drained = tick_effects(&mut actor);
        assert_eq!(drained.expired, vec![EffectId(7)]);
        assert!(actor.effects.is_empty());
    }

    #[test]
    fn expired_shield_takes_its_leftover_pool_along() {
        let mut actor = subject();
        apply_effect(&mut actor, EffectSpec::shield(EffectId(8), 20, 1)).unwrap();

        tick_effects(&mut actor);

        assert!(actor.effects.is_empty());
        assert!(actor.shield.is_depleted());
    }

    #[test]
    fn instant_effects_resolve_without_a_slot() {
        let mut actor = subject();
        actor.hp.deplete(40);

        let healed = apply_effect(&mut actor, EffectSpec::heal(EffectId(9), 25)).unwrap();
        assert_eq!(healed, EffectOutcome::Resolved(EffectKind::Heal));
        assert_eq!(actor.hp.current, 85);

        apply_effect(
            &mut actor,
            EffectSpec::new(EffectId(10), EffectKind::MpDrain, 20, 0),
        )
        .unwrap();
        assert_eq!(actor.mp.current, 30);

        apply_effect(
            &mut actor,
            EffectSpec::new(EffectId(11), EffectKind::MpRestore, 5, 0),
        )
        .unwrap();
        assert_eq!(actor.mp.current, 35);

        assert!(actor.effects.is_empty());
    }

    #[test]
    fn damage_and_teleport_are_redirected() {
        let mut actor = subject();

        let strike = EffectSpec::damage(EffectId(12), 10, DamageType::Physical);
        assert_eq!(
            apply_effect(&mut actor, strike),
            Err(EffectError::NeedsDamagePipeline(EffectKind::Damage))
        );

        let blink = EffectSpec::new(EffectId(13), EffectKind::Teleport, 0, 0);
        assert_eq!(
            apply_effect(&mut actor, blink),
            Err(EffectError::NeedsActionContext(EffectKind::Teleport))
        );
    }

    #[test]
    fn stun_wears_off_with_its_duration() {
        let mut actor = subject();
        apply_effect(&mut actor, EffectSpec::stun(EffectId(14), 2)).unwrap();
        assert!(actor.is_stunned());

        tick_effects(&mut actor);
        assert!(actor.is_stunned());

        tick_effects(&mut actor);
        assert!(!actor.is_stunned());
    }

    #[test]
    fn a_full_status_table_rejects_new_effects() {
        let mut actor = subject();
        for id in 0..crate::config::CombatConfig::MAX_STATUS_EFFECTS as u32 {
            apply_effect(&mut actor, EffectSpec::dot(EffectId(id), 1, 5)).unwrap();
        }

        let overflow = EffectSpec::stun(EffectId(99), 1);
        assert_eq!(
            apply_effect(&mut actor, overflow),
            Err(EffectError::SlotsFull(ActorId(1)))
        );

        // A modifier overflow must not leave a dangling attribute shift.
        let buff = EffectSpec::modifier(
            EffectId(98),
            EffectKind::Buff,
            StatModifier::add(Attribute::Attack, 10),
            2,
        );
        assert_eq!(
            apply_effect(&mut actor, buff),
            Err(EffectError::SlotsFull(ActorId(1)))
        );
        assert_eq!(actor.attribute(Attribute::Attack), 0);
    }
}
