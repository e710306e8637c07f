//! Damage, hit, and magnitude math.
//!
//! Every function here is pure: rolls come in as arguments (already drawn
//! from the rng oracle) and nothing touches actor state except
//! [`apply_damage`], which commits a computed total through the shield pool
//! into hit points.

use crate::config::CombatConfig;
use crate::state::ActorState;

use super::kinds::{DamageType, EffectKind, EffectSpec};

/// Outcome of an attack attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrikeOutcome {
    /// The hit roll failed; no damage was computed.
    Miss,
    /// The attack landed at normal magnitude.
    Hit,
    /// The attack landed and the crit roll succeeded.
    Critical,
}

impl StrikeOutcome {
    pub fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// How a committed damage total split across the target's defenses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    /// Damage after scaling, mitigation, and any critical multiplier.
    pub total: u32,
    /// Portion soaked by the shield pool.
    pub absorbed: u32,
    /// Portion that reached hit points.
    pub hp_damage: u32,
}

/// Percentage step with round-half-up, used by every scaling stage so the
/// pipeline rounds the same way everywhere.
fn percent_of(value: u64, percent: u64) -> u64 {
    (value * percent + 50) / 100
}

/// Hit chance against a defender's evasion.
///
/// # Formula
///
/// ```text
/// hit_chance = base_hit - evasion
/// clamped to [min_hit, max_hit]
/// ```
pub fn hit_chance(evasion: u32, config: &CombatConfig) -> u32 {
    config
        .base_hit_percent
        .saturating_sub(evasion)
        .clamp(config.min_hit_percent, config.max_hit_percent)
}

/// Whether an attack lands, given a 1..=100 roll.
pub fn check_hit(evasion: u32, roll: u32, config: &CombatConfig) -> bool {
    roll <= hit_chance(evasion, config)
}

/// Whether a landed attack crits, given a 1..=100 roll.
///
/// Crit rate is read as a percentage and capped at 100.
pub fn check_crit(crit_rate: u32, roll: u32) -> bool {
    roll <= crit_rate.min(100)
}

/// Compute the damage total for one effect, without applying it.
///
/// # Formula
///
/// ```text
/// base    = effect.value + scale% of (attack | intelligence)
/// reduced = base * mitigation / (defense + mitigation)
/// if critical: reduced * crit_multiplier%
/// ```
///
/// The attack stat feeds physical damage, intelligence feeds magical; the
/// scale percentages and the mitigation constant come from [`CombatConfig`].
/// Every step rounds half up.
///
/// Periodic effects (DOT ticks) skip the pipeline entirely and deal their
/// raw value.
pub fn compute_damage(
    attacker: &ActorState,
    target: &ActorState,
    effect: &EffectSpec,
    critical: bool,
    config: &CombatConfig,
) -> u32 {
    if effect.kind.is_periodic() {
        return effect.value;
    }

    let scaled = match effect.damage_type.unwrap_or(DamageType::Physical) {
        DamageType::Physical => percent_of(
            u64::from(attacker.stats.attack),
            u64::from(config.physical_scale_percent),
        ),
        DamageType::Magical => percent_of(
            u64::from(attacker.stats.intelligence),
            u64::from(config.magical_scale_percent),
        ),
    };
    let base = u64::from(effect.value) + scaled;

    let mitigation = u64::from(config.mitigation_constant);
    let denominator = u64::from(target.stats.defense) + mitigation;
    let mut damage = (base * mitigation + denominator / 2) / denominator;

    if critical {
        damage = percent_of(damage, u64::from(config.crit_multiplier_percent));
    }

    damage as u32
}

/// Commit a damage total to the target: the shield pool absorbs first, the
/// remainder depletes hp (clamped at zero).
pub fn apply_damage(target: &mut ActorState, total: u32) -> DamageOutcome {
    let absorbed = target.shield.absorb(total);
    let hp_damage = total - absorbed;
    target.hp.deplete(hp_damage);
    DamageOutcome {
        total,
        absorbed,
        hp_damage,
    }
}

/// Adjust an effect's magnitude and duration for this caster, target, and
/// cast distance.
///
/// Three adjustments, in order:
///
/// - **Falloff**: past `falloff.full_range` hexes the value drops to
///   `falloff.min_percent` of itself.
/// - **Magnitude scaling**: heals, HOTs, and shields grow with caster
///   intelligence: `100 + int * k1 + (int / step) * k2` percent.
/// - **Duration scaling**: beneficial timed effects gain a turn per
///   `buff_duration_step` points of caster intelligence; hostile timed
///   effects lose a turn per `resist_duration_step` points of target
///   status resistance, never dropping below one turn.
pub fn compute_effect_value(
    caster: &ActorState,
    target: &ActorState,
    effect: &EffectSpec,
    distance: u32,
    config: &CombatConfig,
) -> EffectSpec {
    let mut adjusted = *effect;

    if let Some(falloff) = effect.falloff {
        if distance > falloff.full_range {
            adjusted.value =
                percent_of(u64::from(adjusted.value), u64::from(falloff.min_percent)) as u32;
        }
    }

    if matches!(
        effect.kind,
        EffectKind::Heal | EffectKind::Hot | EffectKind::Shield
    ) {
        let intelligence = u64::from(caster.stats.intelligence);
        let bonus = intelligence * u64::from(config.scaling_k1_percent)
            + (intelligence / u64::from(config.scaling_step))
                * u64::from(config.scaling_k2_percent);
        adjusted.value = percent_of(u64::from(adjusted.value), 100 + bonus) as u32;
    }

    match effect.kind {
        EffectKind::Buff | EffectKind::Hot | EffectKind::Shield | EffectKind::Movement => {
            adjusted.duration += caster.stats.intelligence / config.buff_duration_step;
        }
        EffectKind::Dot | EffectKind::Debuff | EffectKind::Stun => {
            let resisted = target.stats.status_resistance / config.resist_duration_step;
            adjusted.duration = adjusted.duration.saturating_sub(resisted).max(1);
        }
        _ => {}
    }

    adjusted
}
