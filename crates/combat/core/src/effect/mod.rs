//! Effect definitions and resolution.
//!
//! Everything a skill or basic attack does to an actor is expressed as an
//! [`EffectSpec`]. This module owns the full lifecycle:
//!
//! - `kinds` declares the effect vocabulary (damage, heals, timed modifiers,
//!   periodic ticks, shields) and the attributes they touch.
//! - `damage` holds the pure combat math: hit and crit checks against rolled
//!   d100 values, the damage pipeline, and caster/target scaling of effect
//!   magnitudes and durations.
//! - `engine` mutates actor state: attaching and refreshing status effects,
//!   reverting them on expiry, and running per-turn ticks.
//!
//! The split mirrors how actions consume it: pure functions predict, the
//! engine commits.

pub mod damage;
pub mod engine;
pub mod kinds;

pub use damage::{
    DamageOutcome, StrikeOutcome, apply_damage, check_crit, check_hit, compute_damage,
    compute_effect_value, hit_chance,
};
pub use engine::{
    EffectError, EffectOutcome, TickOutcome, apply_effect, remove_effect, tick_effects,
};
pub use kinds::{
    AreaShape, Attribute, DamageType, EffectKind, EffectSpec, Falloff, ModifierOp, StatModifier,
};
