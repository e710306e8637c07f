//! Closed data model for skill effects.
//!
//! Every behavior the resolution engine can produce is a variant of
//! [`EffectKind`]; dispatch is an exhaustive match, so adding a kind is a
//! compile-time event rather than a stringly-typed surprise.

use crate::state::EffectId;

/// What an effect does when applied or ticked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    /// Instant hp loss, run through the damage formula.
    Damage,
    /// Instant hp restoration.
    Heal,
    /// Timed attribute improvement via the attached modifier.
    Buff,
    /// Timed attribute reduction via the attached modifier.
    Debuff,
    /// Periodic raw hp loss on each of the target's turn boundaries.
    Dot,
    /// Periodic hp restoration on each of the target's turn boundaries.
    Hot,
    /// Target cannot act while this remains.
    Stun,
    /// Grants an absorbing pool that soaks damage before hp.
    Shield,
    /// Instant mp loss.
    MpDrain,
    /// Instant mp restoration.
    MpRestore,
    /// Timed move-range change via the attached modifier.
    Movement,
    /// Relocates the caster into contact with the struck target.
    Teleport,
}

impl EffectKind {
    /// Kinds whose value is re-applied on every turn boundary.
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Dot | Self::Hot)
    }

    /// Kinds that resolve entirely at application time and never occupy a
    /// status slot.
    pub fn is_instant(self) -> bool {
        matches!(
            self,
            Self::Damage | Self::Heal | Self::MpDrain | Self::MpRestore | Self::Teleport
        )
    }

    /// Kinds that carry a [`StatModifier`].
    pub fn is_modifier(self) -> bool {
        matches!(self, Self::Buff | Self::Debuff | Self::Movement)
    }
}

/// Physical damage scales with attack, magical with intelligence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageType {
    Physical,
    Magical,
}

/// Attribute a modifier targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    Attack,
    Defense,
    Intelligence,
    Speed,
    CritRate,
    Evasion,
    MoveRange,
}

/// How a modifier combines with the base attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ModifierOp {
    /// Flat points. Buffs add `value`, debuffs subtract it.
    Add,
    /// Percent of the current attribute. Buffs scale by `1 + value/100`,
    /// debuffs by `1 - value/100`.
    Multiply,
}

/// Attribute adjustment attached to buff/debuff/movement effects.
///
/// `value` is always non-negative; the owning effect's kind decides the
/// sign, which keeps reversal a pure negation of whatever was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub attribute: Attribute,
    pub op: ModifierOp,
    pub value: u32,
}

impl StatModifier {
    pub fn add(attribute: Attribute, value: u32) -> Self {
        Self {
            attribute,
            op: ModifierOp::Add,
            value,
        }
    }

    pub fn multiply(attribute: Attribute, percent: u32) -> Self {
        Self {
            attribute,
            op: ModifierOp::Multiply,
            value: percent,
        }
    }
}

/// Distance falloff: full magnitude out to `full_range` hexes, then the
/// value drops to `min_percent` of itself for the rest of the skill's reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Falloff {
    pub full_range: u32,
    pub min_percent: u32,
}

/// Footprint of an effect around its impact cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaShape {
    /// The impact cell only.
    Single,
    /// Every cell within `radius` hexes of the impact cell.
    Circle { radius: u32 },
    /// Cells along the caster-to-impact line, up to `length` hexes.
    Line { length: u32 },
}

/// Immutable effect definition as authored in skill data.
///
/// `duration` is in turns; the live countdown lives on the afflicted actor
/// (see [`ActiveEffect`](crate::state::ActiveEffect)), never here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub id: EffectId,
    pub kind: EffectKind,
    pub value: u32,
    pub duration: u32,
    pub modifier: Option<StatModifier>,
    pub area: Option<AreaShape>,
    pub falloff: Option<Falloff>,
    pub damage_type: Option<DamageType>,
}

impl EffectSpec {
    /// Bare effect of the given kind; optional fields start empty.
    pub fn new(id: EffectId, kind: EffectKind, value: u32, duration: u32) -> Self {
        Self {
            id,
            kind,
            value,
            duration,
            modifier: None,
            area: None,
            falloff: None,
            damage_type: None,
        }
    }

    pub fn damage(id: EffectId, value: u32, damage_type: DamageType) -> Self {
        Self {
            damage_type: Some(damage_type),
            ..Self::new(id, EffectKind::Damage, value, 0)
        }
    }

    pub fn heal(id: EffectId, value: u32) -> Self {
        Self::new(id, EffectKind::Heal, value, 0)
    }

    pub fn dot(id: EffectId, value: u32, duration: u32) -> Self {
        Self::new(id, EffectKind::Dot, value, duration)
    }

    pub fn hot(id: EffectId, value: u32, duration: u32) -> Self {
        Self::new(id, EffectKind::Hot, value, duration)
    }

    pub fn stun(id: EffectId, duration: u32) -> Self {
        Self::new(id, EffectKind::Stun, 0, duration)
    }

    pub fn shield(id: EffectId, value: u32, duration: u32) -> Self {
        Self::new(id, EffectKind::Shield, value, duration)
    }

    pub fn modifier(id: EffectId, kind: EffectKind, modifier: StatModifier, duration: u32) -> Self {
        Self {
            modifier: Some(modifier),
            ..Self::new(id, kind, modifier.value, duration)
        }
    }

    pub fn with_falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = Some(falloff);
        self
    }

    pub fn with_area(mut self, area: AreaShape) -> Self {
        self.area = Some(area);
        self
    }
}
