use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::effect::EffectSpec;
use crate::state::SkillId;

/// Read-only access to authored skill definitions.
pub trait SkillOracle: Send + Sync {
    fn skill(&self, id: SkillId) -> Option<SkillSpec>;
}

/// Broad skill grouping from the authoring data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkillCategory {
    /// Signature skill, otherwise behaves like an active.
    Master,
    /// Cast explicitly on a target.
    Active,
    /// Never cast directly; fires from its trigger condition.
    Passive,
}

/// Targeting silhouette of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RangeShape {
    Single,
    Circle,
    Line,
}

/// Distance bounds for target selection, in hexes from the caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillRange {
    pub shape: RangeShape,
    pub min: u32,
    pub max: u32,
}

impl SkillRange {
    pub fn single(min: u32, max: u32) -> Self {
        Self {
            shape: RangeShape::Single,
            min,
            max,
        }
    }
}

/// Resources consumed when the skill is cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub hp: u32,
    pub mp: u32,
    pub stamina: u32,
}

impl ResourceCost {
    pub const FREE: Self = Self {
        hp: 0,
        mp: 0,
        stamina: 0,
    };

    pub fn mp(mp: u32) -> Self {
        Self { mp, ..Self::FREE }
    }

    pub fn stamina(stamina: u32) -> Self {
        Self {
            stamina,
            ..Self::FREE
        }
    }
}

/// Condition under which a passive skill fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerCondition {
    /// Owner's hp dropped below the given percent of maximum.
    HpBelowPercent(u32),
    /// Fires when a new round begins.
    OnRoundStart,
}

/// Authored skill definition resolved through the [`SkillOracle`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSpec {
    pub id: SkillId,
    pub category: SkillCategory,
    pub range: SkillRange,
    pub cost: ResourceCost,
    pub cooldown: u32,
    /// Applied in authored order when the skill lands.
    pub effects: ArrayVec<EffectSpec, { CombatConfig::MAX_EFFECTS_PER_SKILL }>,
    pub trigger: Option<TriggerCondition>,
}

impl SkillSpec {
    pub fn new(id: SkillId, category: SkillCategory, range: SkillRange) -> Self {
        Self {
            id,
            category,
            range,
            cost: ResourceCost::FREE,
            cooldown: 0,
            effects: ArrayVec::new(),
            trigger: None,
        }
    }

    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Appends an effect; panics if the skill already carries the maximum.
    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerCondition) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// True for categories a player or AI may cast directly.
    pub fn is_castable(&self) -> bool {
        matches!(self.category, SkillCategory::Master | SkillCategory::Active)
    }
}
