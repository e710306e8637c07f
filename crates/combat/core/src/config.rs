/// Combat configuration constants and tunable parameters.
///
/// Compile-time `MAX_*` constants size the bounded collections used across
/// the state types; the runtime-tunable fields feed the damage and effect
/// formulas. Both sides of a prediction must share the same configuration
/// for results to match bit-for-bit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Percentage of attacker attack added to physical damage.
    pub physical_scale_percent: u32,
    /// Percentage of attacker intelligence added to magical damage.
    pub magical_scale_percent: u32,
    /// Critical hit multiplier in percent (150 = 1.5x).
    pub crit_multiplier_percent: u32,
    /// Defense soft-cap constant: mitigation = damage * 100 / (defense + K).
    pub mitigation_constant: u32,
    /// Magnitude of a basic (skill-less) attack before stat scaling.
    pub basic_attack_value: u32,
    /// Hit chance before evasion is subtracted.
    pub base_hit_percent: u32,
    /// Lower clamp for hit chance, so evasion never grants immunity.
    pub min_hit_percent: u32,
    /// Upper clamp for hit chance.
    pub max_hit_percent: u32,
    /// Move range available after an actor has already acted this turn.
    pub post_attack_move_range: u32,
    /// Per-point percent bonus for intelligence-scaled effect magnitudes.
    pub scaling_k1_percent: u32,
    /// Attribute step size for the second scaling term.
    pub scaling_step: u32,
    /// Percent bonus granted per full `scaling_step` of the attribute.
    pub scaling_k2_percent: u32,
    /// Intelligence points per extra turn of buff duration.
    pub buff_duration_step: u32,
    /// Status-resistance points per turn shaved off incoming periodic effects.
    pub resist_duration_step: u32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of actors in a single combat, both sides combined.
    pub const MAX_ACTORS: usize = 16;
    /// Maximum skills a single actor can know.
    pub const MAX_SKILLS_PER_ACTOR: usize = 8;
    /// Maximum effects carried by one skill.
    pub const MAX_EFFECTS_PER_SKILL: usize = 4;
    /// Maximum concurrent status effects on one actor.
    pub const MAX_STATUS_EFFECTS: usize = 16;
    /// Hex tiles hold at most one actor.
    pub const MAX_OCCUPANTS_PER_TILE: usize = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_PHYSICAL_SCALE_PERCENT: u32 = 50;
    pub const DEFAULT_MAGICAL_SCALE_PERCENT: u32 = 80;
    pub const DEFAULT_CRIT_MULTIPLIER_PERCENT: u32 = 150;
    pub const DEFAULT_MITIGATION_CONSTANT: u32 = 100;
    pub const DEFAULT_BASIC_ATTACK_VALUE: u32 = 10;
    pub const DEFAULT_BASE_HIT_PERCENT: u32 = 100;
    pub const DEFAULT_MIN_HIT_PERCENT: u32 = 5;
    pub const DEFAULT_MAX_HIT_PERCENT: u32 = 100;
    pub const DEFAULT_POST_ATTACK_MOVE_RANGE: u32 = 1;
    pub const DEFAULT_SCALING_K1_PERCENT: u32 = 1;
    pub const DEFAULT_SCALING_STEP: u32 = 10;
    pub const DEFAULT_SCALING_K2_PERCENT: u32 = 5;
    pub const DEFAULT_BUFF_DURATION_STEP: u32 = 20;
    pub const DEFAULT_RESIST_DURATION_STEP: u32 = 25;

    pub fn new() -> Self {
        Self {
            physical_scale_percent: Self::DEFAULT_PHYSICAL_SCALE_PERCENT,
            magical_scale_percent: Self::DEFAULT_MAGICAL_SCALE_PERCENT,
            crit_multiplier_percent: Self::DEFAULT_CRIT_MULTIPLIER_PERCENT,
            mitigation_constant: Self::DEFAULT_MITIGATION_CONSTANT,
            basic_attack_value: Self::DEFAULT_BASIC_ATTACK_VALUE,
            base_hit_percent: Self::DEFAULT_BASE_HIT_PERCENT,
            min_hit_percent: Self::DEFAULT_MIN_HIT_PERCENT,
            max_hit_percent: Self::DEFAULT_MAX_HIT_PERCENT,
            post_attack_move_range: Self::DEFAULT_POST_ATTACK_MOVE_RANGE,
            scaling_k1_percent: Self::DEFAULT_SCALING_K1_PERCENT,
            scaling_step: Self::DEFAULT_SCALING_STEP,
            scaling_k2_percent: Self::DEFAULT_SCALING_K2_PERCENT,
            buff_duration_step: Self::DEFAULT_BUFF_DURATION_STEP,
            resist_duration_step: Self::DEFAULT_RESIST_DURATION_STEP,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
