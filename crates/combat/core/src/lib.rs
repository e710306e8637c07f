//! Deterministic combat simulation shared by the session and the prediction
//! path.
//!
//! `combat-core` defines the canonical rules (grid, actions, effects, phase
//! machine) and exposes pure APIs over in-memory state. All state mutation
//! flows through [`engine::CombatEngine`], and supporting crates depend on
//! the types re-exported here.
pub mod action;
pub mod ai;
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod grid;
pub mod rules;
pub mod state;

pub use action::{
    Action, ActionTransition, AttackAction, AttackError, AttackReport, SelectSkillAction,
    SelectSkillError, StandbyAction, StandbyError, WalkAction, WalkError, WalkOutcome,
};
pub use ai::{Decision, Tolerance};
pub use config::CombatConfig;
pub use effect::{
    AreaShape, Attribute, DamageOutcome, DamageType, EffectError, EffectKind, EffectSpec, Falloff,
    ModifierOp, StatModifier, StrikeOutcome, TickOutcome,
};
pub use engine::{
    ActionResult, CombatEngine, ExecuteError, ExecutionOutcome, Phase, PhaseError, PhaseOutcome,
    TransitionPhase, TransitionPhaseError,
};
pub use env::{
    CombatEnv, ConfigOracle, Env, MapDimensions, MapOracle, OracleError, PcgRng, RangeShape,
    ResourceCost, RngOracle, SeedDomain, SkillCategory, SkillOracle, SkillRange, SkillSpec,
    Terrain, Tile, TriggerCondition,
};
pub use grid::{AttackableNode, GridView, HexDirection, ReachableNode};
pub use rules::{RuleViolation, Verdict};
pub use state::{
    ActiveEffect, ActiveEffects, ActorChanges, ActorFields, ActorId, ActorState, AttackRange,
    CombatState, CombatStats, Cooldown, EffectId, Facing, OwnerId, Position, ResourceMeter, Round,
    RoundChanges, RoundFields, RoundStatus, ShieldPool, SkillId, StateDelta, StateError, TileMap,
    TileView, Turn, TurnStatus,
};
#[cfg(feature = "serde")]
pub use state::compute_state_digest;
