//! Building-block types composing the combat state.
mod actor;
mod common;
mod status;
mod turn;
mod world;

pub use actor::{ActorBuilder, ActorState, AttackRange, CombatStats, Cooldown, Facing};
pub use common::{ActorId, EffectId, OwnerId, Position, ResourceMeter, SkillId};
pub use status::{ActiveEffect, ActiveEffects, ShieldPool};
pub use turn::{Round, RoundStatus, Turn, TurnStatus};
pub use world::{TileMap, TileView};
