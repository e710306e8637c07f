//! Async session host for the deterministic combat core.
//!
//! A spawned worker task owns the authoritative [`combat_core::CombatState`]
//! and resolves every mutation through a FIFO event queue, one event at a
//! time. [`SessionHandle`]s submit actions and subscribe to topic-keyed
//! broadcast events; [`CombatSession`] layers the step loop on top, asking a
//! [`DecisionProvider`] for each open turn. [`PredictionLedger`] runs the
//! same decision policy optimistically on a client and reconciles it against
//! authoritative confirmations, rolling back on divergence.

pub mod api;
pub mod events;
pub mod oracle;
pub mod prediction;
pub mod queue;
pub mod session;

mod worker;

pub use api::{
    DecisionProvider, DrainReport, PolicyProvider, Result, RuntimeError, ScriptProvider,
    SessionHandle, StandbyProvider, StepResult,
};
pub use events::{CombatEvent, Event, EventBus, Topic, TurnEvent};
pub use oracle::{OracleBundle, StaticMap, StaticSkillBook};
pub use prediction::{DivergenceError, PredictionLedger, PredictionRecord};
pub use queue::{EventPayload, EventQueue};
pub use session::{CombatSession, SessionBuilder, SessionConfig, StepStatus};
