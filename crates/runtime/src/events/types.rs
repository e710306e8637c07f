//! Event types published on the session bus.

use serde::{Deserialize, Serialize};

use combat_core::{ActionResult, ActorId, CombatState, Phase, StateDelta, TransitionPhase};

use crate::queue::EventPayload;

/// Broadcast topic an [`Event`] is published under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Resolved and rejected queue events, with full state detail.
    Combat,
    /// Lightweight turn and round lifecycle notifications.
    Turn,
}

/// Envelope carried by the bus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Event {
    Combat(CombatEvent),
    Turn(TurnEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Self::Combat(_) => Topic::Combat,
            Self::Turn(_) => Topic::Turn,
        }
    }

    /// Serializes the event for transport or structured logging.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Resolution detail for every event the worker pulls off the queue.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CombatEvent {
    /// The event passed validation and the state advanced.
    Executed {
        /// Nonce the state held when the event was applied.
        nonce: u64,
        event: EventPayload,
        result: ActionResult,
        delta: Box<StateDelta>,
        before_state: Box<CombatState>,
        after_state: Box<CombatState>,
        /// Hex digest of `after_state`, for reconciliation.
        digest: String,
    },
    /// The event was rejected; the state is unchanged.
    Failed {
        nonce: u64,
        event: EventPayload,
        phase: TransitionPhase,
        error: String,
    },
}

impl CombatEvent {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Executed { nonce, .. } | Self::Failed { nonce, .. } => *nonce,
        }
    }
}

/// Turn and round lifecycle notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub phase: Phase,
    /// Actor the phase concerns; `None` for round-level phases.
    pub actor: Option<ActorId>,
    pub nonce: u64,
}
