//! Errors surfaced by the session API.

use thiserror::Error;

use combat_core::{ActorId, RuleViolation, StateError};

use crate::prediction::DivergenceError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failures of the session machinery itself.
///
/// Rule rejections of individual events are not errors at this level; they
/// come back as [`StepResult::Rejected`](crate::api::StepResult) and as
/// `Failed` events on the combat topic.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The queue is drained, the fight is not over, and no turn is open.
    #[error("no active turn to provide a decision for")]
    NoActiveTurn,

    #[error("no decision provider configured")]
    ProviderNotSet,

    #[error("session requires oracles before building")]
    MissingOracles,

    #[error("session worker is gone; command channel closed")]
    CommandChannelClosed,

    #[error("session worker dropped the reply channel")]
    ReplyChannelClosed(#[source] tokio::sync::oneshot::error::RecvError),

    #[error("session worker task failed to join")]
    WorkerJoin(#[source] tokio::task::JoinError),

    /// The initial roster could not be staged.
    #[error("roster rejected")]
    Roster(#[from] StateError),

    /// The scripted policy could not produce a decision.
    #[error("decision policy failed for {actor}")]
    Decision {
        actor: ActorId,
        #[source]
        source: RuleViolation,
    },

    #[error(transparent)]
    Divergence(#[from] DivergenceError),
}
