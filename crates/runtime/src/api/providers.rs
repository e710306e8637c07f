//! Decision providers: where the next action for an open turn comes from.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use combat_core::{Action, ActorId, CombatState, Decision, ai};

use crate::api::errors::{Result, RuntimeError};
use crate::oracle::OracleBundle;

/// Source of the next action for the active turn.
///
/// The session asks the provider once per step; the returned action is
/// submitted through the queue like any other event, so providers never
/// need to reason about validation.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    async fn provide_action(&self, actor: ActorId, state: &CombatState) -> Result<Action>;
}

/// Always stands by. A placeholder while wiring a session up.
pub struct StandbyProvider;

#[async_trait]
impl DecisionProvider for StandbyProvider {
    async fn provide_action(&self, actor: ActorId, _state: &CombatState) -> Result<Action> {
        Ok(Action::standby(actor))
    }
}

/// Replays a fixed list of actions, then stands by.
pub struct ScriptProvider {
    actions: Mutex<VecDeque<Action>>,
}

impl ScriptProvider {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: Mutex::new(actions.into_iter().collect()),
        }
    }
}

#[async_trait]
impl DecisionProvider for ScriptProvider {
    async fn provide_action(&self, actor: ActorId, _state: &CombatState) -> Result<Action> {
        let next = self.actions.lock().await.pop_front();
        Ok(next.unwrap_or_else(|| Action::standby(actor)))
    }
}

/// Drives every turn through the scripted combat policy.
pub struct PolicyProvider {
    oracles: OracleBundle,
}

impl PolicyProvider {
    pub fn new(oracles: OracleBundle) -> Self {
        Self { oracles }
    }
}

#[async_trait]
impl DecisionProvider for PolicyProvider {
    async fn provide_action(&self, actor: ActorId, state: &CombatState) -> Result<Action> {
        let env = self.oracles.as_combat_env();
        let decision = ai::decide(state, &env, actor)
            .map_err(|source| RuntimeError::Decision { actor, source })?;
        Ok(match decision {
            Decision::Attack { target, skill } => match skill {
                Some(skill) => Action::cast(actor, target, skill),
                None => Action::attack(actor, target),
            },
            Decision::Move { to } => Action::walk(actor, to),
            Decision::Standby => Action::standby(actor),
        })
    }
}
