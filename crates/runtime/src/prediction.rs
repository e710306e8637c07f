//! Client-side prediction ledger.
//!
//! A predicting client runs [`combat_core::ai::decide`] against its local
//! state before the authoritative decision arrives, applies the result
//! optimistically, and records what it predicted at which state version.
//! When the confirmation lands, [`PredictionLedger::reconcile`] checks it
//! against the record: consistent confirmations retire the record, while a
//! divergence hands back the snapshot taken before the optimistic apply so
//! the caller can roll back and replay from authoritative data.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use combat_core::{
    ActorId, CombatEnv, CombatState, Decision, RuleViolation, Tolerance, ai, compute_state_digest,
};

/// A predicted decision and the state it was made against.
#[derive(Clone, Debug)]
pub struct PredictionRecord {
    /// State nonce the prediction was made at.
    pub version: u64,
    pub actor: ActorId,
    pub decision: Decision,
    /// State before the optimistic apply; restored on divergence.
    pub snapshot: CombatState,
    /// Hex digest of the snapshot.
    pub digest: String,
}

/// An authoritative decision contradicted the recorded prediction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("prediction at version {version} diverged: predicted {predicted:?}, got {authoritative:?}")]
pub struct DivergenceError {
    pub version: u64,
    pub predicted: Decision,
    pub authoritative: Decision,
}

/// Predicted-but-unconfirmed decisions, ordered by state version.
#[derive(Debug, Default)]
pub struct PredictionLedger {
    records: BTreeMap<u64, PredictionRecord>,
    tolerance: Tolerance,
}

impl PredictionLedger {
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            records: BTreeMap::new(),
            tolerance,
        }
    }

    /// Runs the decision policy against `state` and records the outcome
    /// under the state's nonce.
    ///
    /// `state` is the pre-apply state; the caller applies the decision
    /// optimistically afterwards, so the stored snapshot is exactly what a
    /// rollback must restore.
    pub fn predict(
        &mut self,
        state: &CombatState,
        env: &CombatEnv<'_>,
        actor: ActorId,
    ) -> Result<Decision, RuleViolation> {
        let decision = ai::decide(state, env, actor)?;
        let version = state.nonce;
        self.records.insert(
            version,
            PredictionRecord {
                version,
                actor,
                decision,
                snapshot: state.clone(),
                digest: hex::encode(compute_state_digest(state)),
            },
        );
        Ok(decision)
    }

    /// Checks the authoritative decision for `version` against the record.
    ///
    /// Consistency is judged against `current`, the client's present state,
    /// so a tolerated target swap can look at whether the predicted target
    /// is already down. A consistent confirmation retires and returns the
    /// record; an unknown version is a no-op. On divergence the record
    /// stays put until the caller rolls back through [`Self::take_snapshot`].
    pub fn reconcile(
        &mut self,
        version: u64,
        authoritative: &Decision,
        current: &CombatState,
    ) -> Result<Option<PredictionRecord>, DivergenceError> {
        let Some(record) = self.records.get(&version) else {
            debug!(version, "no prediction recorded for confirmed version");
            return Ok(None);
        };
        if ai::is_decision_consistent(current, &record.decision, authoritative, self.tolerance) {
            Ok(self.records.remove(&version))
        } else {
            Err(DivergenceError {
                version,
                predicted: record.decision,
                authoritative: *authoritative,
            })
        }
    }

    /// Removes the record for `version` and returns its rollback snapshot.
    pub fn take_snapshot(&mut self, version: u64) -> Option<CombatState> {
        self.records.remove(&version).map(|record| record.snapshot)
    }

    /// Drops every record at or after `version`. After a rollback the later
    /// predictions were made against history that no longer exists.
    pub fn discard_from(&mut self, version: u64) {
        self.records.split_off(&version);
    }

    /// Whether the recorded snapshot digest matches an authoritative one.
    /// `None` when no record exists for `version`.
    pub fn digest_matches(&self, version: u64, authoritative: &str) -> Option<bool> {
        self.records
            .get(&version)
            .map(|record| record.digest == authoritative)
    }

    pub fn record(&self, version: u64) -> Option<&PredictionRecord> {
        self.records.get(&version)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use combat_core::{
        Action, CombatConfig, CombatEngine, OwnerId, Phase, Position,
    };

    use crate::oracle::{OracleBundle, StaticMap, StaticSkillBook};

    fn bundle() -> OracleBundle {
        OracleBundle::new(
            StaticMap::open_field(10, 6),
            StaticSkillBook::new(),
            CombatConfig::default(),
        )
    }

    fn skirmish() -> CombatState {
        let mut state = CombatState::new(11);
        state
            .add_actor(fighter(1, 1, Position::new(2, 2)))
            .unwrap();
        state
            .add_actor(fighter(2, 2, Position::new(5, 2)))
            .unwrap();
        state
    }

    fn fighter(id: u32, owner: u32, position: Position) -> combat_core::ActorState {
        combat_core::ActorState::builder(ActorId(id), OwnerId(owner))
            .position(position)
            .move_range(1)
            .hp(60)
            .build()
    }

    fn boot(state: &mut CombatState, oracles: &OracleBundle) {
        let env = oracles.as_combat_env();
        let mut engine = CombatEngine::new(state);
        engine.execute_phase(&env, Phase::GameInit).unwrap();
        engine.execute_phase(&env, Phase::RoundStart).unwrap();
        let actor = ActorId(1);
        engine.execute_phase(&env, Phase::TurnStart(actor)).unwrap();
    }

    #[test]
    fn consistent_confirmations_retire_the_record() {
        let oracles = bundle();
        let mut state = skirmish();
        boot(&mut state, &oracles);

        let mut ledger = PredictionLedger::new(Tolerance::default());
        let env = oracles.as_combat_env();
        let version = state.nonce;
        let decision = ledger.predict(&state, &env, ActorId(1)).unwrap();

        let retired = ledger.reconcile(version, &decision, &state).unwrap();
        assert_eq!(retired.map(|record| record.decision), Some(decision));
        assert!(ledger.is_empty());
    }

    #[test]
    fn divergence_keeps_the_snapshot_for_rollback() {
        let oracles = bundle();
        let mut state = skirmish();
        boot(&mut state, &oracles);

        let mut ledger = PredictionLedger::new(Tolerance::default());
        let env = oracles.as_combat_env();
        let version = state.nonce;
        let predicted = ledger.predict(&state, &env, ActorId(1)).unwrap();
        let before_digest = compute_state_digest(&state);

        // Apply the prediction optimistically, then learn the server chose
        // to stand by instead.
        let action = match predicted {
            Decision::Move { to } => Action::walk(ActorId(1), to),
            other => panic!("expected a closing step, got {other:?}"),
        };
        CombatEngine::new(&mut state)
            .execute(&env, &action)
            .unwrap();

        let err = ledger
            .reconcile(version, &Decision::Standby, &state)
            .unwrap_err();
        assert_eq!(err.version, version);
        assert_eq!(err.predicted, predicted);
        assert_eq!(err.authoritative, Decision::Standby);

        let snapshot = ledger.take_snapshot(version).unwrap();
        assert_eq!(compute_state_digest(&snapshot), before_digest);
        assert!(ledger.is_empty());
    }

    #[test]
    fn confirmations_for_unknown_versions_are_ignored() {
        let oracles = bundle();
        let mut state = skirmish();
        boot(&mut state, &oracles);

        let mut ledger = PredictionLedger::new(Tolerance::default());
        let outcome = ledger.reconcile(99, &Decision::Standby, &state).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn discard_from_drops_the_diverged_tail() {
        let oracles = bundle();
        let mut state = skirmish();
        boot(&mut state, &oracles);

        let mut ledger = PredictionLedger::new(Tolerance::default());
        let env = oracles.as_combat_env();
        let first = state.nonce;
        ledger.predict(&state, &env, ActorId(1)).unwrap();

        // Fake a later prediction by bumping the local state's nonce.
        let mut later = state.clone();
        later.nonce += 4;
        ledger.predict(&later, &env, ActorId(1)).unwrap();
        assert_eq!(ledger.len(), 2);

        ledger.discard_from(later.nonce);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.record(first).is_some());
    }
}
