//! Session worker: the single task that owns the authoritative state.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use combat_core::{
    Action, ActionResult, CombatEngine, CombatState, ExecuteError, Phase, TransitionPhase,
    compute_state_digest,
};

use crate::api::{DrainReport, StepResult};
use crate::events::{CombatEvent, Event, EventBus, TurnEvent};
use crate::oracle::OracleBundle;
use crate::queue::{EventPayload, EventQueue};

/// Commands a [`SessionHandle`](crate::api::SessionHandle) sends to the
/// worker task.
#[derive(Debug)]
pub(crate) enum Command {
    SubmitAction {
        action: Action,
        reply: oneshot::Sender<()>,
    },
    EnqueuePhase {
        phase: Phase,
        reply: oneshot::Sender<()>,
    },
    Step {
        reply: oneshot::Sender<Option<StepResult>>,
    },
    Drain {
        reply: oneshot::Sender<DrainReport>,
    },
    QueryState {
        reply: oneshot::Sender<CombatState>,
    },
}

/// Owns the authoritative state and resolves queue events one at a time.
///
/// All mutation happens on this task. Everything else observes through
/// state snapshots and bus events, so the applied order is exactly the
/// queue order.
pub(crate) struct SessionWorker {
    state: CombatState,
    oracles: OracleBundle,
    queue: EventQueue,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SessionWorker {
    pub(crate) fn new(
        state: CombatState,
        oracles: OracleBundle,
        queue: EventQueue,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            state,
            oracles,
            queue,
            command_rx,
            event_bus,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(seed = self.state.game_seed, "session worker started");
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }
        info!("all session handles dropped, worker stopping");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SubmitAction { action, reply } => {
                debug!(actor = %action.actor(), "action queued");
                self.queue.enqueue(EventPayload::Action(action));
                if reply.send(()).is_err() {
                    debug!("reply channel closed for SubmitAction");
                }
            }
            Command::EnqueuePhase { phase, reply } => {
                debug!(%phase, "phase queued");
                self.queue.enqueue(EventPayload::Phase(phase));
                if reply.send(()).is_err() {
                    debug!("reply channel closed for EnqueuePhase");
                }
            }
            Command::Step { reply } => {
                let result = self.step_once();
                if reply.send(result).is_err() {
                    debug!("reply channel closed for Step");
                }
            }
            Command::Drain { reply } => {
                let report = self.drain();
                if reply.send(report).is_err() {
                    debug!("reply channel closed for Drain");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!("reply channel closed for QueryState");
                }
            }
        }
    }

    /// Claims, resolves, and releases exactly one queue event.
    ///
    /// Claim and release sit on the same straight-line path with no early
    /// return between them, so a rejected event can never leave the queue
    /// wedged behind a held lease.
    fn step_once(&mut self) -> Option<StepResult> {
        let payload = self.queue.claim()?;
        let resolved = self.resolve(&payload);
        self.queue.release();

        Some(match resolved {
            Ok(result) => {
                self.follow_up(&payload, &result);
                StepResult::Executed(result)
            }
            Err(_) => StepResult::Rejected,
        })
    }

    /// Resolves queue events until none are claimable.
    fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        while let Some(result) = self.step_once() {
            match result {
                StepResult::Executed(_) => report.executed += 1,
                StepResult::Rejected => report.rejected += 1,
            }
        }
        report
    }

    fn resolve(&mut self, payload: &EventPayload) -> Result<ActionResult, ExecuteError> {
        let nonce = self.state.nonce;
        let before = self.state.clone();

        let env = self.oracles.as_combat_env();
        let mut engine = CombatEngine::new(&mut self.state);
        let executed = match payload {
            EventPayload::Action(action) => engine.execute(&env, action),
            EventPayload::Phase(phase) => engine.execute_phase(&env, *phase),
        };

        match executed {
            Ok(outcome) => {
                debug!(nonce, result = ?outcome.result, "event applied");
                let digest = hex::encode(compute_state_digest(&self.state));
                self.event_bus.publish(Event::Combat(CombatEvent::Executed {
                    nonce,
                    event: payload.clone(),
                    result: outcome.result.clone(),
                    delta: Box::new(outcome.delta),
                    before_state: Box::new(before),
                    after_state: Box::new(self.state.clone()),
                    digest,
                }));
                if let ActionResult::Phase(phase_outcome) = &outcome.result {
                    self.event_bus.publish(Event::Turn(TurnEvent {
                        phase: phase_outcome.phase,
                        actor: phase_outcome.phase.actor(),
                        nonce,
                    }));
                }
                Ok(outcome.result)
            }
            Err(error) => {
                self.report_failure(payload, &error);
                Err(error)
            }
        }
    }

    /// Enqueues the lifecycle phase a resolved event implies.
    ///
    /// An attack opens the post-attack step window, standby hands the turn
    /// back to the scheduler, and a phase chains to whatever its resolver
    /// reported. Walks and skill selection leave the turn open.
    fn follow_up(&mut self, payload: &EventPayload, result: &ActionResult) {
        match result {
            ActionResult::Attack(report) => {
                self.queue.enqueue(EventPayload::Phase(Phase::TurnSecond(report.attacker)));
            }
            ActionResult::Standby => {
                if let EventPayload::Action(action) = payload {
                    self.queue.enqueue(EventPayload::Phase(Phase::TurnEnd(action.actor())));
                }
            }
            ActionResult::Phase(outcome) => {
                if let Some(next) = outcome.next {
                    self.queue.enqueue(EventPayload::Phase(next));
                }
            }
            ActionResult::Walk(_) | ActionResult::SkillSelected => {}
        }
    }

    fn report_failure(&self, payload: &EventPayload, error: &ExecuteError) {
        let phase = match error {
            ExecuteError::Walk(inner) => inner.phase,
            ExecuteError::Attack(inner) => inner.phase,
            ExecuteError::SelectSkill(inner) => inner.phase,
            ExecuteError::Standby(inner) => inner.phase,
            ExecuteError::Phase(inner) => inner.phase,
            ExecuteError::ActorNotCurrent { .. } => TransitionPhase::PreValidate,
        };
        // Rejections during validation are routine; anything past that
        // stage means an invariant slipped.
        if phase == TransitionPhase::PreValidate {
            debug!(?payload, %error, "event rejected during validation");
        } else {
            error!(?payload, %error, phase = phase.as_str(), "event failed past validation");
        }
        self.event_bus.publish(Event::Combat(CombatEvent::Failed {
            nonce: self.state.nonce,
            event: payload.clone(),
            phase,
            error: error.to_string(),
        }));
    }
}
