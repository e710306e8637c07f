//! FIFO event queue with a single mutation lease.
//!
//! Every mutation source funnels through one queue: player actions, scripted
//! decisions, and the lifecycle phases the worker enqueues as follow-ups.
//! The lease marks an event as in flight so no second resolution can start
//! until the first one released it, which keeps application strictly ordered
//! even though producers are concurrent. Events that sit unclaimed past the
//! staleness window are dropped at claim time rather than applied late.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use combat_core::{Action, Phase};

/// Payload of one queued event: a submitted action or a lifecycle phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    Action(Action),
    Phase(Phase),
}

#[derive(Clone, Debug)]
struct QueuedEvent {
    payload: EventPayload,
    enqueued_at: Instant,
}

/// Order-preserving queue with at most one event in flight.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<QueuedEvent>,
    lease: bool,
    staleness: Duration,
}

impl EventQueue {
    /// Window after which an unclaimed event is considered dead.
    pub const DEFAULT_STALENESS: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        Self::with_staleness(Self::DEFAULT_STALENESS)
    }

    pub fn with_staleness(staleness: Duration) -> Self {
        Self {
            events: VecDeque::new(),
            lease: false,
            staleness,
        }
    }

    pub fn enqueue(&mut self, payload: EventPayload) {
        self.events.push_back(QueuedEvent {
            payload,
            enqueued_at: Instant::now(),
        });
    }

    /// Claims the oldest live event and takes the lease.
    ///
    /// Returns `None` while the lease is held or when nothing live remains.
    /// Staleness is judged here, at claim time; it never cancels an event
    /// already in flight.
    pub fn claim(&mut self) -> Option<EventPayload> {
        if self.lease {
            return None;
        }
        let now = Instant::now();
        while let Some(event) = self.events.pop_front() {
            let age = now.duration_since(event.enqueued_at);
            if age > self.staleness {
                warn!(
                    payload = ?event.payload,
                    age_ms = age.as_millis() as u64,
                    "Dropping stale queued event"
                );
                continue;
            }
            self.lease = true;
            return Some(event.payload);
        }
        None
    }

    /// Releases the lease once the claimed event was applied or rejected.
    pub fn release(&mut self) {
        self.lease = false;
    }

    pub fn is_leased(&self) -> bool {
        self.lease
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use combat_core::{ActorId, Position};

    fn walk(actor: u32, x: i32, y: i32) -> EventPayload {
        EventPayload::Action(Action::walk(ActorId(actor), Position::new(x, y)))
    }

    #[test]
    fn claims_come_back_in_submission_order() {
        let mut queue = EventQueue::new();
        queue.enqueue(walk(1, 2, 2));
        queue.enqueue(EventPayload::Phase(Phase::TurnEnd(ActorId(1))));

        assert_eq!(queue.claim(), Some(walk(1, 2, 2)));
        queue.release();
        assert_eq!(
            queue.claim(),
            Some(EventPayload::Phase(Phase::TurnEnd(ActorId(1))))
        );
        queue.release();
        assert_eq!(queue.claim(), None);
    }

    #[test]
    fn the_lease_blocks_a_second_claim() {
        let mut queue = EventQueue::new();
        queue.enqueue(walk(1, 2, 2));
        queue.enqueue(walk(1, 3, 2));

        assert!(queue.claim().is_some());
        assert!(queue.is_leased());
        assert_eq!(queue.claim(), None);

        queue.release();
        assert_eq!(queue.claim(), Some(walk(1, 3, 2)));
    }

    #[test]
    fn stale_events_are_dropped_at_claim_time() {
        let mut queue = EventQueue::with_staleness(Duration::from_millis(1));
        queue.enqueue(walk(1, 2, 2));
        std::thread::sleep(Duration::from_millis(10));
        queue.enqueue(walk(1, 3, 2));

        // The first event aged out while waiting; the fresh one is claimed.
        assert_eq!(queue.claim(), Some(walk(1, 3, 2)));
        queue.release();
        assert_eq!(queue.claim(), None);
        assert!(queue.is_empty());
    }
}
