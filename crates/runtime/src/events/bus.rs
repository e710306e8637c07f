//! Topic-keyed broadcast fan-out.
//!
//! Subscribers register against a topic and receive every event published
//! there after the point of subscription. Publishing never blocks: with no
//! subscribers, or with subscribers that lagged past the channel capacity,
//! events are simply dropped on their end.

use tokio::sync::broadcast;
use tracing::trace;

use super::types::{Event, Topic};

/// Broadcast bus for session events, one channel per topic.
#[derive(Clone, Debug)]
pub struct EventBus {
    combat: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (combat, _) = broadcast::channel(capacity);
        let (turn, _) = broadcast::channel(capacity);
        Self { combat, turn }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Turn => &self.turn,
        }
    }

    /// Publishes to the event's own topic, best-effort.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            trace!(?topic, "No subscribers for published event");
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::TurnEvent;

    use combat_core::Phase;

    #[test]
    fn events_land_on_their_own_topic() {
        let bus = EventBus::new(8);
        let mut turn_rx = bus.subscribe(Topic::Turn);
        let mut combat_rx = bus.subscribe(Topic::Combat);

        bus.publish(Event::Turn(TurnEvent {
            phase: Phase::RoundStart,
            actor: None,
            nonce: 0,
        }));

        let received = turn_rx.try_recv().unwrap();
        assert_eq!(received.topic(), Topic::Turn);
        assert!(combat_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new(8);
        bus.publish(Event::Turn(TurnEvent {
            phase: Phase::RoundEnd,
            actor: None,
            nonce: 3,
        }));
        assert_eq!(bus.subscriber_count(Topic::Turn), 0);
    }
}
