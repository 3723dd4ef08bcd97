//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::{EntityId, HitEvent, PhaseEvent, StatusEvent, VitalsEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Hit sequence lifecycle and per-hit settlement
    Hits,
    /// Health, shield, healing and death
    Vitals,
    /// Status effects added, removed or refreshed
    Status,
    /// Turn phase changes
    Phase,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Hits, Topic::Vitals, Topic::Status, Topic::Phase];

    const fn index(self) -> usize {
        match self {
            Topic::Hits => 0,
            Topic::Vitals => 1,
            Topic::Status => 2,
            Topic::Phase => 3,
        }
    }
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Hit(HitEvent),
    Vitals(VitalsEvent),
    Status(StatusEvent),
    Phase(PhaseEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Hit(_) => Topic::Hits,
            Event::Vitals(_) => Topic::Vitals,
            Event::Status(_) => Topic::Status,
            Event::Phase(_) => Topic::Phase,
        }
    }

    /// Entity the event is about, if it concerns a single one.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Event::Hit(HitEvent::HitResolved { hit, .. }) => hit.target,
            Event::Hit(HitEvent::TargetDied { target }) => Some(*target),
            Event::Hit(_) | Event::Phase(_) => None,
            Event::Vitals(event) => Some(event.entity()),
            Event::Status(event) => Some(event.entity()),
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is synchronous and never blocks, so
/// it is safe to call from inside core observer callbacks.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<[broadcast::Sender<Event>; 4]>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Topic::ALL.map(|_| broadcast::channel(capacity).0)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        &self.channels[topic.index()]
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::TurnPhase;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::new();
        let mut phases = bus.subscribe(Topic::Phase);
        let mut vitals = bus.subscribe(Topic::Vitals);

        bus.publish(Event::Phase(PhaseEvent {
            phase: TurnPhase::TurnStart,
            turn: 1,
        }));

        assert_eq!(
            phases.try_recv().ok(),
            Some(Event::Phase(PhaseEvent {
                phase: TurnPhase::TurnStart,
                turn: 1
            }))
        );
        assert!(vitals.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(0);
        bus.publish(Event::Vitals(VitalsEvent::Died {
            entity: EntityId(3),
        }));
    }

    #[test]
    fn subscribe_multiple_returns_one_receiver_per_topic() {
        let bus = EventBus::default();
        let receivers = bus.subscribe_multiple(&[Topic::Hits, Topic::Status]);
        assert_eq!(receivers.len(), 2);
        assert!(receivers.contains_key(&Topic::Hits));
        assert!(receivers.contains_key(&Topic::Status));
    }
}
