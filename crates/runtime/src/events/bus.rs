//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use terraform_core::GameId;
use tokio::sync::broadcast;

use super::types::*;

/// A typed domain event with a compile-time topic.
pub trait DomainEvent: Clone + Send + Sync + 'static {
    const TOPIC: Topic;

    fn game_id(&self) -> &GameId;

    fn into_event(self) -> Event;

    fn from_event(event: &Event) -> Option<&Self>;
}

macro_rules! domain_events {
    ($($name:ident),* $(,)?) => {
        /// Topics for event routing, one per event type.
        #[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub enum Topic {
            $($name,)*
        }

        /// Event wrapper that carries the topic and typed event
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum Event {
            $($name($name),)*
        }

        impl Event {
            pub fn topic(&self) -> Topic {
                match self {
                    $(Event::$name(_) => Topic::$name,)*
                }
            }

            pub fn game_id(&self) -> &GameId {
                match self {
                    $(Event::$name(event) => &event.game_id,)*
                }
            }
        }

        $(
            impl DomainEvent for $name {
                const TOPIC: Topic = Topic::$name;

                fn game_id(&self) -> &GameId {
                    &self.game_id
                }

                fn into_event(self) -> Event {
                    Event::$name(self)
                }

                fn from_event(event: &Event) -> Option<&Self> {
                    match event {
                        Event::$name(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }

            impl From<$name> for Event {
                fn from(event: $name) -> Self {
                    Event::$name(event)
                }
            }
        )*
    };
}

domain_events!(
    ResourcesChanged,
    ProductionChanged,
    TerraformRatingChanged,
    TemperatureChanged,
    OxygenChanged,
    OceansChanged,
    TilePlaced,
    PlacementBonusGained,
    CardPlayed,
    StandardProjectPlayed,
    CorporationSelected,
    ResourceStorageChanged,
    GamePhaseChanged,
    GenerationAdvanced,
    GameStateChanged,
    GameEnded,
);

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
}

/// Synchronous topic-based event bus
///
/// Handlers run on the publisher's thread, in registration order, before
/// [`EventBus::publish`] returns. The handler list of a topic is snapshotted
/// before dispatch, so handlers may publish further events or (un)subscribe
/// without deadlocking; changes take effect from the next publish.
///
/// Every published event is also copied to a broadcast "tap" for
/// asynchronous observers such as tests and the simulator log. The tap is
/// best-effort: lagging or absent receivers never affect dispatch.
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
    tap: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default tap capacity
    pub fn new() -> Self {
        Self::with_tap_capacity(256)
    }

    /// Creates a new event bus with the given tap capacity
    pub fn with_tap_capacity(capacity: usize) -> Self {
        let (tap, _) = broadcast::channel(capacity.max(1));
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            tap,
        }
    }

    /// Registers `handler` for every future event of type `E`.
    pub fn subscribe<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: DomainEvent,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |event: &Event| {
            if let Some(event) = E::from_event(event) {
                handler(event);
            }
        });

        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .handlers
            .entry(E::TOPIC)
            .or_default()
            .push((id, handler));

        tracing::trace!(target: "runtime::events", topic = ?E::TOPIC, id = id.0, "handler subscribed");
        id
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for handlers in registry.handlers.values_mut() {
            if let Some(index) = handlers.iter().position(|(existing, _)| *existing == id) {
                handlers.remove(index);
                return true;
            }
        }
        false
    }

    /// Publishes a typed event to its topic.
    pub fn publish<E: DomainEvent>(&self, event: E) {
        self.publish_event(event.into_event());
    }

    /// Publishes an already wrapped event.
    pub fn publish_event(&self, event: Event) {
        let topic = event.topic();
        let handlers: Vec<Handler> = {
            let registry = self
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            registry
                .handlers
                .get(&topic)
                .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        if self.tap.send(event.clone()).is_err() {
            // No tap receivers - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no tap receivers");
        }

        tracing::debug!(
            target: "runtime::events",
            ?topic,
            game = %event.game_id(),
            handlers = handlers.len(),
            "publishing event"
        );
        for handler in handlers {
            handler(&event);
        }
    }

    /// Number of handlers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .get(&topic)
            .map_or(0, Vec::len)
    }

    /// Receiver observing every event published from now on.
    pub fn tap(&self) -> broadcast::Receiver<Event> {
        self.tap.subscribe()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            tap: self.tap.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
