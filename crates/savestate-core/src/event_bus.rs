//! Lifecycle notifications.
//!
//! The EventBus holds an ordered list of observers. Emitting an event calls
//! every observer synchronously, on the calling thread, in subscription
//! order. There is no buffering: an observer subscribed after an event was
//! emitted never sees it.
//!
//! # Example
//!
//! ```rust
//! use savestate_core::event_bus::{EventBus, LifecycleEvent};
//!
//! let mut bus = EventBus::new();
//! let id = bus.subscribe(|event| println!("lifecycle: {event}"));
//!
//! bus.emit(LifecycleEvent::Saved);
//! assert!(bus.unsubscribe(&id));
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// A fresh aggregate was built and populated by every participant.
    Created,
    /// Every participant pulled its fragment out of the aggregate.
    Loaded,
    /// The aggregate was written to the backend.
    Saved,
    /// Every participant was cleared and the cleared aggregate was saved.
    Reset,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Created => "created",
            LifecycleEvent::Loaded => "loaded",
            LifecycleEvent::Saved => "saved",
            LifecycleEvent::Reset => "reset",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observer callback.
pub type Observer = Box<dyn FnMut(LifecycleEvent) + Send>;

/// Synchronous, ordered list of lifecycle observers.
pub struct EventBus {
    observers: Vec<(SubscriptionId, Observer)>,
}

impl EventBus {
    /// Create an EventBus with no observers.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer at the end of the delivery order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(LifecycleEvent) + Send + 'static,
    {
        let id = SubscriptionId::new();
        self.observers.push((id.clone(), Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: &SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| sub != id);
        self.observers.len() != before
    }

    /// Deliver an event to every observer in subscription order.
    ///
    /// Returns the number of observers that were called.
    pub fn emit(&mut self, event: LifecycleEvent) -> usize {
        log::debug!(
            "Emitting lifecycle event '{}' to {} observer(s)",
            event,
            self.observers.len()
        );
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
        self.observers.len()
    }

    /// Get the current number of observers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Observer) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_factory = log.clone();
        let factory = move |name: &str| -> Observer {
            let log = log_for_factory.clone();
            let name = name.to_string();
            Box::new(move |event: LifecycleEvent| {
                log.lock().unwrap().push(format!("{name}:{event}"));
            })
        };
        (log, factory)
    }

    mod lifecycle_event {
        use super::*;

        #[test]
        fn serializes_lowercase() {
            let json = serde_json::to_string(&LifecycleEvent::Reset).unwrap();
            assert_eq!(json, "\"reset\"");

            let parsed: LifecycleEvent = serde_json::from_str("\"loaded\"").unwrap();
            assert_eq!(parsed, LifecycleEvent::Loaded);
        }

        #[test]
        fn display_matches_as_str() {
            for event in [
                LifecycleEvent::Created,
                LifecycleEvent::Loaded,
                LifecycleEvent::Saved,
                LifecycleEvent::Reset,
            ] {
                assert_eq!(event.to_string(), event.as_str());
            }
        }
    }

    mod event_bus {
        use super::*;

        #[test]
        fn new_creates_bus() {
            let bus = EventBus::new();
            assert_eq!(bus.subscriber_count(), 0);
        }

        #[test]
        fn subscribe_increments_count() {
            let mut bus = EventBus::default();
            bus.subscribe(|_| {});
            assert_eq!(bus.subscriber_count(), 1);
            bus.subscribe(|_| {});
            assert_eq!(bus.subscriber_count(), 2);
        }

        #[test]
        fn subscription_ids_are_unique() {
            let mut bus = EventBus::new();
            let a = bus.subscribe(|_| {});
            let b = bus.subscribe(|_| {});
            assert_ne!(a, b);
        }

        #[test]
        fn emit_returns_zero_with_no_subscribers() {
            let mut bus = EventBus::new();
            assert_eq!(bus.emit(LifecycleEvent::Created), 0);
        }

        #[test]
        fn emit_delivers_in_subscription_order() {
            let (log, observer) = recorder();
            let mut bus = EventBus::new();
            bus.subscribe(observer("first"));
            bus.subscribe(observer("second"));
            bus.subscribe(observer("third"));

            let delivered = bus.emit(LifecycleEvent::Saved);

            assert_eq!(delivered, 3);
            assert_eq!(
                *log.lock().unwrap(),
                vec!["first:saved", "second:saved", "third:saved"]
            );
        }

        #[test]
        fn unsubscribe_stops_delivery() {
            let (log, observer) = recorder();
            let mut bus = EventBus::new();
            let first = bus.subscribe(observer("first"));
            bus.subscribe(observer("second"));

            assert!(bus.unsubscribe(&first));
            bus.emit(LifecycleEvent::Loaded);

            assert_eq!(*log.lock().unwrap(), vec!["second:loaded"]);
        }

        #[test]
        fn unsubscribe_unknown_returns_false() {
            let mut bus = EventBus::new();
            bus.subscribe(|_| {});
            assert!(!bus.unsubscribe(&SubscriptionId::new()));
            assert_eq!(bus.subscriber_count(), 1);
        }

        #[test]
        fn late_subscriber_misses_old_events() {
            let (log, observer) = recorder();
            let mut bus = EventBus::new();
            bus.subscribe(observer("early"));

            bus.emit(LifecycleEvent::Created);
            bus.subscribe(observer("late"));
            bus.emit(LifecycleEvent::Saved);

            assert_eq!(
                *log.lock().unwrap(),
                vec!["early:created", "early:saved", "late:saved"]
            );
        }

        #[test]
        fn multiple_events_in_order() {
            let (log, observer) = recorder();
            let mut bus = EventBus::new();
            bus.subscribe(observer("o"));

            bus.emit(LifecycleEvent::Created);
            bus.emit(LifecycleEvent::Loaded);
            bus.emit(LifecycleEvent::Reset);

            assert_eq!(
                *log.lock().unwrap(),
                vec!["o:created", "o:loaded", "o:reset"]
            );
        }
    }
}
