//! Event system for Parley.
//!
//! - [`Event`] - Base trait for all inbound platform events
//! - [`BoxedEvent`] - Type-erased, cheaply cloneable container passed through
//!   the dispatcher
//!
//! Events arrive already decoded. Parley never parses provider payloads; it
//! only needs to know which platform an event belongs to and to hand the
//! concrete value back to predicates and callbacks via downcasting.

use std::any::Any;
use std::sync::Arc;

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all inbound events.
///
/// Events are type-erased using `dyn Event` and can be downcast to concrete
/// types using [`as_any()`](Event::as_any) or [`BoxedEvent::downcast_ref`].
///
/// ```rust,ignore
/// #[derive(Debug, Clone)]
/// struct PingEvent {
///     user: u64,
/// }
///
/// impl Event for PingEvent {
///     fn event_name(&self) -> &'static str {
///         "ping"
///     }
///
///     fn platform(&self) -> &'static str {
///         "test"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Event: Any + Send + Sync {
    /// Returns the human-readable name of this event type.
    fn event_name(&self) -> &'static str;

    /// Returns the platform tag (e.g. "telegram", "vkontakte").
    ///
    /// This is the key used by [`EntityIdResolver`](crate::EntityIdResolver)
    /// and the prefix of every entity id derived from this event.
    fn platform(&self) -> &'static str;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Boxed Event
// ============================================================================

/// A type-erased container for events that supports runtime downcasting.
///
/// `BoxedEvent` wraps any type implementing [`Event`] in an `Arc`, so cloning
/// it into a callback is cheap. It derefs to `dyn Event`:
///
/// ```rust,ignore
/// let event = BoxedEvent::new(update);
/// assert_eq!(event.platform(), "telegram");
/// let update: &Update = event.downcast_ref().unwrap();
/// ```
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing `Event`.
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }

    /// Returns `true` if the wrapped event is of type `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.inner.as_any().is::<E>()
    }
}

impl<E: Event> From<E> for BoxedEvent {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .field("platform", &self.platform())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u64);

    impl Event for Ping {
        fn event_name(&self) -> &'static str {
            "ping"
        }

        fn platform(&self) -> &'static str {
            "test"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Pong;

    impl Event for Pong {
        fn event_name(&self) -> &'static str {
            "pong"
        }

        fn platform(&self) -> &'static str {
            "test"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_downcast_to_concrete_type() {
        let event = BoxedEvent::new(Ping(7));
        assert!(event.is::<Ping>());
        assert!(!event.is::<Pong>());
        assert_eq!(event.downcast_ref::<Ping>(), Some(&Ping(7)));
        assert!(event.downcast_ref::<Pong>().is_none());
    }

    #[test]
    fn test_deref_exposes_event_methods() {
        let event: BoxedEvent = Ping(1).into();
        assert_eq!(event.event_name(), "ping");
        assert_eq!(event.platform(), "test");
        assert_eq!(
            format!("{event:?}"),
            "BoxedEvent { event_name: \"ping\", platform: \"test\" }"
        );
    }
}
