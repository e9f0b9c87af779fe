//! Observation of handled events.
//!
//! An observer installed on the [`Dispatcher`](crate::Dispatcher) is told,
//! after a registration's handler ran, what the conversation state looked
//! like before and after. This is the hook for audit logs and analytics:
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(registry, store, resolver)
//!     .with_observer(TracingObserver);
//!
//! // or any async closure
//! let dispatcher = dispatcher.with_observer(|record: DispatchRecord| async move {
//!     if record.state_changed() {
//!         audit_log.append(&record.entity_id, record.after.label()).await;
//!     }
//! });
//! ```

use std::future::Future;

use async_trait::async_trait;
use parley_core::ConversationState;
use tracing::info;

/// What happened during one matched dispatch pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    /// The entity the event was resolved to.
    pub entity_id: String,
    /// Platform tag of the event.
    pub platform: &'static str,
    /// Name of the event type.
    pub event_name: &'static str,
    /// Name (or `#index`) of the registration that ran.
    pub registration: String,
    /// State loaded before the handler ran.
    pub before: ConversationState,
    /// State re-read after the handler returned.
    pub after: ConversationState,
}

impl DispatchRecord {
    /// Returns `true` if the handler changed the stored state.
    pub fn state_changed(&self) -> bool {
        self.before.label != self.after.label || self.before.data != self.after.data
    }
}

/// Receives a [`DispatchRecord`] after each successful handler run.
#[async_trait]
pub trait DispatchObserver: Send + Sync + 'static {
    /// Called once per matched event, after the handler returned `Ok`.
    async fn observe(&self, record: DispatchRecord);
}

#[async_trait]
impl<F, Fut> DispatchObserver for F
where
    F: Fn(DispatchRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn observe(&self, record: DispatchRecord) {
        self(record).await
    }
}

/// Emits each record as a structured `info` event on the
/// `parley::dispatch` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[async_trait]
impl DispatchObserver for TracingObserver {
    async fn observe(&self, record: DispatchRecord) {
        info!(
            target: "parley::dispatch",
            entity_id = %record.entity_id,
            platform = record.platform,
            event = record.event_name,
            registration = %record.registration,
            old_state = record.before.label(),
            old_state_data = ?record.before.data,
            new_state = record.after.label(),
            new_state_data = ?record.after.data,
            "Handled incoming event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(before: Option<&str>, after: Option<&str>) -> DispatchRecord {
        let state = |label: Option<&str>| ConversationState {
            label: label.map(str::to_string),
            ..ConversationState::virgin("telegram_1")
        };
        DispatchRecord {
            entity_id: "telegram_1".into(),
            platform: "telegram",
            event_name: "telegram.update",
            registration: "greet".into(),
            before: state(before),
            after: state(after),
        }
    }

    #[test]
    fn test_state_changed() {
        assert!(record(None, Some("greeted")).state_changed());
        assert!(!record(Some("greeted"), Some("greeted")).state_changed());
    }

    #[tokio::test]
    async fn test_closure_observer() {
        let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let observer = {
            let seen = std::sync::Arc::clone(&seen);
            move |record: DispatchRecord| {
                let seen = std::sync::Arc::clone(&seen);
                async move { seen.lock().push(record.registration) }
            }
        };

        observer.observe(record(None, None)).await;
        TracingObserver.observe(record(None, None)).await;
        assert_eq!(*seen.lock(), ["greet"]);
    }
}
