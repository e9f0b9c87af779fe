//! The state store: one uniform API over any [`StateBackend`].

use std::sync::Arc;

use tracing::{debug, trace};

use super::backend::{BoxedBackend, StateBackend};
use super::handle::StateHandle;
use super::lock::EntityLocks;
use super::memory::MemoryBackend;
use super::record::{ConversationState, StatePatch, StateRecord};
use crate::foundation::StoreResult;

/// Conversation state storage used by the dispatcher and by handlers.
///
/// `StateStore` turns the raw [`StateBackend`] contract into the operations
/// the engine needs:
///
/// - [`get`](Self::get) never reports "not found"; a missing record yields
///   the virgin state.
/// - [`set`](Self::set) is a read-modify-write merge: fields the patch leaves
///   out keep their stored value.
/// - [`delete`](Self::delete) is idempotent.
///
/// Cloning is cheap; all clones share the backend.
///
/// # Concurrency
///
/// By default there is no compare-and-swap around `set`, so two concurrent
/// `set`s for the same id can race and the last write wins. Call
/// [`with_entity_locks`](Self::with_entity_locks) to serialize `set` and
/// `delete` per entity id inside this process.
#[derive(Clone)]
pub struct StateStore {
    backend: BoxedBackend,
    locks: Option<Arc<EntityLocks>>,
}

impl StateStore {
    /// Creates a store over `backend`.
    pub fn new<B: StateBackend>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Creates a store over an already shared backend.
    pub fn from_arc(backend: BoxedBackend) -> Self {
        Self {
            backend,
            locks: None,
        }
    }

    /// Creates a store over a fresh [`MemoryBackend`].
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Serializes writes per entity id (builder pattern).
    pub fn with_entity_locks(mut self) -> Self {
        self.locks = Some(Arc::new(EntityLocks::new()));
        self
    }

    /// Returns `true` if writes are serialized per entity id.
    pub fn has_entity_locks(&self) -> bool {
        self.locks.is_some()
    }

    /// Returns the backend's name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &BoxedBackend {
        &self.backend
    }

    /// Loads the current state of `entity_id`.
    pub async fn load(&self, entity_id: &str) -> StoreResult<ConversationState> {
        let record = self.backend.load(entity_id).await?;
        trace!(
            backend = self.backend.name(),
            entity_id,
            found = record.is_some(),
            "Loaded state"
        );
        Ok(ConversationState::from_record(entity_id, record))
    }

    /// Loads the current state of `entity_id` as a handle bound to this
    /// store.
    pub async fn get(&self, entity_id: &str) -> StoreResult<StateHandle> {
        let state = self.load(entity_id).await?;
        Ok(StateHandle::new(state, self.clone()))
    }

    /// Merges `patch` into the stored state of `entity_id` and returns the
    /// record that was written.
    pub async fn set(&self, entity_id: &str, patch: StatePatch) -> StoreResult<StateRecord> {
        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(entity_id).await),
            None => None,
        };

        let mut record = self.backend.load(entity_id).await?.unwrap_or_default();
        record.apply(patch);
        self.backend.put(entity_id, record.clone()).await?;

        debug!(
            backend = self.backend.name(),
            entity_id,
            label = record.label.as_deref(),
            "Stored state"
        );
        Ok(record)
    }

    /// Removes the stored state of `entity_id`.
    pub async fn delete(&self, entity_id: &str) -> StoreResult<()> {
        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(entity_id).await),
            None => None,
        };

        self.backend.delete(entity_id).await?;
        debug!(backend = self.backend.name(), entity_id, "Deleted state");
        Ok(())
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("backend", &self.backend.name())
            .field("entity_locks", &self.locks.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::foundation::StoreError;
    use crate::state::StateData;

    fn data(value: Value) -> StateData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_get_is_virgin_for_unknown_id() {
        let store = StateStore::memory();
        let handle = assert_ok!(store.get("telegram_12").await);
        assert_eq!(handle.entity_id(), "telegram_12");
        assert!(handle.label().is_none());
        assert!(handle.data().is_none());
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let store = StateStore::memory();
        assert_ok!(store.set("telegram_12", StatePatch::new().label("a")).await);

        let first = assert_ok!(store.load("telegram_12").await);
        let second = assert_ok!(store.load("telegram_12").await);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let store = StateStore::memory();
        let patch = StatePatch::new()
            .label("some_state")
            .data(data(json!({"key": "value"})));
        assert_ok!(store.set("telegram_12", patch).await);

        let state = assert_ok!(store.load("telegram_12").await);
        assert_eq!(state.label(), Some("some_state"));
        assert_eq!(state.data, Some(data(json!({"key": "value"}))));
    }

    #[tokio::test]
    async fn test_partial_update_preserves_data() {
        let store = StateStore::memory();
        let d0 = data(json!({"step": 0}));
        assert_ok!(
            store
                .set("vkontakte_3", StatePatch::new().label("l0").data(d0.clone()))
                .await
        );
        assert_ok!(store.set("vkontakte_3", StatePatch::new().label("l1")).await);

        let state = assert_ok!(store.load("vkontakte_3").await);
        assert_eq!(state.label(), Some("l1"));
        assert_eq!(state.data, Some(d0));
    }

    #[tokio::test]
    async fn test_empty_patch_on_virgin_stays_virgin() {
        let store = StateStore::memory();
        let written = assert_ok!(store.set("viber_1", StatePatch::new()).await);
        assert!(written.is_virgin());
        assert!(assert_ok!(store.load("viber_1").await).is_virgin());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_virgin() {
        let store = StateStore::memory();
        assert_ok!(store.set("facebook_9", StatePatch::new().label("x")).await);
        assert_ok!(store.delete("facebook_9").await);
        assert!(assert_ok!(store.load("facebook_9").await).is_virgin());

        // Deleting again is not an error.
        assert_ok!(store.delete("facebook_9").await);
    }

    struct DownBackend;

    #[async_trait]
    impl StateBackend for DownBackend {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn load(&self, _entity_id: &str) -> StoreResult<Option<StateRecord>> {
            Err(StoreError::unavailable("down", "connection refused"))
        }

        async fn put(&self, _entity_id: &str, _record: StateRecord) -> StoreResult<()> {
            Err(StoreError::unavailable("down", "connection refused"))
        }

        async fn delete(&self, _entity_id: &str) -> StoreResult<()> {
            Err(StoreError::unavailable("down", "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let store = StateStore::new(DownBackend);
        let err = assert_err!(store.get("telegram_1").await);
        assert!(err.is_unavailable());
        assert_err!(store.set("telegram_1", StatePatch::new().label("x")).await);
        assert_err!(store.delete("telegram_1").await);
    }

    /// A memory backend whose loads yield before returning, so concurrent
    /// read-modify-writes interleave.
    #[derive(Default)]
    struct SlowBackend {
        inner: MemoryBackend,
    }

    #[async_trait]
    impl StateBackend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn load(&self, entity_id: &str) -> StoreResult<Option<StateRecord>> {
            let record = self.inner.load(entity_id).await?;
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(record)
        }

        async fn put(&self, entity_id: &str, record: StateRecord) -> StoreResult<()> {
            self.inner.put(entity_id, record).await
        }

        async fn delete(&self, entity_id: &str) -> StoreResult<()> {
            self.inner.delete(entity_id).await
        }
    }

    #[tokio::test]
    async fn test_entity_locks_keep_both_fields() {
        let store = StateStore::new(SlowBackend::default()).with_entity_locks();
        let d = data(json!({"answer": 42}));

        let (a, b) = tokio::join!(
            store.set("telegram_7", StatePatch::new().label("done")),
            store.set("telegram_7", StatePatch::new().data(d.clone())),
        );
        assert_ok!(a);
        assert_ok!(b);

        let state = assert_ok!(store.load("telegram_7").await);
        assert_eq!(state.label(), Some("done"));
        assert_eq!(state.data, Some(d));
    }

    #[tokio::test]
    async fn test_without_locks_last_write_wins() {
        let store = StateStore::new(SlowBackend::default());
        let d = data(json!({"answer": 42}));

        let (a, b) = tokio::join!(
            store.set("telegram_7", StatePatch::new().label("done")),
            store.set("telegram_7", StatePatch::new().data(d)),
        );
        assert_ok!(a);
        assert_ok!(b);

        // Both writers read the virgin record before either wrote, so one
        // field is lost.
        let state = assert_ok!(store.load("telegram_7").await);
        assert!(state.label.is_none() || state.data.is_none());
    }
}
