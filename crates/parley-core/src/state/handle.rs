//! A state snapshot bound to its store.

use std::ops::Deref;

use serde_json::Value;

use super::record::{ConversationState, StateData, StatePatch};
use super::store::StateStore;
use crate::foundation::StoreResult;

/// The state of one entity as seen by a handler, with write-through
/// mutation.
///
/// A handle is a snapshot taken when the event was dispatched; it does not
/// observe writes made elsewhere afterwards. Its own successful writes are
/// reflected in the snapshot, so reading the handle after `set` returns what
/// was just stored.
///
/// `StateHandle` derefs to [`ConversationState`]:
///
/// ```rust,ignore
/// async fn ask_name(event: BoxedEvent, mut state: StateHandle) -> anyhow::Result<()> {
///     if state.is_virgin() {
///         state.set_label("awaiting_name").await?;
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StateHandle {
    state: ConversationState,
    store: StateStore,
}

impl StateHandle {
    /// Binds `state` to `store`.
    pub fn new(state: ConversationState, store: StateStore) -> Self {
        Self { state, store }
    }

    /// Returns the entity id this handle is bound to.
    pub fn entity_id(&self) -> &str {
        &self.state.entity_id
    }

    /// Returns the current label.
    pub fn label(&self) -> Option<&str> {
        self.state.label()
    }

    /// Returns the current data.
    pub fn data(&self) -> Option<&StateData> {
        self.state.data.as_ref()
    }

    /// Returns the snapshot.
    pub fn snapshot(&self) -> &ConversationState {
        &self.state
    }

    /// Returns the store this handle writes to.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Merges `label` and `data` into the stored state. `None` leaves the
    /// field as it is.
    pub async fn set(&mut self, label: Option<String>, data: Option<StateData>) -> StoreResult<()> {
        self.apply(StatePatch { label, data }).await
    }

    /// Writes `patch` through to the store.
    pub async fn apply(&mut self, patch: StatePatch) -> StoreResult<()> {
        let record = self.store.set(&self.state.entity_id, patch).await?;
        self.state.label = record.label;
        self.state.data = record.data;
        Ok(())
    }

    /// Changes only the label.
    pub async fn set_label(&mut self, label: impl Into<String>) -> StoreResult<()> {
        self.apply(StatePatch::new().label(label)).await
    }

    /// Replaces only the data.
    pub async fn set_data(&mut self, data: StateData) -> StoreResult<()> {
        self.apply(StatePatch::new().data(data)).await
    }

    /// Inserts one key into the data map, creating the map if needed.
    ///
    /// The whole map is written back, so keys added concurrently by another
    /// writer may be lost unless the store uses entity locks.
    pub async fn insert(&mut self, key: impl Into<String>, value: Value) -> StoreResult<()> {
        let mut data = self.state.data.clone().unwrap_or_default();
        data.insert(key.into(), value);
        self.set_data(data).await
    }

    /// Removes the stored state; the handle becomes virgin.
    pub async fn delete(&mut self) -> StoreResult<()> {
        self.store.delete(&self.state.entity_id).await?;
        self.state.label = None;
        self.state.data = None;
        Ok(())
    }

    /// Consumes the handle, returning the snapshot.
    pub fn into_state(self) -> ConversationState {
        self.state
    }
}

impl Deref for StateHandle {
    type Target = ConversationState;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::assert_ok;

    use super::*;

    #[tokio::test]
    async fn test_handle_writes_through() {
        let store = StateStore::memory();
        let mut handle = assert_ok!(store.get("telegram_12").await);

        let mut data = StateData::new();
        data.insert("key".into(), json!("value"));
        assert_ok!(handle.set(Some("some_state".into()), Some(data.clone())).await);

        assert_eq!(handle.label(), Some("some_state"));
        let stored = assert_ok!(store.load("telegram_12").await);
        assert_eq!(stored.label(), Some("some_state"));
        assert_eq!(stored.data, Some(data));
    }

    #[tokio::test]
    async fn test_handle_set_label_keeps_data() {
        let store = StateStore::memory();
        let mut handle = assert_ok!(store.get("telegram_12").await);
        assert_ok!(handle.insert("name", json!("Ann")).await);
        assert_ok!(handle.set_label("awaiting_age").await);

        let reloaded = assert_ok!(store.get("telegram_12").await);
        assert!(reloaded.is("awaiting_age"));
        assert_eq!(reloaded.get("name"), Some(&json!("Ann")));
    }

    #[tokio::test]
    async fn test_handle_delete() {
        let store = StateStore::memory();
        let mut handle = assert_ok!(store.get("viber_u1").await);
        assert_ok!(handle.set_label("menu").await);
        assert_ok!(handle.delete().await);

        assert!(handle.is_virgin());
        assert!(assert_ok!(store.load("viber_u1").await).is_virgin());
    }

    #[tokio::test]
    async fn test_snapshot_does_not_see_foreign_writes() {
        let store = StateStore::memory();
        let handle = assert_ok!(store.get("facebook_1").await);
        assert_ok!(store.set("facebook_1", StatePatch::new().label("elsewhere")).await);

        assert!(handle.is_virgin());
        assert!(assert_ok!(store.get("facebook_1").await).is("elsewhere"));
    }
}
