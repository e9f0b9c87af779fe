//! Conversation state values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form data attached to a conversation (a JSON object).
pub type StateData = Map<String, Value>;

/// The persisted `(label, data)` pair for one entity.
///
/// This is the unit a [`StateBackend`](super::StateBackend) stores. Durable
/// backends serialize it as `{"label": ..., "data": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Where the conversation currently stands, e.g. `"awaiting_reply"`.
    #[serde(default)]
    pub label: Option<String>,
    /// Data accumulated along the conversation.
    #[serde(default)]
    pub data: Option<StateData>,
}

impl StateRecord {
    /// Creates a record from its parts.
    pub fn new(label: Option<String>, data: Option<StateData>) -> Self {
        Self { label, data }
    }

    /// Returns `true` if this is the virgin record (no label, no data).
    pub fn is_virgin(&self) -> bool {
        self.label.is_none() && self.data.is_none()
    }

    /// Overlays `patch` onto this record. Fields the patch leaves unset keep
    /// their current value.
    pub fn apply(&mut self, patch: StatePatch) {
        if let Some(label) = patch.label {
            self.label = Some(label);
        }
        if let Some(data) = patch.data {
            self.data = Some(data);
        }
    }
}

/// A partial update for a [`StateRecord`].
///
/// A patch can only *set* fields; it cannot clear one back to `None`. Use
/// [`StateStore::delete`](super::StateStore::delete) to return an entity to
/// the virgin state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    /// New label, if it should change.
    pub label: Option<String>,
    /// New data, if it should change.
    pub data: Option<StateData>,
}

impl StatePatch {
    /// A patch that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label to write.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the data to write.
    pub fn data(mut self, data: StateData) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns `true` if applying this patch cannot change anything.
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.data.is_none()
    }
}

/// The conversation state of one entity.
///
/// An entity with no stored record has the *virgin* state: both `label` and
/// `data` are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    /// The entity id, e.g. `"telegram_1234"`.
    pub entity_id: String,
    /// Current label.
    pub label: Option<String>,
    /// Current data.
    pub data: Option<StateData>,
}

impl ConversationState {
    /// The virgin state for `entity_id`.
    pub fn virgin(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            label: None,
            data: None,
        }
    }

    /// Builds the state of `entity_id` from a loaded record, or the virgin
    /// state if there is none.
    pub fn from_record(entity_id: impl Into<String>, record: Option<StateRecord>) -> Self {
        let record = record.unwrap_or_default();
        Self {
            entity_id: entity_id.into(),
            label: record.label,
            data: record.data,
        }
    }

    /// Returns the label as a string slice.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns `true` if the label equals `label`.
    pub fn is(&self, label: &str) -> bool {
        self.label() == Some(label)
    }

    /// Returns `true` if no record exists for this entity.
    pub fn is_virgin(&self) -> bool {
        self.label.is_none() && self.data.is_none()
    }

    /// Looks up one key in the data map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }

    /// Returns the `(label, data)` pair as a record.
    pub fn to_record(&self) -> StateRecord {
        StateRecord::new(self.label.clone(), self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> StateData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_apply_keeps_unspecified_fields() {
        let mut record = StateRecord::new(Some("start".into()), Some(data(json!({"a": 1}))));

        record.apply(StatePatch::new().label("next"));
        assert_eq!(record.label.as_deref(), Some("next"));
        assert_eq!(record.data, Some(data(json!({"a": 1}))));

        record.apply(StatePatch::new().data(data(json!({"b": 2}))));
        assert_eq!(record.label.as_deref(), Some("next"));
        assert_eq!(record.data, Some(data(json!({"b": 2}))));

        let before = record.clone();
        record.apply(StatePatch::new());
        assert_eq!(record, before);
    }

    #[test]
    fn test_record_json_shape() {
        let record = StateRecord::new(Some("quiz".into()), Some(data(json!({"score": 3}))));
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded, json!({"label": "quiz", "data": {"score": 3}}));

        let virgin: StateRecord = serde_json::from_str("{}").unwrap();
        assert!(virgin.is_virgin());
    }

    #[test]
    fn test_virgin_state() {
        let state = ConversationState::from_record("vkontakte_5", None);
        assert_eq!(state, ConversationState::virgin("vkontakte_5"));
        assert!(state.is_virgin());
        assert!(!state.is("anything"));
        assert!(state.get("key").is_none());
    }
}
