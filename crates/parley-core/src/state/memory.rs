//! In-memory state backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::backend::StateBackend;
use super::record::StateRecord;
use crate::foundation::StoreResult;

/// Process-lifetime backend holding records in a hash map.
///
/// Records are kept natively (no serialization) and are lost when the
/// process exits. This is the default backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, StateRecord>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, entity_id: &str) -> StoreResult<Option<StateRecord>> {
        Ok(self.records.read().get(entity_id).cloned())
    }

    async fn put(&self, entity_id: &str, record: StateRecord) -> StoreResult<()> {
        self.records.write().insert(entity_id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, entity_id: &str) -> StoreResult<()> {
        self.records.write().remove(entity_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;

    #[tokio::test]
    async fn test_put_load_delete() {
        let backend = MemoryBackend::new();
        assert!(assert_ok!(backend.load("telegram_1").await).is_none());

        let record = StateRecord::new(Some("menu".into()), None);
        assert_ok!(backend.put("telegram_1", record.clone()).await);
        assert_eq!(assert_ok!(backend.load("telegram_1").await), Some(record));
        assert_eq!(backend.len(), 1);

        assert_ok!(backend.delete("telegram_1").await);
        assert_ok!(backend.delete("telegram_1").await);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let backend = MemoryBackend::new();
        let first = StateRecord::new(Some("a".into()), Some(Default::default()));
        let second = StateRecord::new(Some("b".into()), None);

        assert_ok!(backend.put("viber_x", first).await);
        assert_ok!(backend.put("viber_x", second.clone()).await);
        assert_eq!(assert_ok!(backend.load("viber_x").await), Some(second));
    }
}
