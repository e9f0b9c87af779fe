//! The storage contract every state backend implements.

use std::sync::Arc;

use async_trait::async_trait;

use super::record::StateRecord;
use crate::foundation::StoreResult;

/// Raw key/value persistence for conversation state.
///
/// Backends only move whole records around. Merging partial updates and
/// synthesizing the virgin state on a miss is done once, in
/// [`StateStore`](super::StateStore), for every backend alike.
///
/// # Contract
///
/// - [`load`](Self::load) returns `Ok(None)` for an id that was never stored
///   or was deleted; a miss is not an error.
/// - [`put`](Self::put) fully overwrites the record for `entity_id`.
/// - [`delete`](Self::delete) is idempotent.
/// - A `put` followed by a `load` with no other writer in between returns
///   exactly the record that was put.
/// - Failures are reported as [`StoreError`](crate::StoreError) and are
///   never retried by Parley.
#[async_trait]
pub trait StateBackend: Send + Sync + 'static {
    /// Short name used in logs and errors (e.g. `"memory"`).
    fn name(&self) -> &'static str;

    /// Loads the record stored for `entity_id`, if any.
    async fn load(&self, entity_id: &str) -> StoreResult<Option<StateRecord>>;

    /// Stores `record` for `entity_id`, replacing any previous record.
    async fn put(&self, entity_id: &str, record: StateRecord) -> StoreResult<()>;

    /// Removes the record for `entity_id`. Removing a missing id is a no-op.
    async fn delete(&self, entity_id: &str) -> StoreResult<()>;
}

/// A shared, type-erased backend.
pub type BoxedBackend = Arc<dyn StateBackend>;
