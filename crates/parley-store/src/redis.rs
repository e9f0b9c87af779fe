//! Redis backend.
//!
//! Each entity is one string key, `<key_prefix><entity_id>`, holding the
//! JSON-encoded record. Keys never expire.

use async_trait::async_trait;
use fred::prelude::*;
use parley_core::{StateBackend, StateRecord, StoreError, StoreResult};
use tracing::{debug, info};

const BACKEND: &str = "redis";

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "parley:state:";

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::unavailable(BACKEND, err)
}

/// Conversation state kept in Redis.
#[derive(Clone)]
pub struct RedisBackend {
    client: Client,
    key_prefix: String,
}

impl RedisBackend {
    /// Connects to the server at `url` and waits until the connection is up.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> StoreResult<Self> {
        let config = Config::from_url(url).map_err(unavailable)?;
        let client = Client::new(config, None, None, None);
        client.connect();
        client.wait_for_connect().await.map_err(unavailable)?;

        info!("Connected to Redis");
        Ok(Self::from_client(client, key_prefix))
    }

    /// Wraps an existing client. The client must already be connected.
    pub fn from_client(client: Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    /// Returns the key prefix.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Returns the Redis key for an entity.
    pub fn key(&self, entity_id: &str) -> String {
        format!("{}{entity_id}", self.key_prefix)
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StateBackend for RedisBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn load(&self, entity_id: &str) -> StoreResult<Option<StateRecord>> {
        let key = self.key(entity_id);
        let raw: Option<String> = self.client.get(&key).await.map_err(unavailable)?;
        debug!(%key, hit = raw.is_some(), "Loaded state");
        raw.map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn put(&self, entity_id: &str, record: StateRecord) -> StoreResult<()> {
        let raw = serde_json::to_string(&record)?;
        self.client
            .set::<(), _, _>(self.key(entity_id), raw, None, None, false)
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, entity_id: &str) -> StoreResult<()> {
        let _: () = self
            .client
            .del(self.key(entity_id))
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}
