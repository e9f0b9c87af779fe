//! Building a [`StateStore`] from configuration.

use parley_core::StateStore;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::RuntimeResult;

/// Opens the backend selected by `config` and wraps it in a store.
///
/// Network backends are connected before this returns, so a wrong URL fails
/// here rather than on the first event.
pub async fn connect_store(config: &StoreConfig) -> RuntimeResult<StateStore> {
    let store = match config.backend {
        StoreBackend::Memory => StateStore::memory(),
        StoreBackend::Redis => connect_redis(config).await?,
        StoreBackend::Postgres => connect_postgres(config).await?,
    };
    let store = if config.entity_locks {
        store.with_entity_locks()
    } else {
        store
    };

    info!(
        backend = store.backend_name(),
        entity_locks = store.has_entity_locks(),
        "State store ready"
    );
    Ok(store)
}

#[cfg(feature = "redis")]
async fn connect_redis(config: &StoreConfig) -> RuntimeResult<StateStore> {
    let redis = &config.redis;
    let backend = parley_store::RedisBackend::connect(&redis.url, redis.key_prefix.as_str()).await?;
    Ok(StateStore::new(backend))
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_config: &StoreConfig) -> RuntimeResult<StateStore> {
    Err(crate::RuntimeError::BackendDisabled {
        backend: "redis",
        feature: "redis",
    })
}

#[cfg(feature = "postgres")]
async fn connect_postgres(config: &StoreConfig) -> RuntimeResult<StateStore> {
    let postgres = &config.postgres;
    let backend = parley_store::PostgresBackend::connect(
        &postgres.url,
        &postgres.table,
        postgres.max_connections,
    )
    .await?;
    if postgres.create_table {
        backend.ensure_schema().await?;
    }
    Ok(StateStore::new(backend))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_config: &StoreConfig) -> RuntimeResult<StateStore> {
    Err(crate::RuntimeError::BackendDisabled {
        backend: "postgres",
        feature: "postgres",
    })
}
