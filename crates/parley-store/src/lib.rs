//! # Parley Store
//!
//! Durable [`StateBackend`] implementations.
//!
//! | Backend             | Feature    | Storage                               |
//! |---------------------|------------|---------------------------------------|
//! | [`MemoryBackend`]   | (always)   | process memory, lost on exit          |
//! | `RedisBackend`      | `redis`    | one JSON string per key (`fred`)      |
//! | `PostgresBackend`   | `postgres` | one JSONB row per entity (`sqlx`)     |
//!
//! Every backend only moves whole [`StateRecord`](parley_core::StateRecord)s;
//! wrap it in a [`StateStore`](parley_core::StateStore) to get partial
//! updates and virgin-state synthesis.
//!
//! ```rust,ignore
//! use parley_core::StateStore;
//! use parley_store::RedisBackend;
//!
//! let backend = RedisBackend::connect("redis://127.0.0.1:6379", "parley:state:").await?;
//! let store = StateStore::new(backend);
//! ```

pub use parley_core::{MemoryBackend, StateBackend};

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;
#[cfg(feature = "redis")]
pub use redis::RedisBackend;
