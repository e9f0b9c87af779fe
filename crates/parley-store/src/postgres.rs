//! PostgreSQL backend.
//!
//! One row per entity in a table shaped like:
//!
//! ```sql
//! CREATE TABLE conversation_states (
//!     entity_id  TEXT PRIMARY KEY,
//!     label      TEXT,
//!     data       JSONB,
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! The table name is configurable, so it is validated as a plain SQL
//! identifier before it is ever spliced into a statement.

use async_trait::async_trait;
use parley_core::{StateBackend, StateData, StateRecord, StoreError, StoreResult};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use tracing::{debug, info};

const BACKEND: &str = "postgres";

/// Table name used when none is configured.
pub const DEFAULT_TABLE: &str = "conversation_states";

/// Postgres truncates identifiers longer than this.
const MAX_IDENTIFIER_LEN: usize = 63;

fn db_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(err.to_string())
        }
        other => StoreError::unavailable(BACKEND, other),
    }
}

/// Checks that `table` is `name` or `schema.name`, each part a plain
/// unquoted identifier.
pub fn validate_table_name(table: &str) -> StoreResult<()> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        part.len() <= MAX_IDENTIFIER_LEN
            && chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|part| valid_part(part)) {
        Ok(())
    } else {
        Err(StoreError::unavailable(
            BACKEND,
            format!("invalid table name {table:?}"),
        ))
    }
}

struct Statements {
    create: String,
    select: String,
    upsert: String,
    delete: String,
}

impl Statements {
    fn for_table(table: &str) -> Self {
        Self {
            create: format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    entity_id  TEXT PRIMARY KEY,
                    label      TEXT,
                    data       JSONB,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            ),
            select: format!("SELECT label, data FROM {table} WHERE entity_id = $1"),
            upsert: format!(
                "INSERT INTO {table} (entity_id, label, data, updated_at)
                VALUES ($1, $2, $3, now())
                ON CONFLICT (entity_id) DO UPDATE
                SET label = EXCLUDED.label,
                    data = EXCLUDED.data,
                    updated_at = EXCLUDED.updated_at"
            ),
            delete: format!("DELETE FROM {table} WHERE entity_id = $1"),
        }
    }
}

/// Conversation state kept in a PostgreSQL table.
pub struct PostgresBackend {
    pool: PgPool,
    table: String,
    sql: Statements,
}

impl PostgresBackend {
    /// Opens a pool of at most `max_connections` to `url`.
    pub async fn connect(url: &str, table: &str, max_connections: u32) -> StoreResult<Self> {
        validate_table_name(table)?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_error)?;

        info!(table, "Connected to PostgreSQL");
        Self::from_pool(pool, table)
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool, table: &str) -> StoreResult<Self> {
        validate_table_name(table)?;
        Ok(Self {
            pool,
            table: table.to_string(),
            sql: Statements::for_table(table),
        })
    }

    /// Creates the state table if it does not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(&self.sql.create)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        debug!(table = %self.table, "State table ready");
        Ok(())
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl std::fmt::Debug for PostgresBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresBackend")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StateBackend for PostgresBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn load(&self, entity_id: &str) -> StoreResult<Option<StateRecord>> {
        let row: Option<(Option<String>, Option<Json<StateData>>)> =
            sqlx::query_as(&self.sql.select)
                .bind(entity_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(row.map(|(label, data)| StateRecord::new(label, data.map(|Json(data)| data))))
    }

    async fn put(&self, entity_id: &str, record: StateRecord) -> StoreResult<()> {
        sqlx::query(&self.sql.upsert)
            .bind(entity_id)
            .bind(record.label)
            .bind(record.data.map(Json))
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, entity_id: &str) -> StoreResult<()> {
        sqlx::query(&self.sql.delete)
            .bind(entity_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
