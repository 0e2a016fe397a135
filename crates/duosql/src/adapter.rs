//! Execution seam between the statement builders and the drivers.
//!
//! An [`Adapter`] knows its [`PlaceholderStyle`], runs a built [`Statement`]
//! and hands back backend-neutral [`Row`]s or an affected-row count. Driver
//! failures are returned as-is: no retry, no transaction wrapping.

use crate::config::{BackendKind, DatabaseConfig};
use crate::error::{DbError, DbResult};
use crate::placeholder::PlaceholderStyle;
use crate::row::Row;
use crate::template::Statement;
use crate::value::Value;
use deadpool_postgres::Pool;
use rusqlite::Connection;
use std::future::Future;
use std::sync::{Arc, Mutex};

pub mod postgres;
pub mod sqlite;

pub use postgres::PostgresAdapter;
pub use sqlite::SqliteAdapter;

/// A live backend that can run [`Statement`]s.
pub trait Adapter: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Placeholder style statements must be built with for this backend.
    fn style(&self) -> PlaceholderStyle;

    /// Execute a statement and return all rows.
    fn query(&self, stmt: &Statement) -> impl Future<Output = DbResult<Vec<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, stmt: &Statement) -> impl Future<Output = DbResult<u64>> + Send;

    /// Execute a statement and return the first row, if any.
    fn query_opt(&self, stmt: &Statement) -> impl Future<Output = DbResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(stmt).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the first column of the first row, if any.
    fn query_scalar(
        &self,
        stmt: &Statement,
    ) -> impl Future<Output = DbResult<Option<Value>>> + Send {
        async move {
            let row = self.query_opt(stmt).await?;
            Ok(row.and_then(|r| r.into_values().into_iter().next()))
        }
    }
}

/// The backend selected for a database handle.
#[derive(Clone)]
pub enum Backend {
    Sqlite(SqliteAdapter),
    Postgres(PostgresAdapter),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Backend").field(&self.kind()).finish()
    }
}

impl Backend {
    /// Open the backend described by `config`.
    ///
    /// For Postgres one pooled connection is checked out up front so that an
    /// unreachable server fails here rather than on the first query.
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::Embedded(c) => {
                let c = c.clone();
                let adapter = tokio::task::spawn_blocking(move || SqliteAdapter::open(&c)).await??;
                Ok(Backend::Sqlite(adapter))
            }
            DatabaseConfig::Remote(c) => {
                let adapter = PostgresAdapter::connect(c)?;
                let probe = adapter.pool().get().await.map_err(|e| match e {
                    deadpool_postgres::PoolError::Backend(e) => DbError::Postgres(e),
                    other => DbError::Connection(format!("{}:{}: {other}", c.host, c.port)),
                })?;
                drop(probe);
                tracing::info!(
                    target: "duosql",
                    host = %c.host,
                    port = c.port,
                    pool_size = c.pool_size,
                    "postgres pool ready"
                );
                Ok(Backend::Postgres(adapter))
            }
        }
    }

    /// The embedded connection, when this is a SQLite backend.
    pub fn as_sqlite(&self) -> Option<&Arc<Mutex<Connection>>> {
        match self {
            Backend::Sqlite(a) => Some(a.connection()),
            Backend::Postgres(_) => None,
        }
    }

    /// The connection pool, when this is a Postgres backend.
    pub fn as_postgres(&self) -> Option<&Pool> {
        match self {
            Backend::Postgres(a) => Some(a.pool()),
            Backend::Sqlite(_) => None,
        }
    }
}

impl From<SqliteAdapter> for Backend {
    fn from(a: SqliteAdapter) -> Self {
        Backend::Sqlite(a)
    }
}

impl From<PostgresAdapter> for Backend {
    fn from(a: PostgresAdapter) -> Self {
        Backend::Postgres(a)
    }
}

impl Adapter for Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Backend::Sqlite(a) => a.kind(),
            Backend::Postgres(a) => a.kind(),
        }
    }

    fn style(&self) -> PlaceholderStyle {
        match self {
            Backend::Sqlite(a) => a.style(),
            Backend::Postgres(a) => a.style(),
        }
    }

    async fn query(&self, stmt: &Statement) -> DbResult<Vec<Row>> {
        match self {
            Backend::Sqlite(a) => a.query(stmt).await,
            Backend::Postgres(a) => a.query(stmt).await,
        }
    }

    async fn execute(&self, stmt: &Statement) -> DbResult<u64> {
        match self {
            Backend::Sqlite(a) => a.execute(stmt).await,
            Backend::Postgres(a) => a.execute(stmt).await,
        }
    }
}

const MAX_LOGGED_SQL: usize = 200;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emit the statement about to run on the `duosql.sql` target.
pub(crate) fn log_statement(kind: BackendKind, op: &'static str, stmt: &Statement) {
    let sql = truncate_sql_bytes(&stmt.sql, MAX_LOGGED_SQL);
    tracing::debug!(
        target: "duosql.sql",
        backend = %kind,
        op,
        param_count = stmt.values.len(),
        truncated = sql.len() < stmt.sql.len(),
        sql = %sql,
        "executing statement"
    );
}
