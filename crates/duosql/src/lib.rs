//! # duosql
//!
//! A small data-access layer over SQLite and PostgreSQL.
//!
//! ## Features
//!
//! - **Tagged SQL templates**: `sql!("... WHERE id = " {id})` binds every
//!   interpolation as a parameter; `?` or `$n` placeholders are rendered for you
//! - **Plain CRUD**: `insert` / `update` / `get` / `list` over ordered [`Record`]s,
//!   including multi-row inserts numbered across the whole statement
//! - **One handle, two engines**: an embedded `rusqlite` connection or a
//!   `deadpool-postgres` pool behind the same [`Database`] API
//! - **No magic**: no identifier quoting, no migrations, no transactions
//!
//! Table and column names are written into SQL verbatim. Only values are ever
//! bound as parameters, so never pass untrusted input as an identifier.
//!
//! ## Example
//!
//! ```ignore
//! use duosql::{DatabaseOptions, get_database, record, sql};
//!
//! let db = get_database(DatabaseOptions::new()).await?;
//! db.execute("CREATE TABLE contents (id INTEGER PRIMARY KEY, title TEXT, body TEXT)")
//!     .await?;
//!
//! // INSERT
//! db.insert("contents", vec![
//!     record! { "title" => "hello", "body" => "world" },
//!     record! { "title" => "hi", "body" => "universe" },
//! ]).await?;
//!
//! // UPDATE
//! db.update("contents", &record! { "id" => 1 }, &record! { "title" => "hey" })
//!     .await?;
//!
//! // SELECT
//! let row = db.get("contents", &record! { "id" => 1 }).await?;
//! let rows = db.many(sql!("SELECT * FROM contents WHERE title = " {"hi"})).await?;
//! ```

#[macro_use]
mod macros;

pub mod adapter;
pub mod builder;
pub mod config;
pub mod database;
pub mod error;
pub mod placeholder;
pub mod pool;
pub mod record;
pub mod row;
pub mod template;
pub mod value;

pub use adapter::{Adapter, Backend, PostgresAdapter, SqliteAdapter};
pub use builder::{InsertRows, Operation, OperationResult};
pub use config::{BackendKind, DatabaseConfig, DatabaseOptions, EmbeddedConfig, RemoteConfig};
pub use database::{Database, TableHandle, connect, get_database};
pub use error::{DbError, DbResult};
pub use placeholder::PlaceholderStyle;
pub use record::Record;
pub use row::{Row, RowSet};
pub use template::{Statement, Template, sql};
pub use value::{FromValue, Value};

// Re-export the driver crates exposed through `Backend`.
pub use deadpool_postgres;
pub use rusqlite;
pub use tokio_postgres;
