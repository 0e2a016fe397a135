//! Embedded engine adapter over a single `rusqlite` connection.

use super::{Adapter, log_statement};
use crate::config::{BackendKind, EmbeddedConfig};
use crate::error::{DbError, DbResult};
use crate::placeholder::PlaceholderStyle;
use crate::row::Row;
use crate::template::Statement;
use crate::value::Value;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use std::sync::{Arc, Mutex};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(b) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Int(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

/// SQLite adapter. Every statement runs on the blocking pool while holding the
/// connection lock, so statements on one handle never interleave.
#[derive(Clone)]
pub struct SqliteAdapter {
    conn: Arc<Mutex<Connection>>,
    statement_cache: bool,
}

impl SqliteAdapter {
    /// Open the file named by `config`, or an in-memory database.
    pub fn open(config: &EmbeddedConfig) -> DbResult<Self> {
        let conn = match &config.file {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let location = config
            .file
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
        tracing::info!(
            target: "duosql",
            file = %location,
            statement_cache = config.statement_cache,
            "sqlite connection opened"
        );

        Ok(Self::from_connection(conn).statement_cache(config.statement_cache))
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            statement_cache: true,
        }
    }

    pub fn statement_cache(mut self, enabled: bool) -> Self {
        self.statement_cache = enabled;
        self
    }

    /// The shared connection handle.
    pub fn connection(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }

    async fn run<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| DbError::Task("sqlite connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await?
    }
}

fn read_rows(prepared: &mut rusqlite::Statement<'_>, values: &[Value]) -> DbResult<Vec<Row>> {
    let columns: Arc<[String]> = prepared
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = prepared.query(params_from_iter(values.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut vals = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            vals.push(Value::from(row.get_ref(i)?));
        }
        out.push(Row::new(Arc::clone(&columns), vals));
    }
    Ok(out)
}

fn query_rows(conn: &Connection, stmt: &Statement, cached: bool) -> DbResult<Vec<Row>> {
    if cached {
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        read_rows(&mut prepared, &stmt.values)
    } else {
        let mut prepared = conn.prepare(&stmt.sql)?;
        read_rows(&mut prepared, &stmt.values)
    }
}

/// Run `prepared` for effect. Statements that yield rows (`RETURNING`,
/// `PRAGMA`, plain `SELECT`) are drained and report the rows they changed.
fn run_for_effect(
    conn: &Connection,
    prepared: &mut rusqlite::Statement<'_>,
    values: &[Value],
) -> DbResult<u64> {
    let params = params_from_iter(values.iter());
    if prepared.column_count() == 0 {
        return Ok(prepared.execute(params)? as u64);
    }

    let before = conn.total_changes();
    let mut rows = prepared.query(params)?;
    while rows.next()?.is_some() {}
    drop(rows);
    Ok(conn.total_changes().saturating_sub(before))
}

fn execute_stmt(conn: &Connection, stmt: &Statement, cached: bool) -> DbResult<u64> {
    if cached {
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        run_for_effect(conn, &mut prepared, &stmt.values)
    } else {
        let mut prepared = conn.prepare(&stmt.sql)?;
        run_for_effect(conn, &mut prepared, &stmt.values)
    }
}

impl Adapter for SqliteAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Positional
    }

    async fn query(&self, stmt: &Statement) -> DbResult<Vec<Row>> {
        log_statement(self.kind(), "query", stmt);
        let stmt = stmt.clone();
        let cached = self.statement_cache;
        self.run(move |conn| query_rows(conn, &stmt, cached)).await
    }

    async fn execute(&self, stmt: &Statement) -> DbResult<u64> {
        log_statement(self.kind(), "execute", stmt);
        let stmt = stmt.clone();
        let cached = self.statement_cache;
        self.run(move |conn| execute_stmt(conn, &stmt, cached)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> SqliteAdapter {
        SqliteAdapter::open(&EmbeddedConfig::memory()).unwrap()
    }

    #[tokio::test]
    async fn round_trips_every_storage_class() {
        let db = adapter();
        db.execute(&Statement::new(
            "CREATE TABLE t (n INTEGER, r REAL, s TEXT, b BLOB, z TEXT)",
            vec![],
        ))
        .await
        .unwrap();

        let values = vec![
            Value::Int(42),
            Value::Float(1.5),
            Value::Text("hi".into()),
            Value::Blob(vec![0, 1, 2]),
            Value::Null,
        ];
        let affected = db
            .execute(&Statement::new("INSERT INTO t VALUES (?, ?, ?, ?, ?)", values.clone()))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = db
            .query(&Statement::new("SELECT * FROM t", vec![]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), &["n", "r", "s", "b", "z"]);
        assert_eq!(rows[0].clone().into_values(), values);
    }

    #[tokio::test]
    async fn bools_are_stored_as_integers() {
        let db = adapter().statement_cache(false);
        let v = db
            .query_scalar(&Statement::new("SELECT ?", vec![Value::Bool(true)]))
            .await
            .unwrap();
        assert_eq!(v, Some(Value::Int(1)));
    }

    #[tokio::test]
    async fn cached_and_uncached_queries_agree() {
        let cached = adapter();
        let uncached = adapter().statement_cache(false);
        let stmt = Statement::new("SELECT ? AS n", vec![Value::Int(3)]);
        for _ in 0..2 {
            assert_eq!(
                cached.query(&stmt).await.unwrap(),
                uncached.query(&stmt).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn execute_drains_row_returning_statements() {
        for db in [adapter(), adapter().statement_cache(false)] {
            db.execute(&Statement::new(
                "CREATE TABLE t (id INTEGER PRIMARY KEY, s TEXT)",
                vec![],
            ))
            .await
            .unwrap();

            let stmt = Statement::new(
                "INSERT INTO t (s) VALUES (?), (?) RETURNING id",
                vec![Value::from("a"), Value::from("b")],
            );
            assert_eq!(db.execute(&stmt).await.unwrap(), 2);

            let select = Statement::new("SELECT * FROM t", vec![]);
            assert_eq!(db.execute(&select).await.unwrap(), 0);
            assert_eq!(
                db.execute(&Statement::new("PRAGMA journal_mode", vec![]))
                    .await
                    .unwrap(),
                0
            );
        }
    }

    #[tokio::test]
    async fn driver_errors_propagate() {
        let db = adapter();
        let err = db
            .query(&Statement::new("SELECT * FROM missing", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }
}
