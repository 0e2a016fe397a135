//! CRUD statement builders.
//!
//! Each builder turns a table name plus [`Record`]s into a [`Template`]. The
//! template carries no dialect; placeholders are numbered only when it is built
//! for a [`PlaceholderStyle`](crate::PlaceholderStyle), so a multi-row insert or an
//! update numbers its parameters once, across the whole statement.
//!
//! Table and column names are written verbatim. They are trusted input.
//!
//! # Example
//!
//! ```
//! use duosql::{PlaceholderStyle, builder, record};
//!
//! let rows = vec![
//!     record! { "title" => "hello", "body" => "world" },
//!     record! { "title" => "hi", "body" => "universe" },
//! ];
//! let stmt = builder::insert("contents", rows)?.build(PlaceholderStyle::Numbered);
//! assert_eq!(
//!     stmt.sql,
//!     "INSERT INTO contents (title, body) VALUES ($1, $2), ($3, $4)"
//! );
//! # Ok::<(), duosql::DbError>(())
//! ```

use crate::error::{DbError, DbResult};
use crate::record::Record;
use crate::template::Template;
use serde::Serialize;
use std::fmt;


/// Which write produced an [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => f.write_str("insert"),
            Operation::Update => f.write_str("update"),
        }
    }
}

/// Outcome of an insert or update. `affected` is the count the backend reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub operation: Operation,
    pub affected: u64,
}

impl OperationResult {
    pub fn inserted(affected: u64) -> Self {
        Self {
            operation: Operation::Insert,
            affected,
        }
    }

    pub fn updated(affected: u64) -> Self {
        Self {
            operation: Operation::Update,
            affected,
        }
    }
}

/// Insert payload: one row or several rows sharing the same columns.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertRows {
    One(Record),
    Many(Vec<Record>),
}

impl InsertRows {
    pub fn len(&self) -> usize {
        match self {
            InsertRows::One(_) => 1,
            InsertRows::Many(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Record> for InsertRows {
    fn from(row: Record) -> Self {
        InsertRows::One(row)
    }
}

impl From<&Record> for InsertRows {
    fn from(row: &Record) -> Self {
        InsertRows::One(row.clone())
    }
}

impl From<Vec<Record>> for InsertRows {
    fn from(rows: Vec<Record>) -> Self {
        InsertRows::Many(rows)
    }
}

impl From<&[Record]> for InsertRows {
    fn from(rows: &[Record]) -> Self {
        InsertRows::Many(rows.to_vec())
    }
}

impl<const N: usize> From<[Record; N]> for InsertRows {
    fn from(rows: [Record; N]) -> Self {
        InsertRows::Many(rows.into())
    }
}

/// `INSERT INTO table (k1, k2, ...) VALUES (...), (...)`.
///
/// Columns come from the first row. Every further row must have the same keys
/// in the same order; values are bound row by row, then key by key.
///
/// A single row without columns renders `INSERT INTO table DEFAULT VALUES`.
pub fn insert(table: &str, rows: impl Into<InsertRows>) -> DbResult<Template> {
    let rows = match rows.into() {
        InsertRows::One(row) => vec![row],
        InsertRows::Many(rows) => rows,
    };

    let Some(first) = rows.first() else {
        return Err(DbError::shape(format!(
            "insert into {table} requires at least one row"
        )));
    };

    if first.is_empty() {
        if rows.len() > 1 {
            return Err(DbError::shape(format!(
                "multi-row insert into {table} requires at least one column"
            )));
        }
        return Ok(Template::new(format!("INSERT INTO {table} DEFAULT VALUES")));
    }

    if let Some(idx) = rows.iter().position(|r| !r.same_columns(first)) {
        return Err(DbError::shape(format!(
            "insert into {table}: row {idx} has columns ({}), expected ({})",
            rows[idx].keys().collect::<Vec<_>>().join(", "),
            first.keys().collect::<Vec<_>>().join(", "),
        )));
    }

    let columns = first.keys().collect::<Vec<_>>().join(", ");
    let mut t = Template::new(format!("INSERT INTO {table} ({columns}) VALUES "));

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            t.push(", ");
        }
        t.push("(");
        t.push_bind_list(row.values().cloned());
        t.push(")");
    }
    Ok(t)
}

/// `UPDATE table SET d1 = ?, ... WHERE w1 = ? AND ...`.
///
/// `data` values are bound before `where_` values, continuing the same count.
/// Both mappings must be non-empty.
pub fn update(table: &str, where_: &Record, data: &Record) -> DbResult<Template> {
    if data.is_empty() {
        return Err(DbError::shape(format!("update of {table} requires SET columns")));
    }
    if where_.is_empty() {
        return Err(DbError::shape(format!(
            "update of {table} requires WHERE columns"
        )));
    }

    let mut t = Template::new(format!("UPDATE {table} SET "));
    for (i, (column, value)) in data.iter().enumerate() {
        if i > 0 {
            t.push(", ");
        }
        t.push(column).push(" = ").push_bind(value.clone());
    }
    t.push_template(where_clause(where_));
    Ok(t)
}

/// `SELECT * FROM table WHERE k1 = ? AND ...`, or no `WHERE` for an empty mapping.
pub fn select(table: &str, where_: &Record) -> Template {
    let mut t = Template::new(format!("SELECT * FROM {table}"));
    t.push_template(where_clause(where_));
    t
}

/// ` WHERE k1 = ? AND k2 = ?` over the keys in order; empty for an empty mapping.
pub fn where_clause(where_: &Record) -> Template {
    let mut t = Template::empty();
    for (i, (column, value)) in where_.iter().enumerate() {
        t.push(if i == 0 { " WHERE " } else { " AND " });
        t.push(column).push(" = ").push_bind(value.clone());
    }
    t
}
