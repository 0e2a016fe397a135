//! The database handle callers work with.
//!
//! [`Database`] wires the statement builders to the active [`Backend`]: it
//! builds every statement with the backend's placeholder style and runs it.

use crate::adapter::{Adapter, Backend};
use crate::builder::{self, InsertRows, OperationResult};
use crate::config::{BackendKind, DatabaseConfig, DatabaseOptions};
use crate::error::DbResult;
use crate::placeholder::PlaceholderStyle;
use crate::record::Record;
use crate::row::Row;
use crate::template::{Statement, Template};
use crate::value::Value;

/// Open a database from an explicit configuration.
pub async fn connect(config: impl Into<DatabaseConfig>) -> DbResult<Database> {
    let backend = Backend::connect(&config.into()).await?;
    Ok(Database::new(backend))
}

/// Open a database from loose options, inferring the backend when `type` is
/// not given: a `host` selects Postgres, otherwise an embedded database is
/// used (in memory unless `file` is set).
pub async fn get_database(options: DatabaseOptions) -> DbResult<Database> {
    connect(options.into_config()?).await
}

/// A handle over one backend connection or pool.
///
/// Cloning is cheap and shares the underlying connection/pool.
///
/// # Example
///
/// ```no_run
/// use duosql::{DatabaseOptions, get_database, record, sql};
///
/// # async fn run() -> duosql::DbResult<()> {
/// let db = get_database(DatabaseOptions::new()).await?;
/// db.execute("CREATE TABLE contents (id INTEGER PRIMARY KEY, title TEXT, body TEXT)").await?;
///
/// db.insert("contents", record! { "title" => "hello", "body" => "world" }).await?;
/// let rows = db.list("contents", &record! { "title" => "hello" }).await?;
/// assert_eq!(rows.len(), 1);
///
/// let title = "hello";
/// let count = db.pluck(sql!("SELECT COUNT(*) FROM contents WHERE title = " {title})).await?;
/// assert!(count.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    backend: Backend,
}

impl Database {
    pub fn new(backend: impl Into<Backend>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Placeholder style every statement is built with.
    pub fn style(&self) -> PlaceholderStyle {
        self.backend.style()
    }

    /// The raw backend, for work this crate does not cover (closing the pool,
    /// loading extensions, ...).
    pub fn client(&self) -> &Backend {
        &self.backend
    }

    /// Render a template the way this database would run it.
    pub fn build(&self, query: impl Into<Template>) -> Statement {
        query.into().into_statement(self.style())
    }

    // ==================== CRUD ====================

    /// Insert one row or several rows sharing the same columns.
    pub async fn insert(
        &self,
        table: &str,
        rows: impl Into<InsertRows>,
    ) -> DbResult<OperationResult> {
        let stmt = builder::insert(table, rows)?.into_statement(self.style());
        let affected = self.backend.execute(&stmt).await?;
        Ok(OperationResult::inserted(affected))
    }

    /// Set `data` on the rows matching `where_`.
    pub async fn update(
        &self,
        table: &str,
        where_: &Record,
        data: &Record,
    ) -> DbResult<OperationResult> {
        let stmt = builder::update(table, where_, data)?.into_statement(self.style());
        let affected = self.backend.execute(&stmt).await?;
        Ok(OperationResult::updated(affected))
    }

    /// First row matching `where_`, if any.
    pub async fn get(&self, table: &str, where_: &Record) -> DbResult<Option<Row>> {
        let stmt = builder::select(table, where_).into_statement(self.style());
        self.backend.query_opt(&stmt).await
    }

    /// All rows matching `where_`.
    pub async fn list(&self, table: &str, where_: &Record) -> DbResult<Vec<Row>> {
        let stmt = builder::select(table, where_).into_statement(self.style());
        self.backend.query(&stmt).await
    }

    /// Operations bound to one table.
    pub fn table(&self, name: impl Into<String>) -> TableHandle<'_> {
        TableHandle {
            db: self,
            name: name.into(),
        }
    }

    // ==================== Templates ====================

    /// Run a template and return every row.
    pub async fn many(&self, query: impl Into<Template>) -> DbResult<Vec<Row>> {
        let stmt = self.build(query);
        self.backend.query(&stmt).await
    }

    /// Run a template and return its first row, if any.
    pub async fn single(&self, query: impl Into<Template>) -> DbResult<Option<Row>> {
        let stmt = self.build(query);
        self.backend.query_opt(&stmt).await
    }

    /// Run a template and return the first column of its first row, if any.
    pub async fn pluck(&self, query: impl Into<Template>) -> DbResult<Option<Value>> {
        let stmt = self.build(query);
        self.backend.query_scalar(&stmt).await
    }

    /// Run a template for effect and return the affected row count.
    pub async fn execute(&self, query: impl Into<Template>) -> DbResult<u64> {
        let stmt = self.build(query);
        self.backend.execute(&stmt).await
    }

    // ==================== Short aliases ====================

    /// Alias for [`Database::many`].
    pub async fn oo(&self, query: impl Into<Template>) -> DbResult<Vec<Row>> {
        self.many(query).await
    }

    /// Alias for [`Database::single`].
    #[allow(non_snake_case)]
    pub async fn oO(&self, query: impl Into<Template>) -> DbResult<Option<Row>> {
        self.single(query).await
    }

    /// Alias for [`Database::pluck`].
    pub async fn ox(&self, query: impl Into<Template>) -> DbResult<Option<Value>> {
        self.pluck(query).await
    }

    /// Alias for [`Database::execute`].
    pub async fn xx(&self, query: impl Into<Template>) -> DbResult<u64> {
        self.execute(query).await
    }
}

/// CRUD operations with the table name filled in.
#[derive(Debug, Clone)]
pub struct TableHandle<'a> {
    db: &'a Database,
    name: String,
}

impl TableHandle<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn insert(&self, rows: impl Into<InsertRows>) -> DbResult<OperationResult> {
        self.db.insert(&self.name, rows).await
    }

    pub async fn update(&self, where_: &Record, data: &Record) -> DbResult<OperationResult> {
        self.db.update(&self.name, where_, data).await
    }

    pub async fn get(&self, where_: &Record) -> DbResult<Option<Row>> {
        self.db.get(&self.name, where_).await
    }

    pub async fn list(&self, where_: &Record) -> DbResult<Vec<Row>> {
        self.db.list(&self.name, where_).await
    }
}
