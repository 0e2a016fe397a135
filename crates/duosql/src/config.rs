//! Backend selection and connection settings.
//!
//! [`DatabaseConfig`] is the explicit form: either an embedded SQLite target or
//! a remote Postgres server. [`DatabaseOptions`] is the loose form where the
//! backend may be left implicit; [`DatabaseOptions::into_config`] resolves it.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Which engine a database handle talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Postgres,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Sqlite => f.write_str("sqlite"),
            BackendKind::Postgres => f.write_str("postgres"),
        }
    }
}

/// Explicit backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatabaseConfig {
    #[serde(rename = "sqlite")]
    Embedded(EmbeddedConfig),
    #[serde(rename = "postgres")]
    Remote(RemoteConfig),
}

/// Embedded engine settings. No `file` means an in-memory database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub statement_cache: bool,
}

/// Remote engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default, alias = "username")]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_true")]
    pub statement_cache: bool,
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            file: None,
            statement_cache: true,
        }
    }
}

impl EmbeddedConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn statement_cache(mut self, enabled: bool) -> Self {
        self.statement_cache = enabled;
        self
    }
}

impl RemoteConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            database: None,
            user: None,
            password: None,
            pool_size: DEFAULT_POOL_SIZE,
            statement_cache: true,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn statement_cache(mut self, enabled: bool) -> Self {
        self.statement_cache = enabled;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Embedded(EmbeddedConfig::default())
    }
}

impl From<EmbeddedConfig> for DatabaseConfig {
    fn from(c: EmbeddedConfig) -> Self {
        DatabaseConfig::Embedded(c)
    }
}

impl From<RemoteConfig> for DatabaseConfig {
    fn from(c: RemoteConfig) -> Self {
        DatabaseConfig::Remote(c)
    }
}

impl DatabaseConfig {
    /// In-memory embedded database.
    pub fn sqlite_memory() -> Self {
        EmbeddedConfig::memory().into()
    }

    /// File-backed embedded database.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        EmbeddedConfig::file(path).into()
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            DatabaseConfig::Embedded(_) => BackendKind::Sqlite,
            DatabaseConfig::Remote(_) => BackendKind::Postgres,
        }
    }

    /// Parse a connection URL.
    ///
    /// Accepts `postgres://` / `postgresql://` URLs (and key/value strings
    /// understood by `tokio_postgres::Config`) plus `sqlite::memory:`,
    /// `sqlite://path` and `sqlite:path`.
    pub fn from_url(url: &str) -> DbResult<Self> {
        if let Some(rest) = url.strip_prefix("sqlite:") {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path.is_empty() || path == ":memory:" {
                return Ok(Self::sqlite_memory());
            }
            return Ok(Self::sqlite(path));
        }

        let pg: tokio_postgres::Config = url
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::config(e.to_string()))?;

        let host = match pg.get_hosts().first() {
            Some(tokio_postgres::config::Host::Tcp(h)) => h.clone(),
            #[cfg(unix)]
            Some(tokio_postgres::config::Host::Unix(p)) => p.to_string_lossy().into_owned(),
            None => return Err(DbError::config(format!("no host in '{url}'"))),
        };

        let password = pg
            .get_password()
            .map(|p| String::from_utf8(p.to_vec()))
            .transpose()
            .map_err(|_| DbError::config("password is not valid UTF-8"))?;

        Ok(DatabaseConfig::Remote(RemoteConfig {
            host,
            port: pg.get_ports().first().copied().unwrap_or(DEFAULT_PORT),
            database: pg.get_dbname().map(str::to_string),
            user: pg.get_user().map(str::to_string),
            password,
            pool_size: DEFAULT_POOL_SIZE,
            statement_cache: true,
        }))
    }

    /// Parse TOML settings.
    ///
    /// Keys may sit at the top level or under a `[database]` table, and use the
    /// loose [`DatabaseOptions`] shape (`type` optional).
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let mut table: toml::Table =
            toml::from_str(raw).map_err(|e| DbError::config(e.to_string()))?;

        let section = match table.remove("database") {
            Some(toml::Value::Table(section)) => section,
            Some(other) => {
                table.insert("database".to_string(), other);
                table
            }
            None => table,
        };

        let options = DatabaseOptions::deserialize(toml::Value::Table(section))
            .map_err(|e| DbError::config(e.to_string()))?;
        options.into_config()
    }

    /// Read and parse a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            DbError::Config(msg) => DbError::config(format!(
                "failed to parse config file {}: {msg}",
                path.display()
            )),
            other => other,
        })
    }
}

/// Loose options where the backend may be implied.
///
/// With no `type`, a `host` selects Postgres and its absence selects an
/// embedded database (in memory unless `file` is set).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseOptions {
    #[serde(default, rename = "type")]
    pub kind: Option<BackendKind>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default, alias = "username")]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub pool_size: Option<usize>,
    #[serde(default)]
    pub statement_cache: Option<bool>,
}

impl DatabaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: BackendKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// The backend these options select.
    pub fn resolved_kind(&self) -> BackendKind {
        match (self.kind, &self.host) {
            (Some(kind), _) => kind,
            (None, Some(_)) => BackendKind::Postgres,
            (None, None) => BackendKind::Sqlite,
        }
    }

    /// Resolve into an explicit [`DatabaseConfig`].
    pub fn into_config(self) -> DbResult<DatabaseConfig> {
        let statement_cache = self.statement_cache.unwrap_or(true);
        match self.resolved_kind() {
            BackendKind::Sqlite => Ok(DatabaseConfig::Embedded(EmbeddedConfig {
                file: self.file,
                statement_cache,
            })),
            BackendKind::Postgres => {
                let host = self
                    .host
                    .ok_or_else(|| DbError::config("postgres requires a host"))?;
                Ok(DatabaseConfig::Remote(RemoteConfig {
                    host,
                    port: self.port.unwrap_or(DEFAULT_PORT),
                    database: self.database,
                    user: self.user,
                    password: self.password,
                    pool_size: self.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
                    statement_cache,
                }))
            }
        }
    }
}
