//! Connection pool utilities

use crate::config::RemoteConfig;
use crate::error::{DbError, DbResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a connection pool for `config` without TLS.
///
/// Connections are opened lazily, on first checkout.
pub fn create_pool(config: &RemoteConfig) -> DbResult<Pool> {
    create_pool_with_tls(config, NoTls)
}

/// Create a connection pool using a custom TLS connector.
///
/// Wrap the result with [`PostgresAdapter::from_pool`](crate::adapter::PostgresAdapter::from_pool)
/// when the server requires TLS.
pub fn create_pool_with_tls<T>(config: &RemoteConfig, tls: T) -> DbResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    if config.pool_size == 0 {
        return Err(DbError::config("pool_size must be at least 1"));
    }

    let mgr = Manager::from_config(pg_config(config), tls, default_manager_config());
    Pool::builder(mgr)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| DbError::Pool(e.to_string()))
}

/// Translate a [`RemoteConfig`] into driver settings.
pub fn pg_config(config: &RemoteConfig) -> tokio_postgres::Config {
    let mut pg = tokio_postgres::Config::new();
    pg.host(&config.host).port(config.port);
    if let Some(database) = &config.database {
        pg.dbname(database);
    }
    if let Some(user) = &config.user {
        pg.user(user);
    }
    if let Some(password) = &config.password {
        pg.password(password);
    }
    pg
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pg_config_carries_credentials() {
        let cfg = RemoteConfig::new("db.example")
            .port(6000)
            .database("shop")
            .user("bob")
            .password("pw");
        let pg = pg_config(&cfg);
        assert_eq!(pg.get_ports(), &[6000]);
        assert_eq!(pg.get_dbname(), Some("shop"));
        assert_eq!(pg.get_user(), Some("bob"));
        assert_eq!(pg.get_password(), Some(&b"pw"[..]));
    }

    #[test]
    fn zero_sized_pool_is_rejected() {
        let cfg = RemoteConfig::new("localhost").pool_size(0);
        assert!(matches!(create_pool(&cfg), Err(DbError::Config(_))));
    }
}
