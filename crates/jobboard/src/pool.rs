//! Connection pool utilities

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use deadpool_postgres::{Manager, ManagerConfig, PoolBuilder, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

pub use deadpool_postgres::Pool;

/// Create a connection pool sized by [`DatabaseConfig::pool_size`].
///
/// Connections are opened lazily on checkout, so a wrong password or an unreachable
/// host only shows up on the first `pool.get()`. Use [`connect_pool`] to fail early.
///
/// # Example
///
/// ```ignore
/// let pool = jobboard::create_pool(&DatabaseConfig::from_env()?)?;
/// let db = Database::new(pool.get().await?);
/// ```
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool> {
    create_pool_with(config, |builder| builder)
}

/// Create a pool and check out one connection from it.
///
/// An unreachable server or rejected login surfaces as [`Error::Connection`].
pub async fn connect_pool(config: &DatabaseConfig) -> Result<Pool> {
    let pool = create_pool(config)?;
    drop(pool.get().await?);
    tracing::info!(target: "jobboard.db", host = %config.host, "database reachable");
    Ok(pool)
}

/// Create a pool and let the caller tune the [`PoolBuilder`] (timeouts, hooks, ...).
pub fn create_pool_with(
    config: &DatabaseConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> Result<Pool> {
    let manager = Manager::from_config(config.pg_config(), NoTls, default_manager_config());
    let mut builder = Pool::builder(manager).max_size(config.pool_size.max(1));
    if let Some(timeout) = config.connect_timeout_secs {
        builder = builder
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(std::time::Duration::from_secs(timeout)));
    }

    let pool = configure_pool(builder)
        .build()
        .map_err(|e| Error::Pool(e.to_string()))?;

    tracing::info!(
        target: "jobboard.db",
        host = %config.host,
        dbname = %config.dbname,
        max_size = config.pool_size,
        "connection pool created"
    );
    Ok(pool)
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pool_uses_configured_size() {
        let config = DatabaseConfig::new("localhost", "jobboard", "app", "secret").pool_size(4);
        let pool = create_pool(&config).unwrap();
        assert_eq!(pool.status().max_size, 4);
    }

    #[test]
    fn builder_can_be_tuned() {
        let config = DatabaseConfig::new("localhost", "jobboard", "app", "secret");
        let pool = create_pool_with(&config, |b| b.max_size(2)).unwrap();
        assert_eq!(pool.status().max_size, 2);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let config = DatabaseConfig::new("127.0.0.1", "jobboard", "app", "secret")
            .port(1)
            .connect_timeout(Duration::from_secs(2));

        // Building stays lazy.
        let pool = create_pool(&config).unwrap();
        let Err(err) = pool.get().await else {
            panic!("checkout against port 1 succeeded");
        };
        let err = Error::from(err);
        assert!(err.is_connection_error(), "{err}");

        let Err(err) = connect_pool(&config).await else {
            panic!("connect_pool against port 1 succeeded");
        };
        assert!(err.is_connection_error(), "{err}");
    }
}
