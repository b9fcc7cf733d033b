//! Generic client trait for unified database access.

use crate::error::{Error, Result};
use crate::record::Record;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
///
/// SQL handed to a client already uses positional `$n` placeholders; named
/// placeholders are resolved by [`Database`](crate::Database) before this layer.
/// Implementations exist for `tokio_postgres::Client`, `tokio_postgres::Transaction`
/// and (with the `pool` feature) `deadpool_postgres::Client`.
pub trait GenericClient: Send + Sync {
    /// Prepare and run a statement, returning all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send;

    /// Prepare and run a statement, returning the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}

fn decode_rows(rows: Vec<tokio_postgres::Row>) -> Result<Vec<Record>> {
    rows.iter().map(Record::from_row).collect()
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        let rows = tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(Error::from_db_error)?;
        decode_rows(rows)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(Error::from_db_error)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        let rows = tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(Error::from_db_error)?;
        decode_rows(rows)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(Error::from_db_error)
    }
}

/// A pooled client checked out from a deadpool-postgres pool.
#[cfg(feature = "pool")]
pub type PoolClient = deadpool_postgres::Client;

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        GenericClient::query(&**self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        GenericClient::execute(&**self, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::ClientWrapper {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        GenericClient::query(&**self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        GenericClient::execute(&**self, sql, params).await
    }
}

impl<C: GenericClient> GenericClient for &C {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        (**self).query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        (**self).execute(sql, params).await
    }
}

impl<C: GenericClient> GenericClient for std::sync::Arc<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        (**self).query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        (**self).execute(sql, params).await
    }
}
