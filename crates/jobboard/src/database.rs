//! Raw query executor.
//!
//! [`Database`] wraps one connection handle and runs SQL written with `:name`
//! placeholders. The query builder compiles into the same form and is executed
//! through [`Database::run`].
//!
//! # Example
//!
//! ```ignore
//! use jobboard::{Database, DatabaseConfig, params};
//!
//! let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//!
//! let listing = db
//!     .query("SELECT * FROM listings WHERE id = :id", &params! { "id" => 7 })
//!     .await?
//!     .fetch();
//!
//! db.execute(
//!     "INSERT INTO users (name, email) VALUES (:name, :email)",
//!     &params! { "name" => "Ada", "email" => "ada@example.com" },
//! )
//! .await?;
//! ```

use crate::client::GenericClient;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::log::SqlLogger;
use crate::named::{self, Bindings, CompiledQuery};
use crate::qb::BuiltQuery;
use crate::result_set::ResultSet;
use std::time::Instant;
use tokio_postgres::NoTls;

/// One database handle plus the SQL logger used for everything it runs.
#[derive(Debug)]
pub struct Database<C> {
    client: C,
    logger: SqlLogger,
}

impl Database<tokio_postgres::Client> {
    /// Open a single connection. The connection driver runs on a spawned tokio task.
    ///
    /// Failure to connect is returned as [`Error::Connection`]; there is no retry.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let (client, connection) = config
            .pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "jobboard.db", error = %e, "connection closed with error");
            }
        });

        tracing::info!(
            target: "jobboard.db",
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            "connected to database"
        );
        Ok(Self::new(client))
    }
}

impl<C: GenericClient> Database<C> {
    /// Wrap an already established client (connection, transaction or pooled client).
    pub fn new(client: C) -> Self {
        Self {
            client,
            logger: SqlLogger::default(),
        }
    }

    /// Replace the SQL logger.
    pub fn with_logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn compile<'a>(&self, sql: &str, params: &'a Bindings) -> Result<CompiledQuery<'a>> {
        let compiled = named::compile(sql, params)?;
        if !compiled.unused.is_empty() {
            tracing::debug!(
                target: "jobboard.sql",
                unused = ?compiled.unused,
                "bindings not referenced by the statement"
            );
        }
        self.logger
            .before_query(sql, &compiled.sql, compiled.params.len());
        Ok(compiled)
    }

    /// Prepare `sql` verbatim, bind every entry of `params` to its `:name`
    /// placeholder, execute, and return a cursor over the rows.
    pub async fn query(&self, sql: &str, params: &Bindings) -> Result<ResultSet> {
        let compiled = self.compile(sql, params)?;
        let start = Instant::now();
        match self
            .client
            .query(&compiled.sql, &compiled.params_ref())
            .await
        {
            Ok(records) => {
                self.logger
                    .after_query(records.len() as u64, start.elapsed());
                Ok(ResultSet::new(records))
            }
            Err(e) => {
                self.logger.failed(sql, &e, start.elapsed());
                Err(e)
            }
        }
    }

    /// Like [`Database::query`], returning the affected row count instead of rows.
    pub async fn execute(&self, sql: &str, params: &Bindings) -> Result<u64> {
        let compiled = self.compile(sql, params)?;
        let start = Instant::now();
        match self
            .client
            .execute(&compiled.sql, &compiled.params_ref())
            .await
        {
            Ok(affected) => {
                self.logger.after_query(affected, start.elapsed());
                Ok(affected)
            }
            Err(e) => {
                self.logger.failed(sql, &e, start.elapsed());
                Err(e)
            }
        }
    }

    /// Execute the output of a query builder.
    pub async fn run(&self, built: &BuiltQuery) -> Result<ResultSet> {
        self.query(&built.sql, &built.bindings).await
    }
}
