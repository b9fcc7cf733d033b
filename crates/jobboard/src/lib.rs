//! # jobboard
//!
//! Data access and request routing for a Postgres-backed job board.
//!
//! ## Features
//!
//! - **Fluent SELECT builder**: [`qb::table`] accumulates conditions and compiles them
//!   into SQL with `:name` placeholders; `get` / `first` / `count` execute and reset
//! - **Raw SQL with named bindings**: [`Database::query`] and [`Database::execute`]
//!   accept `:name` placeholders and a [`Bindings`] map
//! - **Records**: rows come back as ordered column/value [`Record`]s, optionally mapped
//!   through [`FromRecord`]
//! - **Transaction-friendly**: a [`Database`] wraps anything implementing
//!   [`GenericClient`], including transactions and pooled clients
//! - **Path router**: [`Router`] dispatches `(method, path)` to typed handlers with
//!   `{name}` captures and a configurable not-found handler
//!
//! ## Example
//!
//! ```ignore
//! use jobboard::{Database, DatabaseConfig, params, qb};
//!
//! let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//!
//! let latest = qb::table("listings")
//!     .order_by_desc("created_at")
//!     .limit(6)
//!     .get(&db)
//!     .await?;
//!
//! db.execute(
//!     "DELETE FROM listings WHERE id = :id",
//!     &params! { "id" => 3 },
//! )
//! .await?;
//! ```

pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod log;
pub mod named;
pub mod qb;
pub mod record;
pub mod result_set;
pub mod router;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
mod testing;

pub use client::GenericClient;
pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{Error, Result};
pub use log::SqlLogger;
pub use named::Bindings;
pub use qb::{BuiltQuery, QueryBuilder};
pub use record::{FromRecord, Record};
pub use result_set::ResultSet;
pub use router::{Params, RouteMatch, Router};
pub use value::{FromValue, Value};

#[cfg(feature = "pool")]
pub use client::PoolClient;
#[cfg(feature = "pool")]
pub use pool::{Pool, connect_pool, create_pool, create_pool_with};

// Re-export the driver so downstream crates match its version.
pub use tokio_postgres;
