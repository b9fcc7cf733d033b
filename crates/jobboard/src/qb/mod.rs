//! Fluent SELECT query builder.
//!
//! The builder accumulates a table, a projection, WHERE conditions, one ORDER BY and a
//! LIMIT, and compiles them into SQL that uses `:name` placeholders. Every bound value
//! gets its own placeholder: a field used twice binds `:field` and `:field_1`, list
//! operators bind `:field_0`, `:field_1`, ... Compiled queries run through
//! [`Database::run`](crate::Database::run).
//!
//! # Usage
//!
//! ```ignore
//! use jobboard::qb;
//!
//! let listings = qb::table("listings")
//!     .select(["id", "title", "salary"])
//!     .where_("salary", ">=", 50_000)
//!     .or_where_like("tags", "%rust%")
//!     .order_by_desc("created_at")
//!     .limit(6)
//!     .get(&db)
//!     .await?;
//!
//! // Inspect without executing
//! let built = qb::table("users").where_("email", "=", email).build()?;
//! assert_eq!(built.sql, "SELECT * FROM users WHERE email = :email");
//! ```

mod builder;
mod condition;

pub use builder::{BuiltQuery, Direction, OrderSpec, QueryBuilder};
pub use condition::{Condition, ConditionValue, Joiner};

/// Start a builder for `name`.
pub fn table(name: impl Into<String>) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.table(name);
    qb
}
