//! SELECT query builder with named bindings.

use crate::client::GenericClient;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::named::{Bindings, placeholder_for};
use crate::qb::condition::{Condition, ConditionValue, Joiner, normalize_operator};
use crate::record::{FromRecord, Record};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Sort direction of the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        })
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(Error::validation(format!("invalid sort direction '{s}'")))
        }
    }
}

/// The single ORDER BY of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: Direction,
}

/// SQL text plus the bindings its placeholders refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub bindings: Bindings,
}

/// Accumulates SELECT state and compiles it into SQL with `:name` placeholders.
///
/// Fluent methods return `&mut Self`. The terminal operations [`get`](Self::get),
/// [`first`](Self::first) and [`count`](Self::count) execute and then leave the builder
/// empty, so one instance can be reused for an unrelated query. [`build`](Self::build)
/// and [`to_sql`](Self::to_sql) never change the state.
///
/// ```ignore
/// use jobboard::qb;
///
/// let open = qb::table("listings")
///     .where_("state", "=", "MA")
///     .where_in("city", ["Boston", "Cambridge"])
///     .where_not_null("salary")
///     .order_by("created_at", "DESC")
///     .limit(10)
///     .get(&db)
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    table: Option<String>,
    fields: Vec<String>,
    conditions: Vec<Condition>,
    limit: Option<u64>,
    order_by: Option<OrderSpec>,
    bindings: Bindings,
    build_error: Option<String>,
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target table. Existence is not checked.
    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table = Some(name.into());
        self
    }

    /// Set the projection list. An empty list selects `*`.
    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    // ==================== Generic conditions ====================

    /// `AND field operator value`. A NULL value renders `IS NULL` / `IS NOT NULL`.
    pub fn where_(
        &mut self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.add_condition(Joiner::And, field.into(), operator, value.into())
    }

    /// `OR field operator value`.
    pub fn or_where(
        &mut self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.add_condition(Joiner::Or, field.into(), operator, value.into())
    }

    // ==================== IN ====================

    pub fn where_in<I, V>(&mut self, field: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_list_condition(Joiner::And, field.into(), "IN", values)
    }

    pub fn where_not_in<I, V>(&mut self, field: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_list_condition(Joiner::And, field.into(), "NOT IN", values)
    }

    pub fn or_where_in<I, V>(&mut self, field: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_list_condition(Joiner::Or, field.into(), "IN", values)
    }

    pub fn or_where_not_in<I, V>(&mut self, field: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_list_condition(Joiner::Or, field.into(), "NOT IN", values)
    }

    // ==================== NULL ====================

    pub fn where_null(&mut self, field: impl Into<String>) -> &mut Self {
        self.add_condition(Joiner::And, field.into(), "IS", Value::Null)
    }

    pub fn where_not_null(&mut self, field: impl Into<String>) -> &mut Self {
        self.add_condition(Joiner::And, field.into(), "IS NOT", Value::Null)
    }

    pub fn or_where_null(&mut self, field: impl Into<String>) -> &mut Self {
        self.add_condition(Joiner::Or, field.into(), "IS", Value::Null)
    }

    pub fn or_where_not_null(&mut self, field: impl Into<String>) -> &mut Self {
        self.add_condition(Joiner::Or, field.into(), "IS NOT", Value::Null)
    }

    // ==================== BETWEEN ====================

    pub fn where_between(
        &mut self,
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.add_list_condition(Joiner::And, field.into(), "BETWEEN", [low.into(), high.into()])
    }

    pub fn where_not_between(
        &mut self,
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.add_list_condition(
            Joiner::And,
            field.into(),
            "NOT BETWEEN",
            [low.into(), high.into()],
        )
    }

    pub fn or_where_between(
        &mut self,
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.add_list_condition(Joiner::Or, field.into(), "BETWEEN", [low.into(), high.into()])
    }

    pub fn or_where_not_between(
        &mut self,
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.add_list_condition(
            Joiner::Or,
            field.into(),
            "NOT BETWEEN",
            [low.into(), high.into()],
        )
    }

    // ==================== LIKE ====================

    pub fn where_like(&mut self, field: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.add_condition(Joiner::And, field.into(), "LIKE", Value::Text(pattern.into()))
    }

    pub fn where_not_like(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> &mut Self {
        self.add_condition(Joiner::And, field.into(), "NOT LIKE", Value::Text(pattern.into()))
    }

    pub fn or_where_like(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> &mut Self {
        self.add_condition(Joiner::Or, field.into(), "LIKE", Value::Text(pattern.into()))
    }

    pub fn or_where_not_like(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> &mut Self {
        self.add_condition(Joiner::Or, field.into(), "NOT LIKE", Value::Text(pattern.into()))
    }

    // ==================== ORDER BY / LIMIT ====================

    /// Set the ORDER BY clause, replacing any earlier one. `direction` is `ASC` or
    /// `DESC` in any case; anything else fails the build.
    pub fn order_by(&mut self, field: impl Into<String>, direction: &str) -> &mut Self {
        match direction.parse::<Direction>() {
            Ok(direction) => self.order_by_direction(field, direction),
            Err(_) => {
                self.record_error(format!("invalid sort direction '{}'", direction.trim()));
                self
            }
        }
    }

    pub fn order_by_asc(&mut self, field: impl Into<String>) -> &mut Self {
        self.order_by_direction(field, Direction::Asc)
    }

    pub fn order_by_desc(&mut self, field: impl Into<String>) -> &mut Self {
        self.order_by_direction(field, Direction::Desc)
    }

    pub fn order_by_direction(
        &mut self,
        field: impl Into<String>,
        direction: Direction,
    ) -> &mut Self {
        self.order_by = Some(OrderSpec {
            field: field.into(),
            direction,
        });
        self
    }

    /// Cap the number of rows. Ignored by [`first`](Self::first), which always uses `LIMIT 1`.
    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    // ==================== State access ====================

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Bindings registered so far, keyed by placeholder name.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Clear all accumulated state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when nothing has been set since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.table.is_none()
            && self.fields.is_empty()
            && self.conditions.is_empty()
            && self.limit.is_none()
            && self.order_by.is_none()
            && self.bindings.is_empty()
            && self.build_error.is_none()
    }

    fn record_error(&mut self, message: String) {
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
    }

    fn add_condition(
        &mut self,
        joiner: Joiner,
        field: String,
        operator: &str,
        value: Value,
    ) -> &mut Self {
        let operator = normalize_operator(operator);

        let (operator, value) = if value.is_null() {
            let negated = matches!(operator.as_str(), "!=" | "<>" | "IS NOT" | "NOT LIKE");
            let op = if negated { "IS NOT" } else { "IS" };
            (op.to_string(), ConditionValue::Null)
        } else {
            let name = self.bindings.unique_name(&placeholder_for(&field));
            self.bindings.insert(&name, value);
            (operator, ConditionValue::Scalar(name))
        };

        self.push_condition(Condition {
            joiner,
            field,
            operator,
            value,
        })
    }

    fn add_list_condition<I, V>(
        &mut self,
        joiner: Joiner,
        field: String,
        operator: &str,
        values: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let base = placeholder_for(&field);
        let mut names = Vec::new();
        for (i, value) in values.into_iter().enumerate() {
            let name = self.bindings.unique_name(&format!("{base}_{i}"));
            self.bindings.insert(&name, value);
            names.push(name);
        }

        self.push_condition(Condition {
            joiner,
            field,
            operator: operator.to_string(),
            value: ConditionValue::List(names),
        })
    }

    fn push_condition(&mut self, condition: Condition) -> &mut Self {
        if let Err(message) = condition.check() {
            self.record_error(message);
        }
        self.conditions.push(condition);
        self
    }

    // ==================== Compilation ====================

    fn compile(&self, single: bool) -> String {
        let mut sql = String::from("SELECT ");
        if self.fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.fields.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(self.table.as_deref().unwrap_or_default());

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            for (i, condition) in self.conditions.iter().enumerate() {
                if i > 0 {
                    sql.push(' ');
                    sql.push_str(&condition.joiner.to_string());
                    sql.push(' ');
                }
                condition.render(&mut sql);
            }
        }

        if let Some(order) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {} {}", order.field, order.direction));
        }

        if single {
            sql.push_str(" LIMIT 1");
        } else if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        sql
    }

    /// Debug helper: the SQL the builder would run, without validation or reset.
    pub fn to_sql(&self) -> String {
        self.compile(false)
    }

    /// Validate builder state before execution.
    pub fn validate(&self) -> Result<()> {
        if let Some(message) = &self.build_error {
            return Err(Error::validation(message.clone()));
        }
        match self.table.as_deref().map(str::trim) {
            None | Some("") => Err(Error::validation("no table set")),
            Some(_) => Ok(()),
        }
    }

    /// Compile the accumulated state into SQL and bindings.
    pub fn build(&self) -> Result<BuiltQuery> {
        self.validate()?;
        Ok(BuiltQuery {
            sql: self.compile(false),
            bindings: self.bindings.clone(),
        })
    }

    /// Like [`build`](Self::build) with `LIMIT 1` in place of any limit.
    pub fn build_first(&self) -> Result<BuiltQuery> {
        self.validate()?;
        Ok(BuiltQuery {
            sql: self.compile(true),
            bindings: self.bindings.clone(),
        })
    }

    // ==================== Terminal operations ====================

    /// Execute and return every matching record. Resets the builder.
    pub async fn get<C: GenericClient>(&mut self, db: &Database<C>) -> Result<Vec<Record>> {
        let state = std::mem::take(self);
        let built = state.build()?;
        Ok(db.run(&built).await?.fetch_all())
    }

    /// Execute with `LIMIT 1` and return the record, if any. Resets the builder.
    pub async fn first<C: GenericClient>(&mut self, db: &Database<C>) -> Result<Option<Record>> {
        let state = std::mem::take(self);
        let built = state.build_first()?;
        Ok(db.run(&built).await?.fetch())
    }

    /// Execute and return how many rows the SELECT produced. Resets the builder.
    pub async fn count<C: GenericClient>(&mut self, db: &Database<C>) -> Result<usize> {
        let state = std::mem::take(self);
        let built = state.build()?;
        Ok(db.run(&built).await?.row_count())
    }

    /// [`get`](Self::get) mapped to `T`.
    pub async fn get_as<T: FromRecord, C: GenericClient>(
        &mut self,
        db: &Database<C>,
    ) -> Result<Vec<T>> {
        let records = self.get(db).await?;
        records.iter().map(T::from_record).collect()
    }

    /// [`first`](Self::first) mapped to `T`.
    pub async fn first_as<T: FromRecord, C: GenericClient>(
        &mut self,
        db: &Database<C>,
    ) -> Result<Option<T>> {
        let record = self.first(db).await?;
        record.as_ref().map(T::from_record).transpose()
    }
}
