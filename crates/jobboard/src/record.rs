//! Result records and record mapping traits

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio_postgres::Row;

/// One result row: an insertion-ordered mapping of column name to [`Value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. A repeated column name shadows the earlier one on lookup.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Builder-style [`Record::push`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Decode a driver row. Every column must have a type [`Value`] supports.
    pub fn from_row(row: &Row) -> Result<Self> {
        let mut record = Record {
            columns: Vec::with_capacity(row.len()),
        };
        for (idx, column) in row.columns().iter().enumerate() {
            let value: Value = row
                .try_get(idx)
                .map_err(|e| Error::decode(column.name(), e.to_string()))?;
            record.columns.push((column.name().to_string(), value));
        }
        Ok(record)
    }

    /// Look up a column value.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Look up and convert a column value, returning [`Error::Decode`] on failure.
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| Error::decode(column, "no such column"))?;
        T::from_value(value).map_err(|message| Error::decode(column, message))
    }

    /// Column names in result order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Trait for types that can be built from a [`Record`]
pub trait FromRecord: Sized {
    /// Convert a record into Self
    fn from_record(record: &Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.clone())
    }
}
