//! Cursor over the records returned by one statement.

use crate::error::Result;
use crate::record::{FromRecord, Record};
use std::collections::VecDeque;

/// Records returned by [`Database::query`](crate::Database::query).
///
/// Records are consumed front to back: [`fetch`](ResultSet::fetch) takes the next one,
/// [`fetch_all`](ResultSet::fetch_all) drains what is left. [`row_count`](ResultSet::row_count)
/// keeps reporting how many rows the statement produced.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ResultSet {
    records: VecDeque<Record>,
    row_count: usize,
}

impl ResultSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            row_count: records.len(),
            records: records.into(),
        }
    }

    /// Next record, or `None` once the set is exhausted.
    pub fn fetch(&mut self) -> Option<Record> {
        self.records.pop_front()
    }

    /// All remaining records.
    pub fn fetch_all(&mut self) -> Vec<Record> {
        self.records.drain(..).collect()
    }

    /// Next record mapped to `T`.
    pub fn fetch_as<T: FromRecord>(&mut self) -> Result<Option<T>> {
        self.fetch().as_ref().map(T::from_record).transpose()
    }

    /// All remaining records mapped to `T`.
    pub fn fetch_all_as<T: FromRecord>(&mut self) -> Result<Vec<T>> {
        self.fetch_all().iter().map(T::from_record).collect()
    }

    /// Number of rows the statement returned.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of records not fetched yet.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Iterator for ResultSet {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> Record {
        Record::new().with("id", id)
    }

    #[test]
    fn fetch_then_fetch_all() {
        let mut rs = ResultSet::new(vec![record(1), record(2), record(3)]);
        assert_eq!(rs.fetch(), Some(record(1)));
        assert_eq!(rs.fetch_all(), vec![record(2), record(3)]);
        assert_eq!(rs.fetch(), None);
        assert!(rs.fetch_all().is_empty());
        assert_eq!(rs.row_count(), 3);
        assert_eq!(rs.len(), 0);
        assert!(rs.is_empty());
    }

    #[test]
    fn fetch_as_maps_records() {
        let mut rs = ResultSet::new(vec![record(9)]);
        let first: Option<Record> = rs.fetch_as().unwrap();
        assert_eq!(first.unwrap().try_get::<i64>("id").unwrap(), 9);
        assert!(rs.fetch_as::<Record>().unwrap().is_none());
    }
}
