//! In-memory client used by unit tests.

use crate::client::GenericClient;
use crate::error::{Error, Result};
use crate::record::Record;
use bytes::BytesMut;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A statement the fake client received. Parameters are rendered as text
/// (`None` for NULL).
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<Option<String>>,
}

enum Reply {
    Rows(Vec<Record>),
    Affected(u64),
    Fail(String),
}

#[derive(Default)]
pub struct FakeClient {
    calls: Mutex<Vec<Call>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue rows for the next statement.
    pub fn respond(self, rows: Vec<Record>) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Rows(rows));
        self
    }

    /// Queue an affected-row count for the next statement.
    pub fn affect(self, n: u64) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Affected(n));
        self
    }

    /// Queue a failure for the next statement.
    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Option<Reply> {
        let params = params
            .iter()
            .map(|p| {
                let mut buf = BytesMut::new();
                match p.to_sql_checked(&Type::TEXT, &mut buf) {
                    Ok(IsNull::Yes) => None,
                    Ok(IsNull::No) => Some(String::from_utf8_lossy(&buf).into_owned()),
                    Err(e) => Some(format!("<{e}>")),
                }
            })
            .collect();
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params,
        });
        self.replies.lock().unwrap().pop_front()
    }
}

impl GenericClient for FakeClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        match self.record(sql, params) {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Affected(_)) | None => Ok(Vec::new()),
            Some(Reply::Fail(message)) => Err(Error::UniqueViolation(message)),
        }
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        match self.record(sql, params) {
            Some(Reply::Affected(n)) => Ok(n),
            Some(Reply::Rows(rows)) => Ok(rows.len() as u64),
            None => Ok(0),
            Some(Reply::Fail(message)) => Err(Error::UniqueViolation(message)),
        }
    }
}
