//! `tracing` output for executed SQL.

use std::time::Duration;
use tracing::Level;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// The type of SQL statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let head = sql.trim_start().trim_start_matches('(');
        let keyword = head
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        if keyword.eq_ignore_ascii_case("select") || keyword.eq_ignore_ascii_case("with") {
            StatementKind::Select
        } else if keyword.eq_ignore_ascii_case("insert") {
            StatementKind::Insert
        } else if keyword.eq_ignore_ascii_case("update") {
            StatementKind::Update
        } else if keyword.eq_ignore_ascii_case("delete") {
            StatementKind::Delete
        } else {
            StatementKind::Other
        }
    }
}

/// Emits the SQL that is about to run, and how it ended, as `tracing` events
/// under the `jobboard.sql` target.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Tracing event level for successful statements.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl SqlLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn before_query(&self, sql: &str, exec_sql: &str, param_count: usize) {
        let kind = StatementKind::from_sql(sql);
        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "jobboard.sql",
            kind = ?kind,
            param_count,
            sql = %sql,
            exec_sql = %self.truncate_sql(exec_sql),
            "executing query"
        );
    }

    pub(crate) fn after_query(&self, rows: u64, elapsed: Duration) {
        emit_at_level!(
            self.level,
            target: "jobboard.sql",
            rows,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "query finished"
        );
    }

    pub(crate) fn failed(&self, sql: &str, error: &crate::Error, elapsed: Duration) {
        tracing::warn!(
            target: "jobboard.sql",
            sql = %self.truncate_sql(sql),
            error = %error,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "query failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_statement_kind() {
        assert_eq!(StatementKind::from_sql("  select 1"), StatementKind::Select);
        assert_eq!(StatementKind::from_sql("(SELECT 1)"), StatementKind::Select);
        assert_eq!(
            StatementKind::from_sql("INSERT INTO listings (title) VALUES (:title)"),
            StatementKind::Insert
        );
        assert_eq!(StatementKind::from_sql("DELETE FROM t"), StatementKind::Delete);
        assert_eq!(StatementKind::from_sql("VACUUM"), StatementKind::Other);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let logger = SqlLogger::new().max_sql_length(4);
        assert_eq!(logger.truncate_sql("SELECT"), "SELE...");
        assert_eq!(logger.truncate_sql("héllo"), "hél...");
        assert_eq!(SqlLogger::new().no_truncate().truncate_sql("SELECT"), "SELECT");
    }
}
