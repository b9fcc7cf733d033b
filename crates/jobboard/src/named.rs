//! Named `:name` placeholders.
//!
//! Both the query builder and hand-written SQL use colon-style placeholders with a
//! name → value map ([`Bindings`]). PostgreSQL only understands positional `$n`
//! parameters, so [`compile`] rewrites the SQL text once, right before execution:
//!
//! - every distinct name gets one index, repeated names reuse it;
//! - `::type` casts, quoted literals/identifiers, dollar-quoted bodies and comments
//!   are copied through untouched;
//! - a placeholder with no binding is a [`Error::Validation`].

use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

/// Placeholder name → value map with unique, insertion-ordered keys.
///
/// Names are stored without the leading colon; `insert(":id", ..)` and
/// `insert("id", ..)` address the same binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

fn normalize(name: &str) -> &str {
    name.strip_prefix(':').unwrap_or(name)
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, returning the value it replaces.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        let name = normalize(name.as_ref());
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name.to_string(), value));
                None
            }
        }
    }

    /// Chainable [`Bindings::insert`].
    pub fn bind(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = normalize(name);
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// First free name of `base`, `base_1`, `base_2`, ...
    pub(crate) fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (k, v) in iter {
            bindings.insert(k, v);
        }
        bindings
    }
}

impl<K: AsRef<str>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Bindings {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Build a [`Bindings`] map inline.
///
/// ```ignore
/// let params = jobboard::params! { "id" => 42, "status" => "open" };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Bindings::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut bindings = $crate::Bindings::new();
        $(bindings.insert($name, $value);)+
        bindings
    }};
}

/// SQL rewritten to positional placeholders, with its parameters in `$n` order.
#[derive(Debug, Clone)]
pub struct CompiledQuery<'a> {
    pub sql: String,
    pub params: Vec<&'a Value>,
    /// Binding names that the SQL never referenced.
    pub unused: Vec<&'a str>,
}

impl CompiledQuery<'_> {
    /// Parameters as references compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|v| *v as &(dyn ToSql + Sync)).collect()
    }
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_char(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Valid placeholder name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_placeholder_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    !bytes.is_empty() && is_ident_start(bytes[0]) && bytes.iter().all(|b| is_ident_char(*b))
}

/// Derive a placeholder name from a column expression (`l.id` → `l_id`).
pub fn placeholder_for(field: &str) -> String {
    let mut name: String = field
        .chars()
        .map(|c| if c == '_' || c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !name.as_bytes().first().copied().is_some_and(is_ident_start) {
        name.insert(0, 'p');
    }
    name
}

fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    bytes[start + 1..]
        .iter()
        .position(|b| *b == quote)
        .map_or(bytes.len(), |p| start + 1 + p + 1)
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |p| start + p + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| start + 2 + p + 2)
}

fn skip_dollar_quoted(bytes: &[u8], start: usize) -> usize {
    let mut end = start + 1;
    if end < bytes.len() && bytes[end].is_ascii_digit() {
        // `$1` style positional parameter, not a quote tag.
        return start + 1;
    }
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    if end >= bytes.len() || bytes[end] != b'$' {
        return start + 1;
    }
    let tag = &bytes[start..=end];
    bytes[end + 1..]
        .windows(tag.len())
        .position(|w| w == tag)
        .map_or(bytes.len(), |p| end + 1 + p + tag.len())
}

/// Rewrite `:name` placeholders in `sql` into `$n` and collect parameters.
pub fn compile<'a>(sql: &str, bindings: &'a Bindings) -> Result<CompiledQuery<'a>> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut order: Vec<&'a str> = Vec::new();
    let mut params: Vec<&'a Value> = Vec::new();
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b'$' => i = skip_dollar_quoted(bytes, i),
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|b| is_ident_start(*b)) => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_ident_char(bytes[end]) {
                    end += 1;
                }
                let name = &sql[start..end];

                let index = match order.iter().position(|n| *n == name) {
                    Some(pos) => pos + 1,
                    None => {
                        let (bound_name, value) = bindings
                            .entries
                            .iter()
                            .find(|(n, _)| n == name)
                            .ok_or_else(|| {
                                Error::validation(format!("missing binding for :{name}"))
                            })?;
                        order.push(bound_name.as_str());
                        params.push(value);
                        order.len()
                    }
                };

                out.push_str(&sql[copied..i]);
                let _ = write!(out, "${index}");
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[copied..]);

    let unused = bindings
        .names()
        .filter(|name| !order.contains(name))
        .collect();

    Ok(CompiledQuery {
        sql: out,
        params,
        unused,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_named_placeholders_in_order() {
        let bindings = Bindings::new().bind("status", "open").bind("id", 7);
        let q = compile(
            "SELECT * FROM listings WHERE id = :id AND status = :status",
            &bindings,
        )
        .unwrap();
        assert_eq!(q.sql, "SELECT * FROM listings WHERE id = $1 AND status = $2");
        assert_eq!(q.params, vec![&Value::Int(7), &Value::Text("open".into())]);
        assert!(q.unused.is_empty());
    }

    #[test]
    fn repeated_name_reuses_index() {
        let bindings = Bindings::from([("q", "%rust%")]);
        let q = compile("SELECT 1 WHERE a LIKE :q OR b LIKE :q", &bindings).unwrap();
        assert_eq!(q.sql, "SELECT 1 WHERE a LIKE $1 OR b LIKE $1");
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn leaves_casts_literals_and_comments_alone() {
        let bindings = Bindings::from([("id", 1)]);
        let sql = "SELECT ':nope', \":quoted\", $$ :body $$ -- :comment\n\
                   FROM t /* :block */ WHERE id = :id::bigint";
        let q = compile(sql, &bindings).unwrap();
        assert_eq!(
            q.sql,
            "SELECT ':nope', \":quoted\", $$ :body $$ -- :comment\n\
             FROM t /* :block */ WHERE id = $1::bigint"
        );
    }

    #[test]
    fn positional_parameters_pass_through() {
        let empty = Bindings::new();
        let q = compile("SELECT $1::int", &empty).unwrap();
        assert_eq!(q.sql, "SELECT $1::int");
        assert!(q.params.is_empty());
    }

    #[test]
    fn missing_binding_is_an_error() {
        let err = compile("SELECT * FROM users WHERE email = :email", &Bindings::new())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains(":email"));
    }

    #[test]
    fn reports_unused_bindings() {
        let bindings = Bindings::new().bind("id", 1).bind("extra", 2);
        let q = compile("SELECT * FROM t WHERE id = :id", &bindings).unwrap();
        assert_eq!(q.unused, vec!["extra"]);
    }

    #[test]
    fn colon_prefix_is_normalized() {
        let mut bindings = Bindings::new();
        bindings.insert(":id", 1);
        assert_eq!(bindings.insert("id", 2), Some(Value::Int(1)));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get(":id"), Some(&Value::Int(2)));
    }

    #[test]
    fn unique_name_appends_suffix() {
        let bindings = Bindings::new().bind("id", 1).bind("id_1", 2);
        assert_eq!(bindings.unique_name("id"), "id_2");
        assert_eq!(bindings.unique_name("title"), "title");
    }

    #[test]
    fn placeholder_names_are_sanitized() {
        assert_eq!(placeholder_for("l.id"), "l_id");
        assert_eq!(placeholder_for("1col"), "p1col");
        assert!(is_placeholder_name("field_0"));
        assert!(!is_placeholder_name("l.id"));
    }

    #[test]
    fn params_macro_builds_bindings() {
        let bindings = crate::params! { "id" => 1, "title" => "Dev" };
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.get("title"), Some(&Value::Text("Dev".into())));
    }
}
