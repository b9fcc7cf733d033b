//! Per-request state handed to controllers.

use jobboard::Database;

/// Decoded `application/x-www-form-urlencoded` body, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            fields: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// Last submitted value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Form {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Request method after honouring a `_method` override on POST forms, as HTML
/// forms cannot submit PUT or DELETE.
pub fn effective_method(method: &str, form: &Form) -> String {
    if method.eq_ignore_ascii_case("POST") {
        if let Some(spoofed) = form.get("_method").map(str::trim).filter(|m| !m.is_empty()) {
            return spoofed.to_ascii_uppercase();
        }
    }
    method.to_ascii_uppercase()
}

/// Everything a controller needs: its own database handle and the submitted form.
pub struct RequestContext<C> {
    pub db: Database<C>,
    pub form: Form,
}

impl<C> RequestContext<C> {
    pub fn new(db: Database<C>, form: Form) -> Self {
        Self { db, form }
    }
}
