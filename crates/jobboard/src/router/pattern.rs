//! Route patterns: `/`-separated segments, `{name}` segments capture.

use super::Params;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) if !name.is_empty() => Segment::Capture(name.to_string()),
            _ => Segment::Literal(raw.to_string()),
        }
    }
}

/// A parsed route pattern such as `/listings/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Drop any query string, trim surrounding slashes and split on `/`.
///
/// The root path yields one empty segment, so `/` and `` are the same path and
/// `/listings/` is the same as `/listings`.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    path.trim_matches('/').split('/').collect()
}

impl Pattern {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = split_path(&raw).into_iter().map(Segment::parse).collect();
        Self { raw, segments }
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Names of the capture segments, in order.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Capture(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match already split request segments, returning the captured values.
    pub(crate) fn match_segments(&self, request: &[&str]) -> Option<Params> {
        if request.len() != self.segments.len() {
            return None;
        }
        let mut params = Params::default();
        for (segment, actual) in self.segments.iter().zip(request) {
            match segment {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Capture(name) => params.insert(name, *actual),
            }
        }
        Some(params)
    }

    /// Match a request path.
    pub fn matches(&self, path: &str) -> Option<Params> {
        self.match_segments(&split_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_paths() {
        assert_eq!(split_path("/"), vec![""]);
        assert_eq!(split_path(""), vec![""]);
        assert_eq!(split_path("/listings/"), vec!["listings"]);
        assert_eq!(split_path("/listings/42?tab=info"), vec!["listings", "42"]);
    }

    #[test]
    fn parses_captures() {
        let p = Pattern::parse("/listings/edit/{id}");
        assert_eq!(p.segment_count(), 3);
        assert_eq!(p.captures().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(p.as_str(), "/listings/edit/{id}");
    }

    #[test]
    fn empty_braces_are_literal() {
        let p = Pattern::parse("/a/{}");
        assert_eq!(p.captures().count(), 0);
        assert!(p.matches("/a/{}").is_some());
        assert!(p.matches("/a/b").is_none());
    }

    #[test]
    fn capture_binds_literal_segment() {
        let p = Pattern::parse("/listings/{id}");
        let params = p.matches("/listings/abc").unwrap();
        assert_eq!(params.get("id"), Some("abc"));
        assert!(p.matches("/listings").is_none());
        assert!(p.matches("/listings/1/2").is_none());
        assert!(p.matches("/users/1").is_none());
    }
}
