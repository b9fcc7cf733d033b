//! Segment-based HTTP router.
//!
//! Routes are `(method, pattern, handler)` triples kept in registration order. A
//! request is dispatched to the first route whose method matches case-insensitively
//! and whose pattern matches segment by segment; `{name}` segments capture the request
//! segment verbatim. If nothing matches, the not-found handler runs instead.
//!
//! The router is generic over the request context `C` that handlers receive and the
//! response type `R` they produce, so it carries no HTTP types of its own.
//!
//! ```ignore
//! use jobboard::router::Router;
//!
//! let mut router = Router::new(|_ctx: ()| "404".to_string());
//! router.get("/listings/{id}", |_ctx, params| format!("listing {}", &params["id"]));
//!
//! assert_eq!(router.route((), "GET", "/listings/42"), "listing 42");
//! assert_eq!(router.route((), "GET", "/nope"), "404");
//! ```

mod pattern;

pub use pattern::Pattern;

use pattern::split_path;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// Captured `{name}` segments of a matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<&str> for Params {
    type Output = str;

    /// Panics if `name` was not captured; use [`Params::get`] when unsure.
    fn index(&self, name: &str) -> &str {
        match self.0.get(name) {
            Some(value) => value,
            None => panic!("no route parameter named '{name}'"),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

type Handler<C, R> = Box<dyn Fn(C, Params) -> R + Send + Sync>;
type NotFound<C, R> = Box<dyn Fn(C) -> R + Send + Sync>;

/// One registered route.
pub struct Route<C, R> {
    method: String,
    pattern: Pattern,
    handler: Handler<C, R>,
}

impl<C, R> Route<C, R> {
    /// Upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Invoke the handler.
    pub fn call(&self, ctx: C, params: Params) -> R {
        (self.handler)(ctx, params)
    }
}

impl<C, R> fmt::Debug for Route<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// A route selected for a request, with its captured parameters.
#[derive(Debug)]
pub struct RouteMatch<'r, C, R> {
    pub route: &'r Route<C, R>,
    pub params: Params,
}

/// Ordered route table with a not-found fallback.
pub struct Router<C, R> {
    routes: Vec<Route<C, R>>,
    not_found: NotFound<C, R>,
}

impl<C, R> Router<C, R> {
    /// Create an empty router. `not_found` runs when no route matches.
    pub fn new<F>(not_found: F) -> Self
    where
        F: Fn(C) -> R + Send + Sync + 'static,
    {
        Self {
            routes: Vec::new(),
            not_found: Box::new(not_found),
        }
    }

    /// Register a route. Duplicates are not detected; the earliest registration wins.
    pub fn add<F>(&mut self, method: &str, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(C, Params) -> R + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method: method.trim().to_ascii_uppercase(),
            pattern: Pattern::parse(pattern),
            handler: Box::new(handler),
        });
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(C, Params) -> R + Send + Sync + 'static,
    {
        self.add("GET", pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(C, Params) -> R + Send + Sync + 'static,
    {
        self.add("POST", pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(C, Params) -> R + Send + Sync + 'static,
    {
        self.add("PUT", pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(C, Params) -> R + Send + Sync + 'static,
    {
        self.add("PATCH", pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(C, Params) -> R + Send + Sync + 'static,
    {
        self.add("DELETE", pattern, handler)
    }

    /// Find the first route matching `method` and `path` without invoking anything.
    pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<'_, C, R>> {
        let method = method.trim();
        let segments = split_path(path);
        self.routes
            .iter()
            .filter(|route| route.method.eq_ignore_ascii_case(method))
            .find_map(|route| {
                route
                    .pattern
                    .match_segments(&segments)
                    .map(|params| RouteMatch { route, params })
            })
    }

    /// Dispatch a request: the matched handler or the not-found handler runs exactly once.
    pub fn route(&self, ctx: C, method: &str, path: &str) -> R {
        match self.resolve(method, path) {
            Some(RouteMatch { route, params }) => {
                tracing::debug!(
                    target: "jobboard.router",
                    method = %route.method,
                    pattern = route.pattern.as_str(),
                    path,
                    "route matched"
                );
                route.call(ctx, params)
            }
            None => {
                tracing::debug!(target: "jobboard.router", method, path, "no route matched");
                (self.not_found)(ctx)
            }
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<C, R>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<C, R> fmt::Debug for Router<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
