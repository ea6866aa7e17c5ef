use std::sync::{Arc, OnceLock};

use http::Method;
use smallvec::SmallVec;

use crate::handler::{Handler, ParamVec, SharedHandler};
use crate::method::MethodSet;
use crate::middleware::Chain;
use crate::pattern::{RequestPath, Specificity};

/// The winning route for one request, as seen by whoever asked.
///
/// Holds the unwrapped handler plus the chains of every router it passed
/// through on the way up. Nothing is composed until [`Candidate::handler`]
/// is called, so losing candidates never construct middleware.
#[derive(Clone)]
pub struct Candidate<'a> {
    terminal: &'a SharedHandler,
    composed: &'a OnceLock<SharedHandler>,
    /// Innermost router's chain first
    chains: SmallVec<[&'a Chain; 4]>,
    /// Captured wildcard values
    pub params: ParamVec,
    /// Text of the winning pattern
    pub pattern: Arc<str>,
    /// Rank of the winning pattern for this path
    pub specificity: Specificity,
}

impl<'a> Candidate<'a> {
    /// A candidate for `terminal`, whose composed form is cached in `composed`.
    ///
    /// The cache must belong to the route that owns `terminal` and must be
    /// emptied whenever a chain above that route changes.
    #[must_use]
    pub fn new(
        terminal: &'a SharedHandler,
        composed: &'a OnceLock<SharedHandler>,
        params: ParamVec,
        pattern: Arc<str>,
        specificity: Specificity,
    ) -> Self {
        Self {
            terminal,
            composed,
            chains: SmallVec::new(),
            params,
            pattern,
            specificity,
        }
    }

    /// Record that the candidate is served through `chain`, outside every
    /// chain recorded before it.
    pub fn wrap_in(&mut self, chain: &'a Chain) {
        self.chains.push(chain);
    }

    /// The terminal handler wrapped by every recorded chain.
    ///
    /// Composed on first use and cached, so each `Middleware::wrap` runs once
    /// per route and method rather than once per request.
    #[must_use]
    pub fn handler(&self) -> SharedHandler {
        let composed = self.composed.get_or_init(|| {
            self.chains
                .iter()
                .fold(Arc::clone(self.terminal), |next, chain| chain.compose(next))
        });
        Arc::clone(composed)
    }
}

impl std::fmt::Debug for Candidate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .field("specificity", &self.specificity)
            .field("chains", &self.chains.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of route selection. None of these is an error.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// A route matches both path and method
    Matched(Candidate<'a>),
    /// Routes match the path, but none of them accepts the method
    MethodNotAllowed(MethodSet),
    /// Nothing matches the path
    NotFound,
}

/// Something that can be mounted: it serves requests on its own and can
/// also report its best candidate so a parent can compare it with others.
pub trait Routable: Handler {
    /// Select a route for `method` and `path` without invoking anything.
    ///
    /// A matched candidate must already carry this router's own chain (see
    /// [`Candidate::wrap_in`]); the caller adds its own on top.
    fn resolve<'a>(&'a self, method: &Method, path: &RequestPath<'_>) -> Resolution<'a>;

    /// Registered patterns, for diagnostics
    fn patterns(&self) -> Vec<Arc<str>> {
        Vec::new()
    }

    /// Drop every cached composition. Called by a parent when it adopts this
    /// router or changes its own chain.
    fn clear_composed(&mut self) {}
}

/// Result of [`Router::route`](super::Router::route): which pattern would
/// serve a request, and what it captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Text of the matched pattern
    pub pattern: Arc<str>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `{"id": "123"}`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}
