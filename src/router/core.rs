//! Router core module - registration and the dispatch path.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use http::{Method, StatusCode};
use tracing::{debug, info, warn};

use crate::handler::{handler_fn, Handler, Request, Response, SharedHandler};
use crate::method::{MethodSet, MethodSlot};
use crate::middleware::{Chain, SharedMiddleware};
use crate::pattern::{Pattern, RequestPath, Specificity};
use crate::runtime_config::RuntimeConfig;

use super::error::RouteError;
use super::resolve::{Candidate, Resolution, Routable, RouteMatch};
use super::route::{Mount, Route, RouteOutcome};

/// Pattern-matching request router.
///
/// Holds one [`Route`] per unique pattern, an ordered middleware [`Chain`]
/// and an ordered list of mounted children. Build it up front, then share
/// it (`Router` is `Send + Sync`) and call [`Handler::serve`] from as many
/// threads as needed. Dispatch only ever fills composition caches.
///
/// Middleware is composed around a route's handler the first time that
/// route serves a method, then reused. Registering handlers, adding
/// middleware or mounting drops every cached composition below this router.
///
/// # Selection
///
/// For each request every route is evaluated, and every mount whose prefix
/// covers the path is asked for its own best candidate. Among candidates
/// that accept the request method the most specific wins; on an exact tie a
/// direct route beats a mounted one, then the earlier registration wins.
/// If routes matched the path but none accepts the method the answer is
/// `405 Method Not Allowed` with an `Allow` header, otherwise `404 Not Found`.
///
/// # Example
///
/// ```rust
/// use muxr::{Request, Response, Router};
/// use http::{Method, StatusCode};
///
/// let mut router = Router::new();
/// router
///     .get("/users/{id}", |req, res| {
///         let id = req.path_value("id").unwrap_or_default().to_string();
///         res.write(id.as_bytes());
///     })
///     .unwrap();
///
/// let res = router.dispatch(Request::new(Method::GET, "/users/7"));
/// assert_eq!(res.status, StatusCode::OK);
/// assert_eq!(res.body_text(), "7");
///
/// let res = router.dispatch(Request::new(Method::DELETE, "/users/7"));
/// assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
/// assert_eq!(res.get_header("allow"), Some("GET, HEAD"));
/// ```
pub struct Router {
    routes: Vec<Route>,
    chain: Chain,
    mounts: Vec<Mount>,
    not_found: SharedHandler,
    method_not_allowed: SharedHandler,
    not_found_composed: OnceLock<SharedHandler>,
    method_not_allowed_composed: OnceLock<SharedHandler>,
    config: RuntimeConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("chain", &self.chain)
            .field("mounts", &self.mounts)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create an empty router with default runtime configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            routes: Vec::new(),
            chain: Chain::new(),
            mounts: Vec::new(),
            not_found: default_not_found(),
            method_not_allowed: default_method_not_allowed(),
            not_found_composed: OnceLock::new(),
            method_not_allowed_composed: OnceLock::new(),
            config,
        }
    }

    /// Register `handler` for `method` on `pattern`.
    ///
    /// Registering the same method and pattern again replaces the previous
    /// handler and leaves the pattern's other methods alone.
    pub fn on<H>(&mut self, method: Method, pattern: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler + 'static,
    {
        self.register(Some(method), pattern, Arc::new(handler))
    }

    /// Register a handler for every method.
    ///
    /// The pattern may be method-qualified (`"POST /items"`), in which case
    /// only that method is registered.
    pub fn handle<H>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler + 'static,
    {
        let (method, pattern) = split_method(pattern)?;
        self.register(method, pattern, Arc::new(handler))
    }

    /// Closure form of [`Router::handle`]
    pub fn handle_fn<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        let (method, pattern) = split_method(pattern)?;
        self.register(method, pattern, handler_fn(handler))
    }

    fn register(
        &mut self,
        method: Option<Method>,
        raw: &str,
        handler: SharedHandler,
    ) -> Result<&mut Self, RouteError> {
        let slot = match &method {
            Some(m) => MethodSlot::for_method(m).ok_or_else(|| RouteError::UnsupportedMethod {
                method: m.to_string(),
            })?,
            None => MethodSlot::Any,
        };
        let pattern = Pattern::parse(raw).map_err(|source| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            source,
        })?;

        let index = match self.routes.iter().position(|r| *r.pattern() == pattern) {
            Some(index) => index,
            None => {
                self.routes.push(Route::new(pattern));
                self.routes.len() - 1
            }
        };
        let replaced = self.routes[index].insert(slot, handler);

        let method = method.as_ref().map_or("*", Method::as_str);
        if replaced {
            warn!(method, pattern = raw, "Replaced existing route handler");
        } else {
            debug!(
                method,
                pattern = raw,
                routes_count = self.routes.len(),
                "Route registered"
            );
        }
        Ok(self)
    }

    /// Append middleware. Order is preserved across calls: everything
    /// appended earlier runs before everything appended later.
    pub fn use_middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.chain.extend(middleware);
        self.clear_composed();
        self
    }

    /// Append a single middleware
    pub fn add_middleware(&mut self, middleware: SharedMiddleware) -> &mut Self {
        self.chain.push(middleware);
        self.clear_composed();
        self
    }

    /// Mount `child` under `prefix`.
    ///
    /// The path is not rewritten: the child's patterns are matched against
    /// the full request path, so a child mounted at `/api` registers
    /// `/api/users`, not `/users`. The prefix only decides whether the child
    /// is consulted at all. The child's candidates compete with this
    /// router's own routes on specificity; a child with no match simply
    /// contributes nothing.
    pub fn mount<R>(&mut self, prefix: &str, mut child: R) -> Result<&mut Self, RouteError>
    where
        R: Routable + 'static,
    {
        let prefix_pattern = Pattern::parse(prefix).map_err(|source| RouteError::InvalidPattern {
            pattern: prefix.to_string(),
            source,
        })?;
        info!(
            prefix = %prefix_pattern,
            child_patterns = child.patterns().len(),
            mounts_count = self.mounts.len() + 1,
            "Router mounted"
        );
        child.clear_composed();
        self.mounts.push(Mount {
            prefix: prefix_pattern,
            child: Box::new(child),
        });
        Ok(self)
    }

    /// Replace the handler used when nothing matches the path
    pub fn not_found<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.not_found = Arc::new(handler);
        self.not_found_composed.take();
        self
    }

    /// Replace the handler used when the path matches but the method does not.
    ///
    /// The `Allow` header is already set when it runs.
    pub fn method_not_allowed<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.method_not_allowed = Arc::new(handler);
        self.method_not_allowed_composed.take();
        self
    }

    /// Routes registered directly on this router, in registration order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Runtime settings this router was built with
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Find the route that would serve `method` and `path`, without invoking it.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - the winning pattern and its captures
    /// * `None` - not found or method not allowed
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        match self.select(&method, &RequestPath::parse(path)) {
            Resolution::Matched(candidate) => Some(RouteMatch {
                pattern: candidate.pattern,
                path_params: candidate.params,
            }),
            Resolution::MethodNotAllowed(_) | Resolution::NotFound => None,
        }
    }

    /// Serve an owned request and hand back the recorded response
    #[must_use]
    pub fn dispatch(&self, mut req: Request) -> Response {
        let mut res = Response::new();
        self.serve(&mut req, &mut res);
        res
    }

    /// Pick the best candidate among own routes and mounted children.
    ///
    /// Own routes are visited before mounts and both in registration order,
    /// and a later candidate only replaces the current best when it is
    /// strictly more specific; that is the whole tie-break.
    fn select<'a>(&'a self, method: &Method, path: &RequestPath<'_>) -> Resolution<'a> {
        let mut best: Option<Candidate<'a>> = None;
        let mut allowed = MethodSet::default();

        for route in &self.routes {
            match route.evaluate(method, path) {
                RouteOutcome::Handler {
                    terminal,
                    composed,
                    matched,
                } => {
                    if beats(&matched.specificity, best.as_ref()) {
                        best = Some(Candidate::new(
                            terminal,
                            composed,
                            matched.params,
                            route.pattern().raw(),
                            matched.specificity,
                        ));
                    }
                }
                RouteOutcome::WrongMethod(methods) => allowed = allowed.union(methods),
                RouteOutcome::NoMatch => {}
            }
        }

        for mount in &self.mounts {
            if !mount.prefix.covers(path) {
                continue;
            }
            match mount.child.resolve(method, path) {
                Resolution::Matched(candidate) => {
                    if beats(&candidate.specificity, best.as_ref()) {
                        best = Some(candidate);
                    }
                }
                Resolution::MethodNotAllowed(methods) => allowed = allowed.union(methods),
                Resolution::NotFound => {}
            }
        }

        match best {
            Some(candidate) => Resolution::Matched(candidate),
            None if !allowed.is_empty() => Resolution::MethodNotAllowed(allowed),
            None => Resolution::NotFound,
        }
    }

    fn log_match(&self, req: &Request, candidate: &Candidate, elapsed: Duration) {
        if elapsed > self.config.slow_match_threshold {
            warn!(
                method = %req.method,
                path = %req.path,
                route_pattern = %candidate.pattern,
                path_params = ?candidate.params,
                duration_us = elapsed.as_micros(),
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %req.method,
                path = %req.path,
                route_pattern = %candidate.pattern,
                path_params = ?candidate.params,
                duration_us = elapsed.as_micros(),
                "Route matched"
            );
        }
    }
}

impl Routable for Router {
    fn resolve<'a>(&'a self, method: &Method, path: &RequestPath<'_>) -> Resolution<'a> {
        match self.select(method, path) {
            Resolution::Matched(mut candidate) => {
                candidate.wrap_in(&self.chain);
                Resolution::Matched(candidate)
            }
            other => other,
        }
    }

    fn patterns(&self) -> Vec<Arc<str>> {
        let own = self.routes.iter().map(|r| r.pattern().raw());
        let mounted = self.mounts.iter().flat_map(|m| m.child.patterns());
        own.chain(mounted).collect()
    }

    fn clear_composed(&mut self) {
        self.not_found_composed.take();
        self.method_not_allowed_composed.take();
        for route in &mut self.routes {
            route.clear_composed();
        }
        for mount in &mut self.mounts {
            mount.child.clear_composed();
        }
    }
}

impl Handler for Router {
    fn serve(&self, req: &mut Request, res: &mut Response) {
        debug!(method = %req.method, path = %req.path, "Route match attempt");

        let started = Instant::now();
        let resolution = self.resolve(&req.method, &RequestPath::parse(&req.path));
        let elapsed = started.elapsed();

        match resolution {
            Resolution::Matched(candidate) => {
                self.log_match(req, &candidate, elapsed);
                let handler = candidate.handler();
                req.path_params = candidate.params;
                req.pattern = Some(candidate.pattern);
                handler.serve(req, res);
            }
            Resolution::MethodNotAllowed(allowed) => {
                warn!(
                    method = %req.method,
                    path = %req.path,
                    allow = %allowed.to_header_value(),
                    duration_us = elapsed.as_micros(),
                    "Method not allowed"
                );
                res.set_header("allow", allowed.to_header_value());
                self.method_not_allowed_composed
                    .get_or_init(|| self.chain.compose(Arc::clone(&self.method_not_allowed)))
                    .serve(req, res);
            }
            Resolution::NotFound => {
                warn!(
                    method = %req.method,
                    path = %req.path,
                    duration_us = elapsed.as_micros(),
                    "No route matched"
                );
                self.not_found_composed
                    .get_or_init(|| self.chain.compose(Arc::clone(&self.not_found)))
                    .serve(req, res);
            }
        }
    }
}

fn beats(specificity: &Specificity, best: Option<&Candidate<'_>>) -> bool {
    best.map_or(true, |current| *specificity > current.specificity)
}

/// Split an optional leading method token off a pattern: `"GET /x"`.
fn split_method(raw: &str) -> Result<(Option<Method>, &str), RouteError> {
    match raw.split_once(' ') {
        Some((method, rest)) if !method.starts_with('/') => {
            let method = Method::from_bytes(method.as_bytes()).map_err(|_| {
                RouteError::UnsupportedMethod {
                    method: method.to_string(),
                }
            })?;
            Ok((Some(method), rest.trim_start()))
        }
        _ => Ok((None, raw)),
    }
}

fn default_not_found() -> SharedHandler {
    handler_fn(|_req, res| {
        res.set_status(StatusCode::NOT_FOUND);
        res.set_header("content-type", "text/plain; charset=utf-8");
        res.write(b"404 page not found\n");
    })
}

fn default_method_not_allowed() -> SharedHandler {
    handler_fn(|_req, res| {
        res.set_status(StatusCode::METHOD_NOT_ALLOWED);
        res.set_header("content-type", "text/plain; charset=utf-8");
        res.write(b"Method Not Allowed\n");
    })
}

macro_rules! method_routes {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        impl Router {
            $(
                $(#[$doc])*
                pub fn $name<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
                where
                    F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
                {
                    self.register(Some(Method::$method), pattern, handler_fn(handler))
                }
            )*
        }
    };
}

method_routes! {
    /// Register a GET handler. It also answers HEAD unless an explicit HEAD
    /// handler is registered for the same pattern.
    get => GET;
    /// Register a HEAD handler
    head => HEAD;
    /// Register a POST handler
    post => POST;
    /// Register a PUT handler
    put => PUT;
    /// Register a PATCH handler
    patch => PATCH;
    /// Register a DELETE handler
    delete => DELETE;
    /// Register a CONNECT handler
    connect => CONNECT;
    /// Register an OPTIONS handler
    options => OPTIONS;
    /// Register a TRACE handler
    trace => TRACE;
}
