use std::sync::Arc;

use http::{Method, StatusCode};
use smallvec::SmallVec;

use crate::ids::RequestId;
use crate::pattern::ParamVec;

/// Maximum inline headers before heap allocation
/// Most requests have ≤16 headers
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names use `Arc<str>` because they repeat across requests
/// (Content-Type, Authorization, ...) and cloning one is an atomic increment.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request descriptor handed to every handler.
///
/// The router fills in [`Request::path_params`] and [`Request::pattern`]
/// just before the matched handler chain runs.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path, without the query string
    pub path: String,
    /// Query string parameters (decoded; never used for routing)
    pub query_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Raw request body; the router never reads it
    pub body: Vec<u8>,
    /// Wildcard values captured by the matched pattern
    pub path_params: ParamVec,
    /// Text of the pattern that matched, once routing is done
    pub pattern: Option<Arc<str>>,
}

impl Request {
    /// Build a request for `method` and a raw target such as `/users/1?full=true`.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let query_params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::<str>::from(&*k), v.into_owned()))
            .collect();

        Self {
            request_id: RequestId::new(),
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query_params,
            headers: HeaderVec::new(),
            body: Vec::new(),
            path_params: ParamVec::new(),
            pattern: None,
        }
    }

    /// Add a header (builder style).
    ///
    /// A valid ULID in `x-request-id` becomes the request's id.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("x-request-id") {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    /// Replace the body (builder style)
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Value captured by the wildcard `name`.
    ///
    /// Wildcard names are unique within a pattern, so at most one value exists.
    #[inline]
    #[must_use]
    pub fn path_value(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// (e.g., `?limit=10&limit=20`), returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The pattern that matched this request, if routing has happened
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}

/// Response sink a handler writes into.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code, `200 OK` until a handler changes it
    pub status: StatusCode,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        // Remove existing header with same name (case-insensitive)
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Append bytes to the body
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Body as text, lossily decoded
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The terminal unit of dispatch, and what middleware composition produces.
pub trait Handler: Send + Sync {
    fn serve(&self, req: &mut Request, res: &mut Response);
}

/// Handlers are shared between routes, middleware wrappers and threads.
pub type SharedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, req: &mut Request, res: &mut Response) {
        (**self).serve(req, res);
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn serve(&self, req: &mut Request, res: &mut Response) {
        (**self).serve(req, res);
    }
}

/// Adapter turning a closure into a [`Handler`].
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn serve(&self, req: &mut Request, res: &mut Response) {
        (self.0)(req, res);
    }
}

/// Wrap a closure as a [`SharedHandler`].
pub fn handler_fn<F>(f: F) -> SharedHandler
where
    F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
{
    Arc::new(HandlerFn(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_splits_target() {
        let req = Request::new(Method::GET, "/search?q=a%20b&page=2&page=3");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query_param("q"), Some("a b"));
        assert_eq!(req.query_param("page"), Some("3"));
        assert_eq!(req.query_param("missing"), None);
        assert!(req.pattern().is_none());
        assert!(req.path_params.is_empty());
    }

    #[test]
    fn test_empty_target_is_root() {
        assert_eq!(Request::new(Method::GET, "").path, "/");
        assert_eq!(Request::new(Method::GET, "?x=1").path, "/");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let req = Request::new(Method::POST, "/").with_header("Content-Type", "text/plain");
        assert_eq!(req.get_header("content-type"), Some("text/plain"));

        let mut res = Response::new();
        res.set_header("X-Trace", "1");
        res.set_header("x-trace", "2");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("X-TRACE"), Some("2"));
    }

    #[test]
    fn test_inbound_request_id_is_kept() {
        let id = RequestId::new();
        let req = Request::new(Method::GET, "/").with_header("X-Request-Id", id.to_string());
        assert_eq!(req.request_id, id);
    }

    #[test]
    fn test_handler_fn_and_box_serve() {
        let boxed: Box<dyn Handler> = Box::new(HandlerFn(|_req: &mut Request, res: &mut Response| {
            res.write(b"boxed");
        }));
        let mut req = Request::new(Method::GET, "/").with_body("payload");
        let mut res = Response::default();
        boxed.serve(&mut req, &mut res);
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body_text(), "boxed");
        assert_eq!(req.body, b"payload");
    }
}
