use std::sync::Arc;
use std::time::Instant;

use tracing::{field, info_span};

use super::Middleware;
use crate::handler::{handler_fn, Handler, SharedHandler};

/// Runs the wrapped handler inside a `request` span and records the
/// response status and latency on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        handler_fn(move |req, res| {
            let span = info_span!(
                "request",
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                pattern = req.pattern().unwrap_or(""),
                status = field::Empty,
                latency_us = field::Empty,
            );
            let _entered = span.enter();
            let started = Instant::now();

            next.serve(req, res);

            span.record("status", res.status.as_u16());
            span.record(
                "latency_us",
                u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            );
        })
    }
}

impl TracingMiddleware {
    /// Shared instance ready for `Router::use_middleware`
    ///
    /// ```rust
    /// use muxr::{Router, TracingMiddleware};
    ///
    /// let mut router = Router::new();
    /// router.use_middleware([TracingMiddleware::shared()]);
    /// ```
    #[must_use]
    pub fn shared() -> Arc<dyn Middleware> {
        Arc::new(TracingMiddleware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Request, Response};
    use http::{Method, StatusCode};

    #[test]
    fn test_tracing_middleware_is_transparent() {
        let handler = TracingMiddleware.wrap(handler_fn(|req, res| {
            res.set_status(StatusCode::ACCEPTED);
            res.write(req.path.as_bytes());
        }));
        let mut req = Request::new(Method::POST, "/jobs");
        let mut res = Response::new();
        handler.serve(&mut req, &mut res);
        assert_eq!(res.status, StatusCode::ACCEPTED);
        assert_eq!(res.body_text(), "/jobs");
    }
}
