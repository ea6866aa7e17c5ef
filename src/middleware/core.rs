use std::fmt;
use std::sync::Arc;

use crate::handler::SharedHandler;

/// A handler transformer: `wrap(next) -> handler`.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: SharedHandler) -> SharedHandler;
}

/// Middleware is shared by every route of the router that owns it.
pub type SharedMiddleware = Arc<dyn Middleware>;

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        (**self).wrap(next)
    }
}

/// Adapter turning a closure into a [`Middleware`].
pub struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync,
{
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        (self.0)(next)
    }
}

/// Wrap a closure as a [`SharedMiddleware`].
///
/// Returning a trait object lets differently-typed closures share one
/// `use_middleware([...])` call.
pub fn from_fn<F>(f: F) -> SharedMiddleware
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync + 'static,
{
    Arc::new(FnMiddleware(f))
}

/// Ordered middleware stack.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<SharedMiddleware>,
}

impl Chain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one middleware after everything already in the chain
    pub fn push(&mut self, middleware: SharedMiddleware) {
        self.layers.push(middleware);
    }

    /// Append several middleware, preserving their order
    pub fn extend<I>(&mut self, middleware: I)
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.layers.extend(middleware);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wrap `terminal` so that the first appended middleware runs first.
    ///
    /// An empty chain returns `terminal` unchanged.
    #[must_use]
    pub fn compose(&self, terminal: SharedHandler) -> SharedHandler {
        self.layers
            .iter()
            .rev()
            .fold(terminal, |next, middleware| middleware.wrap(next))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.layers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_fn, Handler, Request, Response};
    use http::{Method, StatusCode};
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn recording(trace: &Trace, name: &'static str) -> SharedMiddleware {
        let trace = Arc::clone(trace);
        from_fn(move |next| {
            let trace = Arc::clone(&trace);
            handler_fn(move |req, res| {
                trace.lock().unwrap().push(format!("{name}:before"));
                next.serve(req, res);
                trace.lock().unwrap().push(format!("{name}:after"));
            })
        })
    }

    fn run(handler: &SharedHandler) -> Response {
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();
        handler.serve(&mut req, &mut res);
        res
    }

    #[test]
    fn test_empty_chain_returns_terminal() {
        let chain = Chain::new();
        let terminal = handler_fn(|_req, res| res.set_status(StatusCode::CREATED));
        let composed = chain.compose(Arc::clone(&terminal));
        assert!(Arc::ptr_eq(&composed, &terminal));
        assert_eq!(run(&composed).status, StatusCode::CREATED);
    }

    #[test]
    fn test_compose_runs_in_append_order() {
        let trace: Trace = Arc::default();
        let mut chain = Chain::new();
        chain.extend([recording(&trace, "a"), recording(&trace, "b")]);
        chain.push(recording(&trace, "c"));

        let terminal_trace = Arc::clone(&trace);
        let handler = chain.compose(handler_fn(move |_req, _res| {
            terminal_trace.lock().unwrap().push("handler".to_string());
        }));
        run(&handler);

        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "a:before", "b:before", "c:before", "handler", "c:after", "b:after", "a:after"
            ]
        );
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_short_circuit_skips_next() {
        let mut chain = Chain::new();
        chain.push(from_fn(|_next| {
            handler_fn(|_req, res| res.set_status(StatusCode::UNAUTHORIZED))
        }));
        let handler = chain.compose(handler_fn(|_req, res| res.set_status(StatusCode::OK)));
        assert_eq!(run(&handler).status, StatusCode::UNAUTHORIZED);
    }
}
