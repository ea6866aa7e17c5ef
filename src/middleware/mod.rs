//! # Middleware Module
//!
//! Middleware wraps a handler in another handler. A [`Middleware`] receives
//! the `next` handler and returns a new one that may run code before and/or
//! after calling `next`, or skip `next` entirely to short-circuit.
//!
//! A router keeps its middleware in a [`Chain`]. The chain preserves append
//! order across any number of `use` calls, and [`Chain::compose`] folds it
//! right to left around a terminal handler, so the first middleware appended
//! runs first (outermost) and its after-code runs last.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use muxr::handler::{handler_fn, Handler, Request, Response};
//! use muxr::middleware::{from_fn, Chain};
//! use http::Method;
//!
//! let trace = Arc::new(Mutex::new(Vec::new()));
//! let mut chain = Chain::new();
//! for name in ["a", "b"] {
//!     let trace = Arc::clone(&trace);
//!     chain.push(from_fn(move |next| {
//!         let trace = Arc::clone(&trace);
//!         handler_fn(move |req, res| {
//!             trace.lock().unwrap().push(name);
//!             next.serve(req, res);
//!         })
//!     }));
//! }
//!
//! let handler = chain.compose(handler_fn(|_req, _res| {}));
//! handler.serve(&mut Request::new(Method::GET, "/"), &mut Response::new());
//! assert_eq!(*trace.lock().unwrap(), vec!["a", "b"]);
//! ```
//!
//! The chain has no retry or recovery logic. A middleware that panics
//! propagates the panic to whoever called `serve`.

mod core;
mod tracing;

pub use self::core::{from_fn, Chain, FnMiddleware, Middleware, SharedMiddleware};
pub use self::tracing::TracingMiddleware;
