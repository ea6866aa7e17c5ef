//! # muxr
//!
//! **muxr** is a small HTTP request router: pattern matching with
//! specificity, per-pattern method tables, ordered middleware and mountable
//! sub-routers. It is transport agnostic: it takes a [`Request`], writes into
//! a [`Response`] and never touches a socket.
//!
//! ## Overview
//!
//! - **[`pattern`]** - Pattern grammar, parsing, matching and specificity
//! - **[`method`]** - Per-pattern method tables and the GET to HEAD rule
//! - **[`handler`]** - The [`Handler`] contract plus request and response types
//! - **[`middleware`]** - Handler transformers and their ordered [`Chain`](middleware::Chain)
//! - **[`router`]** - Registration, mounting, selection and dispatch
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`runtime_config`]** - Environment-driven tuning
//!
//! ## Quick Start
//!
//! ```rust
//! use muxr::{middleware, Handler, Request, Response, Router};
//! use http::{Method, StatusCode};
//!
//! # fn main() -> Result<(), muxr::RouteError> {
//! let mut router = Router::new();
//! router.use_middleware([middleware::from_fn(|next| {
//!     muxr::handler_fn(move |req, res| {
//!         res.set_header("x-served-by", "muxr");
//!         next.serve(req, res);
//!     })
//! })]);
//! router.get("/hello/{name}", |req, res| {
//!     let name = req.path_value("name").unwrap_or("world").to_string();
//!     res.write(format!("hello, {name}").as_bytes());
//! })?;
//!
//! let res = router.dispatch(Request::new(Method::GET, "/hello/ferris"));
//! assert_eq!(res.status, StatusCode::OK);
//! assert_eq!(res.body_text(), "hello, ferris");
//! assert_eq!(res.get_header("x-served-by"), Some("muxr"));
//!
//! // HEAD is answered by the GET handler
//! let res = router.dispatch(Request::new(Method::HEAD, "/hello/ferris"));
//! assert_eq!(res.status, StatusCode::OK);
//! # let _ = Response::new();
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut self`; dispatch takes `&self` and mutates
//! nothing, so a fully built router can be shared behind an `Arc` and served
//! from any number of threads.

pub mod handler;
pub mod ids;
pub mod logging;
pub mod method;
pub mod middleware;
pub mod pattern;
pub mod router;
pub mod runtime_config;

pub use handler::{handler_fn, Handler, Request, Response, SharedHandler};
pub use middleware::{Middleware, SharedMiddleware, TracingMiddleware};
pub use pattern::{Pattern, PatternError};
pub use router::{Routable, RouteError, RouteMatch, Router};
