//! # Router Module
//!
//! Registration, selection and dispatch of requests to handlers.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Holding one route per unique pattern, each with its own method table
//! - Picking the most specific route for a request path
//! - Wrapping the chosen handler in the middleware of every router it passed through
//! - Answering `404 Not Found` and `405 Method Not Allowed` when nothing fits
//!
//! ## Architecture
//!
//! Selection happens in two phases:
//!
//! 1. **Resolve**: the request path is split once, every route is evaluated
//!    against it and every mount whose prefix covers the path is asked for
//!    its own best [`Candidate`]. Nothing is invoked and nothing is mutated.
//!
//! 2. **Serve**: captures and the winning pattern are written onto the
//!    [`Request`](crate::Request), then the composed handler runs. Only the
//!    winner is composed, once per route and method, and the result is
//!    cached until the router is changed again.
//!
//! Mounted routers keep their full paths. A child mounted at `/api` sees the
//! request path `/api/users` unchanged, so its routes are registered with the
//! prefix included.
//!
//! ## Example
//!
//! ```rust
//! use muxr::{Request, Router};
//! use http::{Method, StatusCode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut api = Router::new();
//! api.get("/api/users/{id}", |req, res| {
//!     res.write(req.path_value("id").unwrap_or_default().as_bytes());
//! })?;
//!
//! let mut root = Router::new();
//! root.get("/health", |_req, res| res.write(b"ok"))?;
//! root.mount("/api", api)?;
//!
//! let res = root.dispatch(Request::new(Method::GET, "/api/users/42"));
//! assert_eq!(res.body_text(), "42");
//!
//! let res = root.dispatch(Request::new(Method::GET, "/api/nothing"));
//! assert_eq!(res.status, StatusCode::NOT_FOUND);
//! # Ok(())
//! # }
//! ```

mod core;
mod error;
mod resolve;
mod route;

pub use self::core::Router;
pub use error::RouteError;
pub use resolve::{Candidate, Resolution, Routable, RouteMatch};
pub use route::Route;
