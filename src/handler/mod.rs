//! # Handler Module
//!
//! The request/response contract every route, fallback, middleware and
//! router shares.
//!
//! A [`Handler`] receives a mutable [`Request`] descriptor and a [`Response`]
//! sink. Handlers never return errors: whatever they want the client to see
//! goes into the response. Transport concerns (reading a socket, writing the
//! response out) are outside this crate; a server adapter builds a `Request`,
//! calls [`Handler::serve`] and writes the `Response` back.
//!
//! ## Example
//!
//! ```rust
//! use muxr::handler::{handler_fn, Handler, Request, Response};
//! use http::{Method, StatusCode};
//!
//! let hello = handler_fn(|req: &mut Request, res: &mut Response| {
//!     res.set_status(StatusCode::CREATED);
//!     res.write(format!("hello from {}", req.path).as_bytes());
//! });
//!
//! let mut req = Request::new(Method::GET, "/greeting");
//! let mut res = Response::new();
//! hello.serve(&mut req, &mut res);
//! assert_eq!(res.status, StatusCode::CREATED);
//! ```

mod core;

pub use self::core::{
    handler_fn, Handler, HandlerFn, HeaderVec, Request, Response, SharedHandler,
    MAX_INLINE_HEADERS,
};
pub use crate::pattern::ParamVec;
