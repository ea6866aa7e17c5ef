//! # Pattern Module
//!
//! Route patterns and the segment matcher that evaluates them against request
//! paths.
//!
//! ## Grammar
//!
//! A pattern is a `/`-separated list of segments:
//!
//! - `users` - a literal segment, compared exactly (case-sensitive)
//! - `{id}` - a wildcard, matches one non-empty segment and captures it
//! - `{path...}` - a remainder wildcard, matches one or more trailing
//!   segments and captures them as a single value (final segment only)
//! - `{$}` - the strict-end marker, no further segments may follow
//!   (final segment only)
//!
//! The end of the pattern selects its [`TrailingSlash`] mode:
//!
//! | pattern       | mode        | matches                                  |
//! |---------------|-------------|------------------------------------------|
//! | `/hello`      | `None`      | `/hello`, `/hello/`                      |
//! | `/hello/{$}`  | `Strict`    | `/hello`, `/hello/`                      |
//! | `/hello/`     | `Directory` | `/hello`, `/hello/`, `/hello/a/b`, ...   |
//! | `/`           | `Directory` | every path                               |
//!
//! ## Specificity
//!
//! When several patterns match the same path, [`Specificity`] orders them.
//! Each consumed path position is ranked `Literal > Wildcard > Remainder >
//! Prefix` and the ranks are compared left to right, so a longer run of
//! literal segments always wins. Remaining ties prefer the pattern whose
//! trailing slash agrees with the request, then a pattern that ends exactly
//! over a directory prefix. Anything still tied is resolved by registration
//! order in the router (first registered wins).
//!
//! ## Example
//!
//! ```rust
//! use muxr::pattern::Pattern;
//!
//! let pattern = Pattern::parse("/users/{id}/files/{path...}").unwrap();
//! let m = pattern.matches("/users/42/files/a/b.txt").unwrap();
//! assert_eq!(m.get_param("id"), Some("42"));
//! assert_eq!(m.get_param("path"), Some("a/b.txt"));
//! ```

mod core;
mod matcher;

pub use self::core::{Pattern, PatternError, Segment, TrailingSlash};
pub use matcher::{
    ParamVec, PatternMatch, Rank, RequestPath, Specificity, MAX_INLINE_PARAMS,
};
