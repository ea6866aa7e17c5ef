use std::fmt;

use crate::pattern::PatternError;

/// Registration failure.
///
/// Returned by every `Router` registration call. A route that fails to
/// register is never partially added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern string is malformed
    InvalidPattern {
        /// The pattern as passed in
        pattern: String,
        /// What is wrong with it
        source: PatternError,
    },
    /// The method is not one of the nine standard methods
    UnsupportedMethod {
        /// The method as passed in
        method: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern, source } => {
                write!(f, "invalid route pattern '{pattern}': {source}")
            }
            RouteError::UnsupportedMethod { method } => write!(
                f,
                "unsupported method '{method}': register it with a method-agnostic pattern instead"
            ),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::InvalidPattern { source, .. } => Some(source),
            RouteError::UnsupportedMethod { .. } => None,
        }
    }
}
