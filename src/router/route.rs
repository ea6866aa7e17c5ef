use std::fmt;
use std::sync::OnceLock;

use http::Method;

use crate::handler::SharedHandler;
use crate::method::{MethodSet, MethodSlot, MethodTable};
use crate::pattern::{Pattern, PatternMatch, RequestPath};

use super::resolve::Routable;

/// One unique pattern and the handlers registered for it.
#[derive(Clone)]
pub struct Route {
    pattern: Pattern,
    methods: MethodTable,
    /// Per slot, the handler wrapped by every chain above it. Filled on
    /// first serve, emptied whenever a chain or handler changes.
    composed: [OnceLock<SharedHandler>; MethodSlot::COUNT],
}

/// What a single route says about a request.
pub(crate) enum RouteOutcome<'a> {
    Handler {
        terminal: &'a SharedHandler,
        composed: &'a OnceLock<SharedHandler>,
        matched: PatternMatch,
    },
    WrongMethod(MethodSet),
    NoMatch,
}

impl Route {
    pub(crate) fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            methods: MethodTable::new(),
            composed: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub(crate) fn insert(&mut self, slot: MethodSlot, handler: SharedHandler) -> bool {
        self.clear_composed();
        self.methods.insert(slot, handler).is_some()
    }

    pub(crate) fn clear_composed(&mut self) {
        for cell in &mut self.composed {
            cell.take();
        }
    }

    pub(crate) fn evaluate(&self, method: &Method, path: &RequestPath<'_>) -> RouteOutcome<'_> {
        let Some(matched) = self.pattern.match_path(path) else {
            return RouteOutcome::NoMatch;
        };
        match self.methods.lookup_slot(method) {
            Some((slot, terminal)) => RouteOutcome::Handler {
                terminal,
                composed: &self.composed[slot.index()],
                matched,
            },
            None => RouteOutcome::WrongMethod(self.methods.allowed()),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// A child mounted under a prefix pattern.
pub(crate) struct Mount {
    pub(crate) prefix: Pattern,
    pub(crate) child: Box<dyn Routable>,
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("prefix", &self.prefix.as_str())
            .finish_non_exhaustive()
    }
}
