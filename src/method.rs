//! Per-pattern method tables.
//!
//! Every route owns a [`MethodTable`]: a fixed slot per standard HTTP method
//! plus one method-agnostic slot. Lookups apply the GET/HEAD rule, so a
//! pattern with a GET handler and no explicit HEAD handler answers HEAD with
//! the GET handler. The body is left alone; suppressing it for HEAD is the
//! transport's job.

use std::fmt;

use http::Method;

use crate::handler::SharedHandler;

/// Number of standard methods
pub const METHOD_COUNT: usize = 9;

/// The methods with a dedicated registration function, in `Allow` order.
pub static STANDARD_METHODS: [Method; METHOD_COUNT] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
];

const GET: usize = 0;
const HEAD: usize = 1;

/// Where a handler lives inside a [`MethodTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSlot {
    /// Index into [`STANDARD_METHODS`]
    Standard(usize),
    /// Method-agnostic registration; serves every method
    Any,
}

impl MethodSlot {
    /// Number of distinct slots: the standard methods plus `Any`
    pub const COUNT: usize = METHOD_COUNT + 1;

    /// Dense index, `Any` last
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            MethodSlot::Standard(i) => i,
            MethodSlot::Any => METHOD_COUNT,
        }
    }

    /// Slot for a standard method; extension methods have none.
    #[must_use]
    pub fn for_method(method: &Method) -> Option<Self> {
        STANDARD_METHODS
            .iter()
            .position(|m| m == method)
            .map(MethodSlot::Standard)
    }
}

/// Handlers registered for one pattern, keyed by method.
#[derive(Clone, Default)]
pub struct MethodTable {
    handlers: [Option<SharedHandler>; METHOD_COUNT],
    any: Option<SharedHandler>,
}

impl MethodTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` in `slot`, returning the handler it replaced.
    ///
    /// Last write wins; other slots are untouched.
    pub fn insert(&mut self, slot: MethodSlot, handler: SharedHandler) -> Option<SharedHandler> {
        match slot {
            MethodSlot::Standard(i) => self.handlers[i].replace(handler),
            MethodSlot::Any => self.any.replace(handler),
        }
    }

    /// Handler for `method`: the explicit one, else GET for HEAD, else the
    /// method-agnostic one.
    #[must_use]
    pub fn lookup(&self, method: &Method) -> Option<&SharedHandler> {
        self.lookup_slot(method).map(|(_, handler)| handler)
    }

    /// Like [`MethodTable::lookup`], also reporting which slot answered.
    ///
    /// A HEAD request served by the GET handler reports the GET slot.
    #[must_use]
    pub fn lookup_slot(&self, method: &Method) -> Option<(MethodSlot, &SharedHandler)> {
        let standard = |i: usize| {
            self.handlers[i]
                .as_ref()
                .map(|handler| (MethodSlot::Standard(i), handler))
        };
        let explicit = match MethodSlot::for_method(method) {
            Some(MethodSlot::Standard(HEAD)) => standard(HEAD).or_else(|| standard(GET)),
            Some(MethodSlot::Standard(i)) => standard(i),
            Some(MethodSlot::Any) | None => None,
        };
        explicit.or_else(|| self.any.as_ref().map(|handler| (MethodSlot::Any, handler)))
    }

    /// Methods this table answers. A method-agnostic handler answers all of them.
    #[must_use]
    pub fn allowed(&self) -> MethodSet {
        if self.any.is_some() {
            return MethodSet::all();
        }
        let mut set = MethodSet::default();
        for (i, handler) in self.handlers.iter().enumerate() {
            if handler.is_some() {
                set.insert_index(i);
            }
        }
        if self.handlers[GET].is_some() {
            set.insert_index(HEAD);
        }
        set
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.any.is_none() && self.handlers.iter().all(Option::is_none)
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.allowed())
            .field("any", &self.any.is_some())
            .finish()
    }
}

/// A set of standard methods, used to build `Allow` headers.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MethodSet(u16);

impl MethodSet {
    #[must_use]
    pub fn all() -> Self {
        Self((1 << METHOD_COUNT) - 1)
    }

    pub fn insert(&mut self, method: &Method) {
        if let Some(MethodSlot::Standard(i)) = MethodSlot::for_method(method) {
            self.insert_index(i);
        }
    }

    fn insert_index(&mut self, i: usize) {
        self.0 |= 1 << i;
    }

    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        matches!(MethodSlot::for_method(method), Some(MethodSlot::Standard(i)) if self.0 & (1 << i) != 0)
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in standard order
    pub fn iter(&self) -> impl Iterator<Item = &'static Method> + '_ {
        STANDARD_METHODS
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, m)| m)
    }

    /// Value for an `Allow` header, e.g. `GET, HEAD, POST`
    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.iter().map(Method::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Debug for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
