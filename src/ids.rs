//! Request identifiers.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Per-request identifier backed by a ULID, so ids sort by arrival time.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse an inbound `x-request-id` when it is a valid ULID, else mint one.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

#[cfg(test)]
mod tests {
    use super::RequestId;

    #[test]
    fn test_header_round_trip() {
        let id = RequestId::new();
        let parsed = RequestId::from_header_or_new(Some(&id.to_string()));
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_invalid_header_mints_new_id() {
        let a = RequestId::from_header_or_new(Some("not-a-ulid"));
        let b = RequestId::from_header_or_new(None);
        assert_ne!(a, b);
    }
}
