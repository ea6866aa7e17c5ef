use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// One element of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matched exactly against the (percent-decoded) request segment.
    Literal(String),
    /// Matches any single non-empty segment and binds it to the name.
    Wildcard(Arc<str>),
    /// Matches one or more trailing segments, bound as one `/`-joined value.
    Remainder(Arc<str>),
}

impl Segment {
    /// Name bound by this segment, if it captures anything
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Wildcard(name) | Segment::Remainder(name) => Some(name),
        }
    }
}

/// How the end of a pattern treats trailing slashes and deeper paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailingSlash {
    /// `/hello` - matches the path with or without a trailing slash.
    None,
    /// `/hello/{$}` - no further segments may follow.
    Strict,
    /// `/hello/` - the directory itself and, as a prefix, anything below it.
    Directory,
}

/// Structural problems detected while parsing a pattern.
///
/// A malformed pattern can never match correctly at request time, so these
/// are surfaced at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern does not begin with `/`
    MissingLeadingSlash,
    /// A `{}` or `{...}` segment without a name
    EmptyWildcardName,
    /// A wildcard name that is not an identifier
    InvalidWildcardName {
        /// The offending name
        name: String,
    },
    /// The same wildcard name appears twice
    DuplicateWildcard {
        /// The repeated name
        name: String,
    },
    /// `{name...}` followed by more segments
    RemainderNotLast {
        /// Name of the misplaced remainder wildcard
        name: String,
    },
    /// `{$}` followed by more segments
    StrictEndNotLast,
    /// Braces that do not span the whole segment, such as `a{b}`
    PartialWildcard {
        /// The offending segment
        segment: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MissingLeadingSlash => write!(f, "pattern must begin with '/'"),
            PatternError::EmptyWildcardName => write!(f, "wildcard segment has an empty name"),
            PatternError::InvalidWildcardName { name } => {
                write!(f, "wildcard name '{name}' is not a valid identifier")
            }
            PatternError::DuplicateWildcard { name } => {
                write!(f, "wildcard name '{name}' is used more than once")
            }
            PatternError::RemainderNotLast { name } => {
                write!(f, "remainder wildcard '{{{name}...}}' must be the final segment")
            }
            PatternError::StrictEndNotLast => write!(f, "'{{$}}' must be the final segment"),
            PatternError::PartialWildcard { segment } => write!(
                f,
                "bad wildcard segment '{segment}': a wildcard must be the entire segment"
            ),
        }
    }
}

impl std::error::Error for PatternError {}

/// A parsed route pattern.
///
/// Two patterns are equal when their segments and trailing-slash mode are
/// equal; the original text is kept only for display and logging.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: Arc<str>,
    segments: Vec<Segment>,
    trailing: TrailingSlash,
}

impl Pattern {
    /// Parse a pattern string such as `/users/{id}` or `/static/{path...}`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let body = raw
            .strip_prefix('/')
            .ok_or(PatternError::MissingLeadingSlash)?;

        // "/" is the root directory: the catch-all
        if body.is_empty() {
            return Ok(Self {
                raw: Arc::from(raw),
                segments: Vec::new(),
                trailing: TrailingSlash::Directory,
            });
        }

        let parts: Vec<&str> = body.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        let mut trailing = TrailingSlash::None;

        for (i, part) in parts.iter().enumerate() {
            let is_last = i == last;

            if part.is_empty() && is_last {
                trailing = TrailingSlash::Directory;
                continue;
            }

            if *part == "{$}" {
                if !is_last {
                    return Err(PatternError::StrictEndNotLast);
                }
                trailing = TrailingSlash::Strict;
                continue;
            }

            if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                let segment = match inner.strip_suffix("...") {
                    Some(name) => {
                        let name = validate_name(name)?;
                        if !is_last {
                            return Err(PatternError::RemainderNotLast {
                                name: name.to_string(),
                            });
                        }
                        Segment::Remainder(Arc::from(name))
                    }
                    None => Segment::Wildcard(Arc::from(validate_name(inner)?)),
                };

                if let Some(name) = segment.param_name() {
                    if segments.iter().any(|s: &Segment| s.param_name() == Some(name)) {
                        return Err(PatternError::DuplicateWildcard {
                            name: name.to_string(),
                        });
                    }
                }
                segments.push(segment);
                continue;
            }

            if part.contains('{') || part.contains('}') {
                return Err(PatternError::PartialWildcard {
                    segment: (*part).to_string(),
                });
            }

            segments.push(Segment::Literal(decode_literal(part).into_owned()));
        }

        Ok(Self {
            raw: Arc::from(raw),
            segments,
            trailing,
        })
    }

    /// The pattern text as it was registered
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Shared handle to the pattern text, cheap to hand out per request
    #[must_use]
    pub fn raw(&self) -> Arc<str> {
        Arc::clone(&self.raw)
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn trailing_slash(&self) -> TrailingSlash {
        self.trailing
    }

    /// Whether this is the root catch-all `/`
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.segments.is_empty() && self.trailing == TrailingSlash::Directory
    }

    /// Names of all wildcards, in pattern order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.trailing == other.trailing && self.segments == other.segments
    }
}

impl Eq for Pattern {}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn validate_name(name: &str) -> Result<&str, PatternError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(PatternError::EmptyWildcardName);
    };
    let valid_start = first == '_' || first.is_alphabetic();
    if !valid_start || !chars.all(|c| c == '_' || c.is_alphanumeric()) {
        return Err(PatternError::InvalidWildcardName {
            name: name.to_string(),
        });
    }
    Ok(name)
}

/// Literal text in a pattern may be percent-encoded; it is compared decoded.
fn decode_literal(part: &str) -> Cow<'_, str> {
    if !part.contains('%') {
        return Cow::Borrowed(part);
    }
    urlencoding::decode(part).unwrap_or(Cow::Borrowed(part))
}
