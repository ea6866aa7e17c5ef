use std::borrow::Cow;
use std::sync::Arc;

use smallvec::SmallVec;

use super::core::{Pattern, Segment, TrailingSlash};

/// Maximum number of captured parameters before heap allocation.
/// Most routes have ≤4 wildcards (e.g., /users/{id}/posts/{post_id}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured wildcard values.
///
/// Names are `Arc<str>` shared with the parsed pattern, so a capture costs
/// one atomic increment plus the value itself.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Maximum number of path segments before heap allocation
const MAX_INLINE_SEGMENTS: usize = 16;

/// A request path split into segments, ready to be matched.
///
/// The leading `/` is dropped and a single trailing empty segment (the
/// trailing slash) is recorded as a flag instead of a segment, so `/a/b` and
/// `/a/b/` share the segments `["a", "b"]`. The root path `/` has no
/// segments and counts as having a trailing slash.
#[derive(Debug, Clone)]
pub struct RequestPath<'a> {
    raw: &'a str,
    segments: SmallVec<[&'a str; MAX_INLINE_SEGMENTS]>,
    trailing_slash: bool,
}

impl<'a> RequestPath<'a> {
    /// Split a request path. Anything after `?` is ignored.
    #[must_use]
    pub fn parse(path: &'a str) -> Self {
        let raw = path.split('?').next().unwrap_or(path);
        let body = raw.strip_prefix('/').unwrap_or(raw);

        if body.is_empty() {
            return Self {
                raw,
                segments: SmallVec::new(),
                trailing_slash: true,
            };
        }

        let mut segments: SmallVec<[&'a str; MAX_INLINE_SEGMENTS]> = body.split('/').collect();
        let trailing_slash = segments.last().is_some_and(|s| s.is_empty());
        if trailing_slash {
            segments.pop();
        }

        Self {
            raw,
            segments,
            trailing_slash,
        }
    }

    /// The path this was parsed from, without any query string
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    #[must_use]
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }
}

/// How a single path position was consumed, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    /// Deeper segments absorbed by a directory pattern
    Prefix,
    /// Trailing segments captured by `{name...}`
    Remainder,
    /// One segment captured by `{name}`
    Wildcard,
    /// One segment matched literally
    Literal,
}

/// Ordering key among patterns that match the same path.
///
/// Field order is significant: the derived `Ord` compares `ranks` first
/// (lexicographically, leftmost position dominant), then `slash_agrees`, then
/// `exact_end`. Greater is more specific.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    ranks: SmallVec<[Rank; MAX_INLINE_SEGMENTS]>,
    slash_agrees: bool,
    exact_end: bool,
}

impl Specificity {
    #[must_use]
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Number of leading literal segments
    #[must_use]
    pub fn literal_prefix_len(&self) -> usize {
        self.ranks.iter().take_while(|r| **r == Rank::Literal).count()
    }
}

/// Result of a successful [`Pattern::matches`].
#[derive(Debug, Clone)]
pub struct PatternMatch {
    /// Captured wildcard values, in pattern order
    pub params: ParamVec,
    /// Rank of this match against competing patterns
    pub specificity: Specificity,
}

impl PatternMatch {
    /// Look up a captured value by wildcard name
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Pattern {
    /// Match a request path (query string ignored).
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<PatternMatch> {
        self.match_path(&RequestPath::parse(path))
    }

    /// Match an already split request path.
    ///
    /// Returns `None` when the path does not match; this is never an error.
    #[must_use]
    pub fn match_path(&self, path: &RequestPath<'_>) -> Option<PatternMatch> {
        let request = path.segments();
        let mut params = ParamVec::new();
        let mut ranks = SmallVec::new();

        for (i, segment) in self.segments().iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    let value = request.get(i)?;
                    if decode_segment(value) != literal.as_str() {
                        return None;
                    }
                    ranks.push(Rank::Literal);
                }
                Segment::Wildcard(name) => {
                    let value = request.get(i)?;
                    if value.is_empty() {
                        return None;
                    }
                    params.push((Arc::clone(name), decode_segment(value).into_owned()));
                    ranks.push(Rank::Wildcard);
                }
                Segment::Remainder(name) => {
                    let rest = request.get(i..).filter(|rest| !rest.is_empty())?;
                    let mut value = rest.join("/");
                    if path.has_trailing_slash() {
                        value.push('/');
                    }
                    if value.is_empty() {
                        return None;
                    }
                    params.push((Arc::clone(name), decode_segment(&value).into_owned()));
                    ranks.push(Rank::Remainder);
                    return Some(PatternMatch {
                        params,
                        specificity: Specificity {
                            ranks,
                            slash_agrees: !path.has_trailing_slash(),
                            exact_end: true,
                        },
                    });
                }
            }
        }

        let consumed = self.segments().len();
        match self.trailing_slash() {
            TrailingSlash::None | TrailingSlash::Strict if request.len() != consumed => None,
            TrailingSlash::Directory if request.len() < consumed => None,
            trailing => {
                if request.len() > consumed {
                    ranks.push(Rank::Prefix);
                }
                let pattern_has_slash = trailing != TrailingSlash::None;
                Some(PatternMatch {
                    params,
                    specificity: Specificity {
                        ranks,
                        slash_agrees: pattern_has_slash == path.has_trailing_slash(),
                        exact_end: trailing != TrailingSlash::Directory,
                    },
                })
            }
        }
    }

    /// Whether `path` lies at or below this pattern, used as a mount guard.
    ///
    /// The pattern is read as a directory regardless of its trailing-slash
    /// mode: every pattern segment must match the corresponding leading path
    /// segment and any deeper segments are allowed.
    #[must_use]
    pub fn covers(&self, path: &RequestPath<'_>) -> bool {
        let request = path.segments();
        self.segments()
            .iter()
            .enumerate()
            .all(|(i, segment)| match segment {
                Segment::Literal(literal) => request
                    .get(i)
                    .is_some_and(|value| decode_segment(value) == literal.as_str()),
                Segment::Wildcard(_) => request.get(i).is_some_and(|value| !value.is_empty()),
                Segment::Remainder(_) => request.len() > i,
            })
    }
}

/// Percent-decode one path segment; invalid UTF-8 is compared raw.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}
