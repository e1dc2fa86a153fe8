//! Permission pattern parsing
//!
//! Grammar:
//!
//! ```text
//! pattern    := ["~."] segment ("." segment)*
//! segment    := name ["@" constraint (";" constraint)*]
//! constraint := key "=" value
//! ```
//!
//! Parsing is deliberately liberal: empty segments (`a..b`, leading or trailing
//! dots) are skipped and constraints with an empty key or value are dropped.
//! The only hard failure is a constraint entry with no `=`.
//!
//! # Examples
//!
//! ```
//! use permtree::Pattern;
//!
//! let pattern: Pattern = "~.hello.world@env=prod;region=eu".parse().unwrap();
//! assert_eq!(pattern.len(), 2);
//! assert_eq!(pattern.segments()[1].constraints.get("env"), Some("prod"));
//! assert_eq!(pattern.to_string(), "hello.world@env=prod;region=eu");
//! ```

use crate::constraints::{Constraints, CONSTRAINT_SEPARATOR, KEY_VALUE_SEPARATOR};
use crate::error::ParseError;
use std::fmt;
use std::str::FromStr;

/// Value of the implicit root segment
pub const ROOT: &str = "~";

/// Reserved wildcard segment value
pub const WILDCARD: &str = "*";

/// Optional prefix naming the root explicitly
pub const ROOT_PREFIX: &str = "~.";

/// Separator between path segments
pub const SEGMENT_SEPARATOR: char = '.';

/// Marker introducing a segment's constraint clause
pub const CONSTRAINT_MARKER: char = '@';

/// One path component with its attribute constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment name, or `*` for the wildcard
    pub value: String,
    /// Attribute constraints narrowing the segment
    pub constraints: Constraints,
}

impl Segment {
    /// Create a segment without constraints
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            constraints: Constraints::new(),
        }
    }

    /// Attach a constraint
    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.insert(key, value);
        self
    }

    /// Whether this segment is the wildcard
    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if !self.constraints.is_empty() {
            write!(f, "{}{}", CONSTRAINT_MARKER, self.constraints)?;
        }
        Ok(())
    }
}

/// A parsed permission pattern: segments in root-to-leaf order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a pattern string
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let body = s.strip_prefix(ROOT_PREFIX).unwrap_or(s);
        let mut segments = Vec::new();

        for (position, raw) in body.split(SEGMENT_SEPARATOR).enumerate() {
            if raw.is_empty() {
                continue;
            }

            let (name, clause) = match raw.split_once(CONSTRAINT_MARKER) {
                Some((name, clause)) => (name, Some(clause)),
                None => (raw, None),
            };

            let constraints = match clause {
                Some(clause) => parse_constraints(raw, position, clause)?,
                None => Constraints::new(),
            };

            if name.is_empty() {
                continue;
            }

            segments.push(Segment {
                value: name.to_string(),
                constraints,
            });
        }

        Ok(Self { segments })
    }

    /// Build a pattern from already-parsed segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Segments in root-to-leaf order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the pattern names no segment at all (e.g. `""` or `"~."`)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment is a wildcard
    pub fn has_wildcards(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }
}

fn parse_constraints(raw: &str, position: usize, clause: &str) -> Result<Constraints, ParseError> {
    let mut constraints = Constraints::new();

    for entry in clause.split(CONSTRAINT_SEPARATOR) {
        let (key, value) = entry
            .split_once(KEY_VALUE_SEPARATOR)
            .ok_or_else(|| ParseError::MissingSeparator {
                segment: raw.to_string(),
                position,
                constraint: entry.to_string(),
            })?;

        if key.is_empty() || value.is_empty() {
            continue;
        }

        constraints.insert(key, value);
    }

    Ok(constraints)
}

impl FromStr for Pattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A leading `~` segment must not be read back as the root prefix
        if self.segments.first().is_some_and(|s| s.value == ROOT) {
            write!(f, "{}", ROOT_PREFIX)?;
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, "{}", SEGMENT_SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
