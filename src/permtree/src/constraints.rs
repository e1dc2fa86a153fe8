//! Attribute constraint sets attached to path segments
//!
//! A constraint set maps attribute keys to values (`env=prod`). Two comparison
//! contracts exist and must not be mixed up:
//!
//! - [`Constraints::matches_exact`]: same keys, same values. Used when building
//!   trees to decide whether an existing node can be reused.
//! - [`Constraints::satisfies`]: every key the caller requires is present with
//!   an equal value. Extra keys on `self` are ignored. Used during subsumption.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separator between constraint entries in a segment
pub const CONSTRAINT_SEPARATOR: char = ';';

/// Separator between a constraint key and its value
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Set of key/value attribute constraints
///
/// Backed by an ordered map so that rendering is deterministic; ordering has no
/// meaning for comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints(BTreeMap<String, String>);

impl Constraints {
    /// Create an empty constraint set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a constraint, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up the value constrained for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of constraints
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate constraints in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Exact equality: same cardinality and every key maps to an equal value
    pub fn matches_exact(&self, other: &Constraints) -> bool {
        self.0.len() == other.0.len()
            && other.iter().all(|(k, v)| self.get(k) == Some(v))
    }

    /// Asymmetric match: every constraint in `required` holds on `self`
    pub fn satisfies(&self, required: &Constraints) -> bool {
        required.iter().all(|(k, v)| self.get(k) == Some(v))
    }

    /// Add keys from `other` that are not yet present; existing keys are kept
    ///
    /// Returns the number of keys added.
    pub fn extend_missing(&mut self, other: &Constraints) -> usize {
        let mut added = 0;
        for (k, v) in other.iter() {
            if !self.0.contains_key(k) {
                self.0.insert(k.to_string(), v.to_string());
                added += 1;
            }
        }
        added
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Constraints {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (k, v)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, "{}", CONSTRAINT_SEPARATOR)?;
            }
            write!(f, "{}{}{}", k, KEY_VALUE_SEPARATOR, v)?;
        }
        Ok(())
    }
}
