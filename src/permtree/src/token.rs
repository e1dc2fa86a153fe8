//! Permission holder
//!
//! A [`Token`] owns one [`PermTree`] holding the union of every pattern ever
//! granted to it. Grants only add to the tree; checks never modify it.
//!
//! # Examples
//!
//! ```
//! use permtree::Token;
//!
//! let mut token = Token::new("ce93fe81-5cf5-4819-b898-5f28c640bedd");
//! token.add_perm("hello.world@env=prod").unwrap();
//!
//! assert!(token.has_perm("hello.world"));
//! assert!(token.has_perm("hello.world@env=prod"));
//! assert!(!token.has_perm("hello.world@env=dev"));
//! ```

use crate::cache::DecisionCache;
use crate::config::TokenConfig;
use crate::error::ParseError;
use crate::metrics::{MetricsCollector, TokenMetrics};
use crate::pattern::Pattern;
use crate::tree::PermTree;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stable token identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Create an identifier from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random UUID v4 identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TokenId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Holder of a cumulative set of granted permission patterns
#[derive(Debug)]
pub struct Token {
    id: TokenId,
    tree: PermTree,
    config: TokenConfig,
    cache: Option<DecisionCache>,
    metrics: Option<MetricsCollector>,
}

impl Token {
    /// Create a token with an empty grant tree and the default configuration
    pub fn new(id: impl Into<TokenId>) -> Self {
        Self::with_config(id, TokenConfig::default())
    }

    /// Create a token with a random UUID identifier
    pub fn generate() -> Self {
        Self::new(TokenId::generate())
    }

    /// Create a token with an empty grant tree and the given configuration
    pub fn with_config(id: impl Into<TokenId>, config: TokenConfig) -> Self {
        let id = id.into();
        let cache = config
            .enable_cache
            .then(|| DecisionCache::new(config.cache_capacity));
        let metrics = config.enable_metrics.then(MetricsCollector::new);

        info!(
            token = %id,
            cache = config.enable_cache,
            metrics = config.enable_metrics,
            "Token created"
        );

        Self {
            id,
            tree: PermTree::new(),
            config,
            cache,
            metrics,
        }
    }

    /// Token identifier
    pub fn id(&self) -> &TokenId {
        &self.id
    }

    /// Token configuration
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// The cumulative grant tree
    pub fn tree(&self) -> &PermTree {
        &self.tree
    }

    /// Number of nodes in the grant tree, root included
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// One canonical pattern per granted root-to-leaf path
    pub fn patterns(&self) -> Vec<Pattern> {
        self.tree.patterns()
    }

    /// Counter snapshot, `None` when metrics are disabled
    pub fn metrics(&self) -> Option<TokenMetrics> {
        self.metrics.as_ref().map(MetricsCollector::snapshot)
    }

    /// Grant a permission pattern
    ///
    /// The pattern is parsed into a standalone tree and merged into the grant
    /// tree. Granting the same pattern twice leaves the tree unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if a constraint entry has no `=`; the grant tree
    /// is left untouched in that case.
    pub fn add_perm(&mut self, pattern: &str) -> Result<(), ParseError> {
        let parsed = match Pattern::parse(pattern) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(token = %self.id, pattern, error = %e, "Rejected grant");
                if let Some(metrics) = &self.metrics {
                    metrics.record_grant(false);
                }
                return Err(e);
            }
        };

        let before = self.tree.len();
        self.tree.merge_tree(&PermTree::from_pattern(&parsed));

        if let Some(cache) = &self.cache {
            cache.clear();
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_grant(true);
        }

        debug!(
            token = %self.id,
            pattern,
            added = self.tree.len() - before,
            nodes = self.tree.len(),
            "Granted permission"
        );
        Ok(())
    }

    /// Grant several patterns in order, stopping at the first parse error
    ///
    /// Patterns granted before the failing one stay granted.
    pub fn add_perms<I, S>(&mut self, patterns: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.add_perm(pattern.as_ref())?;
        }
        Ok(())
    }

    /// Check whether the grant tree authorizes `pattern`
    ///
    /// Malformed queries are denied, never reported as errors.
    pub fn has_perm(&self, pattern: &str) -> bool {
        if let Some(allowed) = self.cached(pattern) {
            return allowed;
        }

        let parsed = match Pattern::parse(pattern) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(token = %self.id, pattern, error = %e, "Malformed query denied");
                if let Some(metrics) = &self.metrics {
                    metrics.record_malformed_query();
                }
                return false;
            }
        };

        let allowed = self.tree.includes(&PermTree::from_pattern(&parsed));

        if let Some(cache) = &self.cache {
            cache.put(pattern, allowed);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_decision(allowed);
        }

        debug!(token = %self.id, pattern, allowed, "Checked permission");
        allowed
    }

    fn cached(&self, pattern: &str) -> Option<bool> {
        let cache = self.cache.as_ref()?;
        let hit = cache.get(pattern);

        if let Some(metrics) = &self.metrics {
            match hit {
                Some(allowed) => {
                    metrics.record_cache_hit();
                    metrics.record_decision(allowed);
                }
                None => metrics.record_cache_miss(),
            }
        }

        if let Some(allowed) = hit {
            debug!(token = %self.id, pattern, allowed, "Cache hit");
        }
        hit
    }
}

/// Serialized shape of a token: its id, configuration and granted paths
#[derive(Serialize, Deserialize)]
struct TokenSnapshot {
    id: TokenId,
    #[serde(default)]
    grants: Vec<String>,
    #[serde(default)]
    config: TokenConfig,
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TokenSnapshot {
            id: self.id.clone(),
            grants: self.patterns().iter().map(ToString::to_string).collect(),
            config: self.config.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = TokenSnapshot::deserialize(deserializer)?;
        let mut token = Token::with_config(snapshot.id, snapshot.config);
        token
            .add_perms(&snapshot.grants)
            .map_err(serde::de::Error::custom)?;
        Ok(token)
    }
}
