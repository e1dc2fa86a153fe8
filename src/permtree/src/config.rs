//! Token configuration

use serde::{Deserialize, Serialize};

/// Default number of cached check decisions per token
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Per-token configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Memoize `has_perm` decisions until the next grant
    pub enable_cache: bool,

    /// Maximum number of cached decisions
    pub cache_capacity: usize,

    /// Collect grant/check counters
    pub enable_metrics: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            enable_metrics: true,
        }
    }
}

impl TokenConfig {
    /// Configuration with cache and metrics turned off
    pub fn minimal() -> Self {
        Self {
            enable_cache: false,
            cache_capacity: 0,
            enable_metrics: false,
        }
    }
}
