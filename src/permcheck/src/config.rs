//! Grant file loading

use anyhow::{Context, Result};
use permtree::{Token, TokenConfig, TokenId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Complete checker configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckerConfig {
    #[serde(default)]
    pub token: TokenSection,

    /// Patterns granted to the token, in order
    #[serde(default)]
    pub grants: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenSection {
    /// Token id; a random UUID is used when absent
    pub id: Option<String>,

    #[serde(flatten)]
    pub settings: TokenConfig,
}

impl CheckerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CheckerConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), grants = config.grants.len(), "Loaded config");
        Ok(config)
    }

    /// Build the token described by this configuration plus `extra` grants
    ///
    /// Any grant that fails to parse aborts with the offending pattern named.
    pub fn build_token(&self, extra: &[String]) -> Result<Token> {
        let id = self
            .token
            .id
            .clone()
            .map(TokenId::from)
            .unwrap_or_else(TokenId::generate);
        let mut token = Token::with_config(id, self.token.settings.clone());

        for pattern in self.grants.iter().chain(extra) {
            must_grant(&mut token, pattern)?;
        }
        Ok(token)
    }
}

/// Grant `pattern` or fail with context
pub fn must_grant(token: &mut Token, pattern: &str) -> Result<()> {
    token
        .add_perm(pattern)
        .with_context(|| format!("Invalid grant pattern: '{}'", pattern))
}
