//! Thread-safe token handle
//!
//! A [`Token`] is not internally synchronized. [`SharedToken`] puts it behind a
//! single-writer/multiple-reader lock: grants take the write lock, checks take
//! the read lock, each for the duration of the call.

use crate::config::TokenConfig;
use crate::error::ParseError;
use crate::metrics::TokenMetrics;
use crate::pattern::Pattern;
use crate::token::{Token, TokenId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable, thread-safe handle to one [`Token`]
///
/// Clones share the same underlying token.
#[derive(Debug, Clone)]
pub struct SharedToken {
    inner: Arc<RwLock<Token>>,
}

impl SharedToken {
    /// Create a shared token with the default configuration
    pub fn new(id: impl Into<TokenId>) -> Self {
        Self::from_token(Token::new(id))
    }

    /// Create a shared token with the given configuration
    pub fn with_config(id: impl Into<TokenId>, config: TokenConfig) -> Self {
        Self::from_token(Token::with_config(id, config))
    }

    /// Wrap an existing token
    pub fn from_token(token: Token) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token)),
        }
    }

    /// Token identifier
    pub fn id(&self) -> TokenId {
        self.inner.read().id().clone()
    }

    /// Grant a permission pattern under the write lock
    pub fn add_perm(&self, pattern: &str) -> Result<(), ParseError> {
        self.inner.write().add_perm(pattern)
    }

    /// Check a permission pattern under the read lock
    pub fn has_perm(&self, pattern: &str) -> bool {
        self.inner.read().has_perm(pattern)
    }

    /// Granted paths as canonical patterns
    pub fn patterns(&self) -> Vec<Pattern> {
        self.inner.read().patterns()
    }

    /// Counter snapshot
    pub fn metrics(&self) -> Option<TokenMetrics> {
        self.inner.read().metrics()
    }

    /// Run `f` with shared access to the token
    pub fn read<R>(&self, f: impl FnOnce(&Token) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the token
    pub fn write<R>(&self, f: impl FnOnce(&mut Token) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<Token> for SharedToken {
    fn from(token: Token) -> Self {
        Self::from_token(token)
    }
}
