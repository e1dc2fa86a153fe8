//! # Permission Tree
//!
//! Hierarchical, wildcard- and attribute-constrained permission matching.
//!
//! Grants and checks are both dot-separated path patterns with optional
//! per-segment `key=value` constraints, e.g. `hello.world@env=prod`. A check
//! succeeds when the token's grant tree subsumes the requested pattern.
//!
//! ## Features
//!
//! - **Liberal pattern parser**: empty segments and empty attributes are
//!   dropped, only a constraint without `=` is an error
//! - **Arena-backed trees** with deduplicated, monotonically growing nodes
//! - **Subsumption engine** honoring `*` wildcards and asymmetric constraints
//! - **Fail-closed checks**: a malformed query is never granted
//! - **LRU decision cache** and lock-free metrics per token
//! - **Thread-safe handle** with single-writer/multiple-reader locking
//!
//! ## Example
//!
//! ```rust
//! use permtree::Token;
//!
//! let mut token = Token::generate();
//! token.add_perm("hello.sekai")?;
//! token.add_perm("hello.world@abc=123")?;
//! token.add_perm("hello.world@xyz=987.hey")?;
//!
//! assert!(token.has_perm("hello.world@xyz=987.hey"));
//! assert!(!token.has_perm("hello.world@abc=123.hey"));
//! assert!(!token.has_perm("*"));
//! # Ok::<(), permtree::ParseError>(())
//! ```

pub mod cache;
pub mod config;
pub mod constraints;
pub mod error;
pub mod metrics;
pub mod pattern;
pub mod shared;
pub mod token;
pub mod tree;

// Re-export commonly used types
pub use config::TokenConfig;
pub use constraints::Constraints;
pub use error::{ParseError, TreeError};
pub use metrics::TokenMetrics;
pub use pattern::{Pattern, Segment, ROOT, WILDCARD};
pub use shared::SharedToken;
pub use token::{Token, TokenId};
pub use tree::{Node, NodeId, PermTree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
