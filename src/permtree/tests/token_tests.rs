//! Grant/check behavior of tokens
//!
//! Covers wildcard absorption, constraint handling, depth asymmetry and the
//! fail-closed treatment of malformed queries.

use permtree::{ParseError, PermTree, Pattern, Token, TokenConfig};

const UUID: &str = "ce93fe81-5cf5-4819-b898-5f28c640bedd";

fn token_with(grants: &[&str]) -> Token {
    let mut token = Token::new(UUID);
    for grant in grants {
        token.add_perm(grant).unwrap();
    }
    token
}

// ============================================================================
// Basic Grant/Check
// ============================================================================

#[test]
fn test_token_init() {
    let token = Token::new(UUID);
    assert_eq!(token.id().as_str(), UUID);
    assert!(token.tree().is_empty());
    assert_eq!(token.tree().node(token.tree().root()).value(), "~");
}

#[test]
fn test_add_perms() {
    let mut token = Token::new(UUID);
    token.add_perm("hello.world").unwrap();
    token.add_perm("hello.world@x=y").unwrap();

    // ~, hello, world, world@x=y
    assert_eq!(token.node_count(), 4);
}

#[test]
fn test_grant_then_check() {
    for pattern in ["a", "a.b.c", "~.a.b", "a@k=v.b@x=1;y=2", "a.*", "*"] {
        let token = token_with(&[pattern]);
        assert!(token.has_perm(pattern), "granted pattern {} must be allowed", pattern);
    }
}

#[test]
fn test_empty_token_denies_everything_named() {
    let token = Token::new(UUID);
    assert!(!token.has_perm("a"));
    assert!(!token.has_perm("*"));
    assert!(!token.has_perm("a.b@k=v"));
}

#[test]
fn test_empty_query_names_nothing() {
    // A query with no segments asks for nothing beyond the root
    let token = Token::new(UUID);
    assert!(token.has_perm(""));
    assert!(token.has_perm("~."));
}

// ============================================================================
// Idempotency
// ============================================================================

#[test]
fn test_repeated_grant_is_idempotent() {
    let mut token = token_with(&["a.b@k=v.c"]);
    let count = token.node_count();

    token.add_perm("a.b@k=v.c").unwrap();
    token.add_perm("~.a.b@k=v.c").unwrap();
    token.add_perm("a..b@k=v.c.").unwrap();

    assert_eq!(token.node_count(), count);
}

#[test]
fn test_overlapping_grants_share_prefix() {
    let token = token_with(&["a.b.c", "a.b.d", "a.e"]);
    // ~, a, b, c, d, e
    assert_eq!(token.node_count(), 6);
}

// ============================================================================
// Wildcards
// ============================================================================

#[test]
fn test_root_wildcard_grants_everything() {
    let token = token_with(&["*"]);
    assert!(token.has_perm("anything"));
    assert!(token.has_perm("a.b.c.d"));
    assert!(token.has_perm("a@k=v.b@x=y"));
    assert!(token.has_perm("*"));
}

#[test]
fn test_nested_wildcard() {
    let token = token_with(&["a.*"]);
    assert!(token.has_perm("a.b.c"));
    assert!(token.has_perm("a.b"));
    assert!(token.has_perm("a"));
    assert!(!token.has_perm("b"));
}

#[test]
fn test_wildcard_in_middle() {
    let token = token_with(&["a.*.c"]);
    assert!(token.has_perm("a.b.c"));
    assert!(token.has_perm("a.x.y.z"));
    assert!(!token.has_perm("b.x.c"));
}

#[test]
fn test_wildcard_grants_collapse() {
    let token = token_with(&["a.*", "a.*.b", "a.*@k=v"]);
    let tree = token.tree();
    let a = tree.get_child(tree.root(), "a").unwrap();

    assert_eq!(tree.children(a).len(), 1);
    assert!(tree.has_wildcard_child(a));
}

#[test]
fn test_wildcard_fallback_after_specific_child() {
    let token = token_with(&["a.b@k=v", "a.*"]);
    assert!(token.has_perm("a.b@k=v.c"));
    assert!(token.has_perm("a.b@k=other.c"));
}

// ============================================================================
// Constraints
// ============================================================================

#[test]
fn test_constraint_exactness() {
    let token = token_with(&["a@k=v"]);
    assert!(token.has_perm("a@k=v"));
    assert!(!token.has_perm("a@k=v2"));
    assert!(token.has_perm("a"));
    assert!(!token.has_perm("a@k=v;k2=v2"));
}

#[test]
fn test_multi_constraint_grant_satisfies_subsets() {
    let token = token_with(&["hello.monde@among=us;us=among"]);
    assert!(token.has_perm("hello.monde"));
    assert!(token.has_perm("hello.monde@among=us"));
    assert!(token.has_perm("hello.monde@us=among;among=us"));
    assert!(!token.has_perm("hello.monde@among=them"));
    assert!(!token.has_perm("hello.monde.imposter"));
}

#[test]
fn test_empty_constraint_parts_are_ignored() {
    let token = token_with(&["a@k=v;=x;y="]);
    assert!(token.has_perm("a@k=v"));
    assert!(!token.has_perm("a@y=z"));
}

// ============================================================================
// Depth Asymmetry
// ============================================================================

#[test]
fn test_shorter_request_within_longer_grant() {
    let token = token_with(&["a.b"]);
    assert!(token.has_perm("a"));
    assert!(!token.has_perm("a.b.c"));
}

#[test]
fn test_long_path_prefix() {
    let token = token_with(&["hello.world.I.am.a.tree.that.is.very.special"]);
    assert!(token.has_perm("hello.world.I.am.a.tree"));

    let token = token_with(&["hello.world.I.am.a.tree"]);
    assert!(!token.has_perm("hello.world.I.am.a.tree.that.is.very.special"));
}

// ============================================================================
// Combined Scenario
// ============================================================================

#[test]
fn test_has_perm() {
    let token = token_with(&[
        "hello.sekai",
        "hello.world@abc=123",
        "hello.world@xyz=987.hey",
        "hello.monde@among=us;us=among",
    ]);

    assert!(!token.has_perm("*"));
    assert!(token.has_perm("hello.sekai"));
    assert!(token.has_perm("hello.world"));
    assert!(!token.has_perm("hello.world@123=abc"));
    assert!(token.has_perm("hello.world@abc=123"));
    assert!(token.has_perm("hello.world@xyz=987"));
    assert!(token.has_perm("hello.world@xyz=987.hey"));
    assert!(!token.has_perm("hello.world@abc=123.hey"));
    assert!(!token.has_perm("hello.monde.imposter"));
}

#[test]
fn test_unconstrained_request_finds_any_matching_branch() {
    let token = token_with(&["hello.world@abc=123", "hello.world@xyz=987.hey"]);
    assert!(token.has_perm("hello.world.hey"));
}

// ============================================================================
// Parse Failures
// ============================================================================

#[test]
fn test_parse_failure() {
    let mut token = Token::new(UUID);
    let err = token.add_perm("a@bad").unwrap_err();
    assert!(matches!(err, ParseError::MissingSeparator { position: 0, .. }));
    assert!(!token.has_perm("a@bad"));
}

#[test]
fn test_malformed_query_never_granted() {
    let token = token_with(&["*"]);
    assert!(!token.has_perm("a@bad"));
    assert!(!token.has_perm("a.b@k=v;oops"));
}

#[test]
fn test_parse_error_message_names_segment() {
    let err = Pattern::parse("x.y@k").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("y@k"));
    assert!(message.contains('1'));
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_patterns_rebuild_equivalent_token() {
    let token = token_with(&[
        "hello.sekai",
        "hello.world@abc=123",
        "hello.world@xyz=987.hey",
        "a.*",
    ]);

    let mut rebuilt = Token::with_config("rebuilt", TokenConfig::minimal());
    for pattern in token.patterns() {
        rebuilt.add_perm(&pattern.to_string()).unwrap();
    }

    assert_eq!(rebuilt.node_count(), token.node_count());
    for query in ["hello.world@abc=123", "hello.world@abc=123.hey", "a.b.c", "*"] {
        assert_eq!(rebuilt.has_perm(query), token.has_perm(query), "query {}", query);
    }
}

#[test]
fn test_tree_display() {
    let token = token_with(&["hello.world@abc=123", "hello.sekai"]);
    let rendered = token.tree().to_string();
    assert_eq!(rendered, "~\n  hello\n    world@abc=123\n    sekai\n");
}

#[test]
fn test_includes_on_standalone_trees() {
    let grant = PermTree::from_pattern(&"a.b@k=v".parse().unwrap());
    let request = PermTree::from_pattern(&"a.b".parse().unwrap());

    assert!(grant.includes(&request));
    assert!(!request.includes(&grant));
}
