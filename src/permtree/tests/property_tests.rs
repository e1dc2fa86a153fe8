//! Property tests for tree building and subsumption

use permtree::{PermTree, Pattern, Token, TokenConfig};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    let name = prop_oneof![
        6 => "[a-z]{1,6}",
        1 => Just("*".to_string()),
        1 => Just("~".to_string()),
    ];
    let constraints = prop::collection::btree_map("[a-z]{1,3}", "[a-z0-9=]{1,3}", 0..3);

    (name, constraints).prop_map(|(name, constraints)| {
        if constraints.is_empty() {
            name
        } else {
            let clause: Vec<String> = constraints
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            format!("{}@{}", name, clause.join(";"))
        }
    })
}

fn pattern() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..6).prop_map(|segments| segments.join("."))
}

proptest! {
    #[test]
    fn test_reflexivity(p in pattern()) {
        let parsed = Pattern::parse(&p).unwrap();
        let grant = PermTree::from_pattern(&parsed);
        let request = PermTree::from_pattern(&Pattern::parse(&p).unwrap());
        prop_assert!(grant.includes(&request));
    }

    #[test]
    fn test_monotonic_grant(grants in prop::collection::vec(pattern(), 1..5)) {
        let mut token = Token::with_config("prop", TokenConfig::minimal());
        for (idx, grant) in grants.iter().enumerate() {
            token.add_perm(grant).unwrap();
            for earlier in &grants[..=idx] {
                prop_assert!(token.has_perm(earlier), "{} lost after granting {}", earlier, grant);
            }
        }
    }

    #[test]
    fn test_idempotent_merge(grants in prop::collection::vec(pattern(), 1..5)) {
        let mut token = Token::with_config("prop", TokenConfig::minimal());
        token.add_perms(&grants).unwrap();
        let once = token.node_count();

        token.add_perms(&grants).unwrap();
        prop_assert_eq!(token.node_count(), once);
    }

    #[test]
    fn test_patterns_regrant_equivalent_tree(
        grants in prop::collection::vec(pattern(), 1..5),
        queries in prop::collection::vec(pattern(), 0..4),
    ) {
        let mut token = Token::with_config("prop", TokenConfig::minimal());
        token.add_perms(&grants).unwrap();

        let mut rebuilt = Token::with_config("rebuilt", TokenConfig::minimal());
        for pattern in token.patterns() {
            rebuilt.add_perm(&pattern.to_string()).unwrap();
        }
        prop_assert_eq!(rebuilt.node_count(), token.node_count());

        let restored: Token = serde_json::from_str(&serde_json::to_string(&token).unwrap()).unwrap();
        prop_assert_eq!(restored.node_count(), token.node_count());

        for query in grants.iter().chain(queries.iter()) {
            prop_assert_eq!(rebuilt.has_perm(query), token.has_perm(query), "query {}", query);
            prop_assert_eq!(restored.has_perm(query), token.has_perm(query), "query {}", query);
        }
    }

    #[test]
    fn test_canonical_display_reparses(p in pattern()) {
        let parsed = Pattern::parse(&p).unwrap();
        let reparsed = Pattern::parse(&parsed.to_string()).unwrap();
        prop_assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_cache_agrees_with_tree_walk(
        grants in prop::collection::vec(pattern(), 1..4),
        queries in prop::collection::vec(pattern(), 1..6),
    ) {
        let mut cached = Token::new("cached");
        let mut plain = Token::with_config("plain", TokenConfig::minimal());
        cached.add_perms(&grants).unwrap();
        plain.add_perms(&grants).unwrap();

        for query in queries.iter().chain(queries.iter()) {
            prop_assert_eq!(cached.has_perm(query), plain.has_perm(query));
        }
    }
}
