use super::*;
use std::str::FromStr;

fn rule(server: &str, target: &str, kind: RuleKind) -> TopologyRule {
    TopologyRule {
        server_mask: Pattern::new(server),
        target_mask: Pattern::new(target),
        kind,
    }
}

fn peer(name: &str) -> ServerName {
    ServerName::from_str(name).unwrap()
}

#[test]
fn no_rules_means_no_hub() {
    let policy = StandardTopologyPolicy::new(Vec::new());
    assert_eq!(
        policy.can_introduce(&peer("hub.example.net"), "leaf.example.net"),
        Err(TopologyDenial::NoHubMask {
            target: "leaf.example.net".to_string()
        })
    );
}

#[test]
fn hub_rule_allows_introduction() {
    let policy = StandardTopologyPolicy::new(vec![rule("*", "*", RuleKind::Hub)]);
    assert_eq!(
        policy.can_introduce(&peer("hub.example.net"), "leaf.example.net"),
        Ok(())
    );
}

#[test]
fn leaf_restriction_wins_over_hub() {
    let policy = StandardTopologyPolicy::new(vec![
        rule("*", "*.edu", RuleKind::Leaf),
        rule("*", "*", RuleKind::Hub),
    ]);

    assert_eq!(
        policy.can_introduce(&peer("hub.example.net"), "foo.edu"),
        Err(TopologyDenial::LeafMaskMatched {
            target: "foo.edu".to_string(),
            mask: Pattern::new("*.edu"),
        })
    );
    assert_eq!(policy.can_introduce(&peer("hub.example.net"), "foo.com"), Ok(()));
}

#[test]
fn all_rules_are_consulted() {
    // A hub rule appearing after a matching leaf rule still counts, so the
    // denial must report the leaf restriction rather than a missing hub mask.
    let policy = StandardTopologyPolicy::new(vec![
        rule("*", "*.edu", RuleKind::Leaf),
        rule("hub.*", "*", RuleKind::Hub),
    ]);

    assert!(matches!(
        policy.can_introduce(&peer("hub.example.net"), "foo.edu"),
        Err(TopologyDenial::LeafMaskMatched { .. })
    ));
}

#[test]
fn rules_only_apply_to_matching_peers() {
    let policy = StandardTopologyPolicy::new(vec![rule("hub.*", "*", RuleKind::Hub)]);

    assert_eq!(policy.can_introduce(&peer("hub.example.net"), "leaf.example.net"), Ok(()));
    assert!(matches!(
        policy.can_introduce(&peer("other.example.net"), "leaf.example.net"),
        Err(TopologyDenial::NoHubMask { .. })
    ));
}
