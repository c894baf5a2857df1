use super::*;

/// Standard implementation of [`TopologyPolicyService`] over a configured
/// rule set.
pub struct StandardTopologyPolicy {
    rules: Vec<TopologyRule>,
}

impl StandardTopologyPolicy {
    pub fn new(rules: Vec<TopologyRule>) -> Self {
        Self { rules }
    }
}

impl TopologyPolicyService for StandardTopologyPolicy {
    fn can_introduce(&self, peer: &ServerName, target: &str) -> TopologyResult {
        let mut hub_count = 0;
        let mut leaf_count = 0;
        let mut leaf_mask = None;

        // Every rule is consulted before deciding; rules aren't mutually
        // exclusive and a later rule can add to either counter.
        for rule in &self.rules {
            if rule.server_mask.matches(peer.value()) && rule.target_mask.matches(target) {
                match rule.kind {
                    RuleKind::Hub => hub_count += 1,
                    RuleKind::Leaf => {
                        leaf_count += 1;
                        leaf_mask = Some(rule.target_mask.clone());
                    }
                }
            }
        }

        if hub_count == 0 {
            return Err(TopologyDenial::NoHubMask {
                target: target.to_string(),
            });
        }

        if let (1.., Some(mask)) = (leaf_count, leaf_mask) {
            return Err(TopologyDenial::LeafMaskMatched {
                target: target.to_string(),
                mask,
            });
        }

        Ok(())
    }
}
