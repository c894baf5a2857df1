//! Topology policy: which directly-connected peers may introduce which
//! servers behind them.

use crate::types::Pattern;
use crate::validated::ServerName;

use serde::{Deserialize, Serialize};

mod error;
pub use error::*;

mod standard_topology_policy;
pub use standard_topology_policy::*;

#[cfg(test)]
mod test;

/// Whether a rule authorises hubbing or restricts to leaf status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Hub,
    Leaf,
}

/// One configured (peer mask, target mask, kind) rule.
///
/// Rules are configuration-supplied and read-only during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyRule {
    pub server_mask: Pattern,
    pub target_mask: Pattern,
    pub kind: RuleKind,
}

/// Convenience definition of the `Result` type for topology checks.
pub type TopologyResult = Result<(), TopologyDenial>;

/// A `TopologyPolicyService` decides whether a directly-connected peer is
/// authorised to introduce a given server behind it.
pub trait TopologyPolicyService {
    fn can_introduce(&self, peer: &ServerName, target: &str) -> TopologyResult;
}
