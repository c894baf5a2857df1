use crate::types::Pattern;

use thiserror::Error;

/// A topology-policy denial.
///
/// The `Display` form of each variant is the reason string used when the
/// offending link is terminated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopologyDenial {
    /// No hub rule authorises the peer to introduce anything matching the
    /// target name
    #[error("No matching hub_mask for {target}")]
    NoHubMask { target: String },

    /// A leaf rule bars the peer from introducing this target, even though
    /// some hub rule matched
    #[error("Matching leaf_mask for {target}")]
    LeafMaskMatched { target: String, mask: Pattern },
}
