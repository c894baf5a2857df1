//! Configuration for the local server, its link blocks, and topology rules.

use crate::policy::TopologyRule;
use crate::types::Pattern;
use crate::validated::*;

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config format error: {0}")]
    Format(#[from] json5::Error),
}

/// A configured link block for one remote server that may connect directly.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub name: ServerName,

    /// Crypt-format hash the peer's link password is verified against
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Hosts the peer is allowed to connect from
    #[serde(default)]
    pub host_mask: Option<Pattern>,

    #[serde(default)]
    pub require_tls: bool,

    /// Expected TLS certificate fingerprint, hex-encoded
    #[serde(default)]
    pub fingerprint: Option<String>,

    /// Treat this link as a trusted services link; server names it
    /// introduces are jupes on collision
    #[serde(default)]
    pub service: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub server_name: ServerName,
    pub server_id: ServerId,
    pub server_info: String,

    #[serde(default)]
    pub links: Vec<LinkConfig>,

    #[serde(default)]
    pub topology: Vec<TopologyRule>,

    /// Wire tokens of the capabilities every link must negotiate
    #[serde(default)]
    pub required_capabilities: Vec<String>,

    /// Notify operators when a connection claims a server name with no link
    /// block
    #[serde(default = "default_true")]
    pub warn_unknown_link: bool,
}

fn default_true() -> bool {
    true
}

impl NetworkConfig {
    /// Load configuration from a file
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(filename)?;
        Ok(json5::from_str(&config)?)
    }
}
