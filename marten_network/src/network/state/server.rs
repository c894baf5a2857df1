use crate::capability::ServerCapabilitySet;
use crate::validated::*;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Server flags
    #[derive(Serialize,Deserialize)]
    pub struct ServerFlags : u64
    {
        /// The server asked to be hidden from user-visible maps
        const HIDDEN = 0x01;
        /// The server is a trusted services link; names it introduces are
        /// treated as jupes on collision
        const SERVICE = 0x02;
    }
}

/// A server node in the spanning tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub name: ServerName,
    pub id: Option<ServerId>,
    /// The server that introduced this one; `None` only for the local node
    pub parent: Option<ServerName>,
    pub children: Vec<ServerName>,
    pub hop_count: u32,
    pub info: String,
    pub flags: ServerFlags,
    /// Capability set negotiated on the link this node was admitted over.
    /// Recorded for audit; never renegotiated.
    pub capabilities: ServerCapabilitySet,
    pub introduced_at: i64,
}

impl Server {
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ServerFlags::HIDDEN)
    }

    pub fn is_service(&self) -> bool {
        self.flags.contains(ServerFlags::SERVICE)
    }
}
