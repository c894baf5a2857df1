//! Connection-level state for server-to-server links.

use crate::messages::{MessageSink, OutboundMessage};
use marten_network::prelude::*;

use std::fmt;

/// Identifies one server-to-server connection for the lifetime of the
/// engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u64);

impl LinkId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a connection is in the admission state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Connected, but not yet proven to be the server it claims
    Handshake,
    /// Admitted under the given name
    Established { name: ServerName },
}

/// Transport and negotiation attributes for a connection entering the
/// handshake, supplied by the connection-setup layer.
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    /// Name the connection was pre-associated with, if any (always set for
    /// outbound connections)
    pub expected_name: Option<ServerName>,
    /// Server ID announced during capability negotiation
    pub claimed_id: Option<ServerId>,
    pub capabilities: ServerCapabilitySet,
    /// Whether the peer advertised the baseline timestamp protocol
    pub ts_protocol: bool,
    /// Link password presented before the handshake
    pub password: Option<String>,
    pub tls: bool,
    /// TLS certificate fingerprint, hex-encoded
    pub fingerprint: Option<String>,
    pub remote_address: String,
}

/// One server-to-server connection tracked by the engine.
pub struct LinkSession {
    pub id: LinkId,
    pub state: LinkState,
    pub expected_name: Option<ServerName>,
    pub claimed_id: Option<ServerId>,
    pub capabilities: ServerCapabilitySet,
    pub ts_protocol: bool,
    pub password: Option<String>,
    pub tls: bool,
    pub fingerprint: Option<String>,
    pub remote_address: String,

    sink: Box<dyn MessageSink + Send>,
}

impl LinkSession {
    pub(crate) fn new(id: LinkId, attrs: NewLink, sink: Box<dyn MessageSink + Send>) -> Self {
        Self {
            id,
            state: LinkState::Handshake,
            expected_name: attrs.expected_name,
            claimed_id: attrs.claimed_id,
            capabilities: attrs.capabilities,
            ts_protocol: attrs.ts_protocol,
            password: attrs.password,
            tls: attrs.tls,
            fingerprint: attrs.fingerprint,
            remote_address: attrs.remote_address,
            sink,
        }
    }

    pub fn send(&self, msg: impl Into<OutboundMessage>) {
        self.sink.send(msg.into());
    }

    pub(crate) fn close(&self) {
        self.sink.close();
    }

    pub fn established_name(&self) -> Option<&ServerName> {
        match &self.state {
            LinkState::Established { name } => Some(name),
            LinkState::Handshake => None,
        }
    }

    /// `name[address]` form used in log lines and operator notices
    pub fn describe(&self) -> String {
        let name = self
            .established_name()
            .copied()
            .or(self.expected_name)
            .map(|n| n.value().to_string())
            .unwrap_or_default();
        format!("{}[{}]", name, self.remote_address)
    }
}
