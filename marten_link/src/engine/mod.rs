//! The link admission engine: decides whether connections claiming to be
//! servers may join the network tree, and propagates accepted
//! introductions.

mod handshake;
mod introduction;
mod propagation;


use crate::auth::{ConnectAuthService, StandardConnectAuth};
use crate::link::*;
use crate::messages::{message, MessageSink};
use crate::update::{LinkUpdate, LinkUpdateReceiver};
use marten_network::prelude::*;

use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedReceiver;

/// A message handed to the engine by the per-connection reader tasks.
///
/// Wire lines are tokenised by the transport layer; the engine only sees
/// the command, its parameters, and the already-split source token.
#[derive(Debug, Clone)]
pub enum LinkMessage {
    Command {
        from: LinkId,
        source: Option<String>,
        command: String,
        params: Vec<String>,
    },
    /// The transport lost the connection
    Disconnected { from: LinkId },
}

/// Sequences every admission decision for the local server.
///
/// The engine owns the registry and the session table outright, and
/// processes one message to completion before looking at the next, from
/// any connection. Mutual exclusion between admissions is structural: the
/// engine runs on one task and nothing else can reach its state.
pub struct LinkEngine<Auth = StandardConnectAuth, Topology = StandardTopologyPolicy>
where
    Auth: ConnectAuthService,
    Topology: TopologyPolicyService,
{
    net: Network,
    required_capabilities: ServerCapabilitySet,
    warn_unknown_link: bool,
    auth: Auth,
    topology: Topology,
    links: HashMap<LinkId, LinkSession>,
    next_link_id: u64,
    updates: Box<dyn LinkUpdateReceiver + Send>,
}

impl LinkEngine {
    /// Construct an engine using the standard auth and topology services
    /// built from the configuration.
    pub fn new(
        config: &NetworkConfig,
        updates: Box<dyn LinkUpdateReceiver + Send>,
    ) -> Result<Self, UnknownCapability> {
        Self::with_services(
            config,
            StandardConnectAuth::new(config.links.clone()),
            StandardTopologyPolicy::new(config.topology.clone()),
            updates,
        )
    }
}

impl<Auth, Topology> LinkEngine<Auth, Topology>
where
    Auth: ConnectAuthService,
    Topology: TopologyPolicyService,
{
    pub fn with_services(
        config: &NetworkConfig,
        auth: Auth,
        topology: Topology,
        updates: Box<dyn LinkUpdateReceiver + Send>,
    ) -> Result<Self, UnknownCapability> {
        let required_capabilities = ServerCapabilitySet::from_names(
            config.required_capabilities.iter().map(String::as_str),
        )?;

        Ok(Self {
            net: Network::new(config),
            required_capabilities,
            warn_unknown_link: config.warn_unknown_link,
            auth,
            topology,
            links: HashMap::new(),
            next_link_id: 1,
            updates,
        })
    }

    pub fn network(&self) -> &Network {
        &self.net
    }

    /// Attach a connection that has completed transport setup and is about
    /// to attempt the handshake.
    pub fn attach_link(&mut self, attrs: NewLink, sink: Box<dyn MessageSink + Send>) -> LinkId {
        let id = LinkId::new(self.next_link_id);
        self.next_link_id += 1;
        tracing::debug!(link = %id, address = %attrs.remote_address, "Attaching server connection");
        self.links.insert(id, LinkSession::new(id, attrs, sink));
        id
    }

    /// Remove a server, and everything behind it, from the registry on
    /// behalf of the link-teardown layer.
    pub fn remove_server(&mut self, name: &str) -> LookupResult<Vec<state::Server>> {
        self.net.remove_server(name)
    }

    /// Drain messages until the channel closes, then hand the engine back
    /// for state inspection or shutdown handling.
    pub async fn run(mut self, mut receiver: UnboundedReceiver<LinkMessage>) -> Self {
        while let Some(message) = receiver.recv().await {
            self.handle_message(message);
        }
        self
    }

    /// Process a single message to completion.
    pub fn handle_message(&mut self, message: LinkMessage) {
        match message {
            LinkMessage::Command {
                from,
                source,
                command,
                params,
            } => self.handle_command(from, source, command, params),
            LinkMessage::Disconnected { from } => self.handle_disconnect(from),
        }
    }

    fn handle_command(
        &mut self,
        from: LinkId,
        source: Option<String>,
        command: String,
        params: Vec<String>,
    ) {
        let Some(session) = self.links.get(&from) else {
            tracing::debug!(link = %from, "Dropping command from detached connection");
            return;
        };
        let state = session.state.clone();

        match (command.to_ascii_uppercase().as_str(), state) {
            ("SERVER", LinkState::Handshake) => {
                if params.len() < 3 {
                    tracing::warn!(link = %from, "SERVER with too few parameters");
                    return;
                }
                let hop = params[1].parse().unwrap_or(0);
                self.handle_server_handshake(from, &params[0], hop, &params[2]);
            }
            ("SERVER", LinkState::Established { name: peer }) => {
                if params.len() < 3 {
                    tracing::warn!(link = %from, "SERVER with too few parameters");
                    return;
                }
                let hop = params[1].parse().unwrap_or(0);
                self.handle_server_introduction(from, peer, source, &params[0], hop, &params[2]);
            }
            ("SID", LinkState::Established { name: peer }) => {
                if params.len() < 4 {
                    tracing::warn!(link = %from, "SID with too few parameters");
                    return;
                }
                let hop = params[1].parse().unwrap_or(0);
                self.handle_sid_introduction(
                    from, peer, source, &params[0], hop, &params[2], &params[3],
                );
            }
            ("SID", LinkState::Handshake) => {
                tracing::debug!(link = %from, "Ignoring SID from unregistered connection");
            }
            (other, _) => {
                tracing::debug!(link = %from, command = other, "Unhandled link command");
            }
        }
    }

    fn handle_disconnect(&mut self, from: LinkId) {
        if let Some(session) = self.links.remove(&from) {
            tracing::info!(link = %session.describe(), "Server connection closed");
        }
    }

    /// Terminate a connection. The session is dropped from the table, the
    /// transport is told to close, and listeners are told why.
    fn exit_link(&mut self, id: LinkId, reason: &str) {
        if let Some(session) = self.links.remove(&id) {
            tracing::info!(link = %session.describe(), reason, "Closing server link");
            session.close();
            self.updates.notify_link_update(LinkUpdate::LinkRejected {
                link: id,
                reason: reason.to_string(),
            });
        }
    }

    fn send_error(&self, id: LinkId, text: &str) {
        if let Some(session) = self.links.get(&id) {
            session.send(message::Error::new(text));
        }
    }

    /// Operator-visible notice, mirrored into the audit log
    fn operator_notice(&self, text: &str) {
        tracing::info!(target: "audit", "{}", text);
        self.updates.notify_link_update(LinkUpdate::OperatorNotice {
            text: text.to_string(),
        });
    }
}
