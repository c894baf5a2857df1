//! Admission of servers introduced behind an already-established link.

use super::*;
use crate::server_info::decode_server_info;

use std::str::FromStr;

impl<Auth, Topology> LinkEngine<Auth, Topology>
where
    Auth: ConnectAuthService,
    Topology: TopologyPolicyService,
{
    /// Resolve the source token of an introduction to the server it names.
    /// The tree can be deeper than one hop, so the introducer is not
    /// necessarily the directly-connected peer.
    fn resolve_source(&self, peer: &ServerName, source: Option<&str>) -> Option<ServerName> {
        match source {
            None => Some(*peer),
            Some(token) => self.net.server_by_name_or_id(token).ok().map(|s| s.name),
        }
    }

    pub(super) fn handle_server_introduction(
        &mut self,
        from: LinkId,
        peer: ServerName,
        source: Option<String>,
        name: &str,
        hop: u32,
        info: &str,
    ) {
        let Some(introducer) = self.resolve_source(&peer, source.as_deref()) else {
            tracing::warn!(link = %peer, source = ?source, "Dropping introduction with unknown source");
            return;
        };

        if self.net.server_by_name(name).is_ok() {
            tracing::info!(link = %peer, server = name, "Introduction of existing server");
            self.operator_notice(&format!(
                "Link {} cancelled, server {} already exists",
                peer, name
            ));
            self.exit_link(from, &format!("Server {} already exists", name));
            return;
        }

        // User nicks never contain '.' and server names always do; a
        // dot-free name is a collision with the nick namespace.
        if !name.contains('.') {
            self.send_error(from, &format!("Nickname {} already exists!", name));
            self.operator_notice(&format!(
                "Link {} cancelled: Server/nick collision on {}",
                peer, name
            ));
            tracing::info!(link = %peer, server = name, "Server/nick collision");
            self.exit_link(from, "Nick as Server");
            return;
        }

        if name.len() > HOST_LENGTH_MAX {
            self.operator_notice(&format!(
                "Link {} introduced server with invalid servername {}",
                peer, name
            ));
            self.exit_link(from, "Invalid servername introduced.");
            return;
        }

        if let Err(denial) = self.topology.can_introduce(&peer, name) {
            self.reject_for_topology(from, &peer, name, denial);
            return;
        }

        let Ok(server_name) = ServerName::from_str(name) else {
            tracing::info!(link = %peer, server = name, "Bogus server name introduced");
            self.exit_link(from, "Bogus server name");
            return;
        };

        self.admit_descendant(from, introducer, server_name, None, hop, info);
    }

    pub(super) fn handle_sid_introduction(
        &mut self,
        from: LinkId,
        peer: ServerName,
        source: Option<String>,
        name: &str,
        hop: u32,
        id: &str,
        info: &str,
    ) {
        let Some(introducer) = self.resolve_source(&peer, source.as_deref()) else {
            tracing::warn!(link = %peer, source = ?source, "Dropping introduction with unknown source");
            return;
        };

        // A malformed ID can never collide with anything, so it's rejected
        // before either namespace is consulted.
        let Ok(sid) = ServerId::from_str(id) else {
            self.send_error(from, "Invalid SID");
            self.operator_notice(&format!("Link {} cancelled, SID {} invalid", peer, id));
            tracing::info!(link = %peer, sid = id, "Bogus SID introduced");
            self.exit_link(from, "Bogus SID");
            return;
        };

        if self.net.server_by_name(name).is_ok() {
            tracing::info!(link = %peer, server = name, "Introduction of existing server");
            self.operator_notice(&format!(
                "Link {} cancelled, server {} already exists",
                peer, name
            ));
            self.exit_link(from, &format!("Server {} already exists", name));
            return;
        }

        if let Ok(holder) = self.net.server_by_id(&sid) {
            let holder_name = holder.name;
            let text = format!(
                "Link {} cancelled, SID {} for server {} already in use by {}",
                peer, sid, name, holder_name
            );
            self.operator_notice(&text);
            self.broadcast_wallops(&text);
            self.exit_link(
                from,
                &format!("SID {} for {} already in use by {}", sid, name, holder_name),
            );
            return;
        }

        if server_name_is_bogus(name) {
            self.send_error(from, "Invalid servername");
            self.operator_notice(&format!(
                "Link {} cancelled, servername {} invalid",
                peer, name
            ));
            tracing::info!(link = %peer, server = name, "Bogus server name introduced");
            self.exit_link(from, "Bogus server name");
            return;
        }

        if name.len() > HOST_LENGTH_MAX {
            self.operator_notice(&format!(
                "Link {} introduced server with invalid servername {}",
                peer, name
            ));
            self.exit_link(from, "Invalid servername introduced.");
            return;
        }

        if let Err(denial) = self.topology.can_introduce(&peer, name) {
            self.reject_for_topology(from, &peer, name, denial);
            return;
        }

        let Ok(server_name) = ServerName::from_str(name) else {
            tracing::info!(link = %peer, server = name, "Bogus server name introduced");
            self.exit_link(from, "Bogus server name");
            return;
        };

        self.admit_descendant(from, introducer, server_name, Some(sid), hop, info);
    }

    fn reject_for_topology(
        &mut self,
        from: LinkId,
        peer: &ServerName,
        name: &str,
        denial: TopologyDenial,
    ) {
        match &denial {
            TopologyDenial::NoHubMask { .. } => {
                self.operator_notice(&format!("Non-Hub link {} introduced {}.", peer, name));
            }
            TopologyDenial::LeafMaskMatched { .. } => {
                self.operator_notice(&format!(
                    "Link {} introduced leafed server {}.",
                    peer, name
                ));
            }
        }
        tracing::info!(link = %peer, server = name, ?denial, "Topology policy denied introduction");
        self.exit_link(from, &denial.to_string());
    }

    /// Build the node for an authorised introduction, commit it to the
    /// registry, and tell the rest of the network.
    fn admit_descendant(
        &mut self,
        from: LinkId,
        introducer: ServerName,
        name: ServerName,
        id: Option<ServerId>,
        claimed_hop: u32,
        info: &str,
    ) {
        let Ok(parent) = self.net.server_by_name(introducer.value()) else {
            tracing::warn!(server = %name, introducer = %introducer, "Introducer vanished before admission");
            return;
        };
        // The wire hop count is advisory; the stored value keeps hop counts
        // strictly increasing away from the local node.
        let hop_count = claimed_hop.max(parent.hop_count + 1);
        let capabilities = self
            .links
            .get(&from)
            .map(|s| s.capabilities)
            .unwrap_or_default();

        let (display_info, hidden) = decode_server_info(info);
        let mut flags = state::ServerFlags::empty();
        if hidden {
            flags |= state::ServerFlags::HIDDEN;
        }

        let server = state::Server {
            name,
            id,
            parent: Some(introducer),
            children: Vec::new(),
            hop_count,
            info: display_info,
            flags,
            capabilities,
            introduced_at: marten_network::utils::now(),
        };

        if let Err(error) = self.net.insert_server(server.clone()) {
            tracing::error!(server = %name, %error, "Admission failed at insert");
            self.exit_link(from, &error.to_string());
            return;
        }

        self.propagate_introduction(from, &introducer, &server);
        self.operator_notice(&format!(
            "Server {} being introduced by {}",
            name, introducer
        ));
        self.send_burst_probe(from, &server);
        self.updates.notify_link_update(LinkUpdate::ServerIntroduced {
            introducer,
            server,
        });
    }
}
