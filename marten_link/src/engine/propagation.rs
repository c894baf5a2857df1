//! Split-horizon rebroadcast of accepted introductions.

use super::*;

impl<Auth, Topology> LinkEngine<Auth, Topology>
where
    Auth: ConnectAuthService,
    Topology: TopologyPolicyService,
{
    /// Re-broadcast a freshly admitted server to every other established
    /// link, in the richest form each link supports. The link the
    /// introduction arrived on never hears it back.
    pub(super) fn propagate_introduction(
        &self,
        origin: LinkId,
        introducer: &ServerName,
        server: &state::Server,
    ) {
        let hidden_marker = if server.is_hidden() { "(H) " } else { "" };
        let info = format!("{}{}", hidden_marker, server.info);
        let hopcount = server.hop_count + 1;

        let introducer_id = self
            .net
            .server_by_name(introducer.value())
            .ok()
            .and_then(|s| s.id);

        for (link_id, session) in &self.links {
            if *link_id == origin || !matches!(session.state, LinkState::Established { .. }) {
                continue;
            }

            match server.id {
                Some(sid) if session.capabilities.has(ServerCapability::Ts6) => {
                    let source = introducer_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| introducer.to_string());
                    session.send(message::Sid::new(
                        &source,
                        server.name.value(),
                        hopcount,
                        &sid,
                        &info,
                    ));
                }
                _ => {
                    session.send(message::Server::new(
                        introducer,
                        server.name.value(),
                        hopcount,
                        &info,
                    ));
                }
            }
        }
    }

    /// Probe the freshly admitted node so end-of-burst detection can start
    /// immediately. Routed down the link the introduction arrived on.
    pub(super) fn send_burst_probe(&self, origin: LinkId, server: &state::Server) {
        let destination = server
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| server.name.to_string());

        if let Some(session) = self.links.get(&origin) {
            session.send(message::Ping::new(
                self.net.local_id(),
                self.net.local_name(),
                &destination,
            ));
        }
    }

    /// Network-wide administrative broadcast to every established link
    pub(super) fn broadcast_wallops(&self, text: &str) {
        for session in self.links.values() {
            if matches!(session.state, LinkState::Established { .. }) {
                session.send(message::Wallops::new(self.net.local_id(), text));
            }
        }
    }
}
