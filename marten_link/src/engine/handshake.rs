//! Admission of directly-connected peers that have not yet proven their
//! identity.

use super::*;
use crate::auth::AuthCheckError;
use crate::server_info::decode_server_info;

use std::str::FromStr;

impl<Auth, Topology> LinkEngine<Auth, Topology>
where
    Auth: ConnectAuthService,
    Topology: TopologyPolicyService,
{
    pub(super) fn handle_server_handshake(
        &mut self,
        from: LinkId,
        name: &str,
        hop: u32,
        info: &str,
    ) {
        let Some(session) = self.links.get(&from) else {
            return;
        };
        let describe = session.describe();
        let expected_name = session.expected_name;
        let ts_protocol = session.ts_protocol;
        let capabilities = session.capabilities;
        let claimed_id = session.claimed_id;

        if let Some(expected) = expected_name {
            if !expected.eq_ignore_case(name) {
                self.operator_notice(&format!(
                    "Server {} has unexpected name {}",
                    describe, name
                ));
                tracing::info!(link = %describe, claimed = name, "Server name mismatch");
                self.exit_link(from, "Server name mismatch");
                return;
            }
        }

        if !ts_protocol {
            self.operator_notice(&format!("Link {} dropped, non-TS server", describe));
            self.exit_link(from, "Non-TS server");
            return;
        }

        if server_name_is_bogus(name) {
            tracing::info!(link = %describe, claimed = name, "Bogus server name in handshake");
            self.exit_link(from, "Bogus server name");
            return;
        }

        let auth_result = {
            let Some(session) = self.links.get(&from) else {
                return;
            };
            self.auth.check_server(name, session)
        };

        let link_block = match auth_result {
            Ok(block) => block,
            Err(AuthCheckError::NoEntry) => {
                if self.warn_unknown_link {
                    self.operator_notice(&format!(
                        "Unauthorised server connection attempt from {}: No entry for servername {}",
                        describe, name
                    ));
                }
                tracing::info!(link = %describe, claimed = name, "Access denied, no link block");
                self.exit_link(from, "Invalid servername.");
                return;
            }
            Err(AuthCheckError::BadCredentials) => {
                self.operator_notice(&format!(
                    "Unauthorised server connection attempt from {}: Bad credentials for server {}",
                    describe, name
                ));
                tracing::info!(link = %describe, claimed = name, "Access denied, invalid credentials");
                self.exit_link(from, "Invalid credentials.");
                return;
            }
            Err(AuthCheckError::BadHost) => {
                self.operator_notice(&format!(
                    "Unauthorised server connection attempt from {}: Invalid host for server {}",
                    describe, name
                ));
                tracing::info!(link = %describe, claimed = name, "Access denied, invalid host");
                self.exit_link(from, "Invalid host.");
                return;
            }
            Err(AuthCheckError::NameTooLong) => {
                self.operator_notice(&format!(
                    "Invalid servername {} from {}",
                    name, describe
                ));
                tracing::info!(link = %describe, claimed = name, "Access denied, invalid servername");
                self.exit_link(from, "Invalid servername.");
                return;
            }
            Err(AuthCheckError::RequiresTls) => {
                self.operator_notice(&format!(
                    "Connection from servername {} requires SSL/TLS but is plaintext",
                    name
                ));
                tracing::info!(link = %describe, claimed = name, "Access denied, requires TLS");
                self.exit_link(from, "Access denied, requires SSL/TLS but is plaintext");
                return;
            }
            Err(AuthCheckError::BadFingerprint) => {
                self.operator_notice(&format!(
                    "Connection from servername {} has invalid certificate fingerprint",
                    name
                ));
                tracing::info!(link = %describe, claimed = name, "Access denied, invalid fingerprint");
                self.exit_link(from, "Invalid fingerprint.");
                return;
            }
        };

        if !capabilities.has(ServerCapability::Ts6) {
            self.operator_notice(&format!(
                "Link {} dropped, TS6 protocol is required",
                name
            ));
            self.exit_link(from, "Incompatible TS version");
            return;
        }

        let missing = self.required_capabilities.missing_from(capabilities);
        if !missing.is_empty() {
            let missing = missing.join_names();
            self.operator_notice(&format!(
                "Link {} dropped, required CAPABs [{}] are missing",
                name, missing
            ));
            tracing::info!(link = %describe, missing = %missing, "Missing required capabilities");
            self.send_error(from, &format!("Missing required CAPABs ({})", missing));
            self.exit_link(from, "Missing required CAPABs");
            return;
        }

        if let Ok(existing) = self.net.server_by_name(name) {
            let juped = existing
                .parent
                .and_then(|parent| self.net.server_by_name(parent.value()).ok())
                .map(|parent| parent.is_service())
                .unwrap_or(false);

            if juped {
                self.send_error(from, "Server juped.");
            } else {
                self.operator_notice(&format!(
                    "Attempt to re-introduce server {} from {}",
                    name, describe
                ));
                self.send_error(from, "Server already exists.");
            }
            self.exit_link(from, "Server Exists");
            return;
        }

        if let Some(id) = claimed_id {
            if let Ok(holder) = self.net.server_by_id(&id) {
                let holder_name = holder.name;
                self.operator_notice(&format!(
                    "Attempt to re-introduce SID {} from {} (already in use by {})",
                    id, describe, holder_name
                ));
                self.send_error(from, "SID already exists.");
                self.exit_link(from, "SID Exists");
                return;
            }
        }

        let Ok(server_name) = ServerName::from_str(name) else {
            self.exit_link(from, "Bogus server name");
            return;
        };

        let (display_info, hidden) = decode_server_info(info);
        let mut flags = state::ServerFlags::empty();
        if hidden {
            flags |= state::ServerFlags::HIDDEN;
        }
        if link_block.service {
            flags |= state::ServerFlags::SERVICE;
        }

        let server = state::Server {
            name: server_name,
            id: claimed_id,
            parent: Some(*self.net.local_name()),
            children: Vec::new(),
            hop_count: hop.max(self.net.local().hop_count + 1),
            info: display_info,
            flags,
            capabilities,
            introduced_at: marten_network::utils::now(),
        };

        if let Err(error) = self.net.insert_server(server.clone()) {
            tracing::error!(link = %describe, %error, "Admission failed at insert");
            self.exit_link(from, "Server Exists");
            return;
        }

        if let Some(session) = self.links.get_mut(&from) {
            session.state = LinkState::Established { name: server_name };
        }

        tracing::info!(target: "audit", server = %server_name, link = %describe, "Server link established");
        self.operator_notice(&format!("Link with {} established", server_name));
        self.updates
            .notify_link_update(LinkUpdate::ServerLinked { server });
    }
}
