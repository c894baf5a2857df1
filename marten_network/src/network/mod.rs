//! Defines the [Network] registry.

pub mod errors;
pub mod state;

#[cfg(test)]
mod test;

use crate::capability::ServerCapabilitySet;
use crate::config::NetworkConfig;
use crate::network::errors::*;
use crate::network::state::ServerFlags;
use crate::validated::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Stores the servers currently linked to the network, indexed by name and
/// by ID, together with the spanning tree connecting them.
///
/// All maps are keyed by the case-folded server name; nodes refer to each
/// other by those keys and not by reference. The registry enforces
/// uniqueness of both namespaces at insertion time; policy decisions are
/// made by the callers before anything is inserted.
///
/// A `Network` is fully serializable and cloneable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    servers: HashMap<ServerName, state::Server>,
    servers_by_id: HashMap<ServerId, ServerName>,

    local_key: ServerName,
    local_name: ServerName,
    local_id: ServerId,
}

impl Network {
    /// Create a registry containing only the locally-configured node.
    pub fn new(config: &NetworkConfig) -> Self {
        let me = state::Server {
            name: config.server_name,
            id: Some(config.server_id),
            parent: None,
            children: Vec::new(),
            hop_count: 0,
            info: config.server_info.clone(),
            flags: ServerFlags::empty(),
            capabilities: ServerCapabilitySet::all_known(),
            introduced_at: crate::utils::now(),
        };

        let local_key = me.name.folded();
        let mut servers = HashMap::new();
        let mut servers_by_id = HashMap::new();
        if let Some(id) = me.id {
            servers_by_id.insert(id, local_key);
        }
        servers.insert(local_key, me);

        Self {
            servers,
            servers_by_id,
            local_key,
            local_name: config.server_name,
            local_id: config.server_id,
        }
    }

    /// The locally-configured node
    pub fn local(&self) -> &state::Server {
        // inserted at construction and never removed
        self.servers
            .get(&self.local_key)
            .expect("local server missing from registry")
    }

    pub fn local_name(&self) -> &ServerName {
        &self.local_name
    }

    pub fn local_id(&self) -> &ServerId {
        &self.local_id
    }

    /// Look up a server by name (case-insensitive)
    pub fn server_by_name(&self, name: &str) -> LookupResult<&state::Server> {
        ServerName::from_str(name)
            .ok()
            .and_then(|n| self.servers.get(&n.folded()))
            .ok_or_else(|| LookupError::NoSuchServer(name.to_string()))
    }

    /// Look up a server by its fixed-length ID
    pub fn server_by_id(&self, id: &ServerId) -> LookupResult<&state::Server> {
        self.servers_by_id
            .get(id)
            .and_then(|key| self.servers.get(key))
            .ok_or(LookupError::NoSuchServerId(*id))
    }

    /// Resolve a wire token that may be either a server name or a server ID
    pub fn server_by_name_or_id(&self, token: &str) -> LookupResult<&state::Server> {
        if let Ok(id) = ServerId::from_str(token) {
            self.server_by_id(&id)
        } else {
            self.server_by_name(token)
        }
    }

    /// Admit a server into the registry.
    ///
    /// The node is added to the name index, the ID index, and its parent's
    /// children in a single call; no partial insertion is ever observable.
    /// Collisions in either namespace are rejected here even if the caller
    /// already checked, so the uniqueness invariants hold unconditionally.
    pub fn insert_server(&mut self, server: state::Server) -> Result<(), InsertError> {
        let key = server.name.folded();

        if self.servers.contains_key(&key) {
            return Err(InsertError::NameInUse(server.name));
        }

        if let Some(id) = server.id {
            if let Some(holder_key) = self.servers_by_id.get(&id) {
                let holder = self
                    .servers
                    .get(holder_key)
                    .map(|s| s.name)
                    .unwrap_or(*holder_key);
                return Err(InsertError::IdInUse { id, holder });
            }
        }

        // Only the locally-configured node, inserted at construction, has no
        // parent.
        let Some(parent_name) = server.parent else {
            return Err(InsertError::NoSuchParent(server.name));
        };
        let parent_key = parent_name.folded();
        let Some(parent) = self.servers.get_mut(&parent_key) else {
            return Err(InsertError::NoSuchParent(parent_name));
        };

        parent.children.push(key);
        if let Some(id) = server.id {
            self.servers_by_id.insert(id, key);
        }
        self.servers.insert(key, server);

        Ok(())
    }

    /// Remove a server and everything behind it from the registry.
    ///
    /// This is driven by the link-teardown layer when a link is lost or
    /// terminated; the admission logic itself never removes nodes. Returns
    /// the removed nodes, deepest last.
    pub fn remove_server(&mut self, name: &str) -> LookupResult<Vec<state::Server>> {
        let key = ServerName::from_str(name)
            .ok()
            .map(|n| n.folded())
            .filter(|k| self.servers.contains_key(k))
            .ok_or_else(|| LookupError::NoSuchServer(name.to_string()))?;

        if key == self.local_key {
            tracing::warn!("Refusing to remove the local server from the registry");
            return Ok(Vec::new());
        }

        let parent_key = self
            .servers
            .get(&key)
            .and_then(|s| s.parent)
            .map(|p| p.folded());
        if let Some(parent_key) = parent_key {
            if let Some(parent) = self.servers.get_mut(&parent_key) {
                parent.children.retain(|c| c.folded() != key);
            }
        }

        let mut queue = vec![key];
        let mut removed = Vec::new();
        while let Some(next) = queue.pop() {
            if let Some(server) = self.servers.remove(&next) {
                if let Some(id) = server.id {
                    self.servers_by_id.remove(&id);
                }
                queue.extend(server.children.iter().map(|c| c.folded()));
                removed.push(server);
            }
        }

        Ok(removed)
    }

    /// Iterate over every server in the registry, including the local node
    pub fn servers(&self) -> impl Iterator<Item = &state::Server> {
        self.servers.values()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
