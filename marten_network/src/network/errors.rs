//! Defines errors returned by the registry

use crate::validated::*;
use thiserror::Error;

/// Types of error that can occur while looking up servers
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No such server {0}")]
    NoSuchServer(String),
    #[error("No such server ID {0}")]
    NoSuchServerId(ServerId),
}

/// Convenience definition of a Result type used to look up servers.
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Types of error that can occur when admitting a server into the registry
#[derive(Error, Debug)]
pub enum InsertError {
    #[error("Server {0} already exists")]
    NameInUse(ServerName),
    #[error("Server ID {id} already in use by {holder}")]
    IdInUse { id: ServerId, holder: ServerName },
    #[error("Introducing server {0} is not in the registry")]
    NoSuchParent(ServerName),
}
