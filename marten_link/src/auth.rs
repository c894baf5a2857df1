//! Authorisation of inbound server connections against configured link
//! blocks.

use crate::link::LinkSession;
use marten_network::prelude::*;

use pwhash::unix;
use thiserror::Error;

/// The ways a connection claiming a server name can fail authorisation.
///
/// One variant per failure kind, so call sites can react to each without
/// interpreting numeric codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthCheckError {
    #[error("No entry for servername")]
    NoEntry,
    #[error("Bad credentials")]
    BadCredentials,
    #[error("Invalid host")]
    BadHost,
    #[error("Servername too long")]
    NameTooLong,
    #[error("Requires SSL/TLS but is plaintext")]
    RequiresTls,
    #[error("Invalid certificate fingerprint")]
    BadFingerprint,
}

/// Decides whether a connection presenting a server name is authorised to
/// link. On success the matched link block is returned so the caller can
/// apply its flags.
pub trait ConnectAuthService {
    fn check_server(&self, name: &str, link: &LinkSession)
        -> Result<LinkConfig, AuthCheckError>;
}

/// Standard implementation of [`ConnectAuthService`] over the configured
/// link blocks.
pub struct StandardConnectAuth {
    links: Vec<LinkConfig>,
}

impl StandardConnectAuth {
    pub fn new(links: Vec<LinkConfig>) -> Self {
        Self { links }
    }
}

impl ConnectAuthService for StandardConnectAuth {
    fn check_server(
        &self,
        name: &str,
        link: &LinkSession,
    ) -> Result<LinkConfig, AuthCheckError> {
        if name.len() > HOST_LENGTH_MAX {
            return Err(AuthCheckError::NameTooLong);
        }

        let block = self
            .links
            .iter()
            .find(|b| b.name.eq_ignore_case(name))
            .ok_or(AuthCheckError::NoEntry)?;

        if let Some(mask) = &block.host_mask {
            if !mask.matches(&link.remote_address) {
                return Err(AuthCheckError::BadHost);
            }
        }

        if let Some(hash) = &block.password_hash {
            let password_ok = link
                .password
                .as_deref()
                .map(|password| unix::verify(password, hash))
                .unwrap_or(false);
            if !password_ok {
                return Err(AuthCheckError::BadCredentials);
            }
        }

        if block.require_tls && !link.tls {
            return Err(AuthCheckError::RequiresTls);
        }

        if let Some(expected) = &block.fingerprint {
            let fingerprint_ok = link
                .fingerprint
                .as_deref()
                .map(|fp| fp.eq_ignore_ascii_case(expected))
                .unwrap_or(false);
            if !fingerprint_ok {
                return Err(AuthCheckError::BadFingerprint);
            }
        }

        Ok(block.clone())
    }
}
