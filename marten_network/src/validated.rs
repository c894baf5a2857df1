//! Defines validated string types for server names and identifiers

use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of a server name on the wire.
pub const HOST_LENGTH_MAX: usize = 63;

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGIT: &str = "0123456789";

fn check_allowed_chars(value: &str, allowed_chars: &[&str]) -> Result<(), ()> {
    for c in value.chars() {
        if !allowed_chars.iter().any(|s| s.contains(c)) {
            return Err(());
        }
    }
    Ok(())
}

/// Test whether `value` could never be a server name: it contains a character
/// outside the server-name character class, or no `.` separator at all.
///
/// Names without a dot belong to the nickname namespace, which is disjoint
/// from the server namespace by convention.
pub fn server_name_is_bogus(value: &str) -> bool {
    value.is_empty()
        || !value.contains('.')
        || check_allowed_chars(value, &[LOWER, UPPER, DIGIT, "._-"]).is_err()
}

#[derive(Debug, Clone, Error)]
#[error("Invalid server name: {0}")]
pub struct InvalidServerName(pub String);

/// The name of a server, as carried on introductions and stored in the
/// network tree.
///
/// Valid names contain only `[A-Za-z0-9._-]`, are at most
/// [`HOST_LENGTH_MAX`] characters long, and contain at least one `.`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ServerName(ArrayString<64>);

impl ServerName {
    fn validate(value: &str) -> Result<(), InvalidServerName> {
        if value.len() > HOST_LENGTH_MAX || server_name_is_bogus(value) {
            return Err(InvalidServerName(value.to_string()));
        }
        Ok(())
    }

    /// Access the raw stored value
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Case-folded form of the name, used as the registry key
    pub fn folded(&self) -> Self {
        let mut folded = ArrayString::new();
        for c in self.0.chars() {
            // same length as the validated input, so this can't overflow
            folded.push(c.to_ascii_lowercase());
        }
        Self(folded)
    }

    /// Case-insensitive comparison against a raw wire string
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl TryFrom<String> for ServerName {
    type Error = InvalidServerName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        let stored =
            ArrayString::from(&value).map_err(|_| InvalidServerName(value.clone()))?;
        Ok(Self(stored))
    }
}

impl TryFrom<&str> for ServerName {
    type Error = InvalidServerName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl FromStr for ServerName {
    type Err = InvalidServerName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

impl From<ServerName> for String {
    fn from(value: ServerName) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid server ID: {0}")]
pub struct InvalidServerId(pub String);

/// A fixed-length server identifier: one digit followed by two
/// alphanumerics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ServerId(ArrayString<3>);

impl ServerId {
    fn validate(value: &str) -> Result<(), InvalidServerId> {
        let mut chars = value.chars();
        let valid = matches!(chars.next(), Some(first) if first.is_ascii_digit())
            && value.len() == 3
            && chars.all(|c| c.is_ascii_alphanumeric());
        if valid {
            Ok(())
        } else {
            Err(InvalidServerId(value.to_string()))
        }
    }

    /// Access the raw stored value
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerId {
    type Error = InvalidServerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        let stored = ArrayString::from(&value).map_err(|_| InvalidServerId(value.clone()))?;
        Ok(Self(stored))
    }
}

impl TryFrom<&str> for ServerId {
    type Error = InvalidServerId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl FromStr for ServerId {
    type Err = InvalidServerId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

impl From<ServerId> for String {
    fn from(value: ServerId) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
