//! Server-to-server capability negotiation sets.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use thiserror::Error;

macro_rules! define_capabilities {
    (
        $typename:ident
        {
            $( $cap:ident : $val:literal => $name:literal ),* $(,)?
        }
    ) => {
        #[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
        #[derive(EnumIter)]
        #[repr(u64)]
        pub enum $typename
        {
            $( $cap = $val ),*
        }

        impl $typename
        {
            /// Exhaustive list of all known capabilities
            const ALL: &'static [$typename] = &[ $(Self::$cap),* ];

            /// On-the-wire token advertised for the capability
            pub fn name(self) -> &'static str
            {
                match self
                {
                    $( Self::$cap => $name ),*
                }
            }

            /// Look up a capability from its wire token
            pub fn from_name(name: &str) -> Option<Self>
            {
                match name
                {
                    $( $name => Some(Self::$cap), )*
                    _ => None
                }
            }

            /// Bit used as a mask in [`ServerCapabilitySet`]
            pub fn flag(&self) -> u64
            {
                *self as u64
            }
        }
    };
}

define_capabilities!(
    ServerCapability
    {
        Ts6:            0x0001 => "TS6",
        QuitStorm:      0x0002 => "QS",
        ExceptBans:     0x0004 => "EX",
        InviteExcepts:  0x0008 => "IE",
        Kline:          0x0010 => "KLN",
        Unkline:        0x0020 => "UNKLN",
        Knock:          0x0040 => "KNOCK",
        TopicBurst:     0x0080 => "TB",
        Encap:          0x0100 => "ENCAP",
        Services:       0x0200 => "SERVICES",
        Save:           0x0400 => "SAVE",
        Euid:           0x0800 => "EUID",
    }
);

#[derive(Debug, Error)]
#[error("Unknown capability name {0}")]
pub struct UnknownCapability(pub String);

/// A set of negotiated (or required) server capabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilitySet(u64);

impl ServerCapabilitySet {
    pub fn new() -> Self {
        Self(0)
    }

    /// The set of every capability this implementation knows about
    pub fn all_known() -> Self {
        ServerCapability::ALL.iter().cloned().collect()
    }

    /// Build a set from configured wire tokens
    pub fn from_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, UnknownCapability> {
        let mut ret = Self::new();
        for name in names {
            let cap = ServerCapability::from_name(name)
                .ok_or_else(|| UnknownCapability(name.to_string()))?;
            ret.set(cap);
        }
        Ok(ret)
    }

    pub fn has(&self, cap: ServerCapability) -> bool {
        0 != self.0 & cap as u64
    }

    pub fn has_all(&self, caps: ServerCapabilitySet) -> bool {
        (self.0 & caps.0) == caps.0
    }

    pub fn set(&mut self, cap: ServerCapability) {
        self.0 |= cap as u64;
    }

    pub fn set_all(&mut self, caps: ServerCapabilitySet) {
        self.0 |= caps.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The capabilities present in this set but absent from `other`
    pub fn missing_from(&self, other: ServerCapabilitySet) -> ServerCapabilitySet {
        Self(self.0 & !other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = ServerCapability> + '_ {
        ServerCapability::ALL.iter().cloned().filter(|cap| self.has(*cap))
    }

    /// Wire tokens of the members, space-separated, for diagnostics
    pub fn join_names(&self) -> String {
        self.iter().map(|cap| cap.name()).join(" ")
    }
}

impl From<ServerCapability> for ServerCapabilitySet {
    fn from(cap: ServerCapability) -> Self {
        Self(cap as u64)
    }
}

impl FromIterator<ServerCapability> for ServerCapabilitySet {
    fn from_iter<T: IntoIterator<Item = ServerCapability>>(iter: T) -> Self {
        let mut ret = Self::new();
        for cap in iter {
            ret.set(cap);
        }
        ret
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip() {
        for cap in ServerCapability::iter() {
            assert_eq!(ServerCapability::from_name(cap.name()), Some(cap));
        }
    }

    #[test]
    fn subset_and_missing() {
        let required = ServerCapabilitySet::from_names(["QS", "ENCAP"]).unwrap();
        let negotiated: ServerCapabilitySet =
            [ServerCapability::Ts6, ServerCapability::QuitStorm].into_iter().collect();

        assert!(!negotiated.has_all(required));
        let missing = required.missing_from(negotiated);
        assert_eq!(missing.join_names(), "ENCAP");

        let mut negotiated = negotiated;
        negotiated.set(ServerCapability::Encap);
        assert!(negotiated.has_all(required));
        assert!(required.missing_from(negotiated).is_empty());
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(ServerCapabilitySet::from_names(["NOPE"]).is_err());
    }
}
