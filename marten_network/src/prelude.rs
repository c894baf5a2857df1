//! Collects commonly-used names for convenient import

pub use crate::{
    capability::*,
    config::*,
    network::errors::{InsertError, LookupError, LookupResult},
    network::Network,
    policy::*,
    types::*,
    validated::*,
};

pub use crate::network::state;
