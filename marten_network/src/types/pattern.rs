//! IRC-style glob matching.
//!
//! Permitted wildcards are * (match zero or more characters) and ? (match
//! exactly one character)

use std::fmt::Display;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use wildmatch::WildMatch;

/// A wildcard pattern
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Pattern(String);

impl Deref for Pattern {
    type Target = String;

    fn deref(&self) -> &String {
        &self.0
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq<str> for Pattern {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Pattern {
    /// Construct a `Pattern`
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Test whether the given string matches this pattern. Matching is always
    /// case-insensitive
    pub fn matches(&self, s: &str) -> bool {
        WildMatch::new(&self.0.to_ascii_lowercase()).matches(&s.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wildcard_matches() {
        assert!(Pattern::new("*").matches("anything.at.all"));
        assert!(Pattern::new("*.edu").matches("foo.edu"));
        assert!(!Pattern::new("*.edu").matches("foo.com"));
        assert!(Pattern::new("hub?.example").matches("hub1.example"));
        assert!(!Pattern::new("hub?.example").matches("hub10.example"));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(Pattern::new("*.EDU").matches("foo.edu"));
        assert!(Pattern::new("irc.example.net").matches("IRC.Example.NET"));
    }
}
