// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorities granted to users.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An opaque capability identifier such as `"sys:user:view"`.
///
/// Authorities are compared by exact string equality; there is no hierarchy
/// and no wildcard matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The authority string this value was constructed with.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Authority {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Authority {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's authorities. Ordered so serialized forms are deterministic.
pub type AuthoritySet = BTreeSet<Authority>;

/// Build an [`AuthoritySet`] from string literals.
pub fn authority_set<I, S>(values: I) -> AuthoritySet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Authority::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessor_returns_constructed_value() {
        let authority = Authority::new("sys:user:view");
        assert_eq!(authority.as_str(), "sys:user:view");
        assert_eq!(authority.to_string(), "sys:user:view");
    }

    #[test]
    fn set_deduplicates() {
        let set = authority_set(["sys:user:view", "sys:user:edit", "sys:user:view"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn membership_is_exact() {
        let set = authority_set(["sys:user:view"]);
        assert!(set.contains(&Authority::from("sys:user:view")));
        assert!(!set.contains(&Authority::from("SYS:USER:VIEW")));
        assert!(!set.contains(&Authority::from("sys:user")));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Authority::new("a:b")).unwrap();
        assert_eq!(json, r#""a:b""#);
    }
}
