// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credentials and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::authority::{Authority, AuthoritySet};

/// A plaintext password held only for the duration of a verification.
///
/// `Debug` is redacted so the value cannot end up in logs.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Login payload: `{"username": ..., "password": ...}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credentials {
    pub username: String,
    #[schema(value_type = String, format = Password)]
    pub password: Password,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Password::new(password),
        }
    }
}

/// Authenticated identity associated with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Username the token was issued to
    pub subject: String,
    /// Authorities frozen at token issuance
    pub authorities: AuthoritySet,
}

impl Principal {
    pub fn new(subject: impl Into<String>, authorities: AuthoritySet) -> Self {
        Self {
            subject: subject.into(),
            authorities,
        }
    }

    /// Exact membership test against the principal's authorities.
    pub fn has_authority(&self, required: &str) -> bool {
        self.authorities.contains(&Authority::from(required))
    }

    /// Authorities as plain strings, in set order.
    pub fn authority_names(&self) -> Vec<String> {
        self.authorities
            .iter()
            .map(|a| a.as_str().to_string())
            .collect()
    }
}
