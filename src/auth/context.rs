// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request security context.
//!
//! The context lives in the request's extensions, so it is created and
//! dropped together with the request and can never be observed by another
//! one.

use axum::http::Extensions;

use super::{principal::Principal, AuthError};

/// Outcome of request authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    /// Context with no authenticated principal.
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Read the context installed by the authentication filter.
    ///
    /// A request that never went through the filter is anonymous.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<SecurityContext>().cloned().unwrap_or_default()
    }

    /// Require an authenticated principal.
    pub fn require_principal(&self) -> Result<&Principal, AuthError> {
        self.principal.as_ref().ok_or(AuthError::Unauthorized)
    }

    /// Gate a protected operation on `required`.
    ///
    /// No principal is `Unauthorized`; a principal without the authority is
    /// `Forbidden`.
    pub fn authorize(&self, required: &str) -> Result<&Principal, AuthError> {
        let principal = self.require_principal()?;
        if principal.has_authority(required) {
            Ok(principal)
        } else {
            Err(AuthError::Forbidden {
                required: required.to_string(),
            })
        }
    }
}
