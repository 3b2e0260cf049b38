// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors enforcing the authorization check.
//!
//! Protected handlers declare the permission they need as a type:
//!
//! ```rust,ignore
//! required_permission!(UserView, "sys:user:view");
//!
//! async fn find_all(Authorized(user, ..): Authorized<UserView>) -> impl IntoResponse {
//!     // user holds sys:user:view
//! }
//! ```
//!
//! Both extractors read the [`SecurityContext`] installed by the
//! authentication filter; neither looks at the token itself.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{context::SecurityContext, principal::Principal, AuthError};

/// A permission a protected operation requires.
pub trait RequiredPermission {
    const AUTHORITY: &'static str;
}

/// Declare a zero-sized [`RequiredPermission`] marker type.
#[macro_export]
macro_rules! required_permission {
    ($(#[$meta:meta])* $name:ident, $authority:literal) => {
        $(#[$meta])*
        pub struct $name;

        impl $crate::auth::RequiredPermission for $name {
            const AUTHORITY: &'static str = $authority;
        }
    };
}

/// Extractor for any authenticated principal.
///
/// Rejects with `Unauthorized` when the context is anonymous.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = SecurityContext::from_extensions(&parts.extensions);
        let principal = context.require_principal()?;
        Ok(Auth(principal.clone()))
    }
}

/// Extractor that requires the permission `P`.
///
/// Rejects with `Unauthorized` without a principal and `Forbidden` when the
/// principal lacks `P::AUTHORITY`.
pub struct Authorized<P>(pub Principal, pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for Authorized<P>
where
    P: RequiredPermission + Send + Sync,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = SecurityContext::from_extensions(&parts.extensions);
        match context.authorize(P::AUTHORITY) {
            Ok(principal) => Ok(Authorized(principal.clone(), PhantomData)),
            Err(e) => {
                tracing::info!(
                    required = P::AUTHORITY,
                    subject = context.principal().map(|p| p.subject.as_str()),
                    error_code = e.error_code(),
                    "access denied"
                );
                Err(e)
            }
        }
    }
}

/// Extractor that never rejects, for routes that behave differently for
/// anonymous callers.
pub struct OptionalAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = SecurityContext::from_extensions(&parts.extensions);
        Ok(OptionalAuth(context.principal().cloned()))
    }
}
