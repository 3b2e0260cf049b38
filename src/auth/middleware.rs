// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request authentication filter.
//!
//! Runs once per request ahead of every route. It reads the token from the
//! `Authorization` header, validates it and installs a [`SecurityContext`]
//! in the request extensions. It never rejects a request itself: a missing,
//! expired or invalid token just leaves the context anonymous, and the
//! authorization check on the protected route decides the response.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate_request));
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use super::{context::SecurityContext, token::TokenService};
use crate::state::AppState;

/// Optional scheme prefix accepted in front of the raw token.
const BEARER_PREFIX: &str = "Bearer ";

/// Authentication middleware function.
pub async fn authenticate_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Replace whatever was there: every request starts unauthenticated.
    let context = resolve_context(request.headers(), &state.tokens, Utc::now());
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Build the security context for a request's headers.
pub fn resolve_context(
    headers: &HeaderMap,
    tokens: &TokenService,
    now: DateTime<Utc>,
) -> SecurityContext {
    let Some(token) = extract_token(headers) else {
        return SecurityContext::anonymous();
    };

    match tokens.validate(token, now) {
        Ok(principal) => {
            tracing::debug!(subject = %principal.subject, "request authenticated");
            SecurityContext::authenticated(principal)
        }
        Err(e) => {
            tracing::debug!(error_code = e.error_code(), "token rejected");
            SecurityContext::anonymous()
        }
    }
}

/// Token from the `Authorization` header, with or without a `Bearer ` scheme.
///
/// A missing, non-UTF-8 or blank header yields `None`.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}
