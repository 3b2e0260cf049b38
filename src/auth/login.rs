// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login flow.
//!
//! [`LoginFlow`] turns a `{username, password}` body into a signed token. It
//! is reachable through one of two entry points, chosen by
//! [`LoginStrategy`](crate::config::LoginStrategy):
//!
//! - `Handler`: the `POST /login` route in `api::session`.
//! - `Filter`: [`login_filter`], a middleware that answers `POST /login`
//!   before routing.
//!
//! The router mounts exactly one of them, so a login request is never
//! processed twice.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{
    principal::Credentials, token::TokenService, verifier::CredentialVerifier, AuthError,
};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

/// Largest login body the interceptor will buffer.
pub const MAX_LOGIN_BODY_BYTES: usize = 16 * 1024;

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Token to send back in the `Authorization` header
    pub token: String,
    /// Authorities frozen into the token
    pub authorities: Vec<String>,
}

/// Credential extraction, verification and token issuance.
pub struct LoginFlow {
    verifier: Arc<CredentialVerifier>,
    tokens: Arc<TokenService>,
}

impl LoginFlow {
    pub fn new(verifier: Arc<CredentialVerifier>, tokens: Arc<TokenService>) -> Self {
        Self { verifier, tokens }
    }

    /// Run the whole flow on a raw request body.
    ///
    /// A body that is not a `{username, password}` JSON object fails with
    /// `MalformedRequest` before any verification is attempted.
    pub async fn login(&self, body: &[u8], now: DateTime<Utc>) -> Result<LoginResponse, AuthError> {
        let credentials = parse_credentials(body)?;
        self.authenticate(&credentials, now).await
    }

    /// Verify credentials and issue a token.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, AuthError> {
        let principal = match self.verifier.verify(credentials).await {
            Ok(principal) => principal,
            // Unknown user, wrong password and store outages share one public
            // response; the reason only goes to the log.
            Err(e) if e.is_credential_failure() => {
                tracing::warn!(
                    username = %credentials.username,
                    reason = %e,
                    "login failed"
                );
                return Err(e);
            }
            Err(e) => {
                tracing::error!(username = %credentials.username, error = %e, "login aborted");
                return Err(e);
            }
        };

        let token = self
            .tokens
            .issue(&principal.subject, &principal.authorities, now)?;

        tracing::info!(
            username = %principal.subject,
            authorities = principal.authorities.len(),
            "login succeeded"
        );

        Ok(LoginResponse {
            token,
            authorities: principal.authority_names(),
        })
    }
}

/// Decode the login payload.
pub fn parse_credentials(body: &[u8]) -> Result<Credentials, AuthError> {
    serde_json::from_slice(body).map_err(|e| AuthError::MalformedRequest(e.to_string()))
}

/// Login interceptor.
///
/// Consumes `POST /login` and responds directly; every other request is
/// passed through untouched.
pub async fn login_filter(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() != Method::POST || request.uri().path() != LOGIN_PATH {
        return next.run(request).await;
    }

    let body = match to_bytes(request.into_body(), MAX_LOGIN_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => return AuthError::MalformedRequest(e.to_string()).into_response(),
    };

    match state.login.login(&body, Utc::now()).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}
