// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and logout endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::{AuthError, LoginResponse, OptionalAuth},
    state::AppState,
};

/// Exchange a username and password for a token.
///
/// Mounted only when the login strategy is `handler`; with `filter` the
/// interceptor answers the same path before routing.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Session",
    request_body = crate::auth::Credentials,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Malformed login body"),
        (status = 401, description = "Bad credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let body = body.map_err(|e| AuthError::MalformedRequest(e.body_text()))?;
    state.login.login(&body, Utc::now()).await.map(Json)
}

/// End the session on the client side.
///
/// Tokens are stateless, so there is nothing to revoke; the endpoint only
/// acknowledges so clients can discard their token.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Session",
    responses(
        (status = 200, description = "Logged out"),
    )
)]
pub async fn logout(OptionalAuth(principal): OptionalAuth) -> StatusCode {
    if let Some(principal) = principal {
        tracing::info!(username = %principal.subject, "logout");
    }
    StatusCode::OK
}
