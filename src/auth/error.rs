// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for every credential failure, whatever the cause.
const AUTHENTICATION_FAILED: &str = "Bad credentials";

/// Authentication error type.
///
/// Credential failures (`UserNotFound`, `InvalidCredentials`,
/// `StoreUnavailable`) keep their distinct variants for diagnostics but share
/// one public message and error code, so a client can never tell which part
/// of the credential pair was wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No user with the supplied username
    #[error("user not found")]
    UserNotFound,
    /// Password does not match the stored hash
    #[error("invalid credentials")]
    InvalidCredentials,
    /// User store lookup failed or timed out
    #[error("user store unavailable: {0}")]
    StoreUnavailable(String),
    /// Token signature mismatch or malformed structure
    #[error("token is invalid")]
    TokenInvalid,
    /// Token validated but `expiresAt <= now`
    #[error("token has expired")]
    TokenExpired,
    /// Protected operation reached without an authenticated principal
    #[error("authentication is required")]
    Unauthorized,
    /// Principal lacks the permission the operation declares
    #[error("missing required permission {required}")]
    Forbidden { required: String },
    /// Request body could not be decoded
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// Token could not be produced
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the public error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound
            | AuthError::InvalidCredentials
            | AuthError::StoreUnavailable(_) => "authentication_failed",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Forbidden { .. } => "forbidden",
            AuthError::MalformedRequest(_) => "malformed_request",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound
            | AuthError::InvalidCredentials
            | AuthError::StoreUnavailable(_)
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::UserNotFound
            | AuthError::InvalidCredentials
            | AuthError::StoreUnavailable(_) => AUTHENTICATION_FAILED.to_string(),
            AuthError::Internal(_) => "Internal authentication error".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error came out of credential verification.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::UserNotFound | AuthError::InvalidCredentials | AuthError::StoreUnavailable(_)
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
