// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! `/users/me` reports the caller's principal. The `/user/*` operations are
//! demonstration endpoints: each declares one permission and returns a canned
//! message once the authorization check passes.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, Authorized, Principal};
use crate::required_permission;

required_permission!(UserView, "sys:user:view");
required_permission!(UserEdit, "sys:user:edit");
required_permission!(UserDelete, "sys:user:delete");
required_permission!(UserAdd, "sys:user:add");

/// Response for GET /users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Username the token was issued to
    pub username: String,
    /// Authorities carried by the token
    pub authorities: Vec<String>,
}

impl From<Principal> for UserMeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            authorities: principal.authority_names(),
            username: principal.subject,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn called(operation: &str) -> Json<Self> {
        Json(Self {
            message: format!("this {operation} service is called success."),
        })
    }
}

/// Get the current authenticated user's information.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("token" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(Auth(principal): Auth) -> Json<UserMeResponse> {
    Json(principal.into())
}

/// List users (requires `sys:user:view`).
#[utoipa::path(
    get,
    path = "/user/findAll",
    tag = "Users",
    security(("token" = [])),
    responses(
        (status = 200, description = "Authorized", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Missing sys:user:view"),
    )
)]
pub async fn find_all(_: Authorized<UserView>) -> Json<MessageResponse> {
    MessageResponse::called("findAll")
}

/// Edit a user (requires `sys:user:edit`).
#[utoipa::path(
    get,
    path = "/user/edit",
    tag = "Users",
    security(("token" = [])),
    responses(
        (status = 200, description = "Authorized", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Missing sys:user:edit"),
    )
)]
pub async fn edit(_: Authorized<UserEdit>) -> Json<MessageResponse> {
    MessageResponse::called("edit")
}

/// Delete a user (requires `sys:user:delete`).
#[utoipa::path(
    get,
    path = "/user/delete",
    tag = "Users",
    security(("token" = [])),
    responses(
        (status = 200, description = "Authorized", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Missing sys:user:delete"),
    )
)]
pub async fn delete(_: Authorized<UserDelete>) -> Json<MessageResponse> {
    MessageResponse::called("delete")
}

/// Add a user (requires `sys:user:add`).
#[utoipa::path(
    get,
    path = "/user/add",
    tag = "Users",
    security(("token" = [])),
    responses(
        (status = 200, description = "Authorized", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Missing sys:user:add"),
    )
)]
pub async fn add(_: Authorized<UserAdd>) -> Json<MessageResponse> {
    MessageResponse::called("add")
}
