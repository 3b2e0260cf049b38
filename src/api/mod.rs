// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        login::{login_filter, LOGIN_PATH, MAX_LOGIN_BODY_BYTES},
        middleware::authenticate_request,
        Credentials, LoginResponse,
    },
    config::LoginStrategy,
    error::ApiError,
    state::AppState,
};

pub mod health;
pub mod session;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/logout", post(session::logout))
        .route("/users/me", get(users::get_current_user))
        .route("/user/findAll", get(users::find_all))
        .route("/user/edit", get(users::edit))
        .route("/user/delete", get(users::delete))
        .route("/user/add", get(users::add))
        .route("/health/live", get(health::liveness))
        .fallback(fallback);

    // Exactly one login entry point is mounted.
    let routes = match state.login_strategy {
        LoginStrategy::Handler => routes.route(
            LOGIN_PATH,
            post(session::login).layer(DefaultBodyLimit::max(MAX_LOGIN_BODY_BYTES)),
        ),
        LoginStrategy::Filter => {
            routes.layer(middleware::from_fn_with_state(state.clone(), login_filter))
        }
    };

    let routes = routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_request,
        ))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn fallback() -> ApiError {
    ApiError::not_found("Resource not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        session::login,
        session::logout,
        users::get_current_user,
        users::find_all,
        users::edit,
        users::delete,
        users::add,
        health::liveness
    ),
    components(
        schemas(
            Credentials,
            LoginResponse,
            users::UserMeResponse,
            users::MessageResponse,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Login and logout"),
        (name = "Users", description = "Permission-protected user operations"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;

/// Declares the raw-token `Authorization` header scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use crate::store::InMemoryUserStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
        response::Response,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(strategy: LoginStrategy) -> Router {
        let settings = AuthSettings {
            jwt_secret: Some(b"router-secret-router-secret-router".to_vec()),
            login_strategy: strategy,
            ..AuthSettings::default()
        };
        let store = Arc::new(InMemoryUserStore::demo().unwrap());
        router(AppState::new(store, &settings))
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login_admin(app: &Router) -> String {
        let response = send(app, login_request(r#"{"username":"admin","password":"123"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let _ = app(LoginStrategy::Handler).into_make_service();
        let _ = app(LoginStrategy::Filter).into_make_service();
    }

    #[tokio::test]
    async fn admin_login_scenario() {
        for strategy in [LoginStrategy::Handler, LoginStrategy::Filter] {
            let app = app(strategy);

            let response =
                send(&app, login_request(r#"{"username":"admin","password":"123"}"#)).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            let token = body["token"].as_str().unwrap().to_string();
            assert_eq!(
                body["authorities"],
                serde_json::json!(["sys:user:delete", "sys:user:edit", "sys:user:view"])
            );

            let view = send(&app, get_with_token("/user/findAll", Some(&token))).await;
            assert_eq!(view.status(), StatusCode::OK, "{strategy:?}");

            let add = send(&app, get_with_token("/user/add", Some(&token))).await;
            assert_eq!(add.status(), StatusCode::FORBIDDEN, "{strategy:?}");
        }
    }

    #[tokio::test]
    async fn granted_operations_are_allowed() {
        let app = app(LoginStrategy::Handler);
        let token = login_admin(&app).await;

        for uri in ["/user/findAll", "/user/edit", "/user/delete"] {
            let response = send(&app, get_with_token(uri, Some(&token))).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = app(LoginStrategy::Handler);
        let response = send(&app, get_with_token("/user/findAll", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error_code"], "unauthorized");
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let app = app(LoginStrategy::Handler);
        let response = send(&app, get_with_token("/user/findAll", Some("garbage"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_from_other_process_is_unauthorized() {
        let other = {
            let settings = AuthSettings {
                jwt_secret: Some(b"a-completely-different-signing-key".to_vec()),
                ..AuthSettings::default()
            };
            router(AppState::new(
                Arc::new(InMemoryUserStore::demo().unwrap()),
                &settings,
            ))
        };
        let foreign = login_admin(&other).await;

        let app = app(LoginStrategy::Handler);
        let response = send(&app, get_with_token("/user/findAll", Some(&foreign))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_credentials_are_generic_401() {
        let app = app(LoginStrategy::Handler);

        let wrong_password =
            send(&app, login_request(r#"{"username":"admin","password":"nope"}"#)).await;
        let unknown_user =
            send(&app, login_request(r#"{"username":"ghost","password":"123"}"#)).await;

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong_password).await, body_json(unknown_user).await);
    }

    #[tokio::test]
    async fn malformed_login_body_is_400() {
        for strategy in [LoginStrategy::Handler, LoginStrategy::Filter] {
            let app = app(strategy);
            let response = send(&app, login_request(r#"{"username":"admin""#)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{strategy:?}");
        }
    }

    #[tokio::test]
    async fn oversized_login_body_is_400_for_both_strategies() {
        let padding = "x".repeat(MAX_LOGIN_BODY_BYTES);
        let body = format!(r#"{{"username":"admin","password":"123","pad":"{padding}"}}"#);

        for strategy in [LoginStrategy::Handler, LoginStrategy::Filter] {
            let app = app(strategy);
            let request = Request::builder()
                .method(Method::POST)
                .uri("/login")
                .header("content-type", "application/json")
                .body(Body::from(body.clone()))
                .unwrap();

            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{strategy:?}");
            assert_eq!(
                body_json(response).await["error_code"],
                "malformed_request",
                "{strategy:?}"
            );
        }
    }

    #[tokio::test]
    async fn current_user_reports_principal() {
        let app = app(LoginStrategy::Filter);
        let token = login_admin(&app).await;

        let response = send(&app, get_with_token("/users/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["username"], "admin");

        let anonymous = send(&app, get_with_token("/users/me", None)).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_scheme_is_accepted() {
        let app = app(LoginStrategy::Handler);
        let token = login_admin(&app).await;
        let header = format!("Bearer {token}");
        let response = send(&app, get_with_token("/user/findAll", Some(&header))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn public_routes_need_no_token() {
        let app = app(LoginStrategy::Handler);

        let health = send(&app, get_with_token("/health/live", None)).await;
        assert_eq!(health.status(), StatusCode::OK);

        let logout = Request::builder()
            .method(Method::POST)
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, logout).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = app(LoginStrategy::Filter);
        let response = send(&app, get_with_token("/nope", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn context_does_not_leak_between_requests() {
        let app = app(LoginStrategy::Handler);
        let token = login_admin(&app).await;

        let authed = send(&app, get_with_token("/users/me", Some(&token))).await;
        assert_eq!(authed.status(), StatusCode::OK);

        let anonymous = send(&app, get_with_token("/users/me", None)).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn concurrent_requests_keep_their_own_context() {
        let app = app(LoginStrategy::Handler);
        let token = login_admin(&app).await;

        let mut handles = Vec::new();
        for i in 0..32 {
            let app = app.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                let authed = i % 2 == 0;
                let request = get_with_token("/user/findAll", authed.then_some(token.as_str()));
                let status = app.oneshot(request).await.unwrap().status();
                (authed, status)
            }));
        }

        for handle in handles {
            let (authed, status) = handle.await.unwrap();
            let expected = if authed {
                StatusCode::OK
            } else {
                StatusCode::UNAUTHORIZED
            };
            assert_eq!(status, expected);
        }
    }
}
