// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CredentialVerifier, LoginFlow, SigningSecret, TokenService};
use crate::config::{AuthSettings, LoginStrategy};
use crate::store::UserStore;

/// Shared, read-only services handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub login: Arc<LoginFlow>,
    pub login_strategy: LoginStrategy,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, settings: &AuthSettings) -> Self {
        let secret = match &settings.jwt_secret {
            Some(bytes) => SigningSecret::new(bytes.clone()),
            None => SigningSecret::generate(),
        };

        let tokens = Arc::new(TokenService::new(&secret, settings.token_ttl));
        let verifier = Arc::new(CredentialVerifier::new(store, settings.store_timeout));

        Self {
            login: Arc::new(LoginFlow::new(verifier, Arc::clone(&tokens))),
            tokens,
            login_strategy: settings.login_strategy,
        }
    }
}
