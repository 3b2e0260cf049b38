// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification against the user store.

use std::{future::Future, sync::Arc, time::Duration};

use super::{
    password::verify_password,
    principal::{Credentials, Password, Principal},
    AuthError,
};
use crate::store::{StoreError, UserStore};

/// Argon2id hash with the default cost parameters that matches no password.
///
/// Checked for unknown usernames so both failure paths cost one Argon2 run.
const UNKNOWN_USER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$KHmNIy6X0Ab8PLaiRWxYpA$YVNfQ6ENFRD3N0PG3W2MZbJUiS+1h8+PwayhLRtfixA";

/// Checks a username/password pair and resolves the principal's authorities.
pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    lookup_timeout: Duration,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn UserStore>, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Verify credentials.
    ///
    /// Fails with `UserNotFound`, `InvalidCredentials` or `StoreUnavailable`;
    /// callers must collapse these into one public response.
    pub async fn verify(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let username = credentials.username.as_str();

        let record = self.bounded(self.store.find_by_username(username)).await?;

        let Some(record) = record else {
            check_password(UNKNOWN_USER_HASH.to_string(), credentials.password.clone()).await?;
            return Err(AuthError::UserNotFound);
        };

        if !check_password(record.password_hash, credentials.password.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let authorities = self.bounded(self.store.find_permissions(username)).await?;

        Ok(Principal::new(record.username, authorities))
    }

    async fn bounded<T>(
        &self,
        lookup: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AuthError::StoreUnavailable(e.to_string())),
            Err(_) => Err(AuthError::StoreUnavailable(format!(
                "lookup timed out after {}ms",
                self.lookup_timeout.as_millis()
            ))),
        }
    }
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn check_password(stored_hash: String, password: Password) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, password.expose()))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))
}
