// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User and permission store.
//!
//! The authentication pipeline only reads from the store through the
//! [`UserStore`] trait. [`InMemoryUserStore`] is the adapter used by the
//! server binary and the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::{
    authority::{authority_set, AuthoritySet},
    password::{hash_password, PasswordError},
};

/// A stored user. The password is only ever held as a salted hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup contract the credential verifier depends on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by username, `None` if absent.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Permission set for a username. An empty set is valid.
    async fn find_permissions(&self, username: &str) -> Result<AuthoritySet, StoreError>;
}

struct StoredUser {
    record: UserRecord,
    permissions: AuthoritySet,
}

/// Read-only in-memory store, populated before the server starts.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: HashMap<String, StoredUser>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the demonstration account `admin` / `123`.
    pub fn demo() -> Result<Self, PasswordError> {
        let mut store = Self::new();
        store.insert_user(
            1,
            "admin",
            "123",
            authority_set(["sys:user:view", "sys:user:edit", "sys:user:delete"]),
        )?;
        Ok(store)
    }

    /// Add a user, hashing the plaintext password.
    pub fn insert_user(
        &mut self,
        id: u64,
        username: impl Into<String>,
        password: &str,
        permissions: AuthoritySet,
    ) -> Result<UserRecord, PasswordError> {
        let username = username.into();
        let record = UserRecord {
            id,
            username: username.clone(),
            password_hash: hash_password(password)?,
        };
        self.users.insert(
            username,
            StoredUser {
                record: record.clone(),
                permissions,
            },
        );
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(username).map(|u| u.record.clone()))
    }

    async fn find_permissions(&self, username: &str) -> Result<AuthoritySet, StoreError> {
        Ok(self
            .users
            .get(username)
            .map(|u| u.permissions.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{authority::Authority, password::verify_password};

    #[tokio::test]
    async fn demo_store_has_admin() {
        let store = InMemoryUserStore::demo().unwrap();
        assert_eq!(store.len(), 1);

        let admin = store.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.id, 1);
        assert!(verify_password(&admin.password_hash, "123"));
        assert_ne!(admin.password_hash, "123");

        let perms = store.find_permissions("admin").await.unwrap();
        assert!(perms.contains(&Authority::from("sys:user:view")));
        assert!(!perms.contains(&Authority::from("sys:user:add")));
    }

    #[tokio::test]
    async fn unknown_user_is_absent_with_empty_permissions() {
        let store = InMemoryUserStore::demo().unwrap();
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
        assert!(store.find_permissions("nobody").await.unwrap().is_empty());
    }
}
