// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token-based authentication and permission enforcement.
//!
//! ## Auth Flow
//!
//! 1. Client sends `POST /login` with `{"username", "password"}`
//! 2. Server:
//!    - Looks the user up in the [`UserStore`](crate::store::UserStore)
//!    - Verifies the password against the stored Argon2 hash
//!    - Loads the user's authorities
//!    - Signs a token carrying subject, authorities, `iat` and `exp`
//! 3. Client sends `Authorization: <token>` on later requests
//! 4. The authentication filter validates the token and installs a
//!    per-request [`SecurityContext`]
//! 5. Protected handlers declare a [`RequiredPermission`]; the
//!    [`Authorized`] extractor answers 401 without a principal and 403
//!    without the permission
//!
//! ## Security
//!
//! - Tokens are HS256, signed with a process-wide secret fixed at startup
//! - Expiry is strict (`exp > now`), with no clock skew leeway
//! - Authorities are frozen into the token at login; permission changes take
//!   effect at the next login
//! - Login failures never reveal whether the username or password was wrong

pub mod authority;
pub mod context;
pub mod error;
pub mod extractor;
pub mod login;
pub mod middleware;
pub mod password;
pub mod principal;
pub mod token;
pub mod verifier;

pub use authority::{Authority, AuthoritySet};
pub use context::SecurityContext;
pub use error::AuthError;
pub use extractor::{Auth, Authorized, OptionalAuth, RequiredPermission};
pub use login::{LoginFlow, LoginResponse};
pub use principal::{Credentials, Principal};
pub use token::{SigningSecret, TokenService};
pub use verifier::CredentialVerifier;
