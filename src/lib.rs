// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authgate - Stateless Token Authentication Service
//!
//! This crate authenticates users against a credential store, issues signed
//! time-bounded tokens carrying their authorities, and enforces a declared
//! permission on every protected request.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Credential verification, tokens, request filter, authorization
//! - `config` - Environment configuration
//! - `store` - User and permission store contract and in-memory adapter

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod telemetry;
