// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bistro Server - session and credential backend
//!
//! User registration and login with JWT sessions backed by a session cache,
//! plus restaurant registration for logged-in owners.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Tokens, password hashing and the session gate
//! - `service` - Auth and restaurant workflows
//! - `storage` - Credential store (redb) and session cache

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;
