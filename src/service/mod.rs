// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business workflows between the HTTP handlers and storage.
//!
//! Services are synchronous: redb and the session cache are in-process, so
//! handlers call them inline.

pub mod auth;
pub mod restaurant;

pub use auth::{AuthService, AuthServiceError, Registration, TokenPair};
pub use restaurant::{RestaurantDraft, RestaurantError, RestaurantService};
