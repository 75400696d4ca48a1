// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles carried in token claims and profile snapshots.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role, carried in token claims and profile snapshots.
///
/// - `Admin` - Platform operator
/// - `Owner` - Manages one or more restaurants
/// - `Customer` - Default role for self-registered accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Restaurant owner
    Owner,
    /// Regular customer account
    Customer,
}

impl Role {
    /// Parse role from string (case-insensitive).
    /// Used when reading the role claim back out of a token.
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "owner" => Some(Role::Owner),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Customer => "customer",
        }
    }
}

impl Default for Role {
    /// Self-registered users start as customers.
    fn default() -> Self {
        Role::Customer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
