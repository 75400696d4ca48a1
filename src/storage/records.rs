// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// User account as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique account identifier (UUID v4)
    pub id: Uuid,
    /// Display name, unique across accounts
    pub full_name: String,
    /// Login email, unique across accounts
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied at registration; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Restaurant as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredRestaurant {
    pub id: u64,
    /// Account that registered the restaurant
    pub owner_user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub phone_number: Option<String>,
    pub website_url: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewRestaurant {
    pub owner_user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub phone_number: Option<String>,
    pub website_url: Option<String>,
    pub email: Option<String>,
}
