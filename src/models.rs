// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies used by the REST API. All types derive
//! `ToSchema` for OpenAPI documentation.
//!
//! Request string fields default to empty when absent so that a missing
//! field fails field validation (400 with detail) rather than JSON decoding.
//!
//! ## Model Categories
//!
//! - **Auth**: registration, login, token refresh and profile
//! - **Restaurants**: restaurant registration

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::service::{RestaurantDraft, TokenPair};
use crate::storage::ProfileSnapshot;

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Access/refresh pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<ProfileSnapshot> for ProfileResponse {
    fn from(snapshot: ProfileSnapshot) -> Self {
        Self {
            email: snapshot.email,
            full_name: snapshot.full_name,
            role: snapshot.role,
            is_active: snapshot.is_active,
        }
    }
}

// =============================================================================
// Restaurant Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub banner_url: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

impl From<CreateRestaurantRequest> for RestaurantDraft {
    fn from(req: CreateRestaurantRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            address: req.address,
            logo_url: req.logo_url,
            banner_url: req.banner_url,
            phone_number: req.phone_number,
            description: req.description,
            category: req.category,
            city: req.city,
            district: req.district,
            website_url: req.website_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRestaurantResponse {
    pub id: u64,
}
