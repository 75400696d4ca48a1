// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::Role;

/// Claims carried by both access and refresh tokens.
///
/// The two token kinds only differ by the secret that signs them and by
/// their lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account identifier
    #[serde(default)]
    pub user_id: Uuid,

    /// Account email at issue time
    #[serde(default)]
    pub email: String,

    /// Role name at issue time
    #[serde(default)]
    pub role: String,

    /// Issuer
    pub iss: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Unique token id; two tokens minted in the same second never collide.
    pub jti: String,
}

impl TokenClaims {
    /// True when every identity claim is populated.
    pub fn has_identity(&self) -> bool {
        !self.user_id.is_nil() && !self.email.trim().is_empty() && !self.role.trim().is_empty()
    }
}

/// Identity a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Authenticated user information extracted from a verified access token.
///
/// Inserted into request extensions by the session gate and read back by
/// the [`Auth`](super::Auth) extractor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account identifier
    pub user_id: Uuid,

    /// Email claim
    pub email: String,

    /// Role claim (falls back to customer if unrecognised)
    pub role: Role,

    /// Token expiration (Unix timestamp, used for validation, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified access-token claims.
    pub fn from_claims(claims: TokenClaims) -> Self {
        let role = Role::parse(&claims.role).unwrap_or_default();

        Self {
            user_id: claims.user_id,
            email: claims.email,
            role,
            expires_at: claims.exp,
        }
    }
}
