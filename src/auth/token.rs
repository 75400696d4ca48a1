// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token issuing and verification.
//!
//! Access and refresh tokens are signed with two different secrets, so a
//! leaked access secret cannot be used to mint refresh tokens. Expiry is
//! checked against the injected [`Clock`] rather than inside `jsonwebtoken`,
//! which keeps expiry testable without sleeping.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::claims::{TokenClaims, TokenSubject};
use crate::clock::Clock;

/// Lifetime used when a caller asks for a non-positive TTL.
pub const FALLBACK_TTL_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is invalid")]
    Invalid,

    #[error("token is expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Symmetric key pair derived from one secret.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Creates and verifies signed, expiring bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(issuer: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: issuer.into(),
            clock,
        }
    }

    /// Sign a token for `subject` that expires `ttl_secs` from now.
    pub fn issue(
        &self,
        subject: &TokenSubject,
        key: &SigningKey,
        ttl_secs: i64,
    ) -> Result<String, TokenError> {
        let ttl_secs = if ttl_secs <= 0 {
            FALLBACK_TTL_SECS
        } else {
            ttl_secs
        };
        let now = self.clock.now();
        let expires_at = now + Duration::seconds(ttl_secs);

        let claims = TokenClaims {
            user_id: subject.user_id,
            email: subject.email.clone(),
            role: subject.role.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding).map_err(TokenError::Encode)
    }

    /// Check signature, issuer and structure, then expiry against the clock.
    pub fn verify(&self, token: &str, key: &SigningKey) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &key.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if self.clock.now().timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
