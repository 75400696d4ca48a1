// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login, refresh and profile workflow.
//!
//! ## Session lifecycle
//!
//! 1. `register` persists an account (no session yet).
//! 2. `login` issues an access/refresh pair and writes the profile snapshot
//!    and refresh token to the session cache. Only this (or a refresh) makes
//!    a session live for the session gate.
//! 3. `refresh_token` exchanges the single cached refresh token for a new
//!    pair and rotates both cache entries.
//! 4. The session ends when the profile snapshot expires or is evicted
//!    (`logout`), whatever the access token's own expiry says.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::token::{SigningKey, TokenError, TokenIssuer};
use crate::auth::TokenSubject;
use crate::config::AuthSettings;
use crate::storage::{
    profile_key, refresh_token_key, CacheError, CredentialStore, NewUser, ProfileSnapshot,
    SessionCache, StoreError, StoredUser, UniqueKey,
};

/// TTL used when a profile snapshot is repopulated from the store.
pub const COLD_PROFILE_TTL_MINUTES: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid name")]
    InvalidName,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Name already exists")]
    NameAlreadyExists,

    #[error("User not found")]
    NotFound,

    #[error("User is inactive")]
    UserInactive,

    #[error("Password verification failed")]
    PasswordVerifyFail,

    #[error("Refresh token empty string")]
    RefreshTokenEmpty,

    #[error("Token is not active")]
    TokenNotActive,

    #[error("Token is missing")]
    TokenMissing,

    #[error("Token is malformed")]
    TokenMalformed,

    #[error("Refresh token is no longer cached")]
    RefreshTokenRevoked,

    #[error("failed to generate token: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("session cache failure: {0}")]
    Cache(#[from] CacheError),
}

pub type AuthResult<T> = Result<T, AuthServiceError>;

/// Registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl Registration {
    fn validate(&self) -> AuthResult<()> {
        if !self.email.contains('@') {
            return Err(AuthServiceError::InvalidEmail);
        }
        if self.full_name.trim().is_empty() {
            return Err(AuthServiceError::InvalidName);
        }
        if self.password.trim().is_empty() {
            return Err(AuthServiceError::InvalidPassword);
        }
        Ok(())
    }
}

/// Access/refresh pair handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Orchestrates the credential store, session cache and token issuer.
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    cache: Arc<dyn SessionCache>,
    tokens: TokenIssuer,
    access_key: SigningKey,
    refresh_key: SigningKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        cache: Arc<dyn SessionCache>,
        tokens: TokenIssuer,
        settings: &AuthSettings,
    ) -> Self {
        Self {
            users,
            cache,
            tokens,
            access_key: SigningKey::from_secret(&settings.access_secret),
            refresh_key: SigningKey::from_secret(&settings.refresh_secret),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
            hasher: PasswordHasher::new(),
        }
    }

    /// Create an account and return its id.
    pub fn register(&self, registration: Registration) -> AuthResult<Uuid> {
        registration.validate()?;

        if self.users.user_by_email(&registration.email)?.is_some() {
            return Err(AuthServiceError::UserAlreadyExists);
        }
        if self.users.user_by_name(&registration.full_name)?.is_some() {
            return Err(AuthServiceError::NameAlreadyExists);
        }

        let password_hash = self.hasher.hash(&registration.password)?;

        // A concurrent registration can pass the checks above; the store
        // re-checks inside its insert transaction.
        let user_id = self
            .users
            .create_user(NewUser {
                full_name: registration.full_name,
                email: registration.email,
                password_hash,
            })
            .map_err(|e| match e {
                StoreError::UniqueViolation(UniqueKey::UserEmail) => {
                    AuthServiceError::UserAlreadyExists
                }
                StoreError::UniqueViolation(UniqueKey::UserFullName) => {
                    AuthServiceError::NameAlreadyExists
                }
                other => AuthServiceError::Store(other),
            })?;

        info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Verify credentials and open a session.
    pub fn login(&self, email: &str, password: &str) -> AuthResult<TokenPair> {
        if !email.contains('@') {
            return Err(AuthServiceError::InvalidEmail);
        }
        if password.trim().is_empty() {
            return Err(AuthServiceError::InvalidPassword);
        }

        let user = self
            .users
            .user_by_email(email)?
            .ok_or(AuthServiceError::NotFound)?;
        if !user.is_active {
            return Err(AuthServiceError::UserInactive);
        }
        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(user_id = %user.id, "password verification failed");
            return Err(AuthServiceError::PasswordVerifyFail);
        }

        let pair = self.open_session(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(pair)
    }

    /// Exchange the current refresh token for a new pair.
    pub fn refresh_token(&self, presented: &str) -> AuthResult<TokenPair> {
        if presented.trim().is_empty() {
            return Err(AuthServiceError::RefreshTokenEmpty);
        }

        let claims = self
            .tokens
            .verify(presented, &self.refresh_key)
            .map_err(|_| AuthServiceError::TokenNotActive)?;
        if !claims.has_identity() {
            return Err(AuthServiceError::TokenMissing);
        }

        let cached = self
            .cache
            .get_refresh_token(&refresh_token_key(claims.user_id))?
            .ok_or(AuthServiceError::RefreshTokenRevoked)?;
        if cached != presented {
            warn!(user_id = %claims.user_id, "stale or foreign refresh token presented");
            return Err(AuthServiceError::TokenMalformed);
        }

        let user = self
            .users
            .user_by_email(&claims.email)?
            .ok_or(AuthServiceError::NotFound)?;

        let pair = self.open_session(&user)?;
        info!(user_id = %user.id, "session refreshed");
        Ok(pair)
    }

    /// Profile for `user_id`, served from the session cache when possible.
    pub fn profile(&self, user_id: Uuid) -> AuthResult<ProfileSnapshot> {
        self.load_profile(user_id, Duration::minutes(COLD_PROFILE_TTL_MINUTES))
    }

    /// End the session by evicting both cache entries.
    pub fn logout(&self, user_id: Uuid) -> AuthResult<()> {
        self.cache.remove(&profile_key(user_id))?;
        self.cache.remove(&refresh_token_key(user_id))?;
        info!(%user_id, "session closed");
        Ok(())
    }

    /// Issue a fresh pair for `user` and write both session cache entries.
    fn open_session(&self, user: &StoredUser) -> AuthResult<TokenPair> {
        let subject = TokenSubject {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        };
        let access_token = self
            .tokens
            .issue(&subject, &self.access_key, self.access_ttl_secs)?;
        let refresh_token = self
            .tokens
            .issue(&subject, &self.refresh_key, self.refresh_ttl_secs)?;

        self.store_profile(user, Duration::seconds(self.access_ttl_secs))?;
        self.cache.set_refresh_token(
            &refresh_token_key(user.id),
            &refresh_token,
            Duration::seconds(self.refresh_ttl_secs),
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs,
        })
    }

    fn store_profile(&self, user: &StoredUser, ttl: Duration) -> AuthResult<ProfileSnapshot> {
        let snapshot = ProfileSnapshot {
            user_id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_active: user.is_active,
        };
        self.cache
            .set_profile(&profile_key(user.id), &snapshot, ttl)?;
        Ok(snapshot)
    }

    /// Cache-aside read: cached snapshot, or load from the store and
    /// repopulate with `miss_ttl`.
    fn load_profile(&self, user_id: Uuid, miss_ttl: Duration) -> AuthResult<ProfileSnapshot> {
        if let Some(snapshot) = self.cache.get_profile(&profile_key(user_id))? {
            return Ok(snapshot);
        }

        let user = self
            .users
            .user_by_id(user_id)?
            .ok_or(AuthServiceError::NotFound)?;
        self.store_profile(&user, miss_ttl)
    }
}
