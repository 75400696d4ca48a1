// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session gate middleware for Axum.
//!
//! Applied with `route_layer` to the protected routes:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/api/auth/profile", get(profile))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_session,
//!     ));
//! ```
//!
//! A request passes only if its bearer token verifies against the access key
//! AND a profile snapshot for the token's user is still cached. Evicting the
//! snapshot therefore ends the session before the token itself expires.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::token::{SigningKey, TokenError, TokenIssuer};
use super::{AuthError, AuthenticatedUser};
use crate::clock::Clock;
use crate::state::AppState;
use crate::storage::{profile_key, SessionCache};

/// Validates bearer tokens against the access key and the session cache.
pub struct SessionGate {
    tokens: TokenIssuer,
    access_key: SigningKey,
    cache: Arc<dyn SessionCache>,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    pub fn new(
        tokens: TokenIssuer,
        access_secret: &str,
        cache: Arc<dyn SessionCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            access_key: SigningKey::from_secret(access_secret),
            cache,
            clock,
        }
    }

    /// Run every gate check against the request headers, in order.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
            ["Bearer", token] => *token,
            _ => return Err(AuthError::InvalidAuthHeader),
        };

        let claims = self
            .tokens
            .verify(token, &self.access_key)
            .map_err(|e| match e {
                TokenError::Expired => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        if claims.exp < self.clock.now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        if claims.user_id.is_nil() {
            return Err(AuthError::MissingUser);
        }

        match self.cache.get_profile(&profile_key(claims.user_id)) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(AuthError::SessionNotFound),
            Err(e) => {
                warn!(user_id = %claims.user_id, error = %e, "session cache lookup failed");
                return Err(AuthError::SessionNotFound);
            }
        }

        Ok(AuthenticatedUser::from_claims(claims))
    }
}

/// Reject the request unless it carries a live session; on success the
/// [`AuthenticatedUser`] is added to the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.gate.authenticate(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), reason = e.error_code(), "request rejected by session gate");
            e.into_response()
        }
    }
}
