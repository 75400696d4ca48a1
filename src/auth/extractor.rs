// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a live session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Reuses the user the session gate middleware stored in the request
/// extensions; on routes without the middleware it runs the same checks.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let user = state.gate.authenticate(&parts.headers)?;
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::state::test_support::TestApp;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let app = TestApp::new();
        let result = Auth::from_request_parts(&mut parts(None), &app.state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_runs_gate_without_middleware() {
        let app = TestApp::new();
        let (user_id, tokens) = app.logged_in_user("a@x.com", "A", "pw");

        let header = format!("Bearer {}", tokens.access_token);
        let Auth(user) = Auth::from_request_parts(&mut parts(Some(&header)), &app.state)
            .await
            .unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, Role::Customer);
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let app = TestApp::new();
        let mut parts = parts(None);
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "mw@x.com".to_string(),
            role: Role::Admin,
            expires_at: 0,
        };
        parts.extensions.insert(user.clone());

        let Auth(found) = Auth::from_request_parts(&mut parts, &app.state).await.unwrap();
        assert_eq!(found.user_id, user.user_id);
        assert_eq!(found.email, "mw@x.com");
    }
}
