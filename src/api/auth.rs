// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login, token refresh, profile and logout endpoints.

use axum::extract::State;
use tracing::error;

use crate::auth::Auth;
use crate::error::{ApiError, ApiJson, ApiResponse, Empty, ErrorBody};
use crate::models::{
    LoginRequest, ProfileResponse, RefreshTokenRequest, RegisterRequest, TokenResponse,
};
use crate::service::{AuthServiceError, Registration};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Log an unexpected failure and hide it behind a generic 500.
fn internal(context: &str, err: AuthServiceError) -> ApiError {
    error!(error = %err, "{context} failed");
    ApiError::internal()
}

fn register_error(err: AuthServiceError) -> ApiError {
    use AuthServiceError as E;
    match err {
        E::InvalidEmail => ApiError::invalid_field("email", "Invalid email", "invalid_email"),
        E::InvalidName => ApiError::invalid_field("full_name", "Invalid name", "invalid_name"),
        E::InvalidPassword => {
            ApiError::invalid_field("password", "Invalid password", "invalid_password")
        }
        E::UserAlreadyExists => {
            ApiError::conflict("User already exists").with_code("user_already_exists")
        }
        E::NameAlreadyExists => {
            ApiError::conflict("Name already exists").with_code("name_already_exists")
        }
        other @ (E::NotFound
        | E::UserInactive
        | E::PasswordVerifyFail
        | E::RefreshTokenEmpty
        | E::TokenNotActive
        | E::TokenMissing
        | E::TokenMalformed
        | E::RefreshTokenRevoked
        | E::Token(_)
        | E::Password(_)
        | E::Store(_)
        | E::Cache(_)) => internal("registration", other),
    }
}

fn login_error(err: AuthServiceError) -> ApiError {
    use AuthServiceError as E;
    match err {
        E::InvalidEmail => ApiError::invalid_field("email", "Invalid email", "invalid_email"),
        E::InvalidPassword => {
            ApiError::invalid_field("password", "Invalid password", "invalid_password")
        }
        E::NotFound | E::UserInactive | E::PasswordVerifyFail => {
            ApiError::bad_request(INVALID_CREDENTIALS).with_code("invalid_credentials")
        }
        other @ (E::InvalidName
        | E::UserAlreadyExists
        | E::NameAlreadyExists
        | E::RefreshTokenEmpty
        | E::TokenNotActive
        | E::TokenMissing
        | E::TokenMalformed
        | E::RefreshTokenRevoked
        | E::Token(_)
        | E::Password(_)
        | E::Store(_)
        | E::Cache(_)) => internal("login", other),
    }
}

fn refresh_error(err: AuthServiceError) -> ApiError {
    use AuthServiceError as E;
    match err {
        E::RefreshTokenEmpty => ApiError::invalid_field(
            "refresh_token",
            "Refresh token is required",
            "refresh_token_empty",
        ),
        E::TokenNotActive => {
            ApiError::bad_request(INVALID_REFRESH_TOKEN).with_code("token_not_active")
        }
        E::TokenMissing => ApiError::bad_request(INVALID_REFRESH_TOKEN).with_code("token_missing"),
        E::TokenMalformed => {
            ApiError::bad_request(INVALID_REFRESH_TOKEN).with_code("token_malformed")
        }
        E::RefreshTokenRevoked => {
            ApiError::bad_request(INVALID_REFRESH_TOKEN).with_code("refresh_token_revoked")
        }
        E::NotFound => ApiError::bad_request(INVALID_REFRESH_TOKEN).with_code("user_not_found"),
        other @ (E::InvalidEmail
        | E::InvalidName
        | E::InvalidPassword
        | E::UserAlreadyExists
        | E::NameAlreadyExists
        | E::UserInactive
        | E::PasswordVerifyFail
        | E::Token(_)
        | E::Password(_)
        | E::Store(_)
        | E::Cache(_)) => internal("token refresh", other),
    }
}

fn profile_error(err: AuthServiceError) -> ApiError {
    use AuthServiceError as E;
    match err {
        E::NotFound => ApiError::not_found("User not found").with_code("user_not_found"),
        other @ (E::InvalidEmail
        | E::InvalidName
        | E::InvalidPassword
        | E::UserAlreadyExists
        | E::NameAlreadyExists
        | E::UserInactive
        | E::PasswordVerifyFail
        | E::RefreshTokenEmpty
        | E::TokenNotActive
        | E::TokenMissing
        | E::TokenMalformed
        | E::RefreshTokenRevoked
        | E::Token(_)
        | E::Password(_)
        | E::Store(_)
        | E::Cache(_)) => internal("profile lookup", other),
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = Empty),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 409, description = "Email or name already taken", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<Empty>, ApiError> {
    state
        .auth
        .register(Registration {
            email: req.email,
            full_name: req.full_name,
            password: req.password,
        })
        .map_err(register_error)?;

    Ok(ApiResponse::ok("User registered successfully", Empty {}))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = TokenResponse),
        (status = 400, description = "Invalid input or credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let pair = state
        .auth
        .login(&req.email, &req.password)
        .map_err(login_error)?;
    Ok(ApiResponse::ok("Login successful", pair.into()))
}

/// Exchange a refresh token for a new token pair.
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenResponse),
        (status = 400, description = "Invalid or expired refresh token", body = ErrorBody)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshTokenRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let pair = state
        .auth
        .refresh_token(&req.refresh_token)
        .map_err(refresh_error)?;
    Ok(ApiResponse::ok("Token refreshed", pair.into()))
}

/// Current user's profile.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "No live session", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<ApiResponse<ProfileResponse>, ApiError> {
    let snapshot = state.auth.profile(user.user_id).map_err(profile_error)?;
    Ok(ApiResponse::ok("Profile retrieved", snapshot.into()))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Session closed", body = Empty),
        (status = 401, description = "No live session", body = ErrorBody)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<ApiResponse<Empty>, ApiError> {
    state
        .auth
        .logout(user.user_id)
        .map_err(|e| internal("logout", e))?;
    Ok(ApiResponse::ok("Logged out", Empty {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordError;
    use axum::http::StatusCode;

    #[test]
    fn login_failures_do_not_reveal_which_check_failed() {
        for err in [
            AuthServiceError::NotFound,
            AuthServiceError::UserInactive,
            AuthServiceError::PasswordVerifyFail,
        ] {
            let api = login_error(err);
            assert_eq!(api.status, StatusCode::BAD_REQUEST);
            assert_eq!(api.message, INVALID_CREDENTIALS);
            assert!(api.detail.is_none());
        }
    }

    #[test]
    fn register_conflicts_are_409() {
        assert_eq!(
            register_error(AuthServiceError::UserAlreadyExists).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            register_error(AuthServiceError::NameAlreadyExists).response_code,
            Some("name_already_exists")
        );
    }

    #[test]
    fn validation_errors_name_the_field() {
        let api = register_error(AuthServiceError::InvalidName);
        assert_eq!(api.detail.unwrap().field, "full_name");

        let api = refresh_error(AuthServiceError::RefreshTokenEmpty);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.detail.unwrap().field, "refresh_token");
    }

    #[test]
    fn internal_errors_are_redacted() {
        let api = register_error(AuthServiceError::Password(PasswordError::Hash(
            "salt generation failed".to_string(),
        )));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal server error");
        assert!(api.detail.is_none());
    }

    #[test]
    fn profile_not_found_is_404() {
        assert_eq!(
            profile_error(AuthServiceError::NotFound).status,
            StatusCode::NOT_FOUND
        );
    }
}
