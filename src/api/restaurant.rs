// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::extract::State;
use tracing::error;

use crate::auth::Auth;
use crate::error::{ApiError, ApiJson, ApiResponse, ErrorBody};
use crate::models::{CreateRestaurantRequest, CreateRestaurantResponse};
use crate::service::RestaurantError;
use crate::state::AppState;

fn create_error(err: RestaurantError) -> ApiError {
    use RestaurantError as E;
    match err {
        E::InvalidEmail => ApiError::invalid_field("email", "Invalid email", "invalid_email"),
        E::InvalidName => ApiError::invalid_field("name", "Invalid name", "invalid_name"),
        E::InvalidAddress => {
            ApiError::invalid_field("address", "Invalid address", "invalid_address")
        }
        E::InvalidBanner => {
            ApiError::invalid_field("banner_url", "Invalid banner", "invalid_banner")
        }
        E::InvalidLogo => ApiError::invalid_field("logo_url", "Invalid logo", "invalid_logo"),
        E::InvalidPhoneNumber => ApiError::invalid_field(
            "phone_number",
            "Invalid phone number",
            "invalid_phone_number",
        ),
        E::NameAlreadyExists => ApiError::conflict("Restaurant name already exists")
            .with_code("name_already_exists"),
        E::Store(e) => {
            error!(error = %e, "restaurant creation failed");
            ApiError::internal()
        }
    }
}

/// Register a restaurant owned by the caller.
#[utoipa::path(
    post,
    path = "/api/restaurant",
    tag = "Restaurants",
    security(("bearerAuth" = [])),
    request_body = CreateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant created", body = CreateRestaurantResponse),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 401, description = "No live session", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody)
    )
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(req): ApiJson<CreateRestaurantRequest>,
) -> Result<ApiResponse<CreateRestaurantResponse>, ApiError> {
    let id = state
        .restaurants
        .create(user.user_id, req.into())
        .map_err(create_error)?;

    Ok(ApiResponse::ok(
        "Restaurant created successfully",
        CreateRestaurantResponse { id },
    ))
}
