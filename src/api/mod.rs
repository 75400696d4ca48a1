// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_session, Role},
    error::{Empty, ErrorBody, ErrorDetail},
    models::{
        CreateRestaurantRequest, CreateRestaurantResponse, LoginRequest, ProfileResponse,
        RefreshTokenRequest, RegisterRequest, TokenResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod restaurant;

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let protected = Router::new()
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/restaurant", post(restaurant::create_restaurant))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh-token", post(auth::refresh_token))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::new())
                .layer(timeout_layer(request_timeout))
                .layer(CorsLayer::permissive()),
        )
}

/// Requests running past `request_timeout` are answered with 408.
fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::refresh_token,
        auth::profile,
        auth::logout,
        restaurant::create_restaurant,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            TokenResponse,
            ProfileResponse,
            CreateRestaurantRequest,
            CreateRestaurantResponse,
            Role,
            Empty,
            ErrorBody,
            ErrorDetail,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and session management"),
        (name = "Restaurants", description = "Restaurant registration"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{TestApp, ACCESS_TTL_SECS};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, TestApp) {
        let test_app = TestApp::new();
        let router = router(test_app.state.clone(), Duration::from_secs(5));
        (router, test_app)
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_and_login(router: &Router) -> (String, String) {
        let (status, _) = send(
            router,
            Method::POST,
            "/api/auth/register",
            Some(json!({ "email": "a@x.com", "full_name": "A", "password": "p" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            router,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "p" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    fn restaurant_body(name: &str) -> Value {
        json!({
            "name": name,
            "email": "hello@bistro.test",
            "address": "1 Main St",
            "logo_url": "https://cdn.test/logo.png",
            "banner_url": "https://cdn.test/banner.png",
            "phone_number": "+15550100"
        })
    }

    #[tokio::test]
    async fn register_login_profile_round_trip() {
        let (router, _app) = app();
        let (access, _) = register_and_login(&router).await;

        let (status, body) = send(&router, Method::GET, "/api/auth/profile", None, Some(&access)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "a@x.com");
        assert_eq!(body["data"]["full_name"], "A");
        assert_eq!(body["data"]["role"], "customer");
        assert_eq!(body["data"]["is_active"], true);
    }

    #[tokio::test]
    async fn login_response_reports_expiry() {
        let (router, _app) = app();
        send(
            &router,
            Method::POST,
            "/api/auth/register",
            Some(json!({ "email": "a@x.com", "full_name": "A", "password": "p" })),
            None,
        )
        .await;
        let (_, body) = send(
            &router,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "p" })),
            None,
        )
        .await;
        assert_eq!(body["data"]["expires_in"], ACCESS_TTL_SECS);
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let (router, _app) = app();
        register_and_login(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/auth/register",
            Some(json!({ "email": "a@x.com", "full_name": "B", "password": "p" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["response_code"], "user_already_exists");
    }

    #[tokio::test]
    async fn missing_fields_fail_validation() {
        let (router, _app) = app();
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/auth/register",
            Some(json!({})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "email");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (router, _app) = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\":"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Invalid request payload");
    }

    #[tokio::test]
    async fn wrong_password_is_generic_bad_request() {
        let (router, _app) = app();
        register_and_login(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "nope" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token() {
        let (router, _app) = app();
        let (status, body) = send(&router, Method::GET, "/api/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["response_code"], "missing_auth_header");

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/restaurant",
            Some(restaurant_body("Chez A")),
            Some("not-a-token"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_ends_session_before_token_expiry() {
        let (router, _app) = app();
        let (access, refresh) = register_and_login(&router).await;

        let (status, _) = send(&router, Method::POST, "/api/auth/logout", None, Some(&access)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, Method::GET, "/api/auth/profile", None, Some(&access)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["response_code"], "session_not_found");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/auth/refresh-token",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid refresh token");
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected() {
        let (router, app) = app();
        let (access, _) = register_and_login(&router).await;

        app.clock.advance(chrono::Duration::seconds(ACCESS_TTL_SECS + 1));
        let (status, body) = send(&router, Method::GET, "/api/auth/profile", None, Some(&access)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["response_code"], "token_expired");
    }

    #[tokio::test]
    async fn refresh_rotates_and_revokes_previous_token() {
        let (router, app) = app();
        let (_, refresh) = register_and_login(&router).await;

        // Let the first session's profile snapshot expire
        app.clock.advance(chrono::Duration::seconds(ACCESS_TTL_SECS));

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/auth/refresh-token",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["data"]["access_token"].as_str().unwrap().to_string();

        let (status, _) = send(&router, Method::GET, "/api/auth/profile", None, Some(&access)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/auth/refresh-token",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["response_code"], "token_malformed");
    }

    #[tokio::test]
    async fn restaurant_creation_flow() {
        let (router, app) = app();
        let (access, _) = register_and_login(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/restaurant",
            Some(restaurant_body("Chez A")),
            Some(&access),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], 1);

        let stored = crate::storage::RestaurantStore::restaurant_by_name(app.store.as_ref(), "Chez A")
            .unwrap()
            .unwrap();
        assert_eq!(stored.address.as_deref(), Some("1 Main St"));

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/restaurant",
            Some(restaurant_body("Chez A")),
            Some(&access),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["response_code"], "name_already_exists");

        let mut invalid = restaurant_body("Chez B");
        invalid["phone_number"] = json!(" ");
        let (status, body) = send(&router, Method::POST, "/api/restaurant", Some(invalid), Some(&access)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "phone_number");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (router, _app) = app();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (router, _app) = app();
        let (status, body) = send(&router, Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/auth/login"].is_object());
        assert!(body["components"]["securitySchemes"]["bearerAuth"].is_object());
    }

    #[tokio::test]
    async fn slow_requests_time_out_with_408() {
        let slow = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(10)));

        let response = slow
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
