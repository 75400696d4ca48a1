// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token sessions for the Bistro API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in and receives an access/refresh token pair
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. Server:
//!    - Verifies the HS256 signature, issuer and expiry
//!    - Rejects the nil user id
//!    - Requires a cached profile snapshot for the user (the live session)
//!    - Extracts `user_id`, `email` and `role` into [`AuthenticatedUser`]
//!
//! ## Security
//!
//! - Access and refresh tokens are signed with distinct secrets
//! - Passwords are stored as Argon2id hashes
//! - No clock skew leeway is applied to token expiry

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims, TokenSubject};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::{require_session, SessionGate};
pub use roles::Role;
