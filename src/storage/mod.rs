// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent records (users, restaurants) and the session cache.
//!
//! ## Layout
//!
//! - [`database`] - redb-backed credential and restaurant store
//! - [`session_cache`] - TTL'd key-value cache for profile snapshots and
//!   refresh tokens
//!
//! Services only see the [`CredentialStore`], [`RestaurantStore`] and
//! [`SessionCache`] traits.

pub mod database;
pub mod records;
pub mod session_cache;

use uuid::Uuid;

pub use database::RedbStore;
pub use records::{NewRestaurant, NewUser, StoredRestaurant, StoredUser};
pub use session_cache::{
    profile_key, refresh_token_key, CacheError, LruSessionCache, ProfileSnapshot, SessionCache,
};

/// Unique constraints enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    UserEmail,
    UserFullName,
    RestaurantName,
}

impl std::fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueKey::UserEmail => write!(f, "users.email"),
            UniqueKey::UserFullName => write!(f, "users.full_name"),
            UniqueKey::RestaurantName => write!(f, "restaurants.name"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(UniqueKey),

    #[error("stored record is inconsistent: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence used by the auth workflow.
///
/// Lookups return `Ok(None)` when no record matches; `Err` is reserved for
/// backend failures.
pub trait CredentialStore: Send + Sync {
    fn user_by_id(&self, id: Uuid) -> StoreResult<Option<StoredUser>>;

    fn user_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>>;

    fn user_by_name(&self, full_name: &str) -> StoreResult<Option<StoredUser>>;

    /// Insert a user. Fails with [`StoreError::UniqueViolation`] when the email
    /// or full name is already taken at commit time.
    fn create_user(&self, user: NewUser) -> StoreResult<Uuid>;
}

/// Restaurant persistence used by the restaurant service.
pub trait RestaurantStore: Send + Sync {
    fn restaurant_by_name(&self, name: &str) -> StoreResult<Option<StoredRestaurant>>;

    /// Insert a restaurant and return its numeric id.
    fn create_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<u64>;
}
