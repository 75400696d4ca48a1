// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user and restaurant database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `users_email_idx`: email → user_id
//! - `users_full_name_idx`: full_name → user_id
//! - `restaurants`: restaurant_id → serialized StoredRestaurant
//! - `restaurants_name_idx`: name → restaurant_id
//! - `sequences`: sequence name → last issued value
//!
//! The index tables play the role of unique constraints: every insert checks
//! and writes them inside the same write transaction as the record itself.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::records::{NewRestaurant, NewUser, StoredRestaurant, StoredUser};
use super::{CredentialStore, RestaurantStore, StoreError, StoreResult, UniqueKey};
use crate::auth::Role;

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_email_idx");

const USERS_BY_NAME: TableDefinition<&str, &str> = TableDefinition::new("users_full_name_idx");

const RESTAURANTS: TableDefinition<u64, &[u8]> = TableDefinition::new("restaurants");

const RESTAURANTS_BY_NAME: TableDefinition<&str, u64> =
    TableDefinition::new("restaurants_name_idx");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const RESTAURANT_SEQUENCE: &str = "restaurants";

// =============================================================================
// RedbStore
// =============================================================================

/// Credential and restaurant store on a single redb database.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Volatile database held entirely in memory.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(USERS_BY_NAME)?;
            let _ = write_txn.open_table(RESTAURANTS)?;
            let _ = write_txn.open_table(RESTAURANTS_BY_NAME)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Cheap read used by readiness probes.
    pub fn check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }

    /// Resolve a user through one of the secondary indexes.
    fn user_via_index(
        &self,
        index: TableDefinition<'static, &'static str, &'static str>,
        key: &str,
    ) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(index)?;
        let user_id = match idx_table.get(key)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(user_id.as_str())? {
            Some(value) => Ok(Some(from_json(value.value())?)),
            None => Err(StoreError::Corrupt(format!(
                "index entry {key} points at missing user {user_id}"
            ))),
        }
    }

    /// Overwrite an existing user record in place.
    ///
    /// Indexes are not rewritten, so email and full name must be unchanged.
    #[cfg(test)]
    pub(crate) fn replace_user(&self, user: &StoredUser) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;
        let id = user.id.to_string();
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            users.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

impl CredentialStore for RedbStore {
    fn user_by_id(&self, id: Uuid) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let key = id.to_string();
        match users.get(key.as_str())? {
            Some(value) => Ok(Some(from_json(value.value())?)),
            None => Ok(None),
        }
    }

    fn user_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        self.user_via_index(USERS_BY_EMAIL, email)
    }

    fn user_by_name(&self, full_name: &str) -> StoreResult<Option<StoredUser>> {
        self.user_via_index(USERS_BY_NAME, full_name)
    }

    fn create_user(&self, user: NewUser) -> StoreResult<Uuid> {
        let record = StoredUser {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::default(),
            is_active: true,
            created_at: Utc::now(),
        };
        let id = record.id.to_string();
        let json = serde_json::to_vec(&record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            if by_email.get(record.email.as_str())?.is_some() {
                return Err(StoreError::UniqueViolation(UniqueKey::UserEmail));
            }

            let mut by_name = write_txn.open_table(USERS_BY_NAME)?;
            if by_name.get(record.full_name.as_str())?.is_some() {
                return Err(StoreError::UniqueViolation(UniqueKey::UserFullName));
            }

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id.as_str(), json.as_slice())?;
            by_email.insert(record.email.as_str(), id.as_str())?;
            by_name.insert(record.full_name.as_str(), id.as_str())?;
        }
        write_txn.commit()?;

        Ok(record.id)
    }
}

impl RestaurantStore for RedbStore {
    fn restaurant_by_name(&self, name: &str) -> StoreResult<Option<StoredRestaurant>> {
        let read_txn = self.db.begin_read()?;
        let by_name = read_txn.open_table(RESTAURANTS_BY_NAME)?;
        let id = match by_name.get(name)? {
            Some(value) => value.value(),
            None => return Ok(None),
        };

        let restaurants = read_txn.open_table(RESTAURANTS)?;
        match restaurants.get(id)? {
            Some(value) => Ok(Some(from_json(value.value())?)),
            None => Err(StoreError::Corrupt(format!(
                "index entry {name} points at missing restaurant {id}"
            ))),
        }
    }

    fn create_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<u64> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut by_name = write_txn.open_table(RESTAURANTS_BY_NAME)?;
            if by_name.get(restaurant.name.as_str())?.is_some() {
                return Err(StoreError::UniqueViolation(UniqueKey::RestaurantName));
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let last = sequences
                .get(RESTAURANT_SEQUENCE)?
                .map(|value| value.value())
                .unwrap_or(0);
            let id = last + 1;
            sequences.insert(RESTAURANT_SEQUENCE, id)?;

            let record = StoredRestaurant {
                id,
                owner_user_id: restaurant.owner_user_id,
                name: restaurant.name,
                description: restaurant.description,
                address: restaurant.address,
                category: restaurant.category,
                city: restaurant.city,
                district: restaurant.district,
                logo_url: restaurant.logo_url,
                banner_url: restaurant.banner_url,
                phone_number: restaurant.phone_number,
                website_url: restaurant.website_url,
                email: restaurant.email,
                created_at: Utc::now(),
            };
            let json = serde_json::to_vec(&record)?;

            let mut restaurants = write_txn.open_table(RESTAURANTS)?;
            restaurants.insert(id, json.as_slice())?;
            by_name.insert(record.name.as_str(), id)?;
            id
        };
        write_txn.commit()?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser {
            full_name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    fn new_restaurant(name: &str) -> NewRestaurant {
        NewRestaurant {
            owner_user_id: Uuid::new_v4(),
            name: name.to_string(),
            address: Some("1 Main St".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_and_lookup_user() {
        let store = RedbStore::in_memory().unwrap();
        let id = store.create_user(new_user("a@x.com", "A")).unwrap();

        let by_id = store.user_by_id(id).unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.full_name, "A");
        assert_eq!(by_id.role, Role::Customer);
        assert!(by_id.is_active);

        assert_eq!(store.user_by_email("a@x.com").unwrap(), Some(by_id.clone()));
        assert_eq!(store.user_by_name("A").unwrap(), Some(by_id));
    }

    #[test]
    fn lookups_miss_with_none() {
        let store = RedbStore::in_memory().unwrap();
        assert!(store.user_by_id(Uuid::new_v4()).unwrap().is_none());
        assert!(store.user_by_email("nobody@x.com").unwrap().is_none());
        assert!(store.user_by_name("Nobody").unwrap().is_none());
        assert!(store.restaurant_by_name("Nowhere").unwrap().is_none());
    }

    #[test]
    fn insert_rejects_duplicate_email_and_name() {
        let store = RedbStore::in_memory().unwrap();
        store.create_user(new_user("a@x.com", "A")).unwrap();

        let dup_email = store.create_user(new_user("a@x.com", "B"));
        assert!(matches!(
            dup_email,
            Err(StoreError::UniqueViolation(UniqueKey::UserEmail))
        ));

        let dup_name = store.create_user(new_user("b@x.com", "A"));
        assert!(matches!(
            dup_name,
            Err(StoreError::UniqueViolation(UniqueKey::UserFullName))
        ));

        // The failed inserts left nothing behind
        assert!(store.user_by_email("b@x.com").unwrap().is_none());
        assert_eq!(store.user_by_name("A").unwrap().unwrap().email, "a@x.com");
    }

    #[test]
    fn restaurant_ids_are_sequential() {
        let store = RedbStore::in_memory().unwrap();
        let first = store.create_restaurant(new_restaurant("Pho 24")).unwrap();
        let second = store.create_restaurant(new_restaurant("Banh Mi 25")).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let loaded = store.restaurant_by_name("Banh Mi 25").unwrap().unwrap();
        assert_eq!(loaded.id, 2);
        assert_eq!(loaded.address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn restaurant_name_is_unique() {
        let store = RedbStore::in_memory().unwrap();
        store.create_restaurant(new_restaurant("Pho 24")).unwrap();

        let dup = store.create_restaurant(new_restaurant("Pho 24"));
        assert!(matches!(
            dup,
            Err(StoreError::UniqueViolation(UniqueKey::RestaurantName))
        ));

        // Sequence did not advance for the rejected insert
        assert_eq!(store.create_restaurant(new_restaurant("Com Tam")).unwrap(), 2);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bistro.redb");

        let id = {
            let store = RedbStore::open(&path).unwrap();
            store.create_user(new_user("a@x.com", "A")).unwrap()
        };

        let store = RedbStore::open(&path).unwrap();
        assert!(store.check().is_ok());
        assert_eq!(store.user_by_id(id).unwrap().unwrap().email, "a@x.com");
    }

    #[test]
    fn open_fails_when_parent_is_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let result = RedbStore::open(&blocker.join("bistro.redb"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn replace_user_overwrites_record() {
        let store = RedbStore::in_memory().unwrap();
        let id = store.create_user(new_user("a@x.com", "A")).unwrap();

        let mut user = store.user_by_id(id).unwrap().unwrap();
        user.is_active = false;
        store.replace_user(&user).unwrap();

        assert!(!store.user_by_email("a@x.com").unwrap().unwrap().is_active);
    }
}
