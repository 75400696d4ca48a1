// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Restaurant registration.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::storage::{NewRestaurant, RestaurantStore, StoreError, UniqueKey};

#[derive(Debug, thiserror::Error)]
pub enum RestaurantError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid name")]
    InvalidName,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid banner")]
    InvalidBanner,

    #[error("Invalid logo")]
    InvalidLogo,

    #[error("Invalid phone number")]
    InvalidPhoneNumber,

    #[error("Name already exists")]
    NameAlreadyExists,

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// Restaurant fields as submitted by the owner.
#[derive(Debug, Clone, Default)]
pub struct RestaurantDraft {
    pub name: String,
    pub email: String,
    pub address: String,
    pub logo_url: String,
    pub banner_url: String,
    pub phone_number: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub website_url: Option<String>,
}

impl RestaurantDraft {
    fn validate(&self) -> Result<(), RestaurantError> {
        if !self.email.contains('@') {
            return Err(RestaurantError::InvalidEmail);
        }
        let required = [
            (&self.name, RestaurantError::InvalidName),
            (&self.address, RestaurantError::InvalidAddress),
            (&self.banner_url, RestaurantError::InvalidBanner),
            (&self.logo_url, RestaurantError::InvalidLogo),
            (&self.phone_number, RestaurantError::InvalidPhoneNumber),
        ];
        for (value, err) in required {
            if value.trim().is_empty() {
                return Err(err);
            }
        }
        Ok(())
    }
}

pub struct RestaurantService {
    store: Arc<dyn RestaurantStore>,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    /// Register a restaurant owned by `owner_user_id` and return its id.
    pub fn create(&self, owner_user_id: Uuid, draft: RestaurantDraft) -> Result<u64, RestaurantError> {
        draft.validate()?;

        if self.store.restaurant_by_name(&draft.name)?.is_some() {
            return Err(RestaurantError::NameAlreadyExists);
        }

        let id = self
            .store
            .create_restaurant(NewRestaurant {
                owner_user_id,
                name: draft.name,
                description: draft.description,
                address: Some(draft.address),
                category: draft.category,
                city: draft.city,
                district: draft.district,
                logo_url: Some(draft.logo_url),
                banner_url: Some(draft.banner_url),
                phone_number: Some(draft.phone_number),
                website_url: draft.website_url,
                email: Some(draft.email),
            })
            .map_err(|e| match e {
                StoreError::UniqueViolation(UniqueKey::RestaurantName) => {
                    RestaurantError::NameAlreadyExists
                }
                other => RestaurantError::Store(other),
            })?;

        info!(restaurant_id = id, %owner_user_id, "restaurant created");
        Ok(id)
    }
}
