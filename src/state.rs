// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::token::TokenIssuer;
use crate::auth::SessionGate;
use crate::clock::Clock;
use crate::config::AuthSettings;
use crate::service::{AuthService, RestaurantService};
use crate::storage::{RedbStore, SessionCache};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub restaurants: Arc<RestaurantService>,
    pub gate: Arc<SessionGate>,
    /// Kept for readiness checks
    pub store: Arc<RedbStore>,
}

impl AppState {
    pub fn new(
        settings: &AuthSettings,
        store: Arc<RedbStore>,
        cache: Arc<dyn SessionCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenIssuer::new(settings.issuer.clone(), clock.clone());
        Self {
            auth: Arc::new(AuthService::new(
                store.clone(),
                cache.clone(),
                tokens.clone(),
                settings,
            )),
            restaurants: Arc::new(RestaurantService::new(store.clone())),
            gate: Arc::new(SessionGate::new(
                tokens,
                &settings.access_secret,
                cache,
                clock,
            )),
            store,
        }
    }
}
