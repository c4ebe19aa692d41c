// ABOUTME: Session context caching the signed-in user for all screens
// ABOUTME: Fetches the user once per session and invalidates the cache on logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Session Context
//!
//! Screens read the current user (language, onboarding flag, counters) from
//! here instead of calling `me()` on every visit. Writes go through
//! [`SessionContext::update`] so the cache never goes stale.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::constants::languages::DEFAULT_LANGUAGE;
use crate::errors::AppResult;
use crate::gateways::SessionGateway;
use crate::models::{User, UserPatch};

/// Per-session cache of the signed-in user
pub struct SessionContext {
    gateway: Arc<dyn SessionGateway>,
    user: RwLock<Option<User>>,
}

impl SessionContext {
    /// Create an empty context; nothing is fetched until first use
    #[must_use]
    pub fn new(gateway: Arc<dyn SessionGateway>) -> Self {
        Self {
            gateway,
            user: RwLock::new(None),
        }
    }

    /// The signed-in user, fetched on first call
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` without a session, or the gateway error.
    pub async fn current_user(&self) -> AppResult<User> {
        if let Some(user) = self.user.read().await.as_ref() {
            return Ok(user.clone());
        }

        let mut slot = self.user.write().await;
        if let Some(user) = slot.as_ref() {
            return Ok(user.clone());
        }
        let user = self.gateway.me().await?;
        debug!(user_id = %user.id, "Session user loaded");
        *slot = Some(user.clone());
        Ok(user)
    }

    /// The signed-in user, or `None` when there is no session
    ///
    /// # Errors
    ///
    /// Returns gateway errors other than `AuthRequired`.
    pub async fn optional_user(&self) -> AppResult<Option<User>> {
        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_auth_required() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Preferred language, `"en"` when unknown or signed out
    pub async fn language(&self) -> String {
        self.current_user()
            .await
            .map_or_else(|_| DEFAULT_LANGUAGE.to_owned(), |user| user.language().to_owned())
    }

    /// Update the signed-in user and refresh the cache
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cache is left untouched.
    pub async fn update(&self, patch: UserPatch) -> AppResult<User> {
        let user = self.gateway.update_me(patch).await?;
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// Drop the cached user so the next read refetches
    pub async fn invalidate(&self) {
        *self.user.write().await = None;
    }

    /// End the session and clear the cache
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cache is cleared either way.
    pub async fn logout(&self) -> AppResult<()> {
        let result = self.gateway.logout().await;
        self.invalidate().await;
        info!("Signed out");
        result
    }

    /// Login URL that returns to `return_to`
    #[must_use]
    pub fn login_url(&self, return_to: &str) -> String {
        self.gateway.login_url(return_to)
    }
}
