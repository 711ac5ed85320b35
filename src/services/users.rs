// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile API client.

use serde::Serialize;

use crate::error::ApiError;
use crate::models::{Session, User};
use crate::services::envelope;
use crate::services::gate::ApiGate;
use crate::store::SessionStore;

/// Profile API client with session write-through on update.
#[derive(Clone)]
pub struct UserService {
    gate: ApiGate,
    store: SessionStore,
}

impl UserService {
    pub fn new(gate: ApiGate, store: SessionStore) -> Self {
        Self { gate, store }
    }

    /// Fetch the signed-in user's profile. Read-only; the stored session is
    /// not touched.
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let response = self.gate.get("api/v1/user/profile").await?;
        envelope::unwrap_data(response).await
    }

    /// Change the display name.
    ///
    /// The endpoint requires the email alongside the new name, which is read
    /// from the stored user. On success the stored session (when one is
    /// still present) is rewritten with the server's updated profile.
    pub async fn update_profile(&self, full_name: &str) -> Result<User, ApiError> {
        let current = self
            .store
            .get_current_user()
            .await
            .ok_or_else(|| ApiError::NotFound("current user".to_string()))?;

        let response = self
            .gate
            .put(
                "api/v1/user/profile",
                &UpdateProfileRequest {
                    email: &current.email,
                    full_name,
                },
            )
            .await?;
        let updated: User = envelope::unwrap_data(response).await?;

        if let Some(session) = self.store.get_current_session().await {
            self.store
                .save_session(&Session {
                    user: updated.clone(),
                    tokens: session.tokens,
                })
                .await?;
        }

        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }
}

// ─── Wire Types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct UpdateProfileRequest<'a> {
    email: &'a str,
    full_name: &'a str,
}
