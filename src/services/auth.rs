// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth use-cases: register, login, refresh, logout.
//!
//! Login and refresh write through to the session store; refresh commits
//! with an epoch guard so a sign-out that raced the network call cannot be
//! undone by the late token write.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{AuthTokens, Session, User};
use crate::services::envelope;
use crate::services::gate::ApiGate;
use crate::store::SessionStore;

/// Auth API client with session write-through.
#[derive(Clone)]
pub struct AuthService {
    gate: ApiGate,
    store: SessionStore,
}

impl AuthService {
    pub fn new(gate: ApiGate, store: SessionStore) -> Self {
        Self { gate, store }
    }

    /// Create an account. No session is established; callers log in next.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let response = self
            .gate
            .post(
                "api/v1/auth/register",
                &RegisterRequest {
                    email,
                    password,
                    full_name,
                },
            )
            .await?;
        let user: User = envelope::unwrap_data(response).await?;
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Sign in and persist the full session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let response = self
            .gate
            .post("api/v1/auth/login", &LoginRequest { email, password })
            .await?;
        let payload: LoginPayload = envelope::unwrap_data(response).await?;

        let session = Session {
            user: payload.user,
            tokens: AuthTokens::issued_now(
                payload.access_token,
                payload.refresh_token,
                payload.expires_in,
            ),
        };
        self.store.save_session(&session).await?;

        tracing::info!(user_id = %session.user.id, "Login succeeded, session persisted");
        Ok(session)
    }

    /// Rotate the token pair using the stored refresh token.
    ///
    /// The write back is epoch-guarded: when a sign-out cleared the session
    /// while the request was in flight, the fresh pair is dropped and the
    /// refresh reports failure.
    pub async fn refresh(&self) -> Result<AuthTokens, ApiError> {
        let epoch = self.store.session_epoch().await;
        let refresh_token = self
            .store
            .get_refresh_token()
            .await
            .ok_or(ApiError::NoRefreshToken)?;

        let response = self
            .gate
            .post(
                "api/v1/auth/refresh",
                &RefreshRequest {
                    refresh_token: &refresh_token,
                },
            )
            .await?;
        let payload: TokenPayload = envelope::unwrap_data(response).await?;

        let tokens = AuthTokens::issued_now(
            payload.access_token,
            payload.refresh_token,
            payload.expires_in,
        );

        if !self.store.save_tokens_at(&tokens, epoch).await? {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "session cleared while refreshing, new tokens dropped"
            )));
        }

        tracing::debug!("Token pair rotated");
        Ok(tokens)
    }

    /// Sign out: best-effort server call, unconditional local clear.
    ///
    /// Only a storage failure surfaces; the server being unreachable or
    /// rejecting the call still ends with the local session removed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(refresh_token) = self.store.get_refresh_token().await {
            match self
                .gate
                .post(
                    "api/v1/auth/logout",
                    &LogoutRequest {
                        refresh_token: &refresh_token,
                    },
                )
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        status = response.status().as_u16(),
                        "Server rejected logout, clearing locally anyway"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Logout request failed, clearing locally anyway");
                }
            }
        }

        self.store.clear_session().await?;
        tracing::info!("Signed out, local session cleared");
        Ok(())
    }
}

// ─── Wire Types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct LogoutRequest<'a> {
    refresh_token: &'a str,
}

/// Login payload: the signed-in user plus a fresh token pair.
#[derive(Debug, Clone, Deserialize)]
struct LoginPayload {
    user: User,
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

/// Refresh payload: the rotated token pair.
#[derive(Debug, Clone, Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}
