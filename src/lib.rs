// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GoNotes client: session handling and typed API access for the GoNotes
//! notes service.
//!
//! The crate owns the durable session store, the authenticating request
//! gate, the background refresh coordinator, and thin clients for the auth,
//! notes and profile endpoints.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use error::ApiError;
use models::Session;
use services::{ApiGate, AuthService, NotesService, SessionCoordinator, UserService};
use store::SessionStore;

/// Fully assembled client.
///
/// Components are wired once here and shared by cloning; nothing reads
/// global state after construction.
pub struct GoNotesClient {
    pub config: Config,
    pub store: SessionStore,
    pub auth: AuthService,
    pub notes: NotesService,
    pub users: UserService,
    pub coordinator: Arc<SessionCoordinator>,
}

impl GoNotesClient {
    /// Open the configured session file and assemble the client.
    ///
    /// The coordinator is not started; call [`GoNotesClient::start`] once
    /// the runtime is up.
    pub async fn new(config: Config) -> Result<Self, ApiError> {
        let store = SessionStore::open(config.session_file.clone()).await?;
        Self::with_store(config, store)
    }

    /// Assemble against an existing store (in-memory stores in tests).
    pub fn with_store(config: Config, store: SessionStore) -> Result<Self, ApiError> {
        let gate = ApiGate::new(&config, store.clone())?;
        let auth = AuthService::new(gate.clone(), store.clone());
        let notes = NotesService::new(gate.clone());
        let users = UserService::new(gate, store.clone());
        let coordinator = Arc::new(SessionCoordinator::new(store.clone(), auth.clone()));

        Ok(Self {
            config,
            store,
            auth,
            notes,
            users,
            coordinator,
        })
    }

    /// Resolve the stored session and start the background watchers.
    pub async fn start(&self) -> Result<(), ApiError> {
        self.coordinator.start().await
    }

    /// Sign in and flip the login signal on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let session = self.auth.login(email, password).await?;
        self.coordinator.notify_login_success();
        Ok(session)
    }

    /// Sign out from any state; see [`SessionCoordinator::logout`].
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.coordinator.logout().await
    }

    /// Stop the background watchers.
    pub async fn shutdown(&self) {
        self.coordinator.shutdown().await;
    }
}
