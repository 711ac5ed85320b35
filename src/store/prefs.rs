// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable session store backed by a JSON preference file.
//!
//! Provides high-level operations for:
//! - Sessions (user profile + token pair, written together)
//! - Tokens (rotation on refresh, with a clear-epoch write guard)
//! - Reactive feeds (latest tokens/user, replayed to new subscribers)
//!
//! Writers serialize on one lock and every write commits via temp-file +
//! rename, so a failed write leaves both the file and the in-memory view
//! unchanged. A caller that awaits one save before issuing the next will
//! observe its writes land in that order.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{watch, Mutex};

use crate::error::ApiError;
use crate::models::{AuthTokens, Session, User, DEFAULT_EXPIRY_BUFFER_SECS};
use crate::store::keys;

/// Session store handle; clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    /// Backing file. `None` runs the store purely in memory.
    path: Option<PathBuf>,
    state: Mutex<State>,
    tokens_tx: watch::Sender<Option<AuthTokens>>,
    user_tx: watch::Sender<Option<User>>,
}

struct State {
    prefs: Map<String, Value>,
    /// Bumped on every clear. Guarded writes captured before a clear are
    /// refused, so a stale refresh cannot resurrect a signed-out session.
    clear_epoch: u64,
}

impl SessionStore {
    /// Open (or create) the store at `path`.
    ///
    /// A missing file starts the store empty; an unreadable or corrupt file
    /// is surfaced as a storage error rather than silently discarded.
    pub async fn open(path: PathBuf) -> Result<Self, ApiError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ApiError::Storage(format!("create {}: {}", parent.display(), e))
                })?;
            }
        }

        let prefs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Map<String, Value>>(&bytes)
                .map_err(|e| ApiError::Storage(format!("parse {}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(ApiError::Storage(format!("read {}: {}", path.display(), e)))
            }
        };

        tracing::info!(
            path = %path.display(),
            logged_in = string_pref(&prefs, keys::ACCESS_TOKEN).is_some(),
            "Opened session store"
        );

        Ok(Self::from_parts(Some(path), prefs))
    }

    /// Create a store with no backing file (testing / ephemeral sessions).
    pub fn in_memory() -> Self {
        Self::from_parts(None, Map::new())
    }

    fn from_parts(path: Option<PathBuf>, prefs: Map<String, Value>) -> Self {
        let (tokens_tx, _) = watch::channel(tokens_from_prefs(&prefs));
        let (user_tx, _) = watch::channel(user_from_prefs(&prefs));
        Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(State {
                    prefs,
                    clear_epoch: 0,
                }),
                tokens_tx,
                user_tx,
            }),
        }
    }

    // ─── Write Operations ────────────────────────────────────────

    /// Persist a full session (user profile + tokens) in one commit.
    pub async fn save_session(&self, session: &Session) -> Result<(), ApiError> {
        let mut state = self.inner.state.lock().await;
        self.commit_locked(&mut state, |prefs| {
            put_tokens(prefs, &session.tokens);
            put_user(prefs, &session.user);
        })
        .await
    }

    /// Persist a token pair, leaving any stored user untouched.
    pub async fn save_tokens(&self, tokens: &AuthTokens) -> Result<(), ApiError> {
        let mut state = self.inner.state.lock().await;
        self.commit_locked(&mut state, |prefs| put_tokens(prefs, tokens))
            .await
    }

    /// Persist a token pair only if no clear ran since `epoch` was captured
    /// with [`SessionStore::session_epoch`].
    ///
    /// Returns `false` (and writes nothing) when the session was cleared in
    /// the meantime.
    pub async fn save_tokens_at(&self, tokens: &AuthTokens, epoch: u64) -> Result<bool, ApiError> {
        let mut state = self.inner.state.lock().await;
        if state.clear_epoch != epoch {
            tracing::debug!(
                captured = epoch,
                current = state.clear_epoch,
                "Token write superseded by a session clear, dropping it"
            );
            return Ok(false);
        }
        self.commit_locked(&mut state, |prefs| put_tokens(prefs, tokens))
            .await?;
        Ok(true)
    }

    /// Remove every stored session value. Safe to call repeatedly.
    pub async fn clear_session(&self) -> Result<(), ApiError> {
        let mut state = self.inner.state.lock().await;
        state.clear_epoch += 1;
        self.commit_locked(&mut state, |prefs| {
            for key in keys::ALL {
                prefs.remove(key);
            }
        })
        .await
    }

    /// Epoch snapshot for guarded writes; bumped by every clear.
    pub async fn session_epoch(&self) -> u64 {
        self.inner.state.lock().await.clear_epoch
    }

    // ─── Read Operations ─────────────────────────────────────────

    pub async fn get_access_token(&self) -> Option<String> {
        let state = self.inner.state.lock().await;
        string_pref(&state.prefs, keys::ACCESS_TOKEN)
    }

    pub async fn get_refresh_token(&self) -> Option<String> {
        let state = self.inner.state.lock().await;
        string_pref(&state.prefs, keys::REFRESH_TOKEN)
    }

    /// Stored token pair, or `None` unless all four token values are present
    /// and well-formed.
    pub async fn get_tokens(&self) -> Option<AuthTokens> {
        let state = self.inner.state.lock().await;
        tokens_from_prefs(&state.prefs)
    }

    /// Stored user, or `None` unless all five profile values are present.
    pub async fn get_current_user(&self) -> Option<User> {
        let state = self.inner.state.lock().await;
        user_from_prefs(&state.prefs)
    }

    /// Stored session, requiring both a complete user and a complete pair.
    pub async fn get_current_session(&self) -> Option<Session> {
        let state = self.inner.state.lock().await;
        let user = user_from_prefs(&state.prefs)?;
        let tokens = tokens_from_prefs(&state.prefs)?;
        Some(Session { user, tokens })
    }

    /// Access token presence; does not imply the token is still valid.
    pub async fn is_logged_in(&self) -> bool {
        self.get_access_token().await.is_some()
    }

    /// Expiry check against the stored pair. Fails safe: no stored pair
    /// reads as expired.
    pub async fn is_access_token_expired(&self) -> bool {
        match self.get_tokens().await {
            Some(tokens) => tokens.is_expired(),
            None => true,
        }
    }

    /// Near-expiry check with the default buffer; absent pair reads as
    /// near expiry.
    pub async fn is_access_token_near_expiry(&self) -> bool {
        self.is_access_token_near_expiry_within(DEFAULT_EXPIRY_BUFFER_SECS)
            .await
    }

    pub async fn is_access_token_near_expiry_within(&self, buffer_secs: i64) -> bool {
        match self.get_tokens().await {
            Some(tokens) => tokens.is_near_expiry(buffer_secs),
            None => true,
        }
    }

    // ─── Feeds ───────────────────────────────────────────────────

    /// Feed of the stored token pair. New subscribers immediately observe
    /// the latest value; each committed change is published once.
    pub fn tokens_feed(&self) -> watch::Receiver<Option<AuthTokens>> {
        self.inner.tokens_tx.subscribe()
    }

    /// Feed of the stored user profile, same contract as `tokens_feed`.
    pub fn user_feed(&self) -> watch::Receiver<Option<User>> {
        self.inner.user_tx.subscribe()
    }

    // ─── Commit Path ─────────────────────────────────────────────

    /// Apply `mutate` to a copy of the prefs, persist it, then swap it in
    /// and publish. Must be called with the state lock held.
    async fn commit_locked(
        &self,
        state: &mut State,
        mutate: impl FnOnce(&mut Map<String, Value>),
    ) -> Result<(), ApiError> {
        let mut next = state.prefs.clone();
        mutate(&mut next);
        self.persist(&next).await?;
        state.prefs = next;
        self.publish(&state.prefs);
        Ok(())
    }

    async fn persist(&self, prefs: &Map<String, Value>) -> Result<(), ApiError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(prefs)
            .map_err(|e| ApiError::Storage(format!("encode session: {}", e)))?;

        // Write-then-rename so a crash mid-write never truncates the live file.
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| ApiError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| ApiError::Storage(format!("rename {}: {}", path.display(), e)))?;

        Ok(())
    }

    fn publish(&self, prefs: &Map<String, Value>) {
        let tokens = tokens_from_prefs(prefs);
        self.inner.tokens_tx.send_if_modified(|current| {
            if *current != tokens {
                *current = tokens;
                true
            } else {
                false
            }
        });

        let user = user_from_prefs(prefs);
        self.inner.user_tx.send_if_modified(|current| {
            if *current != user {
                *current = user;
                true
            } else {
                false
            }
        });
    }
}

// ─── Preference Codec ────────────────────────────────────────────

fn string_pref(prefs: &Map<String, Value>, key: &str) -> Option<String> {
    prefs.get(key)?.as_str().map(str::to_string)
}

fn put_tokens(prefs: &mut Map<String, Value>, tokens: &AuthTokens) {
    prefs.insert(
        keys::ACCESS_TOKEN.to_string(),
        Value::from(tokens.access_token.clone()),
    );
    prefs.insert(
        keys::REFRESH_TOKEN.to_string(),
        Value::from(tokens.refresh_token.clone()),
    );
    prefs.insert(
        keys::TOKEN_EXPIRES_IN.to_string(),
        Value::from(tokens.expires_in),
    );
    // issued_at travels as a string to survive preference stores without
    // a 64-bit integer type
    prefs.insert(
        keys::TOKEN_ISSUED_AT.to_string(),
        Value::from(tokens.issued_at.to_string()),
    );
}

fn put_user(prefs: &mut Map<String, Value>, user: &User) {
    prefs.insert(keys::USER_ID.to_string(), Value::from(user.id.clone()));
    prefs.insert(
        keys::USER_EMAIL.to_string(),
        Value::from(user.email.clone()),
    );
    prefs.insert(
        keys::USER_FULL_NAME.to_string(),
        Value::from(user.full_name.clone()),
    );
    prefs.insert(
        keys::USER_CREATED_AT.to_string(),
        Value::from(user.created_at.clone()),
    );
    prefs.insert(
        keys::USER_UPDATED_AT.to_string(),
        Value::from(user.updated_at.clone()),
    );
}

/// Strict reconstruction: all four token values or nothing.
fn tokens_from_prefs(prefs: &Map<String, Value>) -> Option<AuthTokens> {
    let access_token = string_pref(prefs, keys::ACCESS_TOKEN)?;
    let refresh_token = string_pref(prefs, keys::REFRESH_TOKEN)?;
    let expires_in = prefs.get(keys::TOKEN_EXPIRES_IN)?.as_i64()?;
    let issued_at = string_pref(prefs, keys::TOKEN_ISSUED_AT)?.parse().ok()?;
    Some(AuthTokens {
        access_token,
        refresh_token,
        expires_in,
        issued_at,
    })
}

/// Strict reconstruction: all five user values or nothing.
fn user_from_prefs(prefs: &Map<String, Value>) -> Option<User> {
    Some(User {
        id: string_pref(prefs, keys::USER_ID)?,
        email: string_pref(prefs, keys::USER_EMAIL)?,
        full_name: string_pref(prefs, keys::USER_FULL_NAME)?,
        created_at: string_pref(prefs, keys::USER_CREATED_AT)?,
        updated_at: string_pref(prefs, keys::USER_UPDATED_AT)?,
    })
}
