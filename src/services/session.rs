// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle coordinator.
//!
//! Owns the login signal and the two background watchers:
//! - the invalidation watcher flips the signal off when the stored tokens
//!   disappear (gate-triggered clears, sign-out on another task)
//! - the proactive loop refreshes the pair shortly before expiry and signs
//!   out completely when that refresh fails
//!
//! At startup the signal stays `false` until the stored session has been
//! validated by a refresh; once signed out, only an explicit
//! [`SessionCoordinator::notify_login_success`] turns it back on.

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ApiError;
use crate::models::AuthTokens;
use crate::services::auth::AuthService;
use crate::store::SessionStore;

/// Cadence of the proactive expiry check (30 seconds).
const TOKEN_CHECK_INTERVAL_SECS: u64 = 30;

/// Margin before token expiration when we proactively refresh (2 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 2 * 60;

/// Timing knobs for the proactive refresh loop.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    /// Gap between expiry checks; the first check fires one full gap after
    /// start.
    pub check_interval: std::time::Duration,
    /// Refresh once the access token is within this many seconds of expiry.
    pub refresh_margin_secs: i64,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            check_interval: std::time::Duration::from_secs(TOKEN_CHECK_INTERVAL_SECS),
            refresh_margin_secs: TOKEN_REFRESH_MARGIN_SECS,
        }
    }
}

/// Coordinates the login signal, startup session validation, and the
/// background watchers. One instance per client, shared behind an `Arc`.
pub struct SessionCoordinator {
    store: SessionStore,
    auth: AuthService,
    policy: RefreshPolicy,
    logged_in_tx: watch::Sender<bool>,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionCoordinator {
    pub fn new(store: SessionStore, auth: AuthService) -> Self {
        Self::with_policy(store, auth, RefreshPolicy::default())
    }

    pub fn with_policy(store: SessionStore, auth: AuthService, policy: RefreshPolicy) -> Self {
        let (logged_in_tx, _) = watch::channel(false);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            store,
            auth,
            policy,
            logged_in_tx,
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Feed of the login signal. New subscribers immediately observe the
    /// current value; each transition is published exactly once.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.logged_in_tx.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        *self.logged_in_tx.borrow()
    }

    /// Resolve the stored session and start the background watchers.
    ///
    /// A stored session is only trusted after a refresh succeeds; any
    /// failure (missing refresh token included) goes through the full
    /// sign-out path. Meant to be called once; repeat calls are no-ops.
    pub async fn start(&self) -> Result<(), ApiError> {
        if !self.handles.lock().await.is_empty() {
            return Ok(());
        }

        if self.store.is_logged_in().await {
            match self.auth.refresh().await {
                Ok(_) => {
                    set_signal(&self.logged_in_tx, true);
                    tracing::info!("Stored session validated, signed in");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Startup token refresh failed, signing out");
                    set_signal(&self.logged_in_tx, false);
                    self.auth.logout().await?;
                }
            }
        } else {
            tracing::debug!("No stored session");
            set_signal(&self.logged_in_tx, false);
        }

        let mut handles = self.handles.lock().await;
        handles.push(tokio::spawn(run_invalidation_watcher(
            self.store.tokens_feed(),
            self.logged_in_tx.clone(),
            self.shutdown_tx.subscribe(),
        )));
        handles.push(tokio::spawn(run_refresh_loop(
            self.store.clone(),
            self.auth.clone(),
            self.logged_in_tx.clone(),
            self.policy,
            self.shutdown_tx.subscribe(),
        )));

        Ok(())
    }

    /// Mark the session established after a successful login call.
    pub fn notify_login_success(&self) {
        if set_signal(&self.logged_in_tx, true) {
            tracing::info!("Signed in");
        }
    }

    /// Sign out from any state.
    ///
    /// The server call is best-effort and the local clear unconditional, so
    /// the signal drops to `false` even when the network is down; only a
    /// storage failure surfaces.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.auth.logout().await;
        set_signal(&self.logged_in_tx, false);
        result
    }

    /// Stop both watchers. Idempotent; also runs on drop.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.lock().await.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Ok(mut handles) = self.handles.try_lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }
}

/// Flip the signal, reporting whether the value actually changed.
fn set_signal(tx: &watch::Sender<bool>, value: bool) -> bool {
    tx.send_if_modified(|current| {
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    })
}

/// Flip the login signal off whenever the stored tokens disappear.
///
/// Tokens appearing does not flip it on: that is reserved for login and
/// startup validation.
async fn run_invalidation_watcher(
    mut tokens_rx: watch::Receiver<Option<AuthTokens>>,
    logged_in_tx: watch::Sender<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            changed = tokens_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let present = tokens_rx.borrow_and_update().is_some();
                if !present && set_signal(&logged_in_tx, false) {
                    tracing::info!("Session tokens removed, marking signed out");
                }
            }
        }
    }
}

/// Refresh the token pair shortly before it expires.
///
/// Runs for the lifetime of the coordinator; checks are skipped while
/// signed out. A failed refresh ends the session entirely rather than
/// leaving a token that is about to go stale.
async fn run_refresh_loop(
    store: SessionStore,
    auth: AuthService,
    logged_in_tx: watch::Sender<bool>,
    policy: RefreshPolicy,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + policy.check_interval,
        policy.check_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        if !*logged_in_tx.borrow() {
            continue;
        }
        if !store
            .is_access_token_near_expiry_within(policy.refresh_margin_secs)
            .await
        {
            continue;
        }

        tracing::debug!("Access token near expiry, refreshing proactively");
        match auth.refresh().await {
            Ok(_) => tracing::info!("Proactive token refresh succeeded"),
            Err(e) => {
                tracing::warn!(error = %e, "Proactive token refresh failed, signing out");
                if let Err(e) = auth.logout().await {
                    tracing::error!(error = %e, "Local sign-out failed after refresh failure");
                }
                set_signal(&logged_in_tx, false);
            }
        }
    }
}
