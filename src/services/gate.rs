// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticating request gate.
//!
//! Every API request flows through [`ApiGate::dispatch`] exactly once:
//! - attaches the stored bearer token to non-exempt requests
//! - clears the local session when the server answers 401/403
//! - hands the response back unchanged either way (no retries)

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::error::ApiError;
use crate::store::SessionStore;

/// Paths dispatched without credentials and without invalidation handling.
/// Matched by substring, so versioned prefixes don't need listing.
const EXEMPT_PATH_MARKERS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/refresh"];

/// HTTP gate in front of the GoNotes API.
#[derive(Clone)]
pub struct ApiGate {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
}

impl ApiGate {
    /// Build the gate with the configured base URL and timeouts.
    pub fn new(config: &Config, store: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Whether `path` bypasses credential handling entirely.
    pub fn is_exempt(path: &str) -> bool {
        EXEMPT_PATH_MARKERS.iter().any(|marker| path.contains(marker))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ─── Request Verbs ───────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.dispatch(path, self.http.get(self.url(path))).await
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<reqwest::Response, ApiError> {
        self.dispatch(path, self.http.get(self.url(path)).query(query))
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        self.dispatch(path, self.http.post(self.url(path)).json(body))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        self.dispatch(path, self.http.put(self.url(path)).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.dispatch(path, self.http.delete(self.url(path))).await
    }

    // ─── Dispatch ────────────────────────────────────────────────

    /// Single choke point for every outgoing request.
    ///
    /// The token read completes before the request goes out, so a send in
    /// progress never observes a half-written session.
    async fn dispatch(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let exempt = Self::is_exempt(path);

        let request = if exempt {
            request
        } else {
            match self.store.get_access_token().await {
                Some(token) => request.bearer_auth(token),
                // No stored token: send unauthenticated and let the server decide
                None => request,
            }
        };

        let response = request.send().await?;

        let status = response.status().as_u16();
        if !exempt && (status == 401 || status == 403) {
            tracing::warn!(path, status, "Auth failure from API, clearing local session");
            if let Err(e) = self.store.clear_session().await {
                tracing::error!(error = %e, "Failed to clear session after auth failure");
            }
        }

        Ok(response)
    }
}
