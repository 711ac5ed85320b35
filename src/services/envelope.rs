// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GoNotes response envelope handling.
//!
//! Every JSON endpoint (except note deletion) wraps its payload in a
//! standard envelope. Success is decided by the HTTP status line; the
//! envelope's own `status`/`code` fields are informational only.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;

/// Standard response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<String>,
    pub code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Decode a response into the envelope's `data` payload.
///
/// A 2xx response without a decodable `data` field is malformed; a non-2xx
/// response becomes an [`ApiError::Http`] carrying the envelope message
/// when one is present.
pub async fn unwrap_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        let body = response.text().await?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|_| ApiError::MalformedResponse)?;
        envelope.data.ok_or(ApiError::MalformedResponse)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status.as_u16(), &body))
    }
}

/// Accept any 2xx response, discarding the body.
pub async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status.as_u16(), &body))
}

/// Error for a non-2xx response: the envelope's `message` when the body
/// parses and carries one, otherwise the fixed per-status fallback.
pub fn error_from_body(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.is_empty());

    match message {
        Some(message) => ApiError::Http { status, message },
        None => ApiError::http_fallback(status),
    }
}
