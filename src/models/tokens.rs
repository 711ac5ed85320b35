// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Auth token pair with client-side expiry tracking.

use serde::{Deserialize, Serialize};

use crate::time_utils::now_epoch_millis;

/// Default slack used when deciding a token is "about to expire".
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 60;

/// Access/refresh token pair as issued by the auth endpoints.
///
/// The server reports a relative lifetime (`expires_in`); the client stamps
/// `issued_at` the moment the pair is received, and every expiry decision is
/// derived from those two fields. Clock skew against the server is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Bearer token attached to authenticated requests
    pub access_token: String,
    /// Long-lived token used only against the refresh endpoint
    pub refresh_token: String,
    /// Access token lifetime in seconds, relative to `issued_at`
    pub expires_in: i64,
    /// Client receipt time, milliseconds since the Unix epoch
    pub issued_at: i64,
}

impl AuthTokens {
    /// Build a pair stamped with the current wall clock.
    pub fn issued_now(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            issued_at: now_epoch_millis(),
        }
    }

    /// Absolute expiry instant in epoch milliseconds.
    pub fn expires_at_millis(&self) -> i64 {
        self.issued_at + self.expires_in * 1000
    }

    /// True once `now_millis` has reached the expiry instant.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at_millis()
    }

    /// True once `now_millis` is within `buffer_secs` of the expiry instant.
    ///
    /// An already-expired token is always near expiry.
    pub fn is_near_expiry_at(&self, now_millis: i64, buffer_secs: i64) -> bool {
        now_millis >= self.expires_at_millis() - buffer_secs * 1000
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_epoch_millis())
    }

    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.is_near_expiry_at(now_epoch_millis(), buffer_secs)
    }
}
