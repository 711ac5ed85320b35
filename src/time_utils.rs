// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for clock access.

use chrono::Utc;

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// Token issue/expiry arithmetic is done entirely in this unit.
pub fn now_epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
