// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Note and pagination models.

use serde::{Deserialize, Serialize};

/// A note as presented to callers (content already resolved, see the notes
/// service for the content/preview fallback on list responses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned note ID
    pub id: String,
    /// Title
    pub title: String,
    /// Full text, or the server-side preview when only that was returned
    pub content: String,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Whether the note is visible on the public listing
    pub is_public: bool,
    /// Owning user ID
    pub user_id: String,
    /// Creation timestamp (RFC 3339, kept as received)
    pub created_at: String,
    /// Last update timestamp (RFC 3339, kept as received)
    pub updated_at: String,
}

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: i64,
    /// Page size requested
    pub limit: i64,
    /// Total matching notes
    pub total: i64,
    /// Total pages at this limit
    pub total_pages: i64,
    /// Whether a next page exists
    pub has_next: bool,
    /// Whether a previous page exists
    pub has_prev: bool,
}

/// One page of notes plus its paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub pagination: Pagination,
}
