// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notes API client.
//!
//! Handles:
//! - Paged listing (own and public notes)
//! - Create/read/update/delete
//! - Server-side search
//!
//! List responses carry a `preview` instead of the full `content`; mapping
//! resolves whichever is present so callers always see one content field.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Note, NotesPage, Pagination};
use crate::services::envelope;
use crate::services::gate::ApiGate;

/// Note fields a caller supplies on create and update.
#[derive(Debug, Clone, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_public: bool,
}

/// Search parameters; doubles as the wire body of the search endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NoteSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for NoteSearch {
    fn default() -> Self {
        Self {
            query: None,
            tags: Vec::new(),
            is_public: None,
            page: 1,
            page_size: 20,
        }
    }
}

/// Notes API client; every call rides the authenticating gate.
#[derive(Clone)]
pub struct NotesService {
    gate: ApiGate,
}

impl NotesService {
    pub fn new(gate: ApiGate) -> Self {
        Self { gate }
    }

    /// List the signed-in user's notes, newest first.
    pub async fn list_notes(&self, page: u32, limit: u32) -> Result<NotesPage, ApiError> {
        let response = self
            .gate
            .get_with_query(
                "api/v1/notes",
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        let payload: NotesPayload = envelope::unwrap_data(response).await?;
        Ok(payload.into_page())
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> Result<Note, ApiError> {
        let response = self.gate.post("api/v1/notes", draft).await?;
        let dto: NoteDto = envelope::unwrap_data(response).await?;
        let note = dto.into_note();
        tracing::info!(note_id = %note.id, "Note created");
        Ok(note)
    }

    pub async fn get_note(&self, note_id: &str) -> Result<Note, ApiError> {
        let response = self
            .gate
            .get(&format!("api/v1/notes/{}", note_id))
            .await?;
        let dto: NoteDto = envelope::unwrap_data(response).await?;
        Ok(dto.into_note())
    }

    pub async fn update_note(&self, note_id: &str, draft: &NoteDraft) -> Result<Note, ApiError> {
        let response = self
            .gate
            .put(&format!("api/v1/notes/{}", note_id), draft)
            .await?;
        let dto: NoteDto = envelope::unwrap_data(response).await?;
        Ok(dto.into_note())
    }

    /// Delete a note. This endpoint answers with a bare body instead of the
    /// envelope, so a failure surfaces the body text as-is.
    pub async fn delete_note(&self, note_id: &str) -> Result<(), ApiError> {
        let response = self
            .gate
            .delete(&format!("api/v1/notes/{}", note_id))
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(note_id, "Note deleted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            "Delete failed".to_string()
        } else {
            body
        };
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn search_notes(&self, search: &NoteSearch) -> Result<NotesPage, ApiError> {
        let response = self.gate.post("api/v1/notes/search", search).await?;
        let payload: NotesPayload = envelope::unwrap_data(response).await?;
        Ok(payload.into_page())
    }

    /// List publicly shared notes; works signed out as well.
    pub async fn list_public_notes(&self, page: u32, limit: u32) -> Result<NotesPage, ApiError> {
        let response = self
            .gate
            .get_with_query(
                "api/v1/notes/public",
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        let payload: NotesPayload = envelope::unwrap_data(response).await?;
        Ok(payload.into_page())
    }
}

// ─── Wire Types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct NoteDto {
    id: String,
    title: String,
    content: Option<String>,
    preview: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_public: bool,
    user_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl NoteDto {
    fn into_note(self) -> Note {
        Note {
            id: self.id,
            title: self.title,
            content: self.content.or(self.preview).unwrap_or_default(),
            tags: self.tags,
            is_public: self.is_public,
            user_id: self.user_id.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// List payload; paging metadata arrives flattened beside the notes.
#[derive(Debug, Clone, Deserialize)]
struct NotesPayload {
    notes: Vec<NoteDto>,
    total: i64,
    page: i64,
    page_size: i64,
    total_pages: i64,
    has_next: bool,
    has_prev: bool,
}

impl NotesPayload {
    fn into_page(self) -> NotesPage {
        NotesPage {
            notes: self.notes.into_iter().map(NoteDto::into_note).collect(),
            pagination: Pagination {
                page: self.page,
                limit: self.page_size,
                total: self.total,
                total_pages: self.total_pages,
                has_next: self.has_next,
                has_prev: self.has_prev,
            },
        }
    }
}
