// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod note;
pub mod tokens;
pub mod user;

pub use note::{Note, NotesPage, Pagination};
pub use tokens::{AuthTokens, DEFAULT_EXPIRY_BUFFER_SECS};
pub use user::{Session, User};
