// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API clients and session logic.

pub mod auth;
pub mod envelope;
pub mod gate;
pub mod notes;
pub mod session;
pub mod users;

pub use auth::AuthService;
pub use gate::ApiGate;
pub use notes::{NoteDraft, NoteSearch, NotesService};
pub use session::{RefreshPolicy, SessionCoordinator};
pub use users::UserService;
