//! User profile and session models.

use serde::{Deserialize, Serialize};

use super::tokens::AuthTokens;

/// User profile as returned by the auth and profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user ID
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Account creation timestamp (RFC 3339, kept as received)
    pub created_at: String,
    /// Last profile update timestamp (RFC 3339, kept as received)
    pub updated_at: String,
}

/// A fully established session: the signed-in user plus their token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub tokens: AuthTokens,
}
