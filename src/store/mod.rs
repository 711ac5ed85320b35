//! Persistent session storage.

pub mod prefs;

pub use prefs::SessionStore;

/// Preference keys as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const TOKEN_EXPIRES_IN: &str = "token_expires_in";
    /// Stored as a string-encoded integer (epoch millis)
    pub const TOKEN_ISSUED_AT: &str = "token_issued_at";
    pub const USER_ID: &str = "user_id";
    pub const USER_EMAIL: &str = "user_email";
    pub const USER_FULL_NAME: &str = "user_full_name";
    pub const USER_CREATED_AT: &str = "user_created_at";
    pub const USER_UPDATED_AT: &str = "user_updated_at";

    /// Every key the store owns, in persisted order.
    pub const ALL: [&str; 9] = [
        ACCESS_TOKEN,
        REFRESH_TOKEN,
        TOKEN_EXPIRES_IN,
        TOKEN_ISSUED_AT,
        USER_ID,
        USER_EMAIL,
        USER_FULL_NAME,
        USER_CREATED_AT,
        USER_UPDATED_AT,
    ];
}
