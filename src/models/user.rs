use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user record. The password hash never leaves the store layer except
/// for credential checks in the auth handlers.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirmed: bool,
    /// One-shot code shared by account confirmation and password reset.
    /// Cleared whenever it is consumed.
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection attached to the request context by the authentication guard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Draft for account creation, already hashed and carrying the fresh
/// confirmation token.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub token: String,
}
