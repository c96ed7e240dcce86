//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    /// Argon2id PHC string. Never serialized back to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Long-lived secret used by the CLI in place of the password.
    /// `None` until the first successful token request.
    #[serde(skip_serializing)]
    pub cli_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The stored CLI token, treating an empty string as absent.
    pub fn active_cli_token(&self) -> Option<&str> {
        self.cli_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub cli_token: Option<Option<String>>,
}
