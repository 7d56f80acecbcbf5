//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// User record stored in the users set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque unique identifier
    pub id: String,
    /// Unique login name (case-sensitive)
    pub username: String,
    /// Argon2id password hash. Never serialized into API responses.
    pub password_hash: String,
    pub role: Role,
    pub balance: f64,
    /// Monotonic counter anchoring refresh-token revocation.
    /// Starts at 1; bumped on every login, refresh, and logout.
    pub refresh_version: u64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User shape returned by the API: the stored record minus the hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub balance: f64,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            balance: user.balance,
        }
    }
}
