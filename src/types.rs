//! Wire DTOs for the IdeaHub REST API.
//!
//! DESIGN
//! ======
//! All of these entities are owned by the server. Unknown fields are ignored
//! and optional fields default so newer server versions keep decoding.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// An idea as returned by `GET /ideas`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    /// Stable server-assigned identifier.
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of distinct users who liked the idea.
    #[serde(default)]
    pub likes: u64,
    /// Creator's user id, if the server reports it.
    #[serde(default)]
    pub owner_id: Option<i64>,
    /// Creation timestamp (ISO-8601), if the server reports it.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Creation payload for `POST /ideas`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdea {
    pub title: String,
    pub description: Option<String>,
}

impl NewIdea {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self { title: title.into(), description }
    }

    /// Client-side sanity check; the server still validates.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A registered user as returned by `GET /users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of a successful `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
