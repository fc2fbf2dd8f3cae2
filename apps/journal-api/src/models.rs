//! Request and response bodies for the journal API

use journal_core::Journal;
use serde::{Deserialize, Serialize};

/// Body of `/register` and `/login`. Missing fields are a validation error,
/// not a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query string of `/journal/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Bare `{ message }` body, also used for errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalResponse {
    pub message: String,
    pub journal: Journal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalListResponse {
    pub message: String,
    #[serde(rename = "userJournals")]
    pub user_journals: Vec<Journal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub message: String,
    #[serde(rename = "searchResults")]
    pub search_results: Vec<Journal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
