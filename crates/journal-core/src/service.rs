//! Auth and journal services
//!
//! Every journal operation takes an [`AuthenticatedUser`], which only a
//! verified token can produce. Validation and ownership checks run before
//! any write.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::credentials::{CredentialRecord, CredentialStore};
use crate::error::{Error, Result};
use crate::journal::{Journal, JournalStore, NewJournal};
use crate::password::{hash_password, stored_or_dummy_hash, verify_password};
use crate::token::{AuthenticatedUser, IssuedToken, TokenSigner};

/// Run CPU-bound work (password hashing) on the blocking pool
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("Blocking task failed: {}", e)))?
}

fn require_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(Error::validation("Username and password are required"));
    }
    Ok(())
}

/// Registration, login and token checks
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, signer: TokenSigner) -> Self {
        Self {
            credentials,
            signer,
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Create an account. The caller must log in separately.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        require_credentials(username, password)?;

        // Cheap early exit; `insert` below is the authoritative check
        if self.credentials.find_by_username(username).await?.is_some() {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let password = password.to_string();
        let password_hash = run_blocking(move || hash_password(&password)).await?;

        self.credentials
            .insert(CredentialRecord {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!(username = %username, "User registered");
        Ok(())
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown users and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        require_credentials(username, password)?;

        let record = self.credentials.find_by_username(username).await?;
        let user_exists = record.is_some();

        // Unknown users are checked against a dummy hash so both failures
        // take the same time
        let password = password.to_string();
        let hash = stored_or_dummy_hash(record.as_ref().map(|r| r.password_hash.as_str()));
        let valid = run_blocking(move || Ok(verify_password(&password, &hash))).await?;

        if !(user_exists && valid) {
            warn!(username = %username, "Login failed");
            return Err(Error::InvalidCredentials);
        }

        let issued = self.signer.issue(username)?;
        info!(username = %username, expires_at = issued.claims.exp, "Login successful");
        Ok(issued)
    }

    /// Turn a presented token (if any) into an identity
    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(Error::MissingToken),
        };

        self.signer.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            e
        })
    }
}

/// Title and content as supplied by a client.
///
/// Any other field in the body (an `owner`, say) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalDraft {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl JournalDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    fn into_parts(self) -> Result<(String, String)> {
        match (self.title, self.content) {
            (Some(title), Some(content)) => Ok((title, content)),
            _ => Err(Error::validation("Title and content are required")),
        }
    }
}

/// Parse a path id. Anything that isn't a non-negative integer can't name a journal.
pub fn parse_journal_id(raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| Error::NotFound)
}

/// Ownership-enforced journal operations
#[derive(Clone)]
pub struct JournalService {
    journals: Arc<dyn JournalStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl JournalService {
    pub fn new(journals: Arc<dyn JournalStore>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            journals,
            credentials,
        }
    }

    pub async fn create(&self, user: &AuthenticatedUser, draft: JournalDraft) -> Result<Journal> {
        let (title, content) = draft.into_parts()?;

        // A token can outlive the (volatile) account it was issued for
        if self
            .credentials
            .find_by_username(user.username())
            .await?
            .is_none()
        {
            return Err(Error::InvalidToken("Unknown user".to_string()));
        }

        let journal = self
            .journals
            .insert(NewJournal {
                title,
                content,
                owner: user.username().to_string(),
                created_at: Utc::now(),
            })
            .await?;

        info!(id = journal.id, owner = %journal.owner, "Journal created");
        Ok(journal)
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<Journal>> {
        self.journals.filter_by_owner(user.username()).await
    }

    /// Caller's journals whose title contains `query`, ignoring case
    pub async fn search(
        &self,
        user: &AuthenticatedUser,
        query: Option<&str>,
    ) -> Result<Vec<Journal>> {
        let query = match query {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return Err(Error::validation("Search query is required")),
        };

        let mut journals = self.journals.filter_by_owner(user.username()).await?;
        journals.retain(|j| j.title.to_lowercase().contains(&query));
        Ok(journals)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: u64) -> Result<Journal> {
        let journal = self.journals.find_by_id(id).await?.ok_or(Error::NotFound)?;
        if journal.owner != user.username() {
            return Err(Error::Forbidden);
        }
        Ok(journal)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: u64,
        draft: JournalDraft,
    ) -> Result<Journal> {
        let (title, content) = draft.into_parts()?;

        let journal = self
            .journals
            .update_owned(id, user.username(), title, content)
            .await
            .map_err(|e| log_denied(e, id, user))?;

        info!(id, owner = %journal.owner, "Journal updated");
        Ok(journal)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: u64) -> Result<Journal> {
        let journal = self
            .journals
            .delete_owned(id, user.username())
            .await
            .map_err(|e| log_denied(e, id, user))?;

        info!(id, owner = %journal.owner, "Journal deleted");
        Ok(journal)
    }
}

fn log_denied(err: Error, id: u64, user: &AuthenticatedUser) -> Error {
    if err == Error::Forbidden {
        warn!(id, username = %user.username(), "Ownership check failed");
    }
    err
}
