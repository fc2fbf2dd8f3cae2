//! Application state for the journal API

use std::sync::Arc;

use anyhow::Result;
use journal_core::{
    AuthService, CredentialStore, InMemoryCredentialStore, InMemoryJournalStore, JournalService,
    JournalStore, TokenSigner,
};

use crate::config::Config;

/// Attributes of the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    /// Same value as the token lifetime
    pub max_age_secs: u64,
    pub secure: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub journals: JournalService,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let signer = TokenSigner::new(&config.jwt_secret, config.session_ttl_secs)?;
        Ok(Self::in_memory(signer, config.secure_cookies))
    }

    /// State backed by volatile stores
    pub fn in_memory(signer: TokenSigner, secure_cookies: bool) -> Self {
        Self::with_stores(
            signer,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemoryJournalStore::new()),
            secure_cookies,
        )
    }

    pub fn with_stores(
        signer: TokenSigner,
        credentials: Arc<dyn CredentialStore>,
        journals: Arc<dyn JournalStore>,
        secure_cookies: bool,
    ) -> Self {
        let cookies = CookieSettings {
            max_age_secs: signer.lifetime_secs(),
            secure: secure_cookies,
        };

        tracing::info!(
            session_ttl_secs = cookies.max_age_secs,
            secure_cookies,
            "Initialized in-process stores"
        );

        Self {
            auth: AuthService::new(credentials.clone(), signer),
            journals: JournalService::new(journals, credentials),
            cookies,
        }
    }
}
