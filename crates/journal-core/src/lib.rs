//! Journal core
//!
//! Credential storage, session tokens and ownership-enforced journal
//! operations. Independent of any HTTP framework; `journal-api` wires it to
//! axum.
//!
//! ## Modules
//! - [`password`] - Argon2id hashing and verification
//! - [`token`] - HS256 session tokens and the [`AuthenticatedUser`] identity
//! - [`credentials`] - username to password-hash store
//! - [`journal`] - journal records and store
//! - [`service`] - registration, login, and journal CRUD with ownership checks

pub mod credentials;
pub mod error;
pub mod journal;
pub mod password;
pub mod service;
pub mod token;

pub use credentials::{CredentialRecord, CredentialStore, InMemoryCredentialStore};
pub use error::{Error, Result, INVALID_CREDENTIALS};
pub use journal::{InMemoryJournalStore, Journal, JournalStore, NewJournal};
pub use service::{parse_journal_id, AuthService, JournalDraft, JournalService};
pub use token::{
    AuthenticatedUser, IssuedToken, SessionClaims, TokenSigner, CLAIMS_VERSION,
    DEFAULT_SESSION_TTL,
};
