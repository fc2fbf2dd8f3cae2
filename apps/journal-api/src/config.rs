//! Runtime configuration, from flags or environment (`.env` is loaded first)

use anyhow::{bail, Result};
use clap::Parser;
use journal_core::DEFAULT_SESSION_TTL;

/// Shortest signing secret accepted at startup
pub const MIN_SECRET_LEN: usize = 16;

/// Command-line arguments for the journal API server
#[derive(Parser, Clone)]
#[command(name = "journal-api")]
#[command(about = "Journal API server with cookie-based sessions")]
pub struct Config {
    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Session lifetime in seconds, for both the token and its cookie
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL)]
    pub session_ttl_secs: u64,

    /// Mark the session cookie `Secure` (production deployments)
    #[arg(long, env = "COOKIE_SECURE")]
    pub secure_cookies: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("secure_cookies", &self.secure_cookies)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Reject settings that would leave sessions insecure or unusable
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN);
        }
        if self.session_ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be greater than zero");
        }
        Ok(())
    }
}
