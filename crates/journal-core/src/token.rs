//! Session token issuance and verification
//!
//! Tokens are compact JWTs signed with HS256 (HMAC-SHA256). Nothing is kept
//! server-side: a token is valid iff its signature verifies against the
//! server secret, its claims version is supported and the current time is
//! strictly before `exp`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime in seconds (1 hour)
pub const DEFAULT_SESSION_TTL: u64 = 60 * 60;

/// Current claims layout version
pub const CLAIMS_VERSION: u8 = 1;

/// JWT Header for HS256
#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Claims layout version
    pub ver: u8,
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration (Unix timestamp)
    pub exp: u64,
}

impl SessionClaims {
    pub(crate) fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser::new(self.sub.clone())
    }
}

/// A username proven by a verified session token.
///
/// Only obtainable through [`TokenSigner::verify`], so services can't be
/// handed an identity taken from a request body. Hand-built claims don't
/// convert:
///
/// ```compile_fail
/// use journal_core::{SessionClaims, CLAIMS_VERSION};
///
/// let claims = SessionClaims { ver: CLAIMS_VERSION, sub: "bob".into(), iat: 0, exp: u64::MAX };
/// let _user = claims.identity();
/// ```
///
/// ```compile_fail
/// let _user = journal_core::AuthenticatedUser::new("bob".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    username: String,
}

impl AuthenticatedUser {
    pub(crate) fn new(username: String) -> Self {
        Self { username }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// A freshly signed token and the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Signs and verifies session tokens with a server secret
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    lifetime_secs: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"<redacted>")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer. An empty secret or a zero lifetime is rejected.
    pub fn new(secret: impl AsRef<[u8]>, lifetime_secs: u64) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(Error::internal("Token signing secret must not be empty"));
        }
        if lifetime_secs == 0 {
            return Err(Error::internal("Session lifetime must be greater than zero"));
        }

        Ok(Self {
            secret: secret.to_vec(),
            lifetime_secs,
        })
    }

    /// Session lifetime in seconds; also used for the cookie `Max-Age`
    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    /// Issue a token for `username` valid from now
    pub fn issue(&self, username: &str) -> Result<IssuedToken> {
        self.issue_at(username, unix_now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, username: &str, now: u64) -> Result<IssuedToken> {
        let claims = SessionClaims {
            ver: CLAIMS_VERSION,
            sub: username.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime_secs),
        };

        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        self.verify_at(token, unix_now())
            .map(|claims| claims.identity())
    }

    /// Verify a token as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: u64) -> Result<SessionClaims> {
        let claims: SessionClaims = self.decode(token)?;

        if claims.ver != CLAIMS_VERSION {
            return Err(Error::InvalidToken(format!(
                "Unsupported claims version {}",
                claims.ver
            )));
        }

        if now >= claims.exp {
            return Err(Error::InvalidToken("Token expired".to_string()));
        }

        if claims.sub.is_empty() {
            return Err(Error::InvalidToken("Missing subject".to_string()));
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::internal(format!("HMAC error: {}", e)))
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String> {
        let header_json = serde_json::to_string(&JwtHeader::default())
            .map_err(|e| Error::internal(e.to_string()))?;
        let header_b64 = URL_SAFE_NO_PAD.encode(header_json.as_bytes());

        let payload_json =
            serde_json::to_string(claims).map_err(|e| Error::internal(e.to_string()))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());

        let signing_input = format!("{}.{}", header_b64, payload_b64);

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature_b64))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let invalid = |reason: &str| Error::InvalidToken(reason.to_string());

        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("Invalid token format"));
        }

        let (header_b64, payload_b64, signature_b64) = (parts[0], parts[1], parts[2]);

        // Signature first, so nothing unauthenticated gets parsed
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| invalid("Invalid signature encoding"))?;

        let mut mac = self.mac()?;
        mac.update(format!("{}.{}", header_b64, payload_b64).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| invalid("Invalid signature"))?;

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| invalid("Invalid header encoding"))?;
        let header: JwtHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| invalid("Invalid header format"))?;

        if header.alg != "HS256" {
            return Err(invalid("Unsupported algorithm"));
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| invalid("Invalid payload encoding"))?;

        serde_json::from_slice(&payload_bytes).map_err(|_| invalid("Invalid payload format"))
    }
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
