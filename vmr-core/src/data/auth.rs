//! Service-account authentication for the Google Sheets API.
//!
//! A signed JWT assertion (RS256) is exchanged at the key's token URI for a
//! short-lived bearer token. The token is reused until shortly before expiry.
//! Private key material is never logged.

use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

use super::provider::StoreError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Read-only scopes the dashboard needs.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Service-account key fields. Other fields in the key file are ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Signs assertions and caches the resulting bearer token.
pub struct TokenProvider {
    key: ServiceAccountKey,
    signing_key: SigningKey<Sha256>,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("client_email", &self.key.client_email)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Parse the PKCS#8 PEM key. Escaped newlines (`\n` as two characters),
    /// common when keys travel through env vars or TOML, are unescaped first.
    pub fn new(key: ServiceAccountKey) -> Result<Self, StoreError> {
        let pem = key.private_key.replace("\\n", "\n");
        let private_key = RsaPrivateKey::from_pkcs8_pem(&pem)
            .map_err(|e| StoreError::Auth(format!("invalid service-account private key: {e}")))?;
        Ok(Self {
            key,
            signing_key: SigningKey::<Sha256>::new(private_key),
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Build a signed JWT assertion for the given issue time (unix seconds).
    pub fn assertion_at(&self, issued_at: u64) -> Result<String, StoreError> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| StoreError::Auth(format!("claims serialization: {e}")))?;
        let signing_input = format!("{header}.{}", URL_SAFE_NO_PAD.encode(claims_json));
        let signature = self.signing_key.sign(signing_input.as_bytes());
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    /// Return a valid bearer token, exchanging a fresh assertion if needed.
    pub fn bearer(&self, client: &reqwest::blocking::Client) -> Result<String, StoreError> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| StoreError::Auth("token cache poisoned".into()))?;

        if let Some(token) = cached.as_ref() {
            if Instant::now() + EXPIRY_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Auth(format!("system clock before epoch: {e}")))?
            .as_secs();
        let assertion = self.assertion_at(now)?;

        let resp = client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .map_err(|e| StoreError::Connection(format!("token exchange: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange rejected ({status}): {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .map_err(|e| StoreError::ResponseFormat(format!("token response: {e}")))?;

        tracing::debug!(client_email = %self.key.client_email, expires_in = token.expires_in, "obtained access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }
}
