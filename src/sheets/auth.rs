//! Google service account authentication
//!
//! Signs an RS256 assertion with the service account key and exchanges it for
//! a short-lived access token, cached until shortly before expiry.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result};

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Refresh this many seconds before the token actually expires
const EXPIRY_MARGIN_SECS: u64 = 300;

/// Service account credentials
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    pub token_uri: String,
}

/// Service account JSON structure
#[derive(Deserialize)]
struct ServiceAccountJson {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Decode a base64-encoded service account JSON document
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the value is not base64 or not valid JSON
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| {
                Error::Config(format!("GOOGLE_SERVICE_ACCOUNT_KEY is not valid base64: {e}"))
            })?;
        Self::from_json(&decoded)
    }

    /// Parse a service account JSON document
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if required fields are missing
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let raw: ServiceAccountJson = serde_json::from_slice(json).map_err(|e| {
            Error::Config(format!("GOOGLE_SERVICE_ACCOUNT_KEY has invalid format: {e}"))
        })?;

        Ok(Self {
            client_email: raw.client_email,
            private_key: SecretString::from(raw.private_key),
            token_uri: raw
                .token_uri
                .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
        })
    }
}

/// JWT claims for Google OAuth
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Cached token info
struct TokenInfo {
    access_token: String,
    expires_at: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Issues and caches access tokens for one service account
#[derive(Clone)]
pub struct TokenProvider {
    key: ServiceAccountKey,
    client: reqwest::Client,
    cached: Arc<Mutex<Option<TokenInfo>>>,
}

impl TokenProvider {
    #[must_use]
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            client: reqwest::Client::new(),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Create JWT for token request
    fn create_jwt(&self, now: u64) -> Result<String> {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};

        let header = Header::new(Algorithm::RS256);
        let claims = JwtClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            exp: now + 3600,
            iat: now,
        };

        let key = EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_bytes())
            .map_err(|e| Error::Auth(format!("invalid private key: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| Error::Auth(format!("JWT encoding failed: {e}")))
    }

    /// Get or refresh access token
    ///
    /// # Errors
    ///
    /// Returns error if signing or the token exchange fails
    pub async fn access_token(&self) -> Result<String> {
        // Held across the exchange so concurrent appends share one refresh
        let mut cached = self.cached.lock().await;

        let now = now_secs();
        if let Some(token) = cached.as_ref()
            && token.expires_at > now + EXPIRY_MARGIN_SECS
        {
            return Ok(token.access_token.clone());
        }

        let jwt = self.create_jwt(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("token request failed: {status} - {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("token parse error: {e}")))?;

        tracing::debug!(expires_in = token.expires_in, "refreshed Google access token");

        *cached = Some(TokenInfo {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });

        Ok(token.access_token)
    }
}
