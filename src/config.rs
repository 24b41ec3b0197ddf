//! Configuration management for the relay
//!
//! Everything is read from the environment. A `.env` file in the working
//! directory is loaded first when present.

use chrono::{FixedOffset, Offset as _, Utc};
use secrecy::SecretString;

use crate::sheets::ServiceAccountKey;
use crate::{Error, Result};

/// Default ledger high-water mark
pub const DEFAULT_DEDUP_CAPACITY: usize = 1000;

/// Default log timestamp offset (Asia/Taipei, no DST)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE Messaging API credentials
    pub line: LineConfig,

    /// Google Sheets log store
    pub sheets: SheetsConfig,

    /// Transcription settings; `None` disables voice transcription
    pub transcription: Option<TranscriptionConfig>,

    /// HTTP server configuration
    pub api_server: ApiServerConfig,

    /// Event handling settings
    pub relay: RelaySettings,
}

/// LINE Messaging API credentials
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Channel access token (bearer for API calls and content download)
    pub channel_access_token: SecretString,

    /// Channel secret (HMAC key for webhook signatures)
    pub channel_secret: SecretString,
}

/// Google Sheets configuration
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Decoded service account credentials
    pub service_account: ServiceAccountKey,

    /// Target spreadsheet ID
    pub spreadsheet_id: String,
}

/// Whisper transcription configuration
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// `OpenAI` API key
    pub api_key: SecretString,

    /// Whisper model (e.g. "whisper-1")
    pub model: String,

    /// ISO-639-1 language hint (e.g. "zh")
    pub language: String,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Event handling settings
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Dedup ledger high-water mark
    pub dedup_capacity: usize,

    /// Time zone used for log timestamps
    pub utc_offset: FixedOffset,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            utc_offset: taipei_offset(),
        }
    }
}

fn taipei_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a mandatory credential is missing or malformed
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns error if a mandatory credential is missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| Error::Config(format!("{key} is not set")))
        };

        let line = LineConfig {
            channel_access_token: SecretString::from(required("LINE_CHANNEL_ACCESS_TOKEN")?),
            channel_secret: SecretString::from(required("LINE_CHANNEL_SECRET")?),
        };

        let service_account =
            ServiceAccountKey::from_base64(&required("GOOGLE_SERVICE_ACCOUNT_KEY")?)?;
        let sheets = SheetsConfig {
            service_account,
            spreadsheet_id: required("GOOGLE_SHEETS_ID")?.trim().to_string(),
        };

        // Absence of the key disables transcription rather than failing startup
        let transcription = var("OPENAI_API_KEY").map(|key| TranscriptionConfig {
            api_key: SecretString::from(key),
            model: var("WHISPER_MODEL").unwrap_or_else(|| "whisper-1".to_string()),
            language: var("WHISPER_LANGUAGE").unwrap_or_else(|| "zh".to_string()),
        });

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {raw}")))?,
            None => 3000,
        };

        let dedup_capacity = match var("RELAY_DEDUP_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "RELAY_DEDUP_CAPACITY must be a positive integer: {raw}"
                    )));
                }
            },
            None => DEFAULT_DEDUP_CAPACITY,
        };

        let utc_offset = match var("RELAY_UTC_OFFSET_HOURS") {
            Some(raw) => parse_utc_offset(&raw)?,
            None => taipei_offset(),
        };

        Ok(Self {
            line,
            sheets,
            transcription,
            api_server: ApiServerConfig { port },
            relay: RelaySettings {
                dedup_capacity,
                utc_offset,
            },
        })
    }

    /// Whether voice transcription is configured
    #[must_use]
    pub const fn transcription_enabled(&self) -> bool {
        self.transcription.is_some()
    }
}

fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|h| (-12..=14).contains(h))
        .and_then(|h| FixedOffset::east_opt(h * 3600))
        .ok_or_else(|| Error::Config(format!("RELAY_UTC_OFFSET_HOURS out of range: {raw}")))
}
