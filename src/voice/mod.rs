//! Voice message transcription
//!
//! Audio never touches disk: the clip is downloaded from LINE into memory and
//! uploaded straight to Whisper.

mod stt;

use async_trait::async_trait;

pub use stt::SpeechToText;

use crate::Result;
use crate::config::TranscriptionConfig;

/// Turns a platform audio message into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Fetch the audio for `message_id` and transcribe it
    async fn transcribe(&self, message_id: &str, access_token: &str) -> Result<String>;
}

/// Downloads LINE audio content and transcribes it with Whisper
pub struct WhisperTranscriber {
    client: reqwest::Client,
    stt: SpeechToText,
    data_api_url: String,
}

impl WhisperTranscriber {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn from_config(config: &TranscriptionConfig) -> Result<Self> {
        let stt = SpeechToText::new_whisper(
            config.api_key.clone(),
            config.model.clone(),
            config.language.clone(),
        )?;
        Ok(Self::new(stt))
    }

    #[must_use]
    pub fn new(stt: SpeechToText) -> Self {
        Self {
            client: reqwest::Client::new(),
            stt,
            data_api_url: "https://api-data.line.me/v2/bot".to_string(),
        }
    }

    /// Use a different LINE content endpoint
    #[must_use]
    pub fn with_data_api_url(mut self, url: impl Into<String>) -> Self {
        self.data_api_url = url.into();
        self
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, message_id: &str, access_token: &str) -> Result<String> {
        let audio = crate::line::download_content(
            &self.client,
            &self.data_api_url,
            message_id,
            access_token,
        )
        .await?;

        self.stt
            .transcribe(audio, format!("audio_{message_id}.m4a"))
            .await
    }
}
