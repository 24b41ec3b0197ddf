//! LINE Messaging API client

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{MessageTransport, Profile, ProfileResolver};
use crate::relay::ReplyToken;
use crate::{Error, Result};

const LINE_API_URL: &str = "https://api.line.me/v2/bot";
const LINE_DATA_API_URL: &str = "https://api-data.line.me/v2/bot";

/// Text message object
#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    text: &'a str,
}

impl<'a> TextMessage<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            message_type: "text",
            text,
        }
    }
}

/// Reply request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextMessage<'a>; 1],
}

/// Push request body
#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

/// LINE Messaging API client
#[derive(Clone)]
pub struct LineClient {
    client: reqwest::Client,
    access_token: SecretString,
    api_url: String,
    data_api_url: String,
}

impl LineClient {
    /// Create a client for the public LINE endpoints
    #[must_use]
    pub fn new(access_token: SecretString) -> Self {
        Self::with_base_urls(access_token, LINE_API_URL, LINE_DATA_API_URL)
    }

    /// Create a client against custom endpoints
    #[must_use]
    pub fn with_base_urls(
        access_token: SecretString,
        api_url: impl Into<String>,
        data_api_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            api_url: api_url.into(),
            data_api_url: data_api_url.into(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }

    /// Download the binary content of a message (audio, image, ...)
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or LINE responds with non-2xx
    pub async fn download_content(&self, message_id: &str) -> Result<Vec<u8>> {
        download_content(
            &self.client,
            &self.data_api_url,
            message_id,
            self.access_token.expose_secret(),
        )
        .await
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<()> {
        let url = format!("{}{path}", self.api_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, path, "LINE API error");
            return Err(Error::Line(format!("{path} failed: {status} - {body}")));
        }

        Ok(())
    }
}

/// Fetch message content with an explicit access token
///
/// # Errors
///
/// Returns error if the request fails or LINE responds with non-2xx
pub async fn download_content(
    client: &reqwest::Client,
    data_api_url: &str,
    message_id: &str,
    access_token: &str,
) -> Result<Vec<u8>> {
    tracing::debug!(message_id, "downloading message content");

    let url = format!(
        "{data_api_url}/message/{}/content",
        urlencoding::encode(message_id)
    );
    let response = client
        .get(&url)
        .header("Authorization", format!("Bearer {access_token}"))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Line(format!(
            "content download failed: {status} - {body}"
        )));
    }

    let bytes = response.bytes().await?;
    tracing::debug!(message_id, bytes = bytes.len(), "content downloaded");
    Ok(bytes.to_vec())
}

#[async_trait]
impl ProfileResolver for LineClient {
    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let url = format!("{}/profile/{}", self.api_url, urlencoding::encode(user_id));
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Line(format!(
                "profile lookup failed: {status} - {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MessageTransport for LineClient {
    async fn reply(&self, token: ReplyToken, message: &str) -> Result<()> {
        let body = ReplyRequest {
            reply_token: token.as_str(),
            messages: [TextMessage::new(message)],
        };
        self.post_json("/message/reply", &body).await?;
        tracing::debug!("reply sent");
        Ok(())
    }

    async fn push(&self, user_id: &str, message: &str) -> Result<()> {
        let body = PushRequest {
            to: user_id,
            messages: [TextMessage::new(message)],
        };
        self.post_json("/message/push", &body).await?;
        tracing::debug!(user_id, "push sent");
        Ok(())
    }
}
