//! LINE messaging platform adapter
//!
//! The relay core only sees the two traits below; `LineClient` implements
//! both against the Messaging API.

mod client;
pub mod signature;
mod types;

use async_trait::async_trait;
use serde::Deserialize;

pub use client::{LineClient, download_content};
pub use types::{DeliveryContext, EventSource, WebhookBody, WebhookEvent, WebhookMessage};

use crate::Result;
use crate::relay::ReplyToken;

/// User profile as returned by the platform
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub display_name: String,
    pub user_id: Option<String>,
    pub picture_url: Option<String>,
}

/// Resolves a user ID to a profile
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Look up a user's profile
    async fn get_profile(&self, user_id: &str) -> Result<Profile>;
}

/// Sends outbound messages
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Answer an event with its single-use reply token
    async fn reply(&self, token: ReplyToken, message: &str) -> Result<()>;

    /// Send to a user at any time
    async fn push(&self, user_id: &str, message: &str) -> Result<()>;
}
