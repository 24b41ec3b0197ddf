//! Outgoing messages and single-use reply token handling

use crate::line::MessageTransport;
use crate::relay::event::ReplyToken;
use crate::{Error, Result};

/// Acknowledgment sent before a slow transcription
pub const AUDIO_ACK: &str = "🎤 Voice message received. Transcribing, please wait...";

/// Reply when transcription is not configured
pub const AUDIO_DISABLED: &str =
    "🎤 Voice message received, but voice transcription is not enabled on this service.";

/// Confirmation for a logged text message
#[must_use]
pub fn text_confirmation(text: &str, display_name: &str) -> String {
    format!("✅ Message received:\n{text}\n\nFrom: {display_name}")
}

/// Push carrying a finished transcript
#[must_use]
pub fn transcript_message(transcript: &str) -> String {
    if transcript.trim().is_empty() {
        "📝 Transcript: (no speech detected)".to_string()
    } else {
        format!("📝 Transcript:\n{transcript}")
    }
}

/// Push reporting a transcription failure
#[must_use]
pub fn transcription_failure_message(reason: &str) -> String {
    format!("❌ Transcription failed: {reason}")
}

/// The outgoing message a handler step wants sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyIntent {
    /// Send via the event's reply token
    Reply(String),
    /// Send to the user ID; used once the token has been spent
    Push(String),
    /// Nothing to send
    None,
}

/// Sends messages for one event
///
/// Owns the event's reply token; the first reply takes it, so a second
/// reply-token send is an error instead of a transport-side double reply.
pub struct Responder<'a> {
    transport: &'a dyn MessageTransport,
    token: Option<ReplyToken>,
    user_id: String,
    replies: usize,
    pushes: usize,
}

impl<'a> Responder<'a> {
    #[must_use]
    pub fn new(transport: &'a dyn MessageTransport, token: ReplyToken, user_id: String) -> Self {
        Self {
            transport,
            token: Some(token),
            user_id,
            replies: 0,
            pushes: 0,
        }
    }

    /// Whether the reply token is still unused
    #[must_use]
    pub const fn token_available(&self) -> bool {
        self.token.is_some()
    }

    /// Successful reply-token sends
    #[must_use]
    pub const fn replies(&self) -> usize {
        self.replies
    }

    /// Successful push sends
    #[must_use]
    pub const fn pushes(&self) -> usize {
        self.pushes
    }

    /// Send using the reply token.
    ///
    /// The token is taken before the call, so even a failed attempt spends it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReplyTokenSpent` on a second call, or the transport error
    pub async fn reply(&mut self, text: &str) -> Result<()> {
        let token = self.token.take().ok_or(Error::ReplyTokenSpent)?;
        self.transport.reply(token, text).await?;
        self.replies += 1;
        Ok(())
    }

    /// Send to the user directly
    ///
    /// # Errors
    ///
    /// Returns the transport error
    pub async fn push(&mut self, text: &str) -> Result<()> {
        self.transport.push(&self.user_id, text).await?;
        self.pushes += 1;
        Ok(())
    }

    /// Send whatever a handler step produced
    ///
    /// # Errors
    ///
    /// Returns the transport error, or `Error::ReplyTokenSpent`
    pub async fn deliver(&mut self, intent: &ReplyIntent) -> Result<()> {
        match intent {
            ReplyIntent::Reply(text) => self.reply(text).await,
            ReplyIntent::Push(text) => self.push(text).await,
            ReplyIntent::None => Ok(()),
        }
    }

    /// Tell the user something went wrong, using the token if still unused
    ///
    /// # Errors
    ///
    /// Returns the transport error
    pub async fn notify_failure(&mut self, text: &str) -> Result<()> {
        if self.token_available() {
            self.reply(text).await
        } else {
            self.push(text).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageTransport for Recorder {
        async fn reply(&self, token: ReplyToken, message: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("reply:{}:{message}", token.as_str()));
            Ok(())
        }

        async fn push(&self, user_id: &str, message: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("push:{user_id}:{message}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn second_reply_is_rejected() {
        let transport = Recorder::default();
        let mut responder = Responder::new(&transport, ReplyToken::new("rt"), "u1".into());

        responder.reply("first").await.unwrap();
        let err = responder.reply("second").await.unwrap_err();

        assert!(matches!(err, Error::ReplyTokenSpent));
        assert_eq!(*transport.sent.lock().unwrap(), vec!["reply:rt:first"]);
        assert_eq!(responder.replies(), 1);
    }

    #[tokio::test]
    async fn failure_notice_falls_back_to_push_after_reply() {
        let transport = Recorder::default();
        let mut responder = Responder::new(&transport, ReplyToken::new("rt"), "u1".into());

        responder.notify_failure("oops").await.unwrap();
        responder.notify_failure("again").await.unwrap();

        assert_eq!(
            *transport.sent.lock().unwrap(),
            vec!["reply:rt:oops", "push:u1:again"]
        );
        assert_eq!((responder.replies(), responder.pushes()), (1, 1));
    }

    #[tokio::test]
    async fn none_intent_sends_nothing() {
        let transport = Recorder::default();
        let mut responder = Responder::new(&transport, ReplyToken::new("rt"), "u1".into());

        responder.deliver(&ReplyIntent::None).await.unwrap();

        assert!(transport.sent.lock().unwrap().is_empty());
        assert!(responder.token_available());
    }

    #[test]
    fn empty_transcript_has_placeholder() {
        assert_eq!(
            transcript_message("  "),
            "📝 Transcript: (no speech detected)"
        );
        assert!(transcript_message("hello").ends_with("hello"));
    }
}
