//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use line_sheets_relay::config::RelaySettings;
use line_sheets_relay::line::{MessageTransport, Profile, ProfileResolver};
use line_sheets_relay::relay::{InboundEvent, LogRecord, MessageContent, MessageEvent, ReplyToken};
use line_sheets_relay::sheets::LogStore;
use line_sheets_relay::voice::Transcriber;
use line_sheets_relay::{Dispatcher, Error, Result};
use tokio::sync::Mutex;

/// One message handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply { token: String, text: String },
    Push { user_id: String, text: String },
}

/// Transport that records every send
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    fail_replies: bool,
    fail_pushes: bool,
}

impl RecordingTransport {
    /// Transport whose reply calls fail
    pub fn failing_replies() -> Self {
        Self {
            fail_replies: true,
            ..Self::default()
        }
    }

    /// Transport whose push calls fail
    pub fn failing_pushes() -> Self {
        Self {
            fail_pushes: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn replies(&self) -> Vec<Sent> {
        self.sent()
            .await
            .into_iter()
            .filter(|s| matches!(s, Sent::Reply { .. }))
            .collect()
    }

    pub async fn pushes(&self) -> Vec<Sent> {
        self.sent()
            .await
            .into_iter()
            .filter(|s| matches!(s, Sent::Push { .. }))
            .collect()
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn reply(&self, token: ReplyToken, message: &str) -> Result<()> {
        if self.fail_replies {
            return Err(Error::Line("reply rejected".to_string()));
        }
        self.sent.lock().await.push(Sent::Reply {
            token: token.as_str().to_string(),
            text: message.to_string(),
        });
        Ok(())
    }

    async fn push(&self, user_id: &str, message: &str) -> Result<()> {
        if self.fail_pushes {
            return Err(Error::Line("push rejected".to_string()));
        }
        self.sent.lock().await.push(Sent::Push {
            user_id: user_id.to_string(),
            text: message.to_string(),
        });
        Ok(())
    }
}

/// Profile resolver returning a fixed display name
pub struct StaticProfiles {
    display_name: String,
    fail: bool,
}

impl StaticProfiles {
    pub fn named(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            display_name: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ProfileResolver for StaticProfiles {
    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        if self.fail {
            return Err(Error::Line("profile lookup failed: 404".to_string()));
        }
        Ok(Profile {
            display_name: self.display_name.clone(),
            user_id: Some(user_id.to_string()),
            picture_url: None,
        })
    }
}

/// Transcriber with a canned answer
pub struct ScriptedTranscriber {
    result: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedTranscriber {
    pub fn returning(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _message_id: &str, _access_token: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(Error::Stt)
    }
}

/// In-memory log store
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<LogRecord>>,
    fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        if self.fail {
            return Err(Error::Sheets("append failed: 503".to_string()));
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn ensure_header(&self) {}
}

/// Collaborators wired into a dispatcher
pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<MemoryStore>,
    pub transcriber: Option<Arc<ScriptedTranscriber>>,
    pub dispatcher: Dispatcher,
}

impl Harness {
    pub fn build(
        profiles: StaticProfiles,
        transport: RecordingTransport,
        store: MemoryStore,
        transcriber: Option<ScriptedTranscriber>,
    ) -> Self {
        let transport = Arc::new(transport);
        let store = Arc::new(store);
        let transcriber = transcriber.map(Arc::new);

        let mut dispatcher = Dispatcher::new(Arc::new(profiles), transport.clone(), store.clone());
        if let Some(t) = &transcriber {
            dispatcher = dispatcher.with_transcriber(t.clone(), "line-token".to_string().into());
        }

        Self {
            transport,
            store,
            transcriber,
            dispatcher,
        }
    }

    /// Apply relay settings to the dispatcher
    pub fn with_settings(self, settings: &RelaySettings) -> Self {
        Self {
            dispatcher: self.dispatcher.with_settings(settings),
            ..self
        }
    }

    /// Alice, working transport and store, transcription off
    pub fn basic() -> Self {
        Self::build(
            StaticProfiles::named("Alice"),
            RecordingTransport::default(),
            MemoryStore::default(),
            None,
        )
    }

    /// Alice, working transport and store, transcription on
    pub fn with_transcriber(transcriber: ScriptedTranscriber) -> Self {
        Self::build(
            StaticProfiles::named("Alice"),
            RecordingTransport::default(),
            MemoryStore::default(),
            Some(transcriber),
        )
    }
}

pub fn text_event(message_id: &str, text: &str) -> InboundEvent {
    InboundEvent::Message(MessageEvent {
        message_id: message_id.to_string(),
        user_id: "U1".to_string(),
        reply_token: ReplyToken::new(format!("rt-{message_id}")),
        content: MessageContent::Text {
            text: text.to_string(),
        },
        redelivery: false,
    })
}

pub fn audio_event(message_id: &str, duration_ms: Option<u64>) -> InboundEvent {
    InboundEvent::Message(MessageEvent {
        message_id: message_id.to_string(),
        user_id: "U1".to_string(),
        reply_token: ReplyToken::new(format!("rt-{message_id}")),
        content: MessageContent::Audio { duration_ms },
        redelivery: false,
    })
}

pub fn sticker_event(message_id: &str) -> InboundEvent {
    InboundEvent::Message(MessageEvent {
        message_id: message_id.to_string(),
        user_id: "U1".to_string(),
        reply_token: ReplyToken::new(format!("rt-{message_id}")),
        content: MessageContent::Unsupported {
            kind: "sticker".to_string(),
        },
        redelivery: false,
    })
}
