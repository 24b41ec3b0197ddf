//! LINE Sheets Relay - webhook relay for a LINE bot
//!
//! This library provides the core functionality for the relay:
//! - LINE webhook verification and event parsing
//! - Text confirmation replies
//! - Voice message transcription via Whisper
//! - Message logging to Google Sheets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 LINE Platform                        │
//! │        webhook POST /callback  │  reply / push       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                   Relay                              │
//! │  Signature  │  Dedup Ledger  │  Text  │  Audio FSM   │
//! └──────────┬──────────────────────────────┬───────────┘
//!            │                              │
//! ┌──────────▼──────────┐        ┌──────────▼──────────┐
//! │   Google Sheets     │        │   OpenAI Whisper    │
//! │   (message log)     │        │   (transcription)   │
//! └─────────────────────┘        └─────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod line;
pub mod relay;
pub mod sheets;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use relay::Dispatcher;
