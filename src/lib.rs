//! Murmur - voice assistant with built-in commands and LLM fallback
//!
//! This library provides the assistant core:
//! - Continuous speech capture behind an injectable adapter
//! - An ordered command table resolving utterances locally
//! - A one-shot remote inference client for everything unmatched
//! - Preempting speech output
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              Speech Capture Adapter              │
//! │        one finalized transcript per turn         │
//! └────────────────────┬────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────┐
//! │     Command Resolution & Response Pipeline       │
//! │   rule table (first match wins) │ remote fallback│
//! └──────────┬──────────────────────────┬───────────┘
//!            │                          │
//! ┌──────────▼───────────┐   ┌──────────▼───────────┐
//! │     Presentation      │   │ Speech Output Adapter │
//! │  log / status / ctrls │   │   newest-wins speech  │
//! └──────────────────────┘   └──────────────────────┘
//! ```

pub mod config;
pub mod daemon;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod presentation;
pub mod voice;

pub use config::{Config, RemoteConfig, VoiceConfig};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use inference::{InferenceClient, OfflineClient, RemoteInference};
pub use pipeline::rules::{CommandRule, CommandTable, Predicate, RuleAction};
pub use pipeline::{APOLOGY, AssistantState, Pipeline, Turn, TurnStatus};
pub use presentation::{ConsolePresentation, EntryRole, LogEntry, Presentation};
pub use voice::{
    CaptureControl, CaptureEvent, NullBackend, ProcessBackend, SpeechBackend, SpeechOutput,
    SpokenUtterance, TextCapture, VoiceInfo,
};
