//! Voice adapters
//!
//! Wraps the platform speech capabilities behind narrow, injectable
//! contracts: a continuous transcript source and a preempting speech
//! output. The pipeline depends on these traits, never on a concrete
//! recognizer or synthesizer.

mod capture;
mod output;

pub use capture::{CaptureControl, CaptureEvent, TextCapture};
pub use output::{
    NullBackend, ProcessBackend, SpeechBackend, SpeechOutput, SpokenUtterance, VoiceInfo,
};
