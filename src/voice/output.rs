//! Speech output
//!
//! At most one spoken utterance is active at a time: a new response
//! preempts whatever is still being spoken. Speaking is fire-and-forget;
//! callers never await completion.

use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::config::VoiceConfig;
use crate::{Error, Result};

/// A synthesizer voice advertised by the backend
#[derive(Debug, Clone)]
pub struct VoiceInfo {
    /// Backend-specific identifier
    pub id: String,
    /// Human-readable name (e.g. "English Female")
    pub name: String,
    /// BCP-47-ish language tag (e.g. "en-US")
    pub language: String,
}

/// One utterance handed to the backend
#[derive(Debug, Clone)]
pub struct SpokenUtterance {
    pub text: String,
    /// Selected voice id, or `None` for the backend default
    pub voice: Option<String>,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

/// Platform text-to-speech capability.
///
/// `speak` must return once synthesis has started, not once it finishes.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Voices available for selection
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Whether an utterance is currently being spoken
    fn is_speaking(&self) -> bool;

    /// Cancel the in-progress utterance, if any
    fn cancel(&self);

    /// Begin speaking an utterance
    ///
    /// # Errors
    ///
    /// Returns error if synthesis cannot start
    async fn speak(&self, utterance: SpokenUtterance) -> Result<()>;
}

/// Speech output adapter: voice selection plus newest-wins preemption
pub struct SpeechOutput {
    backend: Box<dyn SpeechBackend>,
    language: String,
    name_hint: Option<String>,
    pitch: f32,
    rate: f32,
    volume: f32,
}

impl SpeechOutput {
    /// Wrap a backend with the configured voice preference
    #[must_use]
    pub fn new(backend: Box<dyn SpeechBackend>, config: &VoiceConfig) -> Self {
        Self {
            backend,
            language: config.language.clone(),
            name_hint: config.voice_name.clone(),
            pitch: config.pitch,
            rate: config.rate,
            volume: config.volume,
        }
    }

    /// Speak a response, preempting any utterance still in progress
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot start synthesis
    pub async fn speak(&self, text: &str) -> Result<()> {
        if self.backend.is_speaking() {
            tracing::debug!("preempting in-progress utterance");
            self.backend.cancel();
        }

        let voice = select_voice(&self.backend.voices(), &self.language, self.name_hint.as_deref());

        self.backend
            .speak(SpokenUtterance {
                text: text.to_string(),
                voice,
                pitch: self.pitch,
                rate: self.rate,
                volume: self.volume,
            })
            .await
    }

    /// Whether an utterance is still being spoken
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.backend.is_speaking()
    }
}

/// Pick a voice matching the language tag and, if given, a descriptive
/// name fragment. Falls back to the backend default (`None`) when nothing
/// matches.
fn select_voice(voices: &[VoiceInfo], language: &str, name_hint: Option<&str>) -> Option<String> {
    let candidates: Vec<&VoiceInfo> = voices
        .iter()
        .filter(|v| v.language.contains(language))
        .collect();

    if let Some(hint) = name_hint {
        if let Some(preferred) = candidates.iter().find(|v| v.name.contains(hint)) {
            return Some(preferred.id.clone());
        }
    }

    None
}

/// Backend driving an external synthesizer process (espeak-compatible
/// flags). Cancellation kills the child; a fresh child is spawned per
/// utterance.
pub struct ProcessBackend {
    command: String,
    child: Mutex<Option<Child>>,
}

impl ProcessBackend {
    /// Create a backend for the configured synthesizer command
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be found on PATH
    pub fn new(command: &str) -> Result<Self> {
        which::which(command).map_err(|e| {
            Error::Speech(format!("synthesizer command {command:?} not found: {e}"))
        })?;

        Ok(Self {
            command: command.to_string(),
            child: Mutex::new(None),
        })
    }
}

#[async_trait]
impl SpeechBackend for ProcessBackend {
    fn voices(&self) -> Vec<VoiceInfo> {
        // The process backend does not enumerate voices; selection falls
        // through to the synthesizer default.
        Vec::new()
    }

    fn is_speaking(&self) -> bool {
        self.child.lock().is_ok_and(|mut guard| {
            guard
                .as_mut()
                .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
        })
    }

    fn cancel(&self) {
        if let Ok(mut guard) = self.child.lock() {
            if let Some(mut child) = guard.take() {
                if let Err(e) = child.start_kill() {
                    tracing::warn!(error = %e, "failed to cancel utterance");
                }
            }
        }
    }

    async fn speak(&self, utterance: SpokenUtterance) -> Result<()> {
        // espeak flag ranges: pitch 0-99, speed in wpm, amplitude 0-200
        let pitch = (utterance.pitch * 50.0).clamp(0.0, 99.0).round();
        let speed = (utterance.rate * 175.0).clamp(80.0, 450.0).round();
        let amplitude = (utterance.volume * 100.0).clamp(0.0, 200.0).round();

        let mut command = Command::new(&self.command);
        command
            .arg("-p")
            .arg(pitch.to_string())
            .arg("-s")
            .arg(speed.to_string())
            .arg("-a")
            .arg(amplitude.to_string());

        if let Some(voice) = &utterance.voice {
            command.arg("-v").arg(voice);
        }

        let child = command
            .arg(&utterance.text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Speech(format!("failed to start synthesizer: {e}")))?;

        tracing::debug!(chars = utterance.text.len(), "speaking response");

        if let Ok(mut guard) = self.child.lock() {
            *guard = Some(child);
        }
        Ok(())
    }
}

/// Backend that discards speech. Used when no synthesizer is installed
/// and by the one-shot CLI paths where audio output is unwanted.
#[derive(Default)]
pub struct NullBackend;

#[async_trait]
impl SpeechBackend for NullBackend {
    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn is_speaking(&self) -> bool {
        false
    }

    fn cancel(&self) {}

    async fn speak(&self, _utterance: SpokenUtterance) -> Result<()> {
        Ok(())
    }
}
