//! Test doubles for the platform capabilities and collaborators
//!
//! Every double records into a shared ordered event log so tests can
//! assert cross-collaborator sequencing (e.g. display before speech).

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use murmur::{
    CaptureControl, CommandTable, EntryRole, Error, InferenceClient, OfflineClient, Pipeline,
    Presentation, Result, SpeechBackend, SpeechOutput, SpokenUtterance, VoiceConfig, VoiceInfo,
};

/// Shared, ordered record of observable side effects
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event.into());
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Index of the first event equal to `needle`, if any
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.events().iter().position(|e| e == needle)
    }
}

/// Presentation double keeping the log in memory
pub struct RecordingPresentation {
    events: EventLog,
    entries: Mutex<Vec<(EntryRole, String)>>,
    statuses: Mutex<Vec<String>>,
}

impl RecordingPresentation {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            entries: Mutex::new(Vec::new()),
            statuses: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<(EntryRole, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Presentation for RecordingPresentation {
    fn append_entry(&self, role: EntryRole, text: &str) {
        self.events.push(format!("entry:{role}"));
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((role, text.to_string()));
        }
    }

    fn clear_log(&self) {
        self.events.push("clear");
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn set_status(&self, text: &str) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(text.to_string());
        }
    }

    fn set_controls(&self, _start_enabled: bool, _stop_enabled: bool) {}
}

/// How the scripted inference client responds
#[derive(Clone, Copy)]
pub enum ClientBehavior {
    Reply(&'static str),
    TransportFailure,
    MalformedFailure,
}

/// Inference double recording every request it receives
pub struct ScriptedClient {
    behavior: ClientBehavior,
    calls: Arc<Mutex<Vec<String>>>,
    events: EventLog,
}

impl ScriptedClient {
    pub fn new(behavior: ClientBehavior, events: EventLog) -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                behavior,
                calls: Arc::clone(&calls),
                events,
            },
            calls,
        )
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn infer(&self, text: &str) -> Result<String> {
        self.events.push("infer");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        match self.behavior {
            ClientBehavior::Reply(text) => Ok(text.to_string()),
            ClientBehavior::TransportFailure => {
                Err(Error::RemoteTransport("connection refused".to_string()))
            }
            ClientBehavior::MalformedFailure => {
                Err(Error::RemoteMalformed("missing text field".to_string()))
            }
        }
    }
}

/// Speech backend double. Marks itself speaking after each utterance so
/// the next one exercises preemption.
#[derive(Clone)]
pub struct RecordingBackend {
    speaking: Arc<AtomicBool>,
    voices: Arc<Mutex<Vec<VoiceInfo>>>,
    spoken: Arc<Mutex<Vec<SpokenUtterance>>>,
    events: EventLog,
}

impl RecordingBackend {
    pub fn new(events: EventLog) -> Self {
        Self {
            speaking: Arc::new(AtomicBool::new(false)),
            voices: Arc::new(Mutex::new(Vec::new())),
            spoken: Arc::new(Mutex::new(Vec::new())),
            events,
        }
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::SeqCst);
    }

    pub fn set_voices(&self, voices: Vec<VoiceInfo>) {
        if let Ok(mut v) = self.voices.lock() {
            *v = voices;
        }
    }

    pub fn spoken(&self) -> Vec<SpokenUtterance> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechBackend for RecordingBackend {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.events.push("cancel");
        self.speaking.store(false, Ordering::SeqCst);
    }

    async fn speak(&self, utterance: SpokenUtterance) -> Result<()> {
        self.events.push(format!("speak:{}", utterance.text));
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(utterance);
        }
        self.speaking.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Capture handle double
pub struct FakeCapture {
    active: AtomicBool,
    events: EventLog,
}

impl FakeCapture {
    pub fn new(events: EventLog) -> Self {
        Self {
            active: AtomicBool::new(true),
            events,
        }
    }
}

impl CaptureControl for FakeCapture {
    fn stop(&self) {
        self.events.push("capture-stopped");
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// A fully wired pipeline over doubles, with handles for assertions
pub struct Harness {
    pub pipeline: Pipeline,
    pub presentation: Arc<RecordingPresentation>,
    pub backend: RecordingBackend,
    pub capture: Arc<FakeCapture>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub events: EventLog,
}

impl Harness {
    pub fn new(behavior: ClientBehavior) -> Self {
        let events = EventLog::default();
        let (client, calls) = ScriptedClient::new(behavior, events.clone());
        Self::over(Box::new(client), calls, events)
    }

    /// Harness wired with the no-credential client the daemon falls back
    /// to when no API key is configured
    pub fn offline() -> Self {
        let events = EventLog::default();
        Self::over(
            Box::new(OfflineClient),
            Arc::new(Mutex::new(Vec::new())),
            events,
        )
    }

    fn over(
        client: Box<dyn InferenceClient>,
        calls: Arc<Mutex<Vec<String>>>,
        events: EventLog,
    ) -> Self {
        let presentation = Arc::new(RecordingPresentation::new(events.clone()));
        let backend = RecordingBackend::new(events.clone());
        let capture = Arc::new(FakeCapture::new(events.clone()));

        let display: Arc<dyn Presentation> = presentation.clone();
        let control: Arc<dyn CaptureControl> = capture.clone();
        let pipeline = Pipeline::new(
            CommandTable::builtin(),
            client,
            SpeechOutput::new(Box::new(backend.clone()), &VoiceConfig::default()),
            display,
            control,
        );

        Self {
            pipeline,
            presentation,
            backend,
            capture,
            calls,
            events,
        }
    }

    pub fn remote_calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}
