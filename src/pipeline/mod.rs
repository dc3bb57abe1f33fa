//! Command resolution and response pipeline
//!
//! Given one finalized transcript, produce exactly one response text:
//! either a canned reply from the ordered rule table or the result of a
//! single remote inference call. Display and speech events are emitted in
//! a fixed order per turn: heard entry, (thinking entry if remote),
//! assistant entry, then speech.

pub mod rules;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Local;

use crate::inference::InferenceClient;
use crate::presentation::{EntryRole, Presentation};
use crate::voice::{CaptureControl, SpeechOutput};
use rules::{CommandTable, RuleAction};

/// Fixed apology substituted for any remote failure
pub const APOLOGY: &str =
    "Sorry, I couldn't connect to my AI brain at the moment. Please try again later.";

/// Text of the transient entry shown while a remote call is pending
pub const THINKING_TEXT: &str = "Thinking...";

/// How a turn was (or is being) handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// A command rule matched; no remote call was made
    LocalMatch,
    /// No rule matched; a remote call is in flight
    PendingRemote,
    /// The remote call returned text
    RemoteSuccess,
    /// The remote call failed; the apology was substituted
    RemoteFailure,
}

impl TurnStatus {
    /// Stable status name, used in logs and one-shot output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalMatch => "local-match",
            Self::PendingRemote => "pending-remote",
            Self::RemoteSuccess => "remote-success",
            Self::RemoteFailure => "remote-failure",
        }
    }
}

/// The lifecycle record of one utterance
#[derive(Debug, Clone)]
pub struct Turn {
    /// Monotonic arrival sequence
    pub seq: u64,
    /// The transcript as captured (original case)
    pub heard: String,
    pub status: TurnStatus,
    /// The response text; always present once the turn completes
    pub response: Option<String>,
    /// Name of the matched rule, for local turns
    pub rule: Option<&'static str>,
}

/// Coarse assistant state, driven by capture events, rule resolution,
/// and remote completion. The only suspension point is the remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantState {
    Idle,
    Listening,
    AwaitingRemote,
    Speaking,
}

/// The resolution pipeline. All collaborators are injected so tests can
/// substitute doubles for the platform capabilities.
pub struct Pipeline {
    table: CommandTable,
    inference: Box<dyn InferenceClient>,
    speech: SpeechOutput,
    presentation: Arc<dyn Presentation>,
    capture: Arc<dyn CaptureControl>,
    seq: AtomicU64,
    state: Mutex<AssistantState>,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators
    #[must_use]
    pub fn new(
        table: CommandTable,
        inference: Box<dyn InferenceClient>,
        speech: SpeechOutput,
        presentation: Arc<dyn Presentation>,
        capture: Arc<dyn CaptureControl>,
    ) -> Self {
        Self {
            table,
            inference,
            speech,
            presentation,
            capture,
            seq: AtomicU64::new(0),
            state: Mutex::new(AssistantState::Idle),
        }
    }

    /// Current coarse state
    #[must_use]
    pub fn state(&self) -> AssistantState {
        self.state
            .lock()
            .map_or(AssistantState::Idle, |state| *state)
    }

    fn set_state(&self, next: AssistantState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// Mark the session as actively listening
    pub fn begin_listening(&self) {
        self.set_state(AssistantState::Listening);
    }

    /// Process one utterance end to end: heard entry, resolution,
    /// assistant entry, speech. Always completes with exactly one
    /// response text; remote failures become the fixed apology.
    pub async fn handle_utterance(&self, heard: String) -> Turn {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(seq, heard = %heard, "utterance received");

        self.presentation.append_entry(EntryRole::Heard, &heard);

        let mut turn = Turn {
            seq,
            heard,
            status: TurnStatus::PendingRemote,
            response: None,
            rule: None,
        };
        self.resolve_into(&mut turn).await;

        // The display entry must land before speech begins, and each
        // exactly once per utterance.
        let response = turn.response.as_deref().unwrap_or(APOLOGY);
        self.presentation.append_entry(EntryRole::Assistant, response);

        self.set_state(AssistantState::Speaking);
        if let Err(e) = self.speech.speak(response).await {
            tracing::warn!(error = %e, "speech output failed");
        }

        self.set_state(if self.capture.is_active() {
            AssistantState::Listening
        } else {
            AssistantState::Idle
        });

        turn
    }

    /// Classify the utterance and fill in the response.
    ///
    /// Lowercases for matching but forwards the original text to the
    /// remote client. An empty transcript matches no rule and goes
    /// remote as an empty query.
    async fn resolve_into(&self, turn: &mut Turn) {
        let normalized = turn.heard.to_lowercase();

        if let Some(rule) = self.table.resolve(&normalized) {
            tracing::info!(seq = turn.seq, rule = rule.name, "local command matched");

            // Side effects happen before the confirmation text is
            // appended, so a cleared log starts with the confirmation.
            match rule.action {
                RuleAction::ClearLog => self.presentation.clear_log(),
                RuleAction::StopListening => self.capture.stop(),
                RuleAction::Reply(_) | RuleAction::CurrentTime | RuleAction::CurrentDate => {}
            }

            turn.status = TurnStatus::LocalMatch;
            turn.rule = Some(rule.name);
            turn.response = Some(rule.action.response_text(Local::now()));
            return;
        }

        turn.status = TurnStatus::PendingRemote;
        self.presentation.append_entry(EntryRole::Thinking, THINKING_TEXT);
        self.set_state(AssistantState::AwaitingRemote);

        match self.inference.infer(&turn.heard).await {
            Ok(text) => {
                turn.status = TurnStatus::RemoteSuccess;
                turn.response = Some(text);
            }
            Err(e) => {
                tracing::warn!(seq = turn.seq, error = %e, "remote inference failed");
                turn.status = TurnStatus::RemoteFailure;
                turn.response = Some(APOLOGY.to_string());
            }
        }
    }

    /// The rule table this pipeline resolves against
    #[must_use]
    pub const fn table(&self) -> &CommandTable {
        &self.table
    }
}
