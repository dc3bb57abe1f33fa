//! Presentation collaborator
//!
//! The pipeline writes display events here and never reads anything back.
//! The log is append-only except for the explicit clear command.

use std::fmt;
use std::sync::Mutex;

/// Role of a single log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    /// What the user said
    Heard,
    /// The assistant's response
    Assistant,
    /// Transient indicator while a remote call is in flight
    Thinking,
}

impl EntryRole {
    /// Wire-level role name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heard => "heard",
            Self::Assistant => "assistant",
            Self::Thinking => "thinking",
        }
    }
}

impl fmt::Display for EntryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the conversation display log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub role: EntryRole,
    pub text: String,
}

/// Display surface the assistant core writes to.
///
/// Implementations must tolerate being called from concurrent turns;
/// the core never awaits on presentation calls.
pub trait Presentation: Send + Sync {
    /// Append an entry to the conversation log
    fn append_entry(&self, role: EntryRole, text: &str);

    /// Empty the conversation log
    fn clear_log(&self);

    /// Update the one-line session status
    fn set_status(&self, text: &str);

    /// Enable or disable the start/stop capture controls
    fn set_controls(&self, start_enabled: bool, stop_enabled: bool);
}

/// Terminal-backed presentation: prints entries and keeps the log in memory
/// so the clear command has something observable to empty.
#[derive(Default)]
pub struct ConsolePresentation {
    log: Mutex<Vec<LogEntry>>,
}

impl ConsolePresentation {
    /// Create an empty console presentation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current log
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of entries currently in the log
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Presentation for ConsolePresentation {
    fn append_entry(&self, role: EntryRole, text: &str) {
        match role {
            EntryRole::Heard => println!("You said: \"{text}\""),
            EntryRole::Assistant => println!("Assistant: {text}"),
            EntryRole::Thinking => println!("{text}"),
        }
        if let Ok(mut log) = self.log.lock() {
            log.push(LogEntry {
                role,
                text: text.to_string(),
            });
        }
    }

    fn clear_log(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
        tracing::debug!("conversation log cleared");
    }

    fn set_status(&self, text: &str) {
        println!("[{text}]");
    }

    fn set_controls(&self, start_enabled: bool, stop_enabled: bool) {
        tracing::debug!(start_enabled, stop_enabled, "controls updated");
    }
}
