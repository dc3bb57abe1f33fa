//! Built-in command rules
//!
//! An ordered table of (predicate, action) pairs evaluated by a single
//! linear scan over the lowercased transcript. First match wins; no rule
//! below a match is ever consulted.

use chrono::{DateTime, Local};

/// How a rule's phrases are compared against the normalized transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Matches when the transcript contains ANY of the phrases
    Contains(&'static [&'static str]),
    /// Matches only when the whole transcript equals one of the phrases.
    /// Used for short high-collision phrasings that would otherwise
    /// swallow longer remote-bound queries.
    Exact(&'static [&'static str]),
}

impl Predicate {
    /// Test the predicate against an already-lowercased transcript
    #[must_use]
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Self::Contains(phrases) => phrases.iter().any(|p| normalized.contains(p)),
            Self::Exact(phrases) => phrases.iter().any(|p| normalized == *p),
        }
    }
}

/// What a matched rule does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Reply with fixed text
    Reply(&'static str),
    /// Reply with the current local time
    CurrentTime,
    /// Reply with the current local date
    CurrentDate,
    /// Stop the capture session, then confirm
    StopListening,
    /// Clear the conversation log, then confirm
    ClearLog,
}

impl RuleAction {
    /// Render the response text for this action at the given instant.
    /// Side effects (stopping capture, clearing the log) are the
    /// pipeline's job, not the table's.
    ///
    /// Time and date use a fixed en-US-style rendering; the voice
    /// language preference selects a synthesizer voice, not a locale
    /// for these strings.
    #[must_use]
    pub fn response_text(&self, now: DateTime<Local>) -> String {
        match self {
            Self::Reply(text) => (*text).to_string(),
            Self::CurrentTime => {
                format!("The current time is {}.", now.format("%-I:%M %p"))
            }
            Self::CurrentDate => {
                format!("Today is {}.", now.format("%A, %B %-d, %Y"))
            }
            Self::StopListening => "I've stopped listening.".to_string(),
            Self::ClearLog => "I've cleared our conversation.".to_string(),
        }
    }
}

/// One entry in the command table
#[derive(Debug, Clone, Copy)]
pub struct CommandRule {
    /// Stable name, used in logs and the `rules` subcommand
    pub name: &'static str,
    pub predicate: Predicate,
    pub action: RuleAction,
}

/// The table itself. System commands (clear, stop) come first so they
/// cannot be shadowed by the conversational rules below them.
const BUILTIN_RULES: &[CommandRule] = &[
    CommandRule {
        name: "clear",
        predicate: Predicate::Contains(&["clear screen", "clear chat"]),
        action: RuleAction::ClearLog,
    },
    CommandRule {
        name: "stop",
        predicate: Predicate::Contains(&["stop listening"]),
        action: RuleAction::StopListening,
    },
    CommandRule {
        name: "greeting",
        predicate: Predicate::Contains(&["hello", "hi there"]),
        action: RuleAction::Reply("Hello! How can I help you today?"),
    },
    CommandRule {
        name: "time",
        predicate: Predicate::Exact(&["what time is it", "tell me the time"]),
        action: RuleAction::CurrentTime,
    },
    CommandRule {
        name: "date",
        predicate: Predicate::Exact(&["what's today's date", "what day is it"]),
        action: RuleAction::CurrentDate,
    },
    CommandRule {
        name: "thanks",
        predicate: Predicate::Contains(&["thank you", "thanks"]),
        action: RuleAction::Reply("You're welcome!"),
    },
    CommandRule {
        name: "farewell",
        predicate: Predicate::Contains(&["bye", "goodbye"]),
        action: RuleAction::Reply("Goodbye! Have a great day!"),
    },
];

/// Ordered command table resolved by linear scan
#[derive(Debug, Clone)]
pub struct CommandTable {
    rules: &'static [CommandRule],
}

impl CommandTable {
    /// The built-in assistant command table
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES,
        }
    }

    /// Find the first rule matching the lowercased transcript
    #[must_use]
    pub fn resolve(&self, normalized: &str) -> Option<&CommandRule> {
        self.rules.iter().find(|r| r.predicate.matches(normalized))
    }

    /// All rules in evaluation order
    #[must_use]
    pub const fn rules(&self) -> &'static [CommandRule] {
        self.rules
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::builtin()
    }
}
