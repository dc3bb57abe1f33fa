//! Error types for the murmur assistant

use thiserror::Error;

/// Result type alias for murmur operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech capture is unavailable on this platform.
    /// Fatal to the session: the start control stays disabled.
    #[error("speech capture unsupported: {0}")]
    CaptureUnsupported(String),

    /// Recognizer-level capture error (e.g. no-speech timeout).
    /// The session survives; the user may restart capture manually.
    #[error("capture error: {0}")]
    Capture(String),

    /// Speech output error
    #[error("speech output error: {0}")]
    Speech(String),

    /// Network-level failure talking to the inference service
    #[error("remote transport error: {0}")]
    RemoteTransport(String),

    /// The inference service answered with an unexpected shape
    #[error("malformed remote response: {0}")]
    RemoteMalformed(String),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error came from the remote inference call.
    /// Both transport and malformed-response failures collapse to the
    /// same spoken apology; callers only need "it failed".
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteTransport(_) | Self::RemoteMalformed(_))
    }
}
