//! Continuous speech capture
//!
//! A capture session emits one finalized transcript per utterance until it
//! is stopped explicitly or the underlying source ends. Interim partial
//! results are never surfaced; transcripts arrive already trimmed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Notify, mpsc};

use crate::{Error, Result};

/// Capacity of the capture event channel
const EVENT_BUFFER: usize = 16;

/// Events emitted by a capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// One finalized utterance transcript (trimmed, original case)
    Transcript(String),
    /// Recognizer-level error; the session has terminated
    Error(String),
    /// The session ended (stopped or source exhausted)
    Ended,
}

/// Handle for terminating a running capture session.
///
/// Held by the pipeline so the stop-listening command can end the session
/// from inside a turn.
pub trait CaptureControl: Send + Sync {
    /// Request the session to stop; idempotent
    fn stop(&self);

    /// Whether the session is still accepting utterances
    fn is_active(&self) -> bool;
}

/// Transcript source that reads finalized utterances as lines from stdin.
///
/// Stands in for a microphone recognizer so the assistant runs without
/// audio hardware; every line is treated as one finalized utterance.
pub struct TextCapture {
    active: Arc<AtomicBool>,
    stopped: Arc<Notify>,
}

impl TextCapture {
    /// Start a continuous capture session.
    ///
    /// Returns the control handle and the event stream. The session stays
    /// active across utterances until [`CaptureControl::stop`] is called or
    /// stdin reaches end-of-file.
    ///
    /// # Errors
    ///
    /// Returns `CaptureUnsupported` if the transcript source cannot be
    /// opened on this platform.
    pub fn start() -> Result<(Arc<Self>, mpsc::Receiver<CaptureEvent>)> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let capture = Arc::new(Self {
            active: Arc::new(AtomicBool::new(true)),
            stopped: Arc::new(Notify::new()),
        });

        let active = Arc::clone(&capture.active);
        let stopped = Arc::clone(&capture.stopped);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                tokio::select! {
                    () = stopped.notified() => {
                        tracing::debug!("capture session stopped");
                        break;
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(raw)) => {
                            if !active.load(Ordering::SeqCst) {
                                break;
                            }
                            // Trimming happens here, at capture time;
                            // the pipeline does not trim again.
                            let transcript = raw.trim().to_string();
                            tracing::debug!(transcript = %transcript, "utterance finalized");
                            if tx.send(CaptureEvent::Transcript(transcript)).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            tracing::debug!("transcript source exhausted");
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "capture read failed");
                            active.store(false, Ordering::SeqCst);
                            let _ = tx.send(CaptureEvent::Error(e.to_string())).await;
                            return;
                        }
                    },
                }
            }

            active.store(false, Ordering::SeqCst);
            let _ = tx.send(CaptureEvent::Ended).await;
        });

        Ok((capture, rx))
    }

    /// Probe whether a transcript source is available at all.
    ///
    /// # Errors
    ///
    /// Returns `CaptureUnsupported` when stdin is closed before the
    /// session even starts.
    pub fn probe() -> Result<()> {
        // Line-based capture only needs a readable stdin; the interesting
        // unsupported cases belong to real recognizer backends.
        if cfg!(target_family = "wasm") {
            return Err(Error::CaptureUnsupported(
                "no transcript source on this platform".to_string(),
            ));
        }
        Ok(())
    }
}

impl CaptureControl for TextCapture {
    fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.stopped.notify_one();
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
