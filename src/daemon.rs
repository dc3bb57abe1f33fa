//! Daemon - the long-running assistant session
//!
//! Wires the capture stream into the pipeline and keeps the presentation
//! status and controls in sync with the capture lifecycle. Each utterance
//! is handled on its own task, so a turn awaiting the remote service does
//! not block the next transcript; overlapping remote turns may complete
//! out of arrival order.

use std::sync::Arc;

use crate::inference::{InferenceClient, OfflineClient, RemoteInference};
use crate::pipeline::Pipeline;
use crate::pipeline::rules::CommandTable;
use crate::presentation::{ConsolePresentation, Presentation};
use crate::voice::{
    CaptureControl, CaptureEvent, NullBackend, ProcessBackend, SpeechBackend, SpeechOutput,
    TextCapture,
};
use crate::{Config, Result};

/// The assistant daemon
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a daemon from loaded configuration
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the session until capture ends or the process is interrupted
    ///
    /// # Errors
    ///
    /// Returns error if speech capture is unsupported
    pub async fn run(self) -> Result<()> {
        let presentation = Arc::new(ConsolePresentation::new());

        // A missing synthesizer degrades to silent operation rather than
        // refusing to start.
        let backend: Box<dyn SpeechBackend> =
            match ProcessBackend::new(&self.config.voice.synth_command) {
                Ok(backend) => Box::new(backend),
                Err(e) => {
                    tracing::warn!(error = %e, "speech output unavailable, responses will not be spoken");
                    Box::new(NullBackend)
                }
            };
        let speech = SpeechOutput::new(backend, &self.config.voice);

        // No credential is likewise non-fatal: local rules still work and
        // unmatched utterances get the apology.
        let inference: Box<dyn InferenceClient> =
            match RemoteInference::new(&self.config.remote) {
                Ok(client) => Box::new(client),
                Err(e) => {
                    tracing::warn!(error = %e, "remote inference unavailable, unmatched utterances will get the apology");
                    Box::new(OfflineClient)
                }
            };

        // Capture being unsupported is fatal to the whole session: the
        // start control never comes back.
        if let Err(e) = TextCapture::probe() {
            presentation.set_status("Sorry, speech recognition isn't available here.");
            presentation.set_controls(false, false);
            return Err(e);
        }

        let (capture, mut events) = TextCapture::start()?;
        presentation.set_status("Listening...");
        presentation.set_controls(false, true);

        let display: Arc<dyn Presentation> = presentation.clone();
        let control: Arc<dyn CaptureControl> = capture.clone();
        let pipeline = Arc::new(Pipeline::new(
            CommandTable::builtin(),
            inference,
            speech,
            display,
            control,
        ));
        pipeline.begin_listening();

        tracing::info!("assistant session started");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupt received, stopping capture");
                    capture.stop();
                }
                event = events.recv() => match event {
                    Some(CaptureEvent::Transcript(text)) => {
                        let pipeline = Arc::clone(&pipeline);
                        tokio::spawn(async move {
                            pipeline.handle_utterance(text).await;
                        });
                    }
                    Some(CaptureEvent::Error(e)) => {
                        tracing::warn!(error = %e, "capture error");
                        presentation.set_status(&format!("Error occurred: {e}"));
                        presentation.set_controls(true, false);
                        break;
                    }
                    Some(CaptureEvent::Ended) | None => {
                        presentation.set_status("Voice recognition stopped.");
                        presentation.set_controls(true, false);
                        break;
                    }
                },
            }
        }

        tracing::info!("assistant session stopped");
        Ok(())
    }
}
