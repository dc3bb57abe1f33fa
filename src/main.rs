use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use murmur::{
    CaptureControl, CommandTable, Config, ConsolePresentation, Daemon, InferenceClient,
    NullBackend, OfflineClient, Pipeline, Predicate, ProcessBackend, RemoteInference, SpeechOutput,
};

/// Murmur - voice assistant with built-in commands and LLM fallback
#[derive(Parser)]
#[command(name = "murmur", version, about)]
struct Cli {
    /// Path to a config file (default: ~/.config/murmur/config.toml)
    #[arg(short, long, env = "MURMUR_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one typed utterance and print the turn (no speech)
    Resolve {
        /// The utterance text
        text: String,
    },
    /// Print the built-in command table in evaluation order
    Rules,
    /// Test speech output
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,murmur=info",
        1 => "info,murmur=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Resolve { text } => resolve_once(config, text).await,
            Command::Rules => {
                print_rules();
                Ok(())
            }
            Command::Say { text } => say(&config, &text).await,
        };
    }

    tracing::info!("starting murmur assistant");
    Daemon::new(config).run().await?;
    Ok(())
}

/// Stand-in capture handle for one-shot resolution
struct InertCapture;

impl CaptureControl for InertCapture {
    fn stop(&self) {}

    fn is_active(&self) -> bool {
        false
    }
}

/// Run a single utterance through the pipeline and print the outcome
async fn resolve_once(config: Config, text: String) -> anyhow::Result<()> {
    let inference: Box<dyn InferenceClient> = match RemoteInference::new(&config.remote) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "remote inference unavailable");
            Box::new(OfflineClient)
        }
    };

    let pipeline = Pipeline::new(
        CommandTable::builtin(),
        inference,
        SpeechOutput::new(Box::new(NullBackend), &config.voice),
        Arc::new(ConsolePresentation::new()),
        Arc::new(InertCapture),
    );

    let turn = pipeline.handle_utterance(text).await;

    match turn.rule {
        Some(rule) => println!("[{} via rule {rule:?}]", turn.status.as_str()),
        None => println!("[{}]", turn.status.as_str()),
    }
    Ok(())
}

/// Print the command table in evaluation order
fn print_rules() {
    for (i, rule) in CommandTable::builtin().rules().iter().enumerate() {
        let (kind, phrases) = match rule.predicate {
            Predicate::Contains(phrases) => ("contains", phrases),
            Predicate::Exact(phrases) => ("exact", phrases),
        };
        println!("{:>2}. {:<10} {:<8} {}", i + 1, rule.name, kind, phrases.join(" | "));
    }
}

/// Speak text through the configured synthesizer and wait for it to finish
async fn say(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Speaking: \"{text}\"");

    let backend = ProcessBackend::new(&config.voice.synth_command)?;
    let output = SpeechOutput::new(Box::new(backend), &config.voice);
    output.speak(text).await?;

    while output.is_speaking() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    println!("Done. If you heard nothing, check your synthesizer install.");
    Ok(())
}
