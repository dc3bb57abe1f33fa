//! Configuration
//!
//! Defaults overlaid by an optional TOML file
//! (`~/.config/murmur/config.toml`); all file fields are optional. The
//! API credential may also come from the `MURMUR_API_KEY` or
//! `ANTHROPIC_API_KEY` environment variables, which take precedence over
//! the file.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use crate::{Error, Result};

/// Default messages endpoint
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Default response token cap
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Default system instruction sent with every request
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful voice assistant. Provide concise and accurate responses.";

/// Assistant configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Remote inference configuration
    pub remote: RemoteConfig,

    /// Voice capture/output configuration
    pub voice: VoiceConfig,
}

/// Remote inference service configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Messages endpoint URL
    pub api_url: String,

    /// Static API credential
    pub api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// Response token cap
    pub max_tokens: u32,

    /// System instruction sent with every request
    pub system_prompt: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: SecretString::from(String::new()),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Voice configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Language tag preference for voice selection (e.g. "en")
    pub language: String,

    /// Descriptive voice name fragment to prefer (e.g. "Female")
    pub voice_name: Option<String>,

    /// Pitch multiplier
    pub pitch: f32,

    /// Speaking rate multiplier
    pub rate: f32,

    /// Volume, 0.0 to 1.0
    pub volume: f32,

    /// External synthesizer command (espeak-compatible flags)
    pub synth_command: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            voice_name: Some("Female".to_string()),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
            synth_command: "espeak".to_string(),
        }
    }
}

/// Top-level TOML file schema; a partial overlay on top of defaults
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    remote: RemoteFileConfig,

    #[serde(default)]
    voice: VoiceFileConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteFileConfig {
    api_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VoiceFileConfig {
    language: Option<String>,
    voice_name: Option<String>,
    pitch: Option<f32>,
    rate: Option<f32>,
    volume: Option<f32>,
    synth_command: Option<String>,
}

impl Config {
    /// Load configuration: defaults, then the TOML file, then env vars.
    ///
    /// An explicitly given path must exist and parse; the default path is
    /// best-effort and falls back to defaults with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly given config file is missing or
    /// invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("cannot read config {}: {e}", p.display()))
                })?;
                let parsed: ConfigFile = toml::from_str(&content)?;
                tracing::info!(path = %p.display(), "loaded config file");
                parsed
            }
            None => load_default_file(),
        };

        let mut config = Self {
            remote: RemoteConfig::default(),
            voice: VoiceConfig::default(),
        };
        config.overlay(file);

        if let Some(key) = std::env::var("MURMUR_API_KEY")
            .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
        {
            config.remote.api_key = SecretString::from(key);
        }

        Ok(config)
    }

    /// Apply a partial file config over the current values
    fn overlay(&mut self, file: ConfigFile) {
        let ConfigFile { remote, voice } = file;

        if let Some(api_url) = remote.api_url {
            self.remote.api_url = api_url;
        }
        if let Some(api_key) = remote.api_key {
            self.remote.api_key = SecretString::from(api_key);
        }
        if let Some(model) = remote.model {
            self.remote.model = model;
        }
        if let Some(max_tokens) = remote.max_tokens {
            self.remote.max_tokens = max_tokens;
        }
        if let Some(system_prompt) = remote.system_prompt {
            self.remote.system_prompt = system_prompt;
        }

        if let Some(language) = voice.language {
            self.voice.language = language;
        }
        if let Some(voice_name) = voice.voice_name {
            self.voice.voice_name = Some(voice_name);
        }
        if let Some(pitch) = voice.pitch {
            self.voice.pitch = pitch;
        }
        if let Some(rate) = voice.rate {
            self.voice.rate = rate;
        }
        if let Some(volume) = voice.volume {
            self.voice.volume = volume;
        }
        if let Some(synth_command) = voice.synth_command {
            self.voice.synth_command = synth_command;
        }
    }

    /// Standard config file path: `~/.config/murmur/config.toml`
    #[must_use]
    pub fn file_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.config_dir().join("murmur").join("config.toml"))
    }
}

/// Load the file at the standard path, tolerating absence and parse
/// failures
fn load_default_file() -> ConfigFile {
    let Some(path) = Config::file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(file) => {
                tracing::info!(path = %path.display(), "loaded config file");
                file
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
            ConfigFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.remote.api_url, DEFAULT_API_URL);
        assert_eq!(config.remote.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.remote.api_key.expose_secret().is_empty());
        assert_eq!(config.voice.synth_command, "espeak");
        assert_eq!(config.voice.voice_name.as_deref(), Some("Female"));
    }

    #[test]
    fn test_partial_overlay() {
        let file: ConfigFile = toml::from_str(
            r#"
            [remote]
            model = "claude-3-haiku-20240307"
            max_tokens = 64

            [voice]
            rate = 1.25
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.overlay(file);

        assert_eq!(config.remote.model, "claude-3-haiku-20240307");
        assert_eq!(config.remote.max_tokens, 64);
        // Untouched fields keep their defaults
        assert_eq!(config.remote.api_url, DEFAULT_API_URL);
        assert!((config.voice.rate - 1.25).abs() < f32::EPSILON);
        assert!((config.voice.pitch - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_api_key_overlay() {
        let file: ConfigFile = toml::from_str(
            r#"
            [remote]
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.overlay(file);
        assert_eq!(config.remote.api_key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        let mut config = Config::default();
        config.overlay(file);
        assert_eq!(config.remote.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/murmur.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
