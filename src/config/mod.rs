//! Configuration management for the assistant
//!
//! Values are layered `env > config.toml > default`.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

pub use file::{SahayakConfigFile, config_file_path, load_config_file, load_config_from};

/// Default wake phrase
pub const DEFAULT_WAKE_PHRASE: &str = "hey sahayak";

/// Default assistant name
pub const DEFAULT_NAME: &str = "Sahayak";

/// Default persona description used in the system prompt
pub const DEFAULT_DESCRIPTION: &str = "a warm, caring companion who speaks like a close friend. \
You listen closely, notice how the user is feeling, and answer in a natural, gentle voice.";

/// Default OpenAI-compatible endpoint
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 18790;

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Persona and wake phrase
    pub assistant: AssistantConfig,

    /// Speech capture configuration
    pub capture: CaptureConfig,

    /// Completion backend configuration
    pub llm: LlmConfig,

    /// HTTP surface configuration
    pub server: ServerConfig,

    /// Path to data directory (preferences)
    pub data_dir: PathBuf,
}

/// Persona configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Display name
    pub name: String,

    /// Normalised wake phrase
    pub wake_phrase: String,

    /// Persona description for the system prompt
    pub description: String,
}

/// Speech capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Candidate recognition locales, primary first
    pub locales: Vec<String>,

    /// Silence before reporting `speech-timeout`
    pub silence_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            locales: vec!["hi-IN".to_string(), "en-US".to_string()],
            silence_timeout: Duration::from_secs(8),
        }
    }
}

/// Completion backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_url: String,

    /// Model identifier
    pub model: String,

    /// Token budget per reply
    pub max_tokens: u32,

    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,

    /// Request timeout
    pub timeout: Duration,

    /// Backend credential; absent means every reply is a fallback
    pub api_key: Option<SecretString>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 150,
            temperature: 0.8,
            top_p: 0.9,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
            timeout: Duration::from_secs(15),
            api_key: None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Serve the HTTP surface
    pub enabled: bool,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if the resolved configuration is invalid
    pub fn load() -> Result<Self> {
        let fc = load_config_file();
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the wake phrase or capture locales are empty
    pub fn resolve(fc: SahayakConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let wake_phrase = env("SAHAYAK_WAKE_PHRASE")
            .or(fc.assistant.wake_phrase)
            .unwrap_or_else(|| DEFAULT_WAKE_PHRASE.to_string())
            .trim()
            .to_lowercase();

        if wake_phrase.is_empty() {
            return Err(Error::Config("wake phrase must not be empty".to_string()));
        }

        let assistant = AssistantConfig {
            name: fc.assistant.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            wake_phrase,
            description: fc
                .assistant
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        };

        let capture_defaults = CaptureConfig::default();
        let mut locales = fc
            .capture
            .locales
            .unwrap_or_else(|| capture_defaults.locales.clone());
        if locales.is_empty() {
            return Err(Error::Config(
                "capture.locales needs at least one locale".to_string(),
            ));
        }
        // Recognition always gets a secondary locale
        if locales.len() == 1
            && let Some(secondary) = capture_defaults
                .locales
                .iter()
                .find(|l| !l.eq_ignore_ascii_case(&locales[0]))
        {
            tracing::info!(primary = %locales[0], %secondary, "adding secondary capture locale");
            locales.push(secondary.clone());
        }
        let capture = CaptureConfig {
            locales,
            silence_timeout: fc
                .capture
                .silence_timeout_secs
                .map_or(capture_defaults.silence_timeout, Duration::from_secs),
        };

        let llm_defaults = LlmConfig::default();
        let api_key = env("OPENAI_API_KEY")
            .or(fc.api_keys.openai)
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        let llm = LlmConfig {
            api_url: env("SAHAYAK_LLM_URL")
                .or(fc.llm.api_url)
                .unwrap_or(llm_defaults.api_url),
            model: env("SAHAYAK_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or(llm_defaults.model),
            max_tokens: fc.llm.max_tokens.unwrap_or(llm_defaults.max_tokens),
            temperature: fc.llm.temperature.unwrap_or(llm_defaults.temperature),
            top_p: fc.llm.top_p.unwrap_or(llm_defaults.top_p),
            frequency_penalty: fc
                .llm
                .frequency_penalty
                .unwrap_or(llm_defaults.frequency_penalty),
            presence_penalty: fc
                .llm
                .presence_penalty
                .unwrap_or(llm_defaults.presence_penalty),
            timeout: fc
                .llm
                .timeout_secs
                .map_or(llm_defaults.timeout, Duration::from_secs),
            api_key,
        };

        if llm.api_key.is_none() {
            tracing::warn!("no completion backend key configured - replies will use fallbacks");
        }

        let server = ServerConfig {
            port: env("SAHAYAK_PORT")
                .and_then(|p| p.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            enabled: fc.server.enabled.unwrap_or(true),
        };

        // ~/.local/share/sahayak on Linux
        let data_dir = directories::BaseDirs::new()
            .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("sahayak"));

        Ok(Self {
            assistant,
            capture,
            llm,
            server,
            data_dir,
        })
    }

    /// Path of the persisted preference file
    #[must_use]
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.toml")
    }
}
