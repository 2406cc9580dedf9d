//! TOML configuration file loading
//!
//! Supports `~/.config/sahayak/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SahayakConfigFile {
    /// Persona and wake phrase
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Speech capture configuration
    #[serde(default)]
    pub capture: CaptureFileConfig,

    /// Completion backend configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Shell-facing HTTP server
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Persona configuration
#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Display name the assistant answers to
    pub name: Option<String>,

    /// Wake phrase (e.g. "hey sahayak")
    pub wake_phrase: Option<String>,

    /// Persona description embedded in the system prompt
    pub description: Option<String>,
}

/// Speech capture configuration
#[derive(Debug, Default, Deserialize)]
pub struct CaptureFileConfig {
    /// Candidate recognition locales, primary first
    pub locales: Option<Vec<String>>,

    /// Silence before a `speech-timeout` is reported
    pub silence_timeout_secs: Option<u64>,
}

/// Completion backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    /// Request timeout
    pub timeout_secs: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Serve the HTTP surface at all
    pub enabled: Option<bool>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SahayakConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> SahayakConfigFile {
    let path = std::env::var("SAHAYAK_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(config_file_path);

    path.map_or_else(SahayakConfigFile::default, |p| load_config_from(&p))
}

/// Load a config file from an explicit path
pub fn load_config_from(path: &Path) -> SahayakConfigFile {
    if !path.exists() {
        return SahayakConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                SahayakConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            SahayakConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/sahayak/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("sahayak").join("config.toml"))
}
