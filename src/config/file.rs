//! TOML configuration file loading
//!
//! Supports `~/.config/souschef/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// STT model (e.g. "whisper-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_speed: Option<f64>,

    /// Seconds to wait for an utterance before giving up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_timeout_secs: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiKeysFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepgram: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
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
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/souschef/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("souschef").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let content = r#"
            [voice]
            enabled = false
            tts_voice = "nova"

            [api_keys]
            openai = "sk-test"
        "#;

        let config: ConfigFile = toml::from_str(content).unwrap();
        assert_eq!(config.voice.enabled, Some(false));
        assert_eq!(config.voice.tts_voice.as_deref(), Some("nova"));
        assert_eq!(config.api_keys.openai.as_deref(), Some("sk-test"));
        assert!(config.llm.model.is_none());
    }

    #[test]
    fn serializes_without_none_fields() {
        let config = ConfigFile {
            api_keys: ApiKeysFileConfig {
                openai: Some("sk-test".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("openai"));
        assert!(!rendered.contains("deepgram"));
    }
}
