//! Configuration management for Sous-Chef
//!
//! Resolution order for every setting: environment variable, then the TOML
//! config file, then the built-in default. Missing credentials degrade
//! features (voice falls back to text, generation becomes unavailable)
//! instead of failing startup.

pub mod file;

use std::path::PathBuf;

use crate::Result;

/// Default chat-completions model
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Sous-Chef configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database lives here)
    pub data_dir: PathBuf,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// LLM model identifier for chat completions
    pub llm_model: String,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,

    /// Seconds to wait for an utterance before reporting no speech
    pub listen_timeout_secs: u64,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (chat completions, Whisper STT, TTS)
    pub openai: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

impl Config {
    /// Load configuration
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created
    pub fn load(disable_voice: bool, data_dir_override: Option<PathBuf>) -> Result<Self> {
        let fc = file::load_config_file();

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
            deepgram: std::env::var("DEEPGRAM_API_KEY")
                .ok()
                .or(fc.api_keys.deepgram),
            elevenlabs: std::env::var("ELEVENLABS_API_KEY")
                .ok()
                .or(fc.api_keys.elevenlabs),
        };

        // Voice config (env > toml > default)
        let voice_enabled = if disable_voice {
            false
        } else {
            fc.voice.enabled.unwrap_or(true)
        };
        let voice = VoiceConfig {
            enabled: voice_enabled,
            stt_model: std::env::var("SOUSCHEF_STT_MODEL")
                .ok()
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_model: std::env::var("SOUSCHEF_TTS_MODEL")
                .ok()
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("SOUSCHEF_TTS_VOICE")
                .ok()
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            tts_speed: fc.voice.tts_speed.unwrap_or(1.0),
            listen_timeout_secs: fc.voice.listen_timeout_secs.unwrap_or(10),
        };

        if disable_voice {
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        // Data directory (~/.local/share/souschef on Linux)
        let data_dir = data_dir_override.unwrap_or_else(|| {
            directories::BaseDirs::new()
                .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("souschef"))
        });
        std::fs::create_dir_all(&data_dir)?;

        let llm_model = std::env::var("SOUSCHEF_LLM_MODEL")
            .ok()
            .or(fc.llm.model)
            .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());

        Ok(Self {
            data_dir,
            voice,
            api_keys,
            llm_model,
        })
    }

    /// Path to the `SQLite` database file
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("souschef.db")
    }

    /// Whether a chat-completions credential is configured
    #[must_use]
    pub const fn llm_available(&self) -> bool {
        self.api_keys.openai.is_some()
    }

    /// Whether a speech-to-text credential is configured
    #[must_use]
    pub const fn stt_available(&self) -> bool {
        self.api_keys.openai.is_some() || self.api_keys.deepgram.is_some()
    }

    /// Whether a text-to-speech credential is configured
    #[must_use]
    pub const fn tts_available(&self) -> bool {
        self.api_keys.openai.is_some() || self.api_keys.elevenlabs.is_some()
    }

    /// Whether voice sessions are possible at all
    ///
    /// Requires voice to be enabled and both speech directions to have a
    /// usable credential. When this is false the driver runs text-only.
    #[must_use]
    pub const fn voice_available(&self) -> bool {
        self.voice.enabled && self.stt_available() && self.tts_available()
    }
}
