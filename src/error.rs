//! Error types for Sous-Chef

use thiserror::Error;

/// Result type alias for Sous-Chef operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Sous-Chef
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error (microphone or speaker unavailable)
    #[error("audio error: {0}")]
    Audio(String),

    /// No speech detected within the listen window
    #[error("no speech detected")]
    NoSpeech,

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Language model error
    #[error("language model error: {0}")]
    Llm(String),

    /// Recipe generation error
    #[error("recipe generation failed: {0}")]
    Generation(String),

    /// Malformed recipe data
    #[error("invalid recipe: {0}")]
    Recipe(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Whether this error means the audio device is gone for good.
    ///
    /// The session driver downgrades to text I/O permanently on the first
    /// such failure; transient failures (no speech, service hiccups) do not
    /// trigger the downgrade.
    #[must_use]
    pub const fn is_device_failure(&self) -> bool {
        matches!(self, Self::Audio(_))
    }
}
