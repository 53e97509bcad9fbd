//! Text-to-speech (TTS) processing

use crate::{Error, Result};

/// Synthesis backend with its credentials
enum TtsBackend {
    OpenAi {
        api_key: String,
        model: String,
        voice: String,
        speed: f64,
    },
    ElevenLabs {
        api_key: String,
        voice_id: String,
        model: String,
    },
}

/// Synthesizes speech from text, producing MP3 bytes
pub struct TextToSpeech {
    client: reqwest::Client,
    backend: TtsBackend,
}

impl TextToSpeech {
    /// Create a TTS instance backed by `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn openai(api_key: String, model: String, voice: String, speed: f64) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            backend: TtsBackend::OpenAi {
                api_key,
                model,
                voice,
                speed,
            },
        })
    }

    /// Create a TTS instance backed by `ElevenLabs`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn elevenlabs(api_key: String, voice_id: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            backend: TtsBackend::ElevenLabs {
                api_key,
                voice_id,
                model: "eleven_monolingual_v1".to_string(),
            },
        })
    }

    /// Synthesize text to MP3 audio bytes
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        match &self.backend {
            TtsBackend::OpenAi {
                api_key,
                model,
                voice,
                speed,
            } => self.synthesize_openai(api_key, model, voice, *speed, text).await,
            TtsBackend::ElevenLabs {
                api_key,
                voice_id,
                model,
            } => self.synthesize_elevenlabs(api_key, voice_id, model, text).await,
        }
    }

    async fn synthesize_openai(
        &self,
        api_key: &str,
        model: &str,
        voice: &str,
        speed: f64,
        text: &str,
    ) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f64,
        }

        let request = TtsRequest {
            model,
            input: text,
            voice,
            speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    async fn synthesize_elevenlabs(
        &self,
        api_key: &str,
        voice_id: &str,
        model: &str,
        text: &str,
    ) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("https://api.elevenlabs.io/v1/text-to-speech/{voice_id}");

        let request = ElevenLabsRequest {
            text,
            model_id: model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}
