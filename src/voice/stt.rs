//! Speech-to-text (STT) processing

use crate::{Error, Result};

/// Transcription backend with its credentials
enum SttBackend {
    /// `OpenAI` Whisper (multipart WAV upload)
    Whisper { api_key: String, model: String },
    /// Deepgram (raw WAV body)
    Deepgram { api_key: String, model: String },
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    backend: SttBackend,
}

impl SpeechToText {
    /// Create an STT instance backed by `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn whisper(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            backend: SttBackend::Whisper { api_key, model },
        })
    }

    /// Create an STT instance backed by Deepgram
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn deepgram(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Deepgram API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            backend: SttBackend::Deepgram { api_key, model },
        })
    }

    /// Transcribe WAV audio to text
    ///
    /// # Errors
    ///
    /// Returns error if transcription fails
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        match &self.backend {
            SttBackend::Whisper { api_key, model } => {
                self.transcribe_whisper(api_key, model, audio).await
            }
            SttBackend::Deepgram { api_key, model } => {
                self.transcribe_deepgram(api_key, model, audio).await
            }
        }
    }

    async fn transcribe_whisper(&self, api_key: &str, model: &str, audio: &[u8]) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct WhisperResponse {
            text: String,
        }

        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", model.to_string());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {api_key}"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await?;
        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }

    async fn transcribe_deepgram(
        &self,
        api_key: &str,
        model: &str,
        audio: &[u8],
    ) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct DeepgramResponse {
            results: DeepgramResults,
        }

        #[derive(serde::Deserialize)]
        struct DeepgramResults {
            channels: Vec<DeepgramChannel>,
        }

        #[derive(serde::Deserialize)]
        struct DeepgramChannel {
            alternatives: Vec<DeepgramAlternative>,
        }

        #[derive(serde::Deserialize)]
        struct DeepgramAlternative {
            transcript: String,
        }

        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let url = format!("https://api.deepgram.com/v1/listen?model={model}&punctuate=true");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {api_key}"))
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await?;

        let transcript = result
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}
