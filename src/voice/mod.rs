//! Voice processing and session I/O channels
//!
//! A cooking session talks to the user through a [`TurnIo`] channel chosen
//! once at session start: [`VoiceIo`] (microphone → STT, TTS → speaker) or
//! the console fallback in [`console`]. The session loop is agnostic to
//! which channel supplied an utterance.

mod capture;
pub mod console;
mod playback;
mod stt;
mod tts;

use std::time::{Duration, Instant};

use async_trait::async_trait;

pub use capture::{AudioCapture, SAMPLE_RATE, UtteranceDetector, samples_to_wav};
pub use console::ConsoleIo;
pub use playback::AudioPlayback;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;

use crate::config::{ApiKeys, VoiceConfig};
use crate::{Error, Result};

/// Which kind of channel is carrying the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    Voice,
    Text,
}

/// One user turn of input and output
///
/// `listen` fails with [`Error::NoSpeech`] when nothing intelligible arrived
/// (recover by re-prompting) and with [`Error::Audio`] when the device is
/// unavailable (the driver downgrades to text permanently).
#[async_trait(?Send)]
pub trait TurnIo {
    /// Block until an utterance arrives
    async fn listen(&mut self) -> Result<String>;

    /// Deliver narration to the user
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// The channel kind, for logging and display decisions
    fn mode(&self) -> IoMode;
}

/// Voice channel: microphone capture + STT in, TTS + speaker out
pub struct VoiceIo {
    capture: AudioCapture,
    playback: AudioPlayback,
    stt: SpeechToText,
    tts: TextToSpeech,
    listen_timeout: Duration,
}

impl VoiceIo {
    /// Build a voice channel from configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no STT or TTS credential is configured,
    /// or [`Error::Audio`] if the audio devices cannot be opened
    pub fn from_config(voice: &VoiceConfig, keys: &ApiKeys) -> Result<Self> {
        let stt = if let Some(key) = &keys.openai {
            SpeechToText::whisper(key.clone(), voice.stt_model.clone())?
        } else if let Some(key) = &keys.deepgram {
            let model = if voice.stt_model.starts_with("whisper") {
                "nova-2".to_string()
            } else {
                voice.stt_model.clone()
            };
            SpeechToText::deepgram(key.clone(), model)?
        } else {
            return Err(Error::Config("no STT credential configured".to_string()));
        };

        let tts = if let Some(key) = &keys.openai {
            TextToSpeech::openai(
                key.clone(),
                voice.tts_model.clone(),
                voice.tts_voice.clone(),
                voice.tts_speed,
            )?
        } else if let Some(key) = &keys.elevenlabs {
            TextToSpeech::elevenlabs(key.clone(), voice.tts_voice.clone())?
        } else {
            return Err(Error::Config("no TTS credential configured".to_string()));
        };

        Ok(Self {
            capture: AudioCapture::new()?,
            playback: AudioPlayback::new()?,
            stt,
            tts,
            listen_timeout: Duration::from_secs(voice.listen_timeout_secs),
        })
    }
}

#[async_trait(?Send)]
impl TurnIo for VoiceIo {
    async fn listen(&mut self) -> Result<String> {
        self.capture.start()?;

        let mut detector = UtteranceDetector::new();
        let started = Instant::now();
        // Hard cap so an endless noise floor can't wedge the loop
        let hard_deadline = started + self.listen_timeout * 3;

        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;

            let chunk = self.capture.drain();
            if detector.push(&chunk) {
                let samples = detector.take();
                self.capture.stop();

                let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
                let text = self.stt.transcribe(&wav).await?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(Error::NoSpeech);
                }
                return Ok(text);
            }

            let timed_out = detector.is_waiting() && started.elapsed() >= self.listen_timeout;
            if timed_out || Instant::now() >= hard_deadline {
                self.capture.stop();
                return Err(Error::NoSpeech);
            }
        }
    }

    async fn speak(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let audio = self.tts.synthesize(text).await?;
        self.playback.play_mp3(&audio).await
    }

    fn mode(&self) -> IoMode {
        IoMode::Voice
    }
}
