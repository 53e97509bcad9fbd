//! Audio capture and utterance endpointing

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Minimum RMS energy to count a chunk as speech
const RMS_THRESHOLD: f32 = 0.03;

/// Minimum utterance length before silence ends it (0.3s at 16kHz)
const MIN_UTTERANCE_SAMPLES: usize = 4800;

/// Trailing silence that ends an utterance (0.5s at 16kHz)
const TRAILING_SILENCE_SAMPLES: usize = 8000;

/// Captures audio from the default input device
pub struct AudioCapture {
    config: StreamConfig,
    shared: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Create a new audio capture instance
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if no suitable input device is available
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable input config found".to_string()))?;

        let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "audio capture initialized"
        );

        Ok(Self {
            config,
            shared: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Start capturing into the shared buffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if the input stream cannot be opened
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device".to_string()))?;

        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = shared.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    /// Stop capturing
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("audio capture stopped");
        }
        if let Ok(mut buf) = self.shared.lock() {
            buf.clear();
        }
    }

    /// Take the samples captured since the last drain
    #[must_use]
    pub fn drain(&self) -> Vec<f32> {
        self.shared
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Whether the input stream is currently open
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

/// Segments a live sample stream into single utterances
///
/// Energy-based endpointing: a chunk above the RMS threshold starts an
/// utterance, trailing silence ends it. No wake word — the session prompt
/// itself cues the user to talk.
#[derive(Default)]
pub struct UtteranceDetector {
    capturing: bool,
    buffer: Vec<f32>,
    silence: usize,
}

impl UtteranceDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed captured samples; returns true once an utterance is complete
    pub fn push(&mut self, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return false;
        }

        let energy = rms(samples);
        let is_speech = energy > RMS_THRESHOLD;

        if self.capturing {
            self.buffer.extend_from_slice(samples);
            if is_speech {
                self.silence = 0;
            } else {
                self.silence += samples.len();
            }

            if self.silence > TRAILING_SILENCE_SAMPLES {
                if self.buffer.len() - self.silence > MIN_UTTERANCE_SAMPLES {
                    tracing::debug!(samples = self.buffer.len(), "utterance complete");
                    return true;
                }
                // Too short to be speech: a cough, a door slam
                tracing::trace!("discarding short burst");
                self.reset();
            }
        } else if is_speech {
            self.capturing = true;
            self.silence = 0;
            self.buffer.clear();
            self.buffer.extend_from_slice(samples);
            tracing::trace!(energy, "speech started");
        }

        false
    }

    /// Whether no speech has started yet
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        !self.capturing
    }

    /// Take the accumulated utterance and reset
    pub fn take(&mut self) -> Vec<f32> {
        self.capturing = false;
        self.silence = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Discard any partial capture
    pub fn reset(&mut self) {
        self.capturing = false;
        self.silence = 0;
        self.buffer.clear();
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
