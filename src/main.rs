use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use souschef::voice::{AudioCapture, AudioPlayback, TextToSpeech};
use souschef::{App, Config};

/// Sous-Chef - voice-guided AI cooking assistant
#[derive(Parser)]
#[command(name = "souschef", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for machines without audio hardware)
    #[arg(long, env = "SOUSCHEF_DISABLE_VOICE")]
    disable_voice: bool,

    /// Override the data directory (database location)
    #[arg(long, env = "SOUSCHEF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is your cooking assistant speaking.")]
        text: String,
    },
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,souschef=info",
        1 => "info,souschef=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestTts { text } => test_tts(cli.data_dir, &text).await,
            Command::Setup => souschef::setup::run_setup(),
        };
    }

    let config = Config::load(cli.disable_voice, cli.data_dir)?;
    tracing::debug!(?config, "loaded configuration");

    let app = App::start(config)?;
    app.run().await
}

/// Test microphone input with a level meter
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds. Speak!");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    for second in 1..=duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.drain();
        let energy = rms(&samples);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 200.0).min(50.0) as usize;
        println!("[{second:2}s] RMS {energy:.4} |{:<50}|", "#".repeat(meter_len));
    }

    capture.stop();

    println!("\nIf the meter moved while you spoke, the mic works.");
    println!("If it stayed at zero, check your input device and levels.");
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Synthesize a line and play it
async fn test_tts(data_dir: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    let config = Config::load(false, data_dir)?;

    let tts = if let Some(key) = config.api_keys.openai.clone() {
        TextToSpeech::openai(
            key,
            config.voice.tts_model.clone(),
            config.voice.tts_voice.clone(),
            config.voice.tts_speed,
        )?
    } else if let Some(key) = config.api_keys.elevenlabs.clone() {
        TextToSpeech::elevenlabs(key, config.voice.tts_voice.clone())?
    } else {
        anyhow::bail!("no TTS credential configured; run `souschef setup`");
    };

    println!("Synthesizing: \"{text}\"");
    let audio = tts.synthesize(text).await?;
    println!("Got {} bytes of audio", audio.len());

    let playback = AudioPlayback::new()?;
    playback.play_mp3(&audio).await?;

    println!("If you heard the line, TTS works.");
    Ok(())
}
