//! Interactive first-run setup wizard (`souschef setup`)

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{ApiKeysFileConfig, ConfigFile, LlmFileConfig, VoiceFileConfig};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or the config file cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Sous-Chef Setup\n");

    let existing = crate::config::file::load_config_file();
    let Some(config_path) = crate::config::file::config_file_path() else {
        anyhow::bail!("could not determine config directory");
    };

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. OpenAI key: chat completions plus default STT/TTS
    let openai = prompt_key(
        "OpenAI API key (recipes, questions, Whisper, TTS)",
        existing.api_keys.openai.as_deref(),
    )?;

    // 2. Optional speech providers
    let deepgram = if Confirm::new()
        .with_prompt("Use Deepgram for speech recognition?")
        .default(existing.api_keys.deepgram.is_some())
        .interact()?
    {
        prompt_key("Deepgram API key", existing.api_keys.deepgram.as_deref())?
    } else {
        None
    };

    let elevenlabs = if Confirm::new()
        .with_prompt("Use ElevenLabs for speech synthesis?")
        .default(existing.api_keys.elevenlabs.is_some())
        .interact()?
    {
        prompt_key("ElevenLabs API key", existing.api_keys.elevenlabs.as_deref())?
    } else {
        None
    };

    // 3. LLM model
    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(
            existing
                .llm
                .model
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
        )
        .interact_text()?;

    // 4. Voice settings
    let enable_voice = Confirm::new()
        .with_prompt("Enable voice sessions?")
        .default(existing.voice.enabled.unwrap_or(true))
        .interact()?;

    let tts_voice = if enable_voice {
        let voices = ["alloy", "echo", "fable", "nova", "onyx", "shimmer"];
        let default_voice = existing
            .voice
            .tts_voice
            .as_deref()
            .and_then(|v| voices.iter().position(|&x| x == v))
            .unwrap_or(0);
        let idx = Select::new()
            .with_prompt("TTS voice")
            .items(&voices)
            .default(default_voice)
            .interact()?;
        Some(voices[idx].to_string())
    } else {
        existing.voice.tts_voice
    };

    let config = ConfigFile {
        llm: LlmFileConfig { model: Some(model) },
        voice: VoiceFileConfig {
            enabled: Some(enable_voice),
            stt_model: existing.voice.stt_model,
            tts_model: existing.voice.tts_model,
            tts_voice,
            tts_speed: existing.voice.tts_speed,
            listen_timeout_secs: existing.voice.listen_timeout_secs,
        },
        api_keys: ApiKeysFileConfig {
            openai,
            deepgram,
            elevenlabs,
        },
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;

    println!("\nWrote {}", config_path.display());
    println!("Run `souschef` to start cooking.");
    Ok(())
}

/// Prompt for an API key, keeping the existing one on empty input
fn prompt_key(prompt: &str, existing: Option<&str>) -> anyhow::Result<Option<String>> {
    let masked = existing.map(|k| {
        if k.len() > 8 {
            format!("{}...{}", &k[..4], &k[k.len() - 4..])
        } else {
            "****".to_string()
        }
    });

    let full_prompt = masked.map_or_else(
        || format!("{prompt} (empty to skip)"),
        |m| format!("{prompt} [{m}] (empty to keep)"),
    );

    let input: String = Input::new()
        .with_prompt(full_prompt)
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    if input.is_empty() {
        return Ok(existing.map(ToString::to_string));
    }
    Ok(Some(input.to_string()))
}
