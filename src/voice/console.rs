//! Console fallback channel
//!
//! Text-mode implementation of [`TurnIo`]: commands are typed, narration is
//! printed. Used when voice is disabled, unconfigured, or has failed.

use async_trait::async_trait;
use dialoguer::Input;

use super::{IoMode, TurnIo};
use crate::{Error, Result};

/// Text-mode I/O over the terminal
#[derive(Debug, Default)]
pub struct ConsoleIo;

impl ConsoleIo {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl TurnIo for ConsoleIo {
    async fn listen(&mut self) -> Result<String> {
        let input: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) => Error::Io(io),
            })?;

        let input = input.trim().to_string();
        if input.is_empty() {
            return Err(Error::NoSpeech);
        }
        Ok(input)
    }

    async fn speak(&mut self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }

    fn mode(&self) -> IoMode {
        IoMode::Text
    }
}
