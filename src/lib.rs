//! Sous-Chef - voice-guided AI cooking assistant
//!
//! This library provides the core functionality for Sous-Chef:
//! - Recipe generation via a language model
//! - Voice sessions (STT in, TTS out) with a text fallback
//! - A step-cursor cooking session state machine
//! - Local persistence of recipes and usage statistics
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Menu front end                      │
//! │   generate  │  saved  │  from file  │  statistics   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Cooking session                      │
//! │   TurnIo (voice/text)  │  Classifier  │  Guide      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              External collaborators                  │
//! │   STT  │  TTS  │  Chat completions  │  SQLite       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod llm;
pub mod menu;
pub mod recipe;
pub mod session;
pub mod setup;
pub mod voice;

pub use config::Config;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use generate::{Constraints, RecipeGenerator};
pub use llm::ChatClient;
pub use menu::App;
pub use recipe::{Ingredient, Recipe, RecipeSummary};
pub use session::{
    CommandClassifier, CommandIntent, Guide, RecipeSession, SessionOutcome, SessionStatus,
};
pub use voice::{ConsoleIo, IoMode, TurnIo, VoiceIo};
