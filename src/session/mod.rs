//! Cooking sessions
//!
//! `intent` classifies utterances, `state` holds the step-cursor state
//! machine, and `guide` wires both to an I/O channel and drives the loop.

mod guide;
mod intent;
mod state;

pub use guide::{Guide, SessionOutcome};
pub use intent::{CommandClassifier, CommandIntent, match_keywords};
pub use state::{RecipeSession, SessionStatus};
