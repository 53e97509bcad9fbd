//! Voice-command classification
//!
//! An utterance resolves to a [`CommandIntent`] in two passes: a pure
//! keyword match against the fixed session vocabulary, then — for anything
//! the table doesn't cover — one language-model call that decides whether
//! the user meant a command or asked a real question. The state machine
//! never sees raw strings.

use crate::llm::ChatClient;

/// A classified user command for one turn
///
/// Produced fresh per utterance, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandIntent {
    /// Advance to the next step
    Next,
    /// Re-narrate the current step
    Repeat,
    /// Narrate the ingredient list
    Ingredients,
    /// Offer a tip for the current step
    Help,
    /// Free-form cooking question, carrying the literal utterance
    Question(String),
    /// End the session
    Stop,
    /// Empty or unintelligible input
    Unrecognized,
}

const CLASSIFY_SYSTEM: &str = "You classify commands for a voice cooking assistant. \
     Respond with exactly one word from: NEXT, REPEAT, INGREDIENTS, HELP, STOP, QUESTION. \
     Use NEXT only when the user explicitly wants to move forward; questions about the \
     current step are QUESTION.";

/// Match an utterance against the fixed command vocabulary
///
/// Substring-based on the normalized utterance, so filler words are
/// tolerated ("please go to the next step" matches Next). Returns `None`
/// when no keyword applies.
#[must_use]
pub fn match_keywords(utterance: &str) -> Option<CommandIntent> {
    let text = utterance.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    // Stop first: "let's stop before the next step" should end the session
    let table: &[(&[&str], CommandIntent)] = &[
        (&["stop", "quit", "exit", "done cooking"], CommandIntent::Stop),
        (&["next", "continue", "move on"], CommandIntent::Next),
        (&["repeat", "again", "say that"], CommandIntent::Repeat),
        (&["ingredient"], CommandIntent::Ingredients),
        (&["help", "tip"], CommandIntent::Help),
    ];

    for (keywords, intent) in table {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return Some(intent.clone());
        }
    }

    None
}

/// Maps utterances to session commands
pub struct CommandClassifier {
    chat: Option<ChatClient>,
}

impl CommandClassifier {
    /// Create a classifier; without a chat client the LLM fallback is
    /// skipped and unmatched input is treated as a question directly
    #[must_use]
    pub const fn new(chat: Option<ChatClient>) -> Self {
        Self { chat }
    }

    /// Classify one utterance
    ///
    /// Never fails: a broken LLM fallback degrades to `Unrecognized` with
    /// the cause logged. No retries.
    pub async fn classify(&self, utterance: &str) -> CommandIntent {
        let trimmed = utterance.trim();
        if trimmed.is_empty() {
            return CommandIntent::Unrecognized;
        }

        if let Some(intent) = match_keywords(trimmed) {
            tracing::debug!(utterance = %trimmed, ?intent, "keyword match");
            return intent;
        }

        let Some(chat) = &self.chat else {
            return CommandIntent::Question(trimmed.to_string());
        };

        match chat.complete(CLASSIFY_SYSTEM, trimmed, 8, 0.1).await {
            Ok(label) => {
                let intent = label_to_intent(&label, trimmed);
                tracing::debug!(utterance = %trimmed, label = %label, ?intent, "llm classification");
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, "intent classification failed");
                CommandIntent::Unrecognized
            }
        }
    }
}

/// Map the model's one-word label back to an intent
fn label_to_intent(label: &str, utterance: &str) -> CommandIntent {
    let label = label.trim().to_uppercase();
    match label
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|ch: char| !ch.is_ascii_alphabetic())
    {
        "NEXT" => CommandIntent::Next,
        "REPEAT" => CommandIntent::Repeat,
        "INGREDIENTS" => CommandIntent::Ingredients,
        "HELP" => CommandIntent::Help,
        "STOP" => CommandIntent::Stop,
        // QUESTION and anything unexpected both carry the literal text on
        _ => CommandIntent::Question(utterance.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_tolerates_filler() {
        assert_eq!(match_keywords("next"), Some(CommandIntent::Next));
        assert_eq!(
            match_keywords("please go to the next step"),
            Some(CommandIntent::Next)
        );
        assert_eq!(match_keywords("what's next"), Some(CommandIntent::Next));
        assert_eq!(
            match_keywords("please repeat that"),
            Some(CommandIntent::Repeat)
        );
        assert_eq!(match_keywords("say that again"), Some(CommandIntent::Repeat));
        assert_eq!(
            match_keywords("what are the ingredients"),
            Some(CommandIntent::Ingredients)
        );
        assert_eq!(match_keywords("any tips?"), Some(CommandIntent::Help));
        assert_eq!(match_keywords("STOP"), Some(CommandIntent::Stop));
        assert_eq!(match_keywords("I want to quit"), Some(CommandIntent::Stop));
    }

    #[test]
    fn stop_outranks_next() {
        assert_eq!(
            match_keywords("stop before the next step"),
            Some(CommandIntent::Stop)
        );
    }

    #[test]
    fn no_keyword_yields_none() {
        assert_eq!(match_keywords("how do I dice an onion"), None);
        assert_eq!(match_keywords(""), None);
        assert_eq!(match_keywords("   "), None);
    }

    #[tokio::test]
    async fn empty_utterance_is_unrecognized() {
        let classifier = CommandClassifier::new(None);
        assert_eq!(classifier.classify("").await, CommandIntent::Unrecognized);
        assert_eq!(classifier.classify("  ").await, CommandIntent::Unrecognized);
    }

    #[tokio::test]
    async fn unmatched_without_llm_becomes_question() {
        let classifier = CommandClassifier::new(None);
        assert_eq!(
            classifier.classify("how do I dice an onion").await,
            CommandIntent::Question("how do I dice an onion".to_string())
        );
    }

    #[test]
    fn labels_map_back_to_intents() {
        assert_eq!(label_to_intent("NEXT", "x"), CommandIntent::Next);
        assert_eq!(label_to_intent("stop.", "x"), CommandIntent::Stop);
        assert_eq!(label_to_intent("Repeat", "x"), CommandIntent::Repeat);
        assert_eq!(
            label_to_intent("QUESTION", "how hot"),
            CommandIntent::Question("how hot".to_string())
        );
        assert_eq!(
            label_to_intent("SOMETHING_ELSE", "how hot"),
            CommandIntent::Question("how hot".to_string())
        );
    }
}
