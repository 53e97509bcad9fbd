//! Guided cooking loop
//!
//! Drives read → classify → act over a [`RecipeSession`] until a terminal
//! state. Owns the failure policy from the session's point of view: no
//! speech re-prompts, a dead audio device downgrades the channel to text
//! permanently, and an unreachable language model produces a fixed apology
//! instead of ending the session.

use super::intent::{CommandClassifier, CommandIntent};
use super::state::{RecipeSession, SessionStatus};
use crate::db::StatsRepo;
use crate::llm::ChatClient;
use crate::voice::{IoMode, TurnIo};
use crate::Result;

const APOLOGY: &str =
    "Sorry, I'm having trouble answering right now. Let's keep cooking; say next when you're ready.";

const ASSISTANT_SYSTEM: &str = "You are a practical cooking assistant guiding someone through a \
     recipe. Answer in under 50 words, concretely, for the step at hand.";

/// How a finished session ended
#[derive(Debug)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    pub recipe_id: Option<String>,
}

/// Runs one cooking session over an I/O channel
pub struct Guide {
    session: RecipeSession,
    classifier: CommandClassifier,
    assistant: Option<ChatClient>,
    channel: Box<dyn TurnIo>,
    fallback: Option<Box<dyn TurnIo>>,
    stats: Option<(StatsRepo, String)>,
}

impl Guide {
    /// Create a guide over a primary channel with a text fallback
    ///
    /// The fallback is consumed on the first device failure; pass `None`
    /// when the primary channel is already text.
    pub fn new(
        session: RecipeSession,
        classifier: CommandClassifier,
        assistant: Option<ChatClient>,
        channel: Box<dyn TurnIo>,
        fallback: Option<Box<dyn TurnIo>>,
    ) -> Self {
        Self {
            session,
            classifier,
            assistant,
            channel,
            fallback,
            stats: None,
        }
    }

    /// Record session statistics for this user when the session ends
    #[must_use]
    pub fn with_stats(mut self, repo: StatsRepo, user_id: String) -> Self {
        self.stats = Some((repo, user_id));
        self
    }

    /// Run the session to a terminal state
    ///
    /// # Errors
    ///
    /// Returns error only when the input channel itself is gone (e.g.
    /// stdin closed); every in-session failure is handled inline
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let intro = self.session.intro();
        self.narrate(&intro).await;
        let first = self.session.step_narration();
        self.narrate(&first).await;

        while !self.session.status().is_terminal() {
            let utterance = match self.channel.listen().await {
                Ok(text) => text,
                Err(e) if e.is_device_failure() => {
                    if self.downgrade(&e.to_string()).await {
                        continue;
                    }
                    return Err(e);
                }
                Err(crate::Error::NoSpeech) => {
                    self.narrate("I didn't hear anything. Try again.").await;
                    continue;
                }
                Err(crate::Error::Io(e)) => return Err(crate::Error::Io(e)),
                Err(e) => {
                    tracing::warn!(error = %e, "listen failed");
                    self.narrate("I'm having trouble hearing you. Try again.")
                        .await;
                    continue;
                }
            };

            if self.channel.mode() == IoMode::Voice {
                println!("You said: {utterance}");
            }

            let intent = self.classifier.classify(&utterance).await;
            let reply = match intent {
                CommandIntent::Next => self.session.advance(),
                CommandIntent::Repeat => self.session.repeat(),
                CommandIntent::Ingredients => self.session.ingredients(),
                CommandIntent::Help => self.tip().await,
                CommandIntent::Question(q) => self.answer(&q).await,
                CommandIntent::Stop => self.session.stop(),
                CommandIntent::Unrecognized => self.session.unrecognized(),
            };
            self.narrate(&reply).await;
        }

        let status = self.session.status();
        self.finalize_stats(status);

        Ok(SessionOutcome {
            status,
            recipe_id: self.session.recipe().id.clone(),
        })
    }

    /// Deliver narration, downgrading to text if the device fails mid-speak
    async fn narrate(&mut self, text: &str) {
        if self.channel.mode() == IoMode::Voice {
            println!("{text}");
        }

        match self.channel.speak(text).await {
            Ok(()) => {}
            Err(e) if e.is_device_failure() => {
                // Text already printed above; future turns go to the console
                self.downgrade(&e.to_string()).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "narration failed, text only for this turn");
            }
        }
    }

    /// Swap permanently to the fallback channel
    ///
    /// Returns false when no fallback remains to switch to.
    async fn downgrade(&mut self, reason: &str) -> bool {
        let Some(fallback) = self.fallback.take() else {
            return false;
        };

        tracing::warn!(reason, "audio device unavailable, switching to text mode");
        self.channel = fallback;

        let notice = "Voice is unavailable, so we'll continue with typed commands.";
        if self.channel.speak(notice).await.is_err() {
            println!("{notice}");
        }
        true
    }

    /// Context-aware tip for the current step
    async fn tip(&mut self) -> String {
        let Some(chat) = &self.assistant else {
            return APOLOGY.to_string();
        };

        let prompt = format!(
            "{}\n\nGive one practical tip for the current step.",
            self.session.step_context()
        );

        match chat.complete(ASSISTANT_SYSTEM, &prompt, 120, 0.7).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "tip request failed");
                APOLOGY.to_string()
            }
        }
    }

    /// Answer a free-form question with the current step as context
    async fn answer(&mut self, question: &str) -> String {
        let Some(chat) = &self.assistant else {
            return APOLOGY.to_string();
        };

        let prompt = format!("{}\n\nQuestion: {question}", self.session.step_context());

        match chat.complete(ASSISTANT_SYSTEM, &prompt, 120, 0.7).await {
            Ok(text) => format!("{text} Say next when you're ready to continue."),
            Err(e) => {
                tracing::warn!(error = %e, "question answering failed");
                APOLOGY.to_string()
            }
        }
    }

    /// Exactly one stats write per finished session, when the recipe is in
    /// the store
    fn finalize_stats(&self, status: SessionStatus) {
        let Some((repo, user_id)) = &self.stats else {
            return;
        };
        let Some(recipe_id) = &self.session.recipe().id else {
            tracing::debug!("recipe not saved, skipping stats write");
            return;
        };

        let completed = status == SessionStatus::Completed;
        if let Err(e) = repo.record_session(user_id, recipe_id, completed) {
            tracing::warn!(error = %e, "failed to record session stats");
        }
    }
}
