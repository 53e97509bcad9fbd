//! Cooking-session state machine
//!
//! Pure state: a step cursor over an immutable recipe plus a status. Every
//! operation returns the narration for that turn; I/O, classification, and
//! store writes live in the guide. The step index is always a valid index
//! into the recipe's steps, and status only moves toward a terminal state.

use crate::recipe::Recipe;
use crate::Result;

/// Session status
///
/// `Paused` is reserved for future mid-session suspension; no command
/// currently transitions into or out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
    Aborted,
}

impl SessionStatus {
    /// Whether the session has ended
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

const SESSION_OVER: &str = "This cooking session has ended.";

const NOT_UNDERSTOOD: &str =
    "Sorry, I didn't catch that. Say next, repeat, ingredients, or ask a cooking question.";

/// One guided walkthrough of a single recipe
pub struct RecipeSession {
    recipe: Recipe,
    step: usize,
    status: SessionStatus,
}

impl RecipeSession {
    /// Start a session at step 0
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Recipe`] if the recipe has no steps
    pub fn new(recipe: Recipe) -> Result<Self> {
        recipe.validate()?;
        Ok(Self {
            recipe,
            step: 0,
            status: SessionStatus::Active,
        })
    }

    #[must_use]
    pub const fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Current 0-based step index
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Narration for the current step; identical every time the cursor
    /// lands on or repeats the same step
    #[must_use]
    pub fn step_narration(&self) -> String {
        format!(
            "Step {} of {}: {}",
            self.step + 1,
            self.recipe.steps.len(),
            self.recipe.steps[self.step]
        )
    }

    /// Opening narration for the session
    #[must_use]
    pub fn intro(&self) -> String {
        format!(
            "Hi! I'm Sous-Chef, your cooking assistant for {}. \
             Say next to continue, repeat to hear a step again, ingredients \
             for the full list, or ask any cooking question.",
            self.recipe.name
        )
    }

    /// Advance the step cursor
    ///
    /// At the last step this completes the session instead.
    pub fn advance(&mut self) -> String {
        if self.status.is_terminal() {
            return SESSION_OVER.to_string();
        }

        if self.step + 1 < self.recipe.steps.len() {
            self.step += 1;
            self.step_narration()
        } else {
            self.status = SessionStatus::Completed;
            tracing::info!(recipe = %self.recipe.name, "session completed");
            "That was the final step. All done, great job cooking!".to_string()
        }
    }

    /// Re-narrate the current step without moving the cursor
    #[must_use]
    pub fn repeat(&self) -> String {
        if self.status.is_terminal() {
            return SESSION_OVER.to_string();
        }
        self.step_narration()
    }

    /// Narrate the full ingredient list
    #[must_use]
    pub fn ingredients(&self) -> String {
        if self.status.is_terminal() {
            return SESSION_OVER.to_string();
        }

        if self.recipe.ingredients.is_empty() {
            return "I don't have an ingredient list for this recipe.".to_string();
        }

        let list = self
            .recipe
            .ingredients
            .iter()
            .map(crate::recipe::Ingredient::display)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Here are the ingredients for {}: {list}.", self.recipe.name)
    }

    /// End the session early
    pub fn stop(&mut self) -> String {
        if self.status.is_terminal() {
            return SESSION_OVER.to_string();
        }

        self.status = SessionStatus::Aborted;
        tracing::info!(recipe = %self.recipe.name, step = self.step, "session aborted");
        "Ending the cooking guide. See you next time!".to_string()
    }

    /// Response for input that could not be classified
    #[must_use]
    pub fn unrecognized(&self) -> String {
        if self.status.is_terminal() {
            return SESSION_OVER.to_string();
        }
        NOT_UNDERSTOOD.to_string()
    }

    /// Prompt context handed to the language model for questions and tips
    #[must_use]
    pub fn step_context(&self) -> String {
        let total = self.recipe.steps.len();
        let next_preview = self
            .recipe
            .steps
            .get(self.step + 1)
            .map_or_else(|| "This is the last step.".to_string(), |s| format!("Next step: {s}"));

        let ingredients = if self.recipe.ingredients.is_empty() {
            "not specified".to_string()
        } else {
            self.recipe
                .ingredients
                .iter()
                .map(crate::recipe::Ingredient::display)
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "Recipe: {}\nProgress: step {} of {total}\nCurrent step: {}\n{next_preview}\nIngredients: {ingredients}",
            self.recipe.name,
            self.step + 1,
            self.recipe.steps[self.step],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    fn recipe(steps: usize) -> Recipe {
        Recipe {
            id: Some("r1".to_string()),
            name: "Test Dish".to_string(),
            ingredients: vec![Ingredient {
                name: "flour".to_string(),
                quantity: "2".to_string(),
                unit: "cups".to_string(),
            }],
            steps: (1..=steps).map(|i| format!("Do thing {i}.")).collect(),
            meal_type: "dinner".to_string(),
            max_minutes: 10,
            skill_level: "beginner".to_string(),
            dietary_tags: Vec::new(),
        }
    }

    #[test]
    fn starts_active_at_step_zero() {
        let session = RecipeSession::new(recipe(3)).unwrap();
        assert_eq!(session.step(), 0);
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn rejects_stepless_recipe() {
        let mut r = recipe(1);
        r.steps.clear();
        assert!(RecipeSession::new(r).is_err());
    }

    #[test]
    fn repeat_is_stable() {
        let mut session = RecipeSession::new(recipe(3)).unwrap();
        let arrival = session.step_narration();

        assert_eq!(session.repeat(), arrival);
        assert_eq!(session.repeat(), arrival);
        assert_eq!(session.step(), 0);

        session.advance();
        let second = session.step_narration();
        assert_eq!(session.repeat(), second);
        assert_ne!(second, arrival);
    }

    #[test]
    fn advance_walks_to_completion_within_bounds() {
        let n = 5;
        let mut session = RecipeSession::new(recipe(n)).unwrap();

        for expected in 1..n {
            session.advance();
            assert_eq!(session.step(), expected);
            assert_eq!(session.status(), SessionStatus::Active);
        }

        // One more advance completes without moving past the last step
        let farewell = session.advance();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.step(), n - 1);
        assert!(farewell.contains("All done"));
    }

    #[test]
    fn stop_aborts_and_locks_the_session() {
        let mut session = RecipeSession::new(recipe(3)).unwrap();
        session.advance();

        session.stop();
        assert_eq!(session.status(), SessionStatus::Aborted);

        // No command moves a finished session
        let step_before = session.step();
        session.advance();
        assert_eq!(session.step(), step_before);
        assert_eq!(session.status(), SessionStatus::Aborted);
        assert_eq!(session.stop(), SESSION_OVER);
        assert_eq!(session.repeat(), SESSION_OVER);
    }

    #[test]
    fn completed_session_stays_completed() {
        let mut session = RecipeSession::new(recipe(1)).unwrap();
        session.advance();
        assert_eq!(session.status(), SessionStatus::Completed);

        session.stop();
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn no_command_reaches_paused() {
        let mut session = RecipeSession::new(recipe(2)).unwrap();
        session.advance();
        session.repeat();
        let _ = session.ingredients();
        let _ = session.unrecognized();
        session.stop();
        assert_ne!(session.status(), SessionStatus::Paused);
    }

    #[test]
    fn ingredients_lists_in_order() {
        let mut r = recipe(1);
        r.ingredients.push(Ingredient {
            name: "sugar".to_string(),
            quantity: "1".to_string(),
            unit: "tbsp".to_string(),
        });
        let session = RecipeSession::new(r).unwrap();

        let text = session.ingredients();
        let flour = text.find("flour").unwrap();
        let sugar = text.find("sugar").unwrap();
        assert!(flour < sugar);
    }

    #[test]
    fn step_context_mentions_current_and_next() {
        let mut session = RecipeSession::new(recipe(3)).unwrap();
        let ctx = session.step_context();
        assert!(ctx.contains("Do thing 1."));
        assert!(ctx.contains("Next step: Do thing 2."));

        session.advance();
        session.advance();
        assert!(session.step_context().contains("This is the last step."));
    }
}
