//! Interactive menu front end
//!
//! The terminal surface around cooking sessions: generate a recipe, pick a
//! saved one, load one from a file, or look at cooking statistics. Failures
//! here (generation, malformed files, missing recipes) are reported in
//! plain language and return the user to the menu they came from.

use dialoguer::{Confirm, Input, Select};

use crate::config::Config;
use crate::db::{self, RecipeRepo, StatsRepo, User, UserRepo};
use crate::generate::{Constraints, RecipeGenerator};
use crate::llm::ChatClient;
use crate::recipe::{Recipe, RecipeSummary};
use crate::session::{CommandClassifier, Guide, RecipeSession, SessionStatus};
use crate::voice::{ConsoleIo, TurnIo, VoiceIo};

/// Cap on regeneration attempts in one workflow
const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// The interactive application
pub struct App {
    config: Config,
    recipes: RecipeRepo,
    stats: StatsRepo,
    user: User,
}

impl App {
    /// Open the database and sign the user in
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or stdin is closed
    pub fn start(config: Config) -> anyhow::Result<Self> {
        let pool = db::init(config.db_path())?;

        let username: String = Input::new()
            .with_prompt("Your name")
            .validate_with(|s: &String| {
                if s.trim().is_empty() {
                    Err("name cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;

        let user = UserRepo::new(pool.clone()).find_or_create(username.trim())?;
        println!("Welcome, {}!", user.username);

        if !config.llm_available() {
            println!("No language-model key configured: recipe generation and questions are off.");
        }
        if !config.voice_available() {
            println!("Voice is not available; cooking sessions will use typed commands.");
        }

        Ok(Self {
            recipes: RecipeRepo::new(pool.clone()),
            stats: StatsRepo::new(pool),
            config,
            user,
        })
    }

    /// Run the main menu until the user quits
    ///
    /// # Errors
    ///
    /// Returns error only if terminal I/O itself fails
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            let choice = Select::new()
                .with_prompt("Sous-Chef")
                .items(&[
                    "Generate a new recipe",
                    "Cook a saved recipe",
                    "Load a recipe from a file",
                    "View cooking statistics",
                    "Quit",
                ])
                .default(0)
                .interact()?;

            match choice {
                0 => {
                    if let Some(recipe) = self.generate_workflow().await? {
                        self.action_menu(recipe).await?;
                    }
                }
                1 => {
                    if let Some(recipe) = self.saved_workflow()? {
                        self.action_menu(recipe).await?;
                    }
                }
                2 => {
                    if let Some(recipe) = self.file_workflow()? {
                        self.action_menu(recipe).await?;
                    }
                }
                3 => self.show_stats()?,
                _ => break,
            }
        }

        println!("Thanks for cooking with Sous-Chef!");
        Ok(())
    }

    /// Prompt for constraints, generate candidates until one is accepted
    async fn generate_workflow(&mut self) -> anyhow::Result<Option<Recipe>> {
        let Some(key) = self.config.api_keys.openai.clone() else {
            println!("Recipe generation needs a language-model key. Set OPENAI_API_KEY.");
            return Ok(None);
        };

        let constraints = prompt_constraints()?;
        let generator = RecipeGenerator::new(ChatClient::new(key, self.config.llm_model.clone())?);

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            println!("Generating recipe...");
            let recipe = match generator.generate(&constraints, attempt).await {
                Ok(recipe) => recipe,
                Err(e) => {
                    tracing::warn!(error = %e, "generation failed");
                    println!("I couldn't come up with a recipe just now.");
                    if attempt < MAX_GENERATION_ATTEMPTS
                        && Confirm::new()
                            .with_prompt("Try again?")
                            .default(true)
                            .interact()?
                    {
                        continue;
                    }
                    return Ok(None);
                }
            };

            print_preview(&recipe);

            let choice = Select::new()
                .with_prompt("Happy with this recipe?")
                .items(&[
                    "Yes, use this recipe",
                    "No, generate a different one",
                    "Cancel",
                ])
                .default(0)
                .interact()?;

            match choice {
                0 => {
                    let saved = self.recipes.save(&self.user.id, &recipe)?;
                    println!("Saved '{}' to your collection.", saved.name);
                    return Ok(Some(saved));
                }
                1 => {}
                _ => return Ok(None),
            }
        }

        println!("That's enough attempts for now; back to the menu.");
        Ok(None)
    }

    /// Pick a recipe from the store
    fn saved_workflow(&mut self) -> anyhow::Result<Option<Recipe>> {
        let choice = Select::new()
            .with_prompt("Which recipes?")
            .items(&[
                "Recipes you cooked",
                "Recipes you liked",
                "Search by name",
            ])
            .default(0)
            .interact()?;

        let summaries: Vec<RecipeSummary> = match choice {
            0 => self.recipes.list_cooked(&self.user.id)?,
            1 => self.recipes.list_liked(&self.user.id)?,
            _ => {
                let query: String = Input::new().with_prompt("Search").interact_text()?;
                self.recipes.search(&self.user.id, query.trim())?
            }
        };

        if summaries.is_empty() {
            println!("No matching recipes found.");
            return Ok(None);
        }

        let labels: Vec<String> = summaries
            .iter()
            .map(|s| format!("{} ({}, {} steps)", s.name, s.meal_type, s.total_steps))
            .collect();

        let picked = Select::new()
            .with_prompt("Pick a recipe")
            .items(&labels)
            .default(0)
            .interact()?;

        match self.recipes.load(&summaries[picked].id) {
            Ok(recipe) => Ok(Some(recipe)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load recipe");
                println!("That recipe could not be loaded.");
                Ok(None)
            }
        }
    }

    /// Load a recipe from a JSON file, optionally importing it
    fn file_workflow(&mut self) -> anyhow::Result<Option<Recipe>> {
        let path: String = Input::new().with_prompt("Recipe file path").interact_text()?;

        let recipe = match Recipe::load_json(path.trim()) {
            Ok(recipe) => recipe,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load recipe file");
                println!("That file doesn't contain a usable recipe.");
                return Ok(None);
            }
        };

        print_preview(&recipe);

        let import = Confirm::new()
            .with_prompt("Save it to your collection?")
            .default(true)
            .interact()?;

        if import {
            let saved = self.recipes.save(&self.user.id, &recipe)?;
            return Ok(Some(saved));
        }
        Ok(Some(recipe))
    }

    /// What to do with a chosen recipe
    async fn action_menu(&mut self, recipe: Recipe) -> anyhow::Result<()> {
        loop {
            let choice = Select::new()
                .with_prompt(format!("'{}'", recipe.name))
                .items(&["Start guided cooking", "View full recipe", "Back"])
                .default(0)
                .interact()?;

            match choice {
                0 => {
                    self.cook(recipe.clone()).await?;
                    return Ok(());
                }
                1 => print_details(&recipe),
                _ => return Ok(()),
            }
        }
    }

    /// Run one guided cooking session
    async fn cook(&mut self, recipe: Recipe) -> anyhow::Result<()> {
        let session = match RecipeSession::new(recipe) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "cannot start session");
                println!("This recipe can't be cooked: it has no steps.");
                return Ok(());
            }
        };

        let chat = self
            .config
            .api_keys
            .openai
            .clone()
            .map(|key| ChatClient::new(key, self.config.llm_model.clone()))
            .transpose()?;

        let (channel, fallback): (Box<dyn TurnIo>, Option<Box<dyn TurnIo>>) =
            if self.config.voice_available() {
                match VoiceIo::from_config(&self.config.voice, &self.config.api_keys) {
                    Ok(voice) => (Box::new(voice), Some(Box::new(ConsoleIo::new()))),
                    Err(e) => {
                        tracing::warn!(error = %e, "voice unavailable");
                        println!("Voice could not start; using typed commands instead.");
                        (Box::new(ConsoleIo::new()), None)
                    }
                }
            } else {
                (Box::new(ConsoleIo::new()), None)
            };

        let guide = Guide::new(
            session,
            CommandClassifier::new(chat.clone()),
            chat,
            channel,
            fallback,
        )
        .with_stats(self.stats.clone(), self.user.id.clone());

        let outcome = guide.run().await?;

        if outcome.status == SessionStatus::Completed {
            println!("Recipe completed!");
            if let Some(recipe_id) = outcome.recipe_id {
                self.prompt_rating(&recipe_id)?;
            }
        } else {
            println!("Cooking session ended early.");
        }

        Ok(())
    }

    /// Optional 1-5 rating after a completed session
    fn prompt_rating(&mut self, recipe_id: &str) -> anyhow::Result<()> {
        let rate = Confirm::new()
            .with_prompt("Rate this recipe?")
            .default(true)
            .interact()?;
        if !rate {
            return Ok(());
        }

        let rating: u8 = Input::new()
            .with_prompt("Rating (1-5)")
            .validate_with(|n: &u8| {
                if (1..=5).contains(n) {
                    Ok(())
                } else {
                    Err("enter a number from 1 to 5")
                }
            })
            .interact_text()?;

        self.stats.record_rating(&self.user.id, recipe_id, rating)?;
        println!("Thanks for the rating!");
        Ok(())
    }

    /// Print the statistics screen
    fn show_stats(&self) -> anyhow::Result<()> {
        let stats = self.stats.user_stats(&self.user.id)?;

        println!("\n--- Cooking statistics for {} ---", self.user.username);
        println!("Recipes saved:    {}", stats.recipes_saved);
        println!("Cooking sessions: {}", stats.sessions);
        println!("Recipes cooked:   {}", stats.recipes_cooked);
        println!("Recipes liked:    {}", stats.recipes_liked);
        if stats.recipes_saved > 0 {
            println!("Completion rate:  {:.1}%", stats.completion_rate());
        }
        println!();
        Ok(())
    }
}

/// Prompt for recipe generation constraints
fn prompt_constraints() -> anyhow::Result<Constraints> {
    let meal_types = ["breakfast", "lunch", "dinner", "snack"];
    let meal = Select::new()
        .with_prompt("Meal type")
        .items(&["Breakfast", "Lunch", "Dinner", "Snack"])
        .default(2)
        .interact()?;

    let max_minutes: u32 = Input::new()
        .with_prompt("Maximum cooking time in minutes")
        .validate_with(|n: &u32| if *n >= 1 { Ok(()) } else { Err("must be at least 1") })
        .interact_text()?;

    let skill_levels = ["beginner", "intermediate", "advanced"];
    let skill = Select::new()
        .with_prompt("Skill level")
        .items(&["Beginner", "Intermediate", "Advanced"])
        .default(0)
        .interact()?;

    let dietary_options = [
        "None",
        "Vegetarian",
        "Vegan",
        "Kosher",
        "Sugar-free",
        "Allergy (specify)",
    ];
    let dietary_pick = Select::new()
        .with_prompt("Dietary restriction")
        .items(&dietary_options)
        .default(0)
        .interact()?;

    let dietary = match dietary_pick {
        0 => None,
        5 => {
            let allergy: String = Input::new().with_prompt("Specify allergy").interact_text()?;
            Some(format!("free of {}", allergy.trim()))
        }
        i => Some(dietary_options[i].to_lowercase()),
    };

    let ingredients_input: String = Input::new()
        .with_prompt("Available ingredients (comma-separated, empty to skip)")
        .allow_empty(true)
        .interact_text()?;
    let available_ingredients = ingredients_input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    Ok(Constraints {
        meal_type: meal_types[meal].to_string(),
        max_minutes,
        skill_level: skill_levels[skill].to_string(),
        dietary,
        available_ingredients,
    })
}

/// Short recipe preview before cooking
fn print_preview(recipe: &Recipe) {
    println!("\n=== {} ===", recipe.name);
    if !recipe.meal_type.is_empty() {
        println!("Meal: {}", recipe.meal_type);
    }
    if recipe.max_minutes > 0 {
        println!("Time: up to {} minutes", recipe.max_minutes);
    }
    if !recipe.skill_level.is_empty() {
        println!("Skill: {}", recipe.skill_level);
    }
    if !recipe.dietary_tags.is_empty() {
        println!("Dietary: {}", recipe.dietary_tags.join(", "));
    }

    println!("Ingredients ({} total):", recipe.ingredients.len());
    for ingredient in recipe.ingredients.iter().take(3) {
        println!("  - {ingredient}");
    }
    if recipe.ingredients.len() > 3 {
        println!("  ... and {} more", recipe.ingredients.len() - 3);
    }
    println!("Steps: {}", recipe.steps.len());
    println!();
}

/// Full recipe listing
fn print_details(recipe: &Recipe) {
    println!("\n=== {} ===", recipe.name);
    println!("Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {ingredient}");
    }
    println!("Instructions:");
    for (i, step) in recipe.steps.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
    println!();
}
