//! Recipe generation via the language model
//!
//! Builds a constrained prompt, runs one completion, and parses the
//! structured text response into a [`Recipe`]. Parsing tolerates the usual
//! model quirks (bullets, numbering, stray blank lines); anything that
//! doesn't yield a name and at least one step is a generation failure.

use crate::llm::ChatClient;
use crate::recipe::{Ingredient, Recipe};
use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "You are a helpful cooking assistant that provides recipes.";

/// Upper bound on tokens for a single recipe completion
const MAX_RECIPE_TOKENS: u32 = 800;

/// User-supplied generation constraints
#[derive(Debug, Clone)]
pub struct Constraints {
    /// Meal type (breakfast, lunch, dinner, snack)
    pub meal_type: String,

    /// Maximum cooking time in minutes
    pub max_minutes: u32,

    /// Skill level (beginner, intermediate, advanced)
    pub skill_level: String,

    /// Dietary restriction, free-form (e.g. "vegan", "no peanuts")
    pub dietary: Option<String>,

    /// Ingredients the user already has
    pub available_ingredients: Vec<String>,
}

/// Generates recipes from constraints
pub struct RecipeGenerator {
    chat: ChatClient,
}

impl RecipeGenerator {
    #[must_use]
    pub const fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Generate one recipe candidate
    ///
    /// `attempt` starts at 1; later attempts ask the model for a different
    /// suggestion than before so the user can cycle through options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the model call fails or the
    /// response cannot be parsed into a usable recipe
    pub async fn generate(&self, constraints: &Constraints, attempt: u32) -> Result<Recipe> {
        let prompt = build_prompt(constraints, attempt);

        tracing::info!(
            meal_type = %constraints.meal_type,
            max_minutes = constraints.max_minutes,
            attempt,
            "generating recipe"
        );

        let text = self
            .chat
            .complete(SYSTEM_PROMPT, &prompt, MAX_RECIPE_TOKENS, 0.7)
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let recipe = parse_recipe_text(&text, constraints)?;
        tracing::info!(recipe = %recipe.name, steps = recipe.steps.len(), "recipe generated");
        Ok(recipe)
    }
}

/// Build the generation prompt for one attempt
fn build_prompt(c: &Constraints, attempt: u32) -> String {
    let mut prompt = format!(
        "Please suggest a {} recipe that:\n\
         - Takes {} minutes or less to prepare\n\
         - Is suitable for a {} cook\n",
        c.meal_type, c.max_minutes, c.skill_level
    );

    if !c.available_ingredients.is_empty() {
        prompt.push_str(&format!(
            "- Uses some of these available ingredients: {}\n",
            c.available_ingredients.join(", ")
        ));
    }

    if let Some(dietary) = &c.dietary {
        prompt.push_str(&format!("\nMust be {dietary}\n"));
    }

    prompt.push_str(
        "\nPlease provide the recipe in this format:\n\
         Recipe Name: [name]\n\
         Cooking Time: [time in minutes]\n\
         Ingredients:\n\
         - [ingredient 1]\n\
         - [ingredient 2]\n\
         Instructions:\n\
         1. [step 1]\n\
         2. [step 2]\n",
    );

    if attempt > 1 {
        prompt.push_str(
            "\nPlease provide a DIFFERENT recipe suggestion than previous attempts. \
             Make it unique and creative while still meeting the requirements above.",
        );
    }

    prompt
}

/// Section of the response currently being consumed
#[derive(PartialEq, Eq, Clone, Copy)]
enum Section {
    None,
    Ingredients,
    Instructions,
}

/// Parse a structured recipe text into a [`Recipe`]
///
/// # Errors
///
/// Returns [`Error::Generation`] if no name or no steps can be extracted
pub(crate) fn parse_recipe_text(text: &str, c: &Constraints) -> Result<Recipe> {
    let mut name = String::new();
    let mut ingredients = Vec::new();
    let mut steps = Vec::new();
    let mut section = Section::None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((head, rest)) = line.split_once(':') {
            let head = head.trim().to_lowercase();
            let rest = rest.trim();

            if head.contains("recipe name") || head == "name" {
                name = rest.to_string();
                continue;
            }
            if head.contains("ingredient") {
                section = Section::Ingredients;
                if !rest.is_empty() {
                    ingredients.push(parse_ingredient_line(rest));
                }
                continue;
            }
            if head.contains("instruction") || head.contains("steps") {
                section = Section::Instructions;
                if !rest.is_empty() {
                    steps.push(rest.to_string());
                }
                continue;
            }
            if head.contains("cooking time") {
                continue;
            }
        }

        match section {
            Section::Ingredients => {
                let body = strip_bullet(line);
                if !body.is_empty() {
                    ingredients.push(parse_ingredient_line(body));
                }
            }
            Section::Instructions => {
                let body = strip_step_marker(line);
                if !body.is_empty() {
                    steps.push(body.to_string());
                }
            }
            Section::None => {}
        }
    }

    if name.is_empty() {
        return Err(Error::Generation("response has no recipe name".to_string()));
    }
    if steps.is_empty() {
        return Err(Error::Generation(format!(
            "response for '{name}' has no instructions"
        )));
    }

    Ok(Recipe {
        id: None,
        name,
        ingredients,
        steps,
        meal_type: c.meal_type.clone(),
        max_minutes: c.max_minutes,
        skill_level: c.skill_level.clone(),
        dietary_tags: c.dietary.clone().into_iter().collect(),
    })
}

/// Strip a leading bullet from an ingredient line, keeping quantities intact
fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|ch: char| matches!(ch, '-' | '*' | '•' | ' '))
}

/// Strip leading step numbering ("1.", "2)", "- ") from an instruction line
fn strip_step_marker(line: &str) -> &str {
    line.trim_start_matches(|ch: char| {
        ch.is_ascii_digit() || matches!(ch, '.' | ')' | '-' | '*' | '•' | ' ')
    })
}

/// Units recognized when splitting an ingredient line
const UNITS: &[&str] = &[
    "cup", "cups", "tbsp", "tablespoon", "tablespoons", "tsp", "teaspoon", "teaspoons", "g",
    "gram", "grams", "kg", "ml", "l", "liter", "liters", "oz", "ounce", "ounces", "lb", "lbs",
    "pound", "pounds", "clove", "cloves", "slice", "slices", "pinch", "can", "cans", "bunch",
    "stalk", "stalks", "sprig", "sprigs",
];

/// Split an ingredient line into quantity/unit/name on a best-effort basis
///
/// "2 cups flour" becomes `{quantity: "2", unit: "cups", name: "flour"}`;
/// anything that doesn't start with a number is kept whole in `name`.
pub(crate) fn parse_ingredient_line(line: &str) -> Ingredient {
    let line = line.trim();
    let mut words = line.split_whitespace();

    let Some(first) = words.next() else {
        return Ingredient {
            name: String::new(),
            quantity: String::new(),
            unit: String::new(),
        };
    };

    let is_quantity = first.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '/' | '.' | '½' | '¼' | '¾'))
        && first.chars().any(|ch| ch.is_ascii_digit() || matches!(ch, '½' | '¼' | '¾'));

    if !is_quantity {
        return Ingredient {
            name: line.to_string(),
            quantity: String::new(),
            unit: String::new(),
        };
    }

    let quantity = first.to_string();
    let rest: Vec<&str> = words.collect();

    if let Some((unit_word, name_words)) = rest.split_first() {
        let normalized = unit_word.to_lowercase();
        if UNITS.contains(&normalized.as_str()) && !name_words.is_empty() {
            let mut name = name_words.join(" ");
            if let Some(stripped) = name.strip_prefix("of ") {
                name = stripped.to_string();
            }
            return Ingredient {
                name,
                quantity,
                unit: (*unit_word).to_string(),
            };
        }
    }

    Ingredient {
        name: rest.join(" "),
        quantity,
        unit: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> Constraints {
        Constraints {
            meal_type: "dinner".to_string(),
            max_minutes: 30,
            skill_level: "beginner".to_string(),
            dietary: Some("vegetarian".to_string()),
            available_ingredients: vec!["eggs".to_string(), "tomatoes".to_string()],
        }
    }

    #[test]
    fn parses_well_formed_response() {
        let text = "Recipe Name: Quick Shakshuka\n\
                    Cooking Time: 25 minutes\n\
                    Ingredients:\n\
                    - 4 eggs\n\
                    - 1 can crushed tomatoes\n\
                    - salt to taste\n\
                    Instructions:\n\
                    1. Saute the onion.\n\
                    2. Add tomatoes and simmer.\n\
                    3. Crack in the eggs and cover.\n";

        let recipe = parse_recipe_text(text, &constraints()).unwrap();
        assert_eq!(recipe.name, "Quick Shakshuka");
        assert_eq!(recipe.steps.len(), 3);
        assert_eq!(recipe.steps[0], "Saute the onion.");
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[0].quantity, "4");
        assert_eq!(recipe.ingredients[0].name, "eggs");
        assert_eq!(recipe.ingredients[2].name, "salt to taste");
        assert_eq!(recipe.meal_type, "dinner");
        assert_eq!(recipe.dietary_tags, vec!["vegetarian".to_string()]);
    }

    #[test]
    fn rejects_response_without_steps() {
        let text = "Recipe Name: Mystery Dish\nIngredients:\n- 1 cup hope\n";
        let err = parse_recipe_text(text, &constraints()).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn rejects_response_without_name() {
        let text = "Ingredients:\n- 2 eggs\nInstructions:\n1. Cook them.\n";
        assert!(parse_recipe_text(text, &constraints()).is_err());
    }

    #[test]
    fn splits_quantity_unit_name() {
        let ing = parse_ingredient_line("2 cups flour");
        assert_eq!(ing.quantity, "2");
        assert_eq!(ing.unit, "cups");
        assert_eq!(ing.name, "flour");

        let ing = parse_ingredient_line("1 can of crushed tomatoes");
        assert_eq!(ing.unit, "can");
        assert_eq!(ing.name, "crushed tomatoes");

        let ing = parse_ingredient_line("4 eggs");
        assert_eq!(ing.quantity, "4");
        assert_eq!(ing.unit, "");
        assert_eq!(ing.name, "eggs");

        let ing = parse_ingredient_line("salt to taste");
        assert_eq!(ing.quantity, "");
        assert_eq!(ing.name, "salt to taste");

        let ing = parse_ingredient_line("1/2 tsp cumin");
        assert_eq!(ing.quantity, "1/2");
        assert_eq!(ing.unit, "tsp");
        assert_eq!(ing.name, "cumin");
    }

    #[test]
    fn variation_prompt_asks_for_different_recipe() {
        let first = build_prompt(&constraints(), 1);
        let retry = build_prompt(&constraints(), 2);
        assert!(!first.contains("DIFFERENT"));
        assert!(retry.contains("DIFFERENT"));
        assert!(first.contains("vegetarian"));
        assert!(first.contains("eggs, tomatoes"));
    }
}
