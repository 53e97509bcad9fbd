//! Recipe data model and JSON file interchange
//!
//! A recipe loaded from a file and a recipe loaded from the store produce
//! the same in-memory shape. Recipes are immutable once a cooking session
//! starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single ingredient entry
///
/// `quantity` and `unit` may be empty when the source line was free-form
/// (e.g. "salt to taste").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,

    #[serde(default)]
    pub quantity: String,

    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    /// Spoken/printed form, e.g. "2 cups flour"
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.quantity.is_empty() {
            parts.push(self.quantity.as_str());
        }
        if !self.unit.is_empty() {
            parts.push(self.unit.as_str());
        }
        parts.push(self.name.as_str());
        parts.join(" ")
    }
}

impl std::fmt::Display for Ingredient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// A complete recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Store-assigned identifier; `None` until the recipe is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    /// Ordered ingredient list
    pub ingredients: Vec<Ingredient>,

    /// Ordered step texts
    pub steps: Vec<String>,

    /// Meal type (breakfast, lunch, dinner, snack)
    #[serde(default)]
    pub meal_type: String,

    /// Maximum cooking time in minutes
    #[serde(default)]
    pub max_minutes: u32,

    /// Skill level (beginner, intermediate, advanced)
    #[serde(default)]
    pub skill_level: String,

    /// Dietary tags (vegetarian, vegan, kosher, ...)
    #[serde(default)]
    pub dietary_tags: Vec<String>,
}

impl Recipe {
    /// Load a recipe from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or
    /// fails [`Recipe::validate`]
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let recipe: Self = serde_json::from_str(&content)?;
        recipe.validate()?;
        tracing::info!(recipe = %recipe.name, steps = recipe.steps.len(), "loaded recipe from file");
        Ok(recipe)
    }

    /// Check the recipe is usable for a cooking session
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recipe`] if the name is empty or there are no steps
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Recipe("recipe has no name".to_string()));
        }
        if self.steps.is_empty() {
            return Err(Error::Recipe(format!("recipe '{}' has no steps", self.name)));
        }
        if self.steps.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::Recipe(format!("recipe '{}' has an empty step", self.name)));
        }
        Ok(())
    }
}

/// Short recipe listing row, as returned by store searches
#[derive(Debug, Clone)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub meal_type: String,
    pub max_minutes: u32,
    pub skill_level: String,
    pub total_steps: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: None,
            name: "Shakshuka".to_string(),
            ingredients: vec![
                Ingredient {
                    name: "eggs".to_string(),
                    quantity: "4".to_string(),
                    unit: String::new(),
                },
                Ingredient {
                    name: "crushed tomatoes".to_string(),
                    quantity: "1".to_string(),
                    unit: "can".to_string(),
                },
            ],
            steps: vec![
                "Saute the onion until translucent.".to_string(),
                "Add tomatoes and simmer.".to_string(),
                "Crack in the eggs and cover.".to_string(),
            ],
            meal_type: "breakfast".to_string(),
            max_minutes: 30,
            skill_level: "beginner".to_string(),
            dietary_tags: vec!["vegetarian".to_string()],
        }
    }

    #[test]
    fn json_roundtrip_preserves_order() {
        let recipe = sample();
        let json = serde_json::to_string(&recipe).unwrap();
        let back: Recipe = serde_json::from_str(&json).unwrap();

        assert_eq!(back.name, recipe.name);
        assert_eq!(back.ingredients, recipe.ingredients);
        assert_eq!(back.steps, recipe.steps);
        assert_eq!(back.dietary_tags, recipe.dietary_tags);
    }

    #[test]
    fn validate_rejects_empty_steps() {
        let mut recipe = sample();
        recipe.steps.clear();
        assert!(recipe.validate().is_err());

        let mut recipe = sample();
        recipe.name = "  ".to_string();
        assert!(recipe.validate().is_err());

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn ingredient_display_skips_empty_fields() {
        let full = Ingredient {
            name: "flour".to_string(),
            quantity: "2".to_string(),
            unit: "cups".to_string(),
        };
        assert_eq!(full.display(), "2 cups flour");

        let bare = Ingredient {
            name: "salt to taste".to_string(),
            quantity: String::new(),
            unit: String::new(),
        };
        assert_eq!(bare.display(), "salt to taste");
    }

    #[test]
    fn missing_metadata_defaults() {
        let json = r#"{"name":"Toast","ingredients":[{"name":"bread"}],"steps":["Toast the bread."]}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.id.is_none());
        assert_eq!(recipe.max_minutes, 0);
        assert!(recipe.dietary_tags.is_empty());
        assert_eq!(recipe.ingredients[0].quantity, "");
    }
}
