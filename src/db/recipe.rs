//! Recipe repository
//!
//! Recipes are stored as a parent row plus ordered ingredient and step
//! child rows; loading reassembles the exact [`Recipe`] shape used for file
//! interchange, with order preserved.

use rusqlite::params;
use uuid::Uuid;

use super::DbPool;
use crate::recipe::{Ingredient, Recipe, RecipeSummary};
use crate::{Error, Result};

/// Recipe repository
#[derive(Clone)]
pub struct RecipeRepo {
    pool: DbPool,
}

impl RecipeRepo {
    /// Create a new recipe repository
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Save a recipe for a user, assigning it a fresh identifier
    ///
    /// # Errors
    ///
    /// Returns error if the recipe is invalid or a database operation fails
    pub fn save(&self, user_id: &str, recipe: &Recipe) -> Result<Recipe> {
        recipe.validate()?;

        let mut conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let tags = serde_json::to_string(&recipe.dietary_tags)?;

        tx.execute(
            "INSERT INTO recipes (id, user_id, name, meal_type, max_minutes, skill_level, dietary_tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &id,
                user_id,
                &recipe.name,
                &recipe.meal_type,
                recipe.max_minutes,
                &recipe.skill_level,
                &tags
            ],
        )?;

        #[allow(clippy::cast_possible_wrap)]
        for (position, ingredient) in recipe.ingredients.iter().enumerate() {
            tx.execute(
                "INSERT INTO ingredients (recipe_id, position, name, quantity, unit)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &id,
                    position as i64,
                    &ingredient.name,
                    &ingredient.quantity,
                    &ingredient.unit
                ],
            )?;
        }

        #[allow(clippy::cast_possible_wrap)]
        for (position, body) in recipe.steps.iter().enumerate() {
            tx.execute(
                "INSERT INTO steps (recipe_id, position, body) VALUES (?1, ?2, ?3)",
                params![&id, position as i64, body],
            )?;
        }

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        tracing::info!(recipe = %recipe.name, id = %id, "saved recipe");

        let mut saved = recipe.clone();
        saved.id = Some(id);
        Ok(saved)
    }

    /// Load a recipe by identifier
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe does not exist
    pub fn load(&self, id: &str) -> Result<Recipe> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT name, meal_type, max_minutes, skill_level, dietary_tags
                 FROM recipes WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::NotFound(format!("recipe {id}"))
                }
                other => Error::Sqlite(other),
            })?;

        let (name, meal_type, max_minutes, skill_level, tags) = row;
        let dietary_tags: Vec<String> = serde_json::from_str(&tags).unwrap_or_default();

        let mut stmt = conn.prepare(
            "SELECT name, quantity, unit FROM ingredients
             WHERE recipe_id = ?1 ORDER BY position",
        )?;
        let ingredients = stmt
            .query_map([id], |row| {
                Ok(Ingredient {
                    name: row.get(0)?,
                    quantity: row.get(1)?,
                    unit: row.get(2)?,
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        let mut stmt =
            conn.prepare("SELECT body FROM steps WHERE recipe_id = ?1 ORDER BY position")?;
        let steps = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(Recipe {
            id: Some(id.to_string()),
            name,
            ingredients,
            steps,
            meal_type,
            max_minutes,
            skill_level,
            dietary_tags,
        })
    }

    /// Search a user's recipes by name substring
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn search(&self, user_id: &str, query: &str) -> Result<Vec<RecipeSummary>> {
        self.summaries(
            "SELECT r.id, r.name, r.meal_type, r.max_minutes, r.skill_level,
                    (SELECT COUNT(*) FROM steps s WHERE s.recipe_id = r.id)
             FROM recipes r
             WHERE r.user_id = ?1 AND r.name LIKE ?2
             ORDER BY r.created_at DESC",
            params![user_id, format!("%{query}%")],
        )
    }

    /// List recipes the user has cooked at least once, most recent first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_cooked(&self, user_id: &str) -> Result<Vec<RecipeSummary>> {
        self.summaries(
            "SELECT r.id, r.name, r.meal_type, r.max_minutes, r.skill_level,
                    (SELECT COUNT(*) FROM steps s WHERE s.recipe_id = r.id)
             FROM recipes r
             JOIN recipe_stats rs ON rs.recipe_id = r.id AND rs.user_id = ?1
             WHERE rs.times_cooked > 0
             ORDER BY rs.last_session_at DESC",
            params![user_id],
        )
    }

    /// List recipes the user rated 4 or higher
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_liked(&self, user_id: &str) -> Result<Vec<RecipeSummary>> {
        self.summaries(
            "SELECT r.id, r.name, r.meal_type, r.max_minutes, r.skill_level,
                    (SELECT COUNT(*) FROM steps s WHERE s.recipe_id = r.id)
             FROM recipes r
             JOIN recipe_stats rs ON rs.recipe_id = r.id AND rs.user_id = ?1
             WHERE rs.rating >= 4
             ORDER BY rs.rating DESC, rs.last_session_at DESC",
            params![user_id],
        )
    }

    fn summaries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<RecipeSummary>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(RecipeSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    meal_type: row.get(2)?,
                    max_minutes: row.get(3)?,
                    skill_level: row.get(4)?,
                    total_steps: row.get::<_, i64>(5)?.try_into().unwrap_or(0),
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{UserRepo, init_memory};

    fn setup() -> (RecipeRepo, String) {
        let pool = init_memory().unwrap();
        let user = UserRepo::new(pool.clone()).find_or_create("cook").unwrap();
        (RecipeRepo::new(pool), user.id)
    }

    fn sample_recipe() -> Recipe {
        Recipe {
            id: None,
            name: "Lentil Soup".to_string(),
            ingredients: vec![
                Ingredient {
                    name: "red lentils".to_string(),
                    quantity: "1".to_string(),
                    unit: "cup".to_string(),
                },
                Ingredient {
                    name: "onion".to_string(),
                    quantity: "1".to_string(),
                    unit: String::new(),
                },
            ],
            steps: vec![
                "Dice the onion.".to_string(),
                "Simmer lentils for 20 minutes.".to_string(),
            ],
            meal_type: "dinner".to_string(),
            max_minutes: 40,
            skill_level: "beginner".to_string(),
            dietary_tags: vec!["vegan".to_string()],
        }
    }

    #[test]
    fn save_assigns_id_and_load_roundtrips() {
        let (repo, user_id) = setup();

        let saved = repo.save(&user_id, &sample_recipe()).unwrap();
        let id = saved.id.clone().unwrap();

        let loaded = repo.load(&id).unwrap();
        assert_eq!(loaded.name, "Lentil Soup");
        assert_eq!(loaded.ingredients, saved.ingredients);
        assert_eq!(loaded.steps, saved.steps);
        assert_eq!(loaded.dietary_tags, vec!["vegan".to_string()]);
    }

    #[test]
    fn load_missing_is_not_found() {
        let (repo, _) = setup();
        let err = repo.load("nope").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn search_matches_substring() {
        let (repo, user_id) = setup();
        repo.save(&user_id, &sample_recipe()).unwrap();

        let hits = repo.search(&user_id, "lentil").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].total_steps, 2);

        let misses = repo.search(&user_id, "pancake").unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn save_rejects_invalid_recipe() {
        let (repo, user_id) = setup();
        let mut recipe = sample_recipe();
        recipe.steps.clear();
        assert!(repo.save(&user_id, &recipe).is_err());
    }
}
