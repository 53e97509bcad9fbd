//! Shared test utilities

use souschef::db::{self, DbPool, User, UserRepo};
use souschef::{Ingredient, Recipe};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Create a test user in the database
pub fn create_test_user(pool: &DbPool, username: &str) -> User {
    UserRepo::new(pool.clone())
        .find_or_create(username)
        .expect("failed to create test user")
}

/// Build an unsaved recipe with the given number of steps
#[must_use]
pub fn sample_recipe(steps: usize) -> Recipe {
    Recipe {
        id: None,
        name: "Test Pasta".to_string(),
        ingredients: vec![
            Ingredient {
                name: "spaghetti".to_string(),
                quantity: "200".to_string(),
                unit: "g".to_string(),
            },
            Ingredient {
                name: "garlic".to_string(),
                quantity: "2".to_string(),
                unit: "cloves".to_string(),
            },
            Ingredient {
                name: "olive oil".to_string(),
                quantity: String::new(),
                unit: String::new(),
            },
        ],
        steps: (1..=steps).map(|i| format!("Step body number {i}.")).collect(),
        meal_type: "dinner".to_string(),
        max_minutes: 25,
        skill_level: "beginner".to_string(),
        dietary_tags: vec!["vegetarian".to_string()],
    }
}
