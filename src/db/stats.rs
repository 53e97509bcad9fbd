//! Usage-statistics repository
//!
//! Stats are written only at session boundaries: one `record_session` per
//! finished cooking session, plus an optional `record_rating` prompted
//! afterwards. Nothing here is touched mid-step.

use chrono::Utc;
use rusqlite::params;

use super::DbPool;
use crate::{Error, Result};

/// Per-(user, recipe) usage counters
#[derive(Debug, Clone)]
pub struct UsageStat {
    pub recipe_id: String,
    pub sessions: u32,
    pub times_cooked: u32,
    pub rating: Option<u8>,
}

/// Aggregate statistics for the statistics screen
#[derive(Debug, Clone, Default)]
pub struct UserStats {
    pub recipes_saved: u32,
    pub sessions: u32,
    pub recipes_cooked: u32,
    pub recipes_liked: u32,
}

impl UserStats {
    /// Share of saved recipes cooked at least once, in percent
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        if self.recipes_saved == 0 {
            return 0.0;
        }
        f64::from(self.recipes_cooked) / f64::from(self.recipes_saved) * 100.0
    }
}

/// Statistics repository
#[derive(Clone)]
pub struct StatsRepo {
    pool: DbPool,
}

impl StatsRepo {
    /// Create a new statistics repository
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record one finished cooking session
    ///
    /// Bumps the session counter, and the times-cooked counter when the
    /// session ran to completion. Exactly one row write per session.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn record_session(&self, user_id: &str, recipe_id: &str, completed: bool) -> Result<()> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        let cooked = i32::from(completed);

        conn.execute(
            "INSERT INTO recipe_stats (user_id, recipe_id, sessions, times_cooked, last_session_at)
             VALUES (?1, ?2, 1, ?3, ?4)
             ON CONFLICT(user_id, recipe_id) DO UPDATE SET
                 sessions = sessions + 1,
                 times_cooked = times_cooked + ?3,
                 last_session_at = ?4",
            params![user_id, recipe_id, cooked, &now],
        )?;

        tracing::info!(recipe_id, completed, "recorded session");
        Ok(())
    }

    /// Record a 1-5 rating for a recipe
    ///
    /// # Errors
    ///
    /// Returns error if the rating is out of range or the operation fails
    pub fn record_rating(&self, user_id: &str, recipe_id: &str, rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::Database(format!("rating {rating} out of range 1-5")));
        }

        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO recipe_stats (user_id, recipe_id, rating, last_session_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, recipe_id) DO UPDATE SET rating = ?3",
            params![user_id, recipe_id, rating, &now],
        )?;

        tracing::info!(recipe_id, rating, "recorded rating");
        Ok(())
    }

    /// Usage counters for one recipe, if any session was ever recorded
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn for_recipe(&self, user_id: &str, recipe_id: &str) -> Result<Option<UsageStat>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let stat = conn
            .query_row(
                "SELECT recipe_id, sessions, times_cooked, rating
                 FROM recipe_stats WHERE user_id = ?1 AND recipe_id = ?2",
                [user_id, recipe_id],
                |row| {
                    Ok(UsageStat {
                        recipe_id: row.get(0)?,
                        sessions: row.get(1)?,
                        times_cooked: row.get(2)?,
                        rating: row.get(3)?,
                    })
                },
            )
            .ok();

        Ok(stat)
    }

    /// Aggregate statistics for a user
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let recipes_saved: u32 = conn.query_row(
            "SELECT COUNT(*) FROM recipes WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;

        let (sessions, recipes_cooked, recipes_liked): (u32, u32, u32) = conn.query_row(
            "SELECT COALESCE(SUM(sessions), 0),
                    COALESCE(SUM(times_cooked > 0), 0),
                    COALESCE(SUM(rating >= 4), 0)
             FROM recipe_stats WHERE user_id = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(UserStats {
            recipes_saved,
            sessions,
            recipes_cooked,
            recipes_liked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{UserRepo, init_memory};

    fn setup() -> (StatsRepo, String) {
        let pool = init_memory().unwrap();
        let user = UserRepo::new(pool.clone()).find_or_create("cook").unwrap();
        (StatsRepo::new(pool), user.id)
    }

    #[test]
    fn session_counters_accumulate() {
        let (repo, user_id) = setup();

        repo.record_session(&user_id, "r1", false).unwrap();
        repo.record_session(&user_id, "r1", true).unwrap();
        repo.record_session(&user_id, "r1", true).unwrap();

        let stat = repo.for_recipe(&user_id, "r1").unwrap().unwrap();
        assert_eq!(stat.sessions, 3);
        assert_eq!(stat.times_cooked, 2);
        assert_eq!(stat.rating, None);
    }

    #[test]
    fn rating_is_validated_and_survives_sessions() {
        let (repo, user_id) = setup();

        assert!(repo.record_rating(&user_id, "r1", 0).is_err());
        assert!(repo.record_rating(&user_id, "r1", 6).is_err());

        repo.record_rating(&user_id, "r1", 5).unwrap();
        repo.record_session(&user_id, "r1", true).unwrap();

        let stat = repo.for_recipe(&user_id, "r1").unwrap().unwrap();
        assert_eq!(stat.rating, Some(5));
    }

    #[test]
    fn completion_rate_math() {
        let stats = UserStats {
            recipes_saved: 4,
            sessions: 10,
            recipes_cooked: 3,
            recipes_liked: 1,
        };
        assert!((stats.completion_rate() - 75.0).abs() < f64::EPSILON);

        assert!(UserStats::default().completion_rate().abs() < f64::EPSILON);
    }
}
