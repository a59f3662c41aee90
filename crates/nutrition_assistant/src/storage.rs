//! SQLite-backed profile persistence.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use crate::error::{AssistantError, AssistantResult};
use crate::profile::{ActivityLevel, Gender, Goal, Profile};

/// Profile store over a SQLite pool. One row per user, replaced on save.
pub struct ProfileStore {
    pool: SqlitePool,
}

impl ProfileStore {
    /// Connects and creates the schema when missing. `sqlite:` URLs get
    /// `?mode=rwc` appended so a missing database file is created instead
    /// of failing the connect.
    pub async fn connect(database_url: &str) -> AssistantResult<Self> {
        let url = if database_url.starts_with("sqlite:") && !database_url.contains("mode=") {
            format!("{}?mode=rwc", database_url)
        } else {
            database_url.to_string()
        };
        let pool = SqlitePool::connect(&url).await?;
        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!("profile store ready at {}", database_url);
        Ok(store)
    }

    async fn migrate(&self) -> AssistantResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                gender TEXT NOT NULL,
                age INTEGER NOT NULL,
                weight REAL NOT NULL,
                height REAL NOT NULL,
                activity TEXT NOT NULL,
                goal TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upserts the profile; a previous row for the same user is replaced.
    pub async fn save(&self, user_id: i64, profile: &Profile) -> AssistantResult<()> {
        sqlx::query(
            r"
            INSERT OR REPLACE INTO users (user_id, gender, age, weight, height, activity, goal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user_id)
        .bind(profile.gender.as_str())
        .bind(i64::from(profile.age))
        .bind(profile.weight_kg)
        .bind(profile.height_cm)
        .bind(profile.activity.as_str())
        .bind(profile.goal.as_str())
        .execute(&self.pool)
        .await?;
        tracing::debug!("profile saved for user {}", user_id);
        Ok(())
    }

    /// Loads a stored profile. Enum columns parse leniently so rows written
    /// by older versions still load; numeric columns are revalidated against
    /// the accepted ranges.
    pub async fn load(&self, user_id: i64) -> AssistantResult<Option<Profile>> {
        let row = sqlx::query(
            "SELECT gender, age, weight, height, activity, goal FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_profile(&row)?)),
            None => Ok(None),
        }
    }
}

fn row_to_profile(row: &SqliteRow) -> AssistantResult<Profile> {
    let gender: String = row.get("gender");
    let age: i64 = row.get("age");
    let weight: f64 = row.get("weight");
    let height: f64 = row.get("height");
    let activity: String = row.get("activity");
    let goal: String = row.get("goal");

    let age = u32::try_from(age)
        .map_err(|_| AssistantError::Validation(format!("stored age {} is not usable", age)))?;

    Profile::new(
        Gender::from_stored(&gender),
        age,
        weight,
        height,
        ActivityLevel::from_stored(&activity),
        Goal::from_stored(&goal),
    )
}
