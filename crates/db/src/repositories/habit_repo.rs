//! Repository for the `habits` table.

use sqlx::PgPool;
use habitual_core::types::DbId;

use crate::models::habit::{AdminHabitRow, CreateHabit, Habit, HabitSummaryRow, UpdateHabit};
use crate::repositories::like_pattern;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, description, frequency, color, icon, \
                       reminder_time, is_public, public_id, created_at, updated_at";

/// Provides CRUD operations for habits. Every user-facing lookup is scoped
/// to the owner so foreign habits read as absent.
pub struct HabitRepo;

impl HabitRepo {
    /// Insert a new habit, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateHabit) -> Result<Habit, sqlx::Error> {
        let query = format!(
            "INSERT INTO habits
                (user_id, name, description, frequency, color, icon, reminder_time, is_public, public_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Habit>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.frequency)
            .bind(&input.color)
            .bind(&input.icon)
            .bind(input.reminder_time)
            .bind(input.is_public)
            .bind(&input.public_id)
            .fetch_one(pool)
            .await
    }

    /// Find a habit owned by `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Habit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM habits WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Habit>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a shared habit by its public id.
    pub async fn find_public(
        pool: &PgPool,
        public_id: &str,
    ) -> Result<Option<Habit>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM habits WHERE public_id = $1 AND is_public = TRUE");
        sqlx::query_as::<_, Habit>(&query)
            .bind(public_id)
            .fetch_optional(pool)
            .await
    }

    /// All habits of a user, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Habit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM habits WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Habit>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Id, name and creation time of every habit a user owns, oldest first.
    pub async fn summaries_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<HabitSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, HabitSummaryRow>(
            "SELECT id, name, created_at FROM habits WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update to an owned habit.
    ///
    /// For the nullable columns a boolean "touched" flag is bound next to the
    /// value so that an explicit clear can be told apart from an absent field.
    /// Returns `None` if no owned row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateHabit,
    ) -> Result<Option<Habit>, sqlx::Error> {
        let query = format!(
            "UPDATE habits SET
                name = COALESCE($3, name),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                frequency = COALESCE($6, frequency),
                color = COALESCE($7, color),
                icon = COALESCE($8, icon),
                reminder_time = CASE WHEN $9 THEN $10 ELSE reminder_time END,
                is_public = COALESCE($11, is_public),
                public_id = CASE WHEN $12 THEN $13 ELSE public_id END
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Habit>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(&input.frequency)
            .bind(&input.color)
            .bind(&input.icon)
            .bind(input.reminder_time.is_some())
            .bind(input.reminder_time.flatten())
            .bind(input.is_public)
            .bind(input.public_id.is_some())
            .bind(input.public_id.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Delete an owned habit and its completions in one transaction.
    ///
    /// Completions go first; returns `true` if the habit existed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query(
            "DELETE FROM habit_completions
             WHERE habit_id = (SELECT id FROM habits WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin listing across all users, newest first, with owner details.
    pub async fn list_paginated(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminHabitRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminHabitRow>(
            "SELECT h.id, h.user_id, h.name, h.description, h.frequency, h.color, h.icon,
                    h.reminder_time, h.is_public, h.public_id, h.created_at, h.updated_at,
                    u.email AS owner_email, u.name AS owner_name
             FROM habits h
             JOIN users u ON u.id = h.user_id
             WHERE ($1::TEXT IS NULL OR h.name ILIKE $1 OR h.description ILIKE $1)
             ORDER BY h.created_at DESC, h.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(search.map(like_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count habits matching the same filter as [`Self::list_paginated`].
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM habits
             WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1)",
        )
        .bind(search.map(like_pattern))
        .fetch_one(pool)
        .await
    }
}
