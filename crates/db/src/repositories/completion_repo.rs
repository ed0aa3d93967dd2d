//! Repository for the `habit_completions` table (the completion log).
//!
//! One row per `(habit_id, user_id, date)`, enforced by
//! `uq_habit_completions_habit_user_date`. Rows are never updated; unmarking
//! deletes the row.

use sqlx::PgPool;
use habitual_core::types::{CalendarDate, DbId};

use crate::models::completion::{
    Completion, CompletionEntry, CreateCompletion, HabitCompletionStats,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, habit_id, user_id, date, streak, completed_at, created_at";

pub struct CompletionRepo;

impl CompletionRepo {
    /// Every completion of one habit by one user, ascending by date.
    pub async fn list_for_habit(
        pool: &PgPool,
        habit_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<CompletionEntry>, sqlx::Error> {
        sqlx::query_as::<_, CompletionEntry>(
            "SELECT habit_id, date, streak FROM habit_completions
             WHERE habit_id = $1 AND user_id = $2
             ORDER BY date",
        )
        .bind(habit_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Every completion recorded by a user, across habits.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CompletionEntry>, sqlx::Error> {
        sqlx::query_as::<_, CompletionEntry>(
            "SELECT habit_id, date, streak FROM habit_completions
             WHERE user_id = $1
             ORDER BY date",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find(
        pool: &PgPool,
        habit_id: DbId,
        user_id: DbId,
        date: CalendarDate,
    ) -> Result<Option<Completion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM habit_completions
             WHERE habit_id = $1 AND user_id = $2 AND date = $3"
        );
        sqlx::query_as::<_, Completion>(&query)
            .bind(habit_id)
            .bind(user_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Append a completion.
    ///
    /// Returns `None` when a row for the same date already exists. The check
    /// is the unique constraint itself, so concurrent writers for one date
    /// see exactly one `Some`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCompletion,
    ) -> Result<Option<Completion>, sqlx::Error> {
        let query = format!(
            "INSERT INTO habit_completions (habit_id, user_id, date, streak)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_habit_completions_habit_user_date DO NOTHING
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Completion>(&query)
            .bind(input.habit_id)
            .bind(input.user_id)
            .bind(input.date)
            .bind(input.streak)
            .fetch_optional(pool)
            .await?;
        if created.is_none() {
            tracing::debug!(
                habit_id = input.habit_id,
                date = %input.date,
                "Completion already recorded for date",
            );
        }
        Ok(created)
    }

    /// Remove a completion. Returns `true` if a row was deleted.
    pub async fn delete(
        pool: &PgPool,
        habit_id: DbId,
        user_id: DbId,
        date: CalendarDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM habit_completions WHERE habit_id = $1 AND user_id = $2 AND date = $3",
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(date)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of the user's habits completed on `date`.
    pub async fn habit_ids_completed_on(
        pool: &PgPool,
        user_id: DbId,
        date: CalendarDate,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT habit_id FROM habit_completions WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// Count, current streak snapshot and last date for one habit.
    pub async fn stats_for_habit(
        pool: &PgPool,
        habit_id: DbId,
    ) -> Result<HabitCompletionStats, sqlx::Error> {
        sqlx::query_as::<_, HabitCompletionStats>(
            "SELECT COUNT(*) AS completion_count,
                    COALESCE((SELECT streak FROM habit_completions
                              WHERE habit_id = $1 ORDER BY date DESC LIMIT 1), 0) AS current_streak,
                    MAX(date) AS last_completion_date
             FROM habit_completions
             WHERE habit_id = $1",
        )
        .bind(habit_id)
        .fetch_one(pool)
        .await
    }
}
