//! Loads the completion log and hands it to the core aggregators.

use chrono::Utc;
use habitual_core::analytics::{
    build_dashboard, build_habit_analytics, CompletionRecord, DashboardStats, HabitAnalytics,
    HabitSummary,
};
use habitual_core::error::CoreError;
use habitual_core::types::DbId;
use habitual_db::repositories::{CompletionRepo, HabitRepo};
use habitual_db::DbPool;

use crate::error::AppError;

pub async fn dashboard(pool: &DbPool, user_id: DbId) -> Result<DashboardStats, AppError> {
    let habits: Vec<HabitSummary> = HabitRepo::summaries_for_user(pool, user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let completions: Vec<CompletionRecord> = CompletionRepo::list_for_user(pool, user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(build_dashboard(&habits, &completions, Utc::now()))
}

/// Per-habit history. Habits owned by someone else read as NotFound.
pub async fn habit_analytics(
    pool: &DbPool,
    user_id: DbId,
    habit_id: DbId,
) -> Result<HabitAnalytics, AppError> {
    HabitRepo::find_owned(pool, habit_id, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Habit",
            id: habit_id,
        })?;

    let dates: Vec<_> = CompletionRepo::list_for_habit(pool, habit_id, user_id)
        .await?
        .into_iter()
        .map(|entry| entry.date)
        .collect();

    Ok(build_habit_analytics(habit_id, &dates))
}
