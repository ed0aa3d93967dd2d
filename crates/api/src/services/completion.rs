//! Mark / unmark a habit as completed for a calendar day.
//!
//! Both the REST handlers and the WebSocket dispatcher go through here so
//! the streak snapshot and the emitted events are identical.

use habitual_core::dates::{format_date_key, parse_date_key, today_utc};
use habitual_core::error::CoreError;
use habitual_core::streak::{streak_ending_at, STARTING_STREAK};
use habitual_core::types::{CalendarDate, DbId};
use habitual_db::models::completion::{Completion, CreateCompletion};
use habitual_db::repositories::{CompletionRepo, HabitRepo};
use habitual_db::DbPool;
use habitual_events::{EventNotifier, HabitEvent};

use crate::error::AppError;

/// Record a completion of `habit_id` on `date` (today, UTC, when `None`).
///
/// Fails with NotFound when the habit is not owned by `user_id`, and with
/// Conflict when that day is already recorded.
pub async fn mark_complete(
    pool: &DbPool,
    notifier: &dyn EventNotifier,
    user_id: DbId,
    habit_id: DbId,
    date: Option<&str>,
) -> Result<Completion, AppError> {
    let date = match date {
        Some(key) => parse_date_key(key)?,
        None => today_utc(),
    };

    ensure_owned(pool, habit_id, user_id).await?;

    let streak = streak_for(pool, habit_id, user_id, date).await;

    let completion = CompletionRepo::create(
        pool,
        &CreateCompletion {
            habit_id,
            user_id,
            date,
            streak,
        },
    )
    .await?
    .ok_or_else(|| CoreError::Conflict("Habit already completed for this date".into()))?;

    tracing::info!(habit_id, user_id, date = %date, streak, "Habit marked complete");
    notifier.notify(HabitEvent::habit_completed(
        user_id,
        habit_id,
        &format_date_key(date),
        streak,
    ));

    Ok(completion)
}

/// Remove the completion of `habit_id` on `date`.
pub async fn unmark_complete(
    pool: &DbPool,
    notifier: &dyn EventNotifier,
    user_id: DbId,
    habit_id: DbId,
    date: &str,
) -> Result<(), AppError> {
    let date = parse_date_key(date)?;

    ensure_owned(pool, habit_id, user_id).await?;

    let date_key = format_date_key(date);
    if !CompletionRepo::delete(pool, habit_id, user_id, date).await? {
        return Err(CoreError::NotFoundByKey {
            entity: "Completion",
            key: date_key,
        }
        .into());
    }

    tracing::info!(habit_id, user_id, date = %date_key, "Habit completion removed");
    notifier.notify(HabitEvent::habit_uncompleted(user_id, habit_id, &date_key));

    Ok(())
}

async fn ensure_owned(pool: &DbPool, habit_id: DbId, user_id: DbId) -> Result<(), AppError> {
    HabitRepo::find_owned(pool, habit_id, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Habit",
                id: habit_id,
            }
            .into()
        })
}

/// Streak snapshot for a new completion on `date`.
///
/// A failed history read degrades to a fresh streak instead of failing the
/// write.
async fn streak_for(pool: &DbPool, habit_id: DbId, user_id: DbId, date: CalendarDate) -> i32 {
    match CompletionRepo::list_for_habit(pool, habit_id, user_id).await {
        Ok(history) => streak_ending_at(history.iter().map(|entry| entry.date), date),
        Err(e) => {
            tracing::warn!(
                error = %e,
                habit_id,
                "Could not read completion history, starting streak at 1",
            );
            STARTING_STREAK
        }
    }
}
