//! Completion log rows.

use habitual_core::analytics::CompletionRecord;
use habitual_core::types::{CalendarDate, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `habit_completions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub id: DbId,
    pub habit_id: DbId,
    pub user_id: DbId,
    pub date: CalendarDate,
    /// Streak at the time of completion; never recomputed.
    pub streak: i32,
    pub completed_at: Timestamp,
    pub created_at: Timestamp,
}

/// Date + snapshot pair read by the calculators.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CompletionEntry {
    pub habit_id: DbId,
    pub date: CalendarDate,
    pub streak: i32,
}

impl From<CompletionEntry> for CompletionRecord {
    fn from(entry: CompletionEntry) -> Self {
        Self {
            habit_id: entry.habit_id,
            date: entry.date,
            streak: entry.streak,
        }
    }
}

/// Aggregate shown on the habit detail view.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletionStats {
    pub completion_count: i64,
    /// Snapshot on the latest-dated completion, 0 when there is none.
    pub current_streak: i32,
    pub last_completion_date: Option<CalendarDate>,
}

#[derive(Debug, Clone)]
pub struct CreateCompletion {
    pub habit_id: DbId,
    pub user_id: DbId,
    pub date: CalendarDate,
    pub streak: i32,
}
