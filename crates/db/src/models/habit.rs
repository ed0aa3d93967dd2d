//! Habit entity model and DTOs.

use habitual_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `habits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub color: String,
    pub icon: String,
    pub reminder_time: Option<Timestamp>,
    pub is_public: bool,
    /// Present iff `is_public`.
    pub public_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Habit row joined with its owner, for the admin listing.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminHabitRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub habit: Habit,
    pub owner_email: String,
    pub owner_name: String,
}

/// Minimal projection used by the dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct HabitSummaryRow {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<HabitSummaryRow> for habitual_core::analytics::HabitSummary {
    fn from(row: HabitSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// DTO for inserting a habit. Defaults are resolved by the caller.
#[derive(Debug, Clone)]
pub struct CreateHabit {
    pub user_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub color: String,
    pub icon: String,
    pub reminder_time: Option<Timestamp>,
    pub is_public: bool,
    pub public_id: Option<String>,
}

/// Partial update. `None` leaves a column untouched.
///
/// The nullable columns use `Option<Option<_>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateHabit {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub frequency: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub reminder_time: Option<Option<Timestamp>>,
    pub is_public: Option<bool>,
    pub public_id: Option<Option<String>>,
}
