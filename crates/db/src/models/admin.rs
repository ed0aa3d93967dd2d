//! Read models for the admin console.

use serde::Serialize;
use sqlx::FromRow;

/// Per-user activity counters.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub habits_count: i64,
    pub completions_count: i64,
    pub public_habits_count: i64,
    pub longest_streak: i32,
    pub days_since_registration: i64,
}

/// Flat counter row; see [`SystemMetrics`] for the response shape.
#[derive(Debug, Clone, FromRow)]
pub struct MetricsRow {
    pub users_total: i64,
    pub users_active: i64,
    pub users_admins: i64,
    pub users_new: i64,
    pub habits_total: i64,
    pub habits_public: i64,
    pub habits_new: i64,
    pub completions_total: i64,
    pub completions_recent: i64,
    pub longest_streak: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub users: UserMetrics,
    pub habits: HabitMetrics,
    pub completions: CompletionMetrics,
    pub streaks: StreakMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetrics {
    pub total: i64,
    /// Users with a completion recorded in the last 30 days.
    pub active: i64,
    pub admins: i64,
    pub new_last_30_days: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitMetrics {
    pub total: i64,
    pub public: i64,
    pub new_last_30_days: i64,
    pub avg_per_user: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionMetrics {
    pub total: i64,
    pub recent_7_days: i64,
    pub avg_per_habit: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakMetrics {
    pub longest: i32,
}

impl From<MetricsRow> for SystemMetrics {
    fn from(row: MetricsRow) -> Self {
        Self {
            users: UserMetrics {
                total: row.users_total,
                active: row.users_active,
                admins: row.users_admins,
                new_last_30_days: row.users_new,
            },
            habits: HabitMetrics {
                total: row.habits_total,
                public: row.habits_public,
                new_last_30_days: row.habits_new,
                avg_per_user: ratio(row.habits_total, row.users_total),
            },
            completions: CompletionMetrics {
                total: row.completions_total,
                recent_7_days: row.completions_recent,
                avg_per_habit: ratio(row.completions_total, row.habits_total),
            },
            streaks: StreakMetrics {
                longest: row.longest_streak,
            },
        }
    }
}

/// `numerator / denominator` rounded to 2 decimals, 0 for an empty denominator.
fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 100.0).round() / 100.0
}
