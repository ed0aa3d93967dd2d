//! Cross-table counters for the admin console.

use sqlx::PgPool;
use habitual_core::types::DbId;

use crate::models::admin::{MetricsRow, SystemMetrics, UserStats};

pub struct AdminRepo;

impl AdminRepo {
    /// Activity counters for one user. Returns `None` if the user does not exist.
    pub async fn user_stats(pool: &PgPool, user_id: DbId) -> Result<Option<UserStats>, sqlx::Error> {
        sqlx::query_as::<_, UserStats>(
            "SELECT
                (SELECT COUNT(*) FROM habits WHERE user_id = u.id) AS habits_count,
                (SELECT COUNT(*) FROM habit_completions WHERE user_id = u.id) AS completions_count,
                (SELECT COUNT(*) FROM habits WHERE user_id = u.id AND is_public) AS public_habits_count,
                (SELECT COALESCE(MAX(streak), 0) FROM habit_completions WHERE user_id = u.id)
                    AS longest_streak,
                FLOOR(EXTRACT(EPOCH FROM (NOW() - u.created_at)) / 86400)::BIGINT
                    AS days_since_registration
             FROM users u
             WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// System-wide totals and averages.
    pub async fn system_metrics(pool: &PgPool) -> Result<SystemMetrics, sqlx::Error> {
        let row = sqlx::query_as::<_, MetricsRow>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS users_total,
                (SELECT COUNT(DISTINCT user_id) FROM habit_completions
                 WHERE completed_at >= NOW() - INTERVAL '30 days') AS users_active,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS users_admins,
                (SELECT COUNT(*) FROM users
                 WHERE created_at >= NOW() - INTERVAL '30 days') AS users_new,
                (SELECT COUNT(*) FROM habits) AS habits_total,
                (SELECT COUNT(*) FROM habits WHERE is_public) AS habits_public,
                (SELECT COUNT(*) FROM habits
                 WHERE created_at >= NOW() - INTERVAL '30 days') AS habits_new,
                (SELECT COUNT(*) FROM habit_completions) AS completions_total,
                (SELECT COUNT(*) FROM habit_completions
                 WHERE completed_at >= NOW() - INTERVAL '7 days') AS completions_recent,
                (SELECT COALESCE(MAX(streak), 0) FROM habit_completions) AS longest_streak",
        )
        .fetch_one(pool)
        .await?;
        Ok(row.into())
    }
}
