use async_graphql::{Context, Object};
use habitual_core::analytics::{DashboardStats, HabitAnalytics};
use habitual_core::types::DbId;
use habitual_db::DbPool;

use super::{require_user, to_graphql_error};
use crate::services::analytics;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Cross-habit summary for the caller.
    async fn dashboard(&self, ctx: &Context<'_>) -> async_graphql::Result<DashboardStats> {
        let user = require_user(ctx)?;
        let pool = ctx.data::<DbPool>()?;
        analytics::dashboard(pool, user.user_id)
            .await
            .map_err(to_graphql_error)
    }

    /// History of one of the caller's habits.
    async fn habit_analytics(
        &self,
        ctx: &Context<'_>,
        habit_id: DbId,
    ) -> async_graphql::Result<HabitAnalytics> {
        let user = require_user(ctx)?;
        let pool = ctx.data::<DbPool>()?;
        analytics::habit_analytics(pool, user.user_id, habit_id)
            .await
            .map_err(to_graphql_error)
    }
}
