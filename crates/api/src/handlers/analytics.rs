//! REST views over the analytics aggregators. Same payloads as the
//! GraphQL `dashboard` / `habitAnalytics` queries.

use axum::extract::{Path, State};
use axum::Json;
use habitual_core::analytics::{DashboardStats, HabitAnalytics};
use habitual_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::services::analytics;
use crate::state::AppState;

/// GET /api/v1/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let stats = analytics::dashboard(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/v1/analytics/habits/{habit_id}
pub async fn habit_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<HabitAnalytics>>> {
    let view = analytics::habit_analytics(&state.pool, auth.user_id, habit_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}
