//! Handlers for the `/admin` resource (user and habit management, metrics).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::Json;
use habitual_core::error::CoreError;
use habitual_core::pagination::Pagination;
use habitual_core::roles::is_valid_role;
use habitual_core::types::DbId;
use habitual_db::models::admin::{SystemMetrics, UserStats};
use habitual_db::models::habit::AdminHabitRow;
use habitual_db::models::user::UserResponse;
use habitual_db::repositories::{AdminRepo, HabitRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserResponse,
    pub stats: UserStats,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let (page, limit, offset) = params.window();
    let search = params.search();

    let users = UserRepo::list_paginated(&state.pool, search, limit, offset).await?;
    let total = UserRepo::count(&state.pool, search).await?;

    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::paginated(
        users,
        Pagination::new(page, limit, total),
    )))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserDetail>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    let stats = AdminRepo::user_stats(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    Ok(Json(ApiResponse::ok(UserDetail {
        user: user.into(),
        stats,
    })))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if !is_valid_role(&input.role) {
        return Err(CoreError::Validation(format!("Invalid role: {}", input.role)).into());
    }

    let user = UserRepo::update_role(&state.pool, id, &input.role)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    tracing::info!(
        user_id = id,
        role = %input.role,
        admin_id = admin.user_id,
        "User role updated"
    );
    Ok(Json(
        ApiResponse::ok(UserResponse::from(user)).with_message("User role updated successfully"),
    ))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Removes the user along with their habits and completions.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }

    tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// GET /api/v1/admin/habits
pub async fn list_habits(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<AdminHabitRow>>>> {
    let (page, limit, offset) = params.window();
    let search = params.search();

    let habits = HabitRepo::list_paginated(&state.pool, search, limit, offset).await?;
    let total = HabitRepo::count(&state.pool, search).await?;

    Ok(Json(ApiResponse::paginated(
        habits,
        Pagination::new(page, limit, total),
    )))
}

/// GET /api/v1/admin/metrics
pub async fn metrics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<ApiResponse<SystemMetrics>>> {
    let metrics = AdminRepo::system_metrics(&state.pool).await?;
    Ok(Json(ApiResponse::ok(metrics)))
}
