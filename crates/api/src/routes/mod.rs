pub mod admin;
pub mod analytics;
pub mod auth;
pub mod habits;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::graphql;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                  register (public)
/// /auth/login                                     login (public)
/// /auth/refresh                                   refresh (public)
/// /auth/logout                                    logout (requires auth)
/// /auth/me                                        current user (requires auth)
///
/// /habits                                         list, create
/// /habits/{id}                                    get, update, delete
/// /habits/{id}/complete                           mark complete (POST)
/// /habits/{id}/complete/{date}                    unmark (DELETE)
/// /habits/public/{public_id}                      shared view (public)
///
/// /analytics/dashboard                            cross-habit summary
/// /analytics/habits/{habit_id}                    per-habit history
///
/// /admin/users                                    list (admin only)
/// /admin/users/{id}                               get, delete
/// /admin/users/{id}/role                          change role (PUT)
/// /admin/habits                                   list all habits
/// /admin/metrics                                  system metrics
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/habits", habits::router())
        .nest("/analytics", analytics::router())
        .nest("/admin", admin::router())
}

/// Endpoints mounted at the root next to `/health`:
///
/// ```text
/// /graphql                                        analytics queries (POST)
/// /ws?token=...                                   real-time channel
/// ```
pub fn realtime_routes() -> Router<AppState> {
    Router::new()
        .route("/graphql", post(graphql::graphql_handler))
        .route("/ws", get(ws::ws_handler))
}
