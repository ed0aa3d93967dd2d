//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the `admin` role.
///
/// ```text
/// GET    /users              -> list_users
/// GET    /users/{id}         -> get_user
/// DELETE /users/{id}         -> delete_user
/// PUT    /users/{id}/role    -> update_role
/// GET    /habits             -> list_habits
/// GET    /metrics            -> metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user).delete(admin::delete_user),
        )
        .route("/users/{id}/role", put(admin::update_role))
        .route("/habits", get(admin::list_habits))
        .route("/metrics", get(admin::metrics))
}
