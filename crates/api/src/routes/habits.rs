//! Route definitions for the `/habits` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::habits;
use crate::state::AppState;

/// Routes mounted at `/habits`.
///
/// ```text
/// GET    /                        -> list_habits
/// POST   /                        -> create_habit
/// GET    /public/{public_id}      -> get_public_habit (no auth)
/// GET    /{id}                    -> get_habit
/// PUT    /{id}                    -> update_habit
/// DELETE /{id}                    -> delete_habit
/// POST   /{id}/complete           -> complete_habit
/// DELETE /{id}/complete/{date}    -> uncomplete_habit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(habits::list_habits).post(habits::create_habit))
        .route("/public/{public_id}", get(habits::get_public_habit))
        .route(
            "/{id}",
            get(habits::get_habit)
                .put(habits::update_habit)
                .delete(habits::delete_habit),
        )
        .route("/{id}/complete", post(habits::complete_habit))
        .route("/{id}/complete/{date}", delete(habits::uncomplete_habit))
}
