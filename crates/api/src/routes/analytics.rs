use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET /dashboard            -> dashboard
/// GET /habits/{habit_id}    -> habit_analytics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(analytics::dashboard))
        .route("/habits/{habit_id}", get(analytics::habit_analytics))
}
