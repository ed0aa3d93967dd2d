//! `/auth`: account creation and the token lifecycle.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth::{login, logout, me, refresh, register};
use crate::state::AppState;

/// `logout` and `me` need a bearer token; the rest are public.
pub fn router() -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh));

    let session = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me));

    public.merge(session)
}
