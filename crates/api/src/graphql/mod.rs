//! Read-only GraphQL endpoint for analytics.
//!
//! The schema is built once at startup and stored in [`AppState`]. The
//! bearer identity (if any) is resolved by the HTTP handler and attached
//! to the request data; resolvers reject anonymous callers themselves.

mod query;

use async_graphql::{EmptyMutation, EmptySubscription, ErrorExtensions, Schema};
use axum::extract::State;
use axum::Json;
use habitual_db::DbPool;

use crate::error::{AppError, CODE_AUTHENTICATION};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

pub use query::QueryRoot;

pub type AnalyticsSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(pool: DbPool) -> AnalyticsSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(pool)
        .finish()
}

/// POST /graphql
pub async fn graphql_handler(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let request = match user {
        Some(user) => request.data(user),
        None => request,
    };
    Json(state.graphql.execute(request).await)
}

/// Fetch the caller, failing with an `AUTHENTICATION_ERROR` extension code.
fn require_user<'a>(ctx: &async_graphql::Context<'a>) -> async_graphql::Result<&'a AuthUser> {
    ctx.data_opt::<AuthUser>().ok_or_else(|| {
        async_graphql::Error::new("Authentication required")
            .extend_with(|_, ext| ext.set("code", CODE_AUTHENTICATION))
    })
}

/// Carry the REST error classification over to GraphQL errors.
fn to_graphql_error(err: AppError) -> async_graphql::Error {
    let parts = err.parts();
    if parts.status.is_server_error() {
        tracing::error!(error = %err, "GraphQL resolver failed");
    }
    async_graphql::Error::new(parts.message).extend_with(|_, ext| ext.set("code", parts.code))
}
