//! Liveness probe, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    fn from_db(db_healthy: bool) -> Self {
        Self {
            status: match db_healthy {
                true => "ok",
                false => "degraded",
            },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            timestamp: Utc::now(),
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let probe = habitual_db::health_check(&state.pool).await;
    if let Err(e) = &probe {
        tracing::warn!(error = %e, "Health probe could not reach the database");
    }
    Json(HealthStatus::from_db(probe.is_ok()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
