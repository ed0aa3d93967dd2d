use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use habitual_core::error::CoreError;
use serde_json::json;
use validator::ValidationErrors;

pub const CODE_VALIDATION: &str = "VALIDATION_ERROR";
pub const CODE_AUTHENTICATION: &str = "AUTHENTICATION_ERROR";
pub const CODE_AUTHORIZATION: &str = "AUTHORIZATION_ERROR";
pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_CONFLICT: &str = "CONFLICT_ERROR";
pub const CODE_INTERNAL: &str = "INTERNAL_SERVER_ERROR";

const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Whether 5xx bodies carry the underlying error text. Off unless the
/// server runs outside production.
static EXPOSE_INTERNAL_DETAIL: AtomicBool = AtomicBool::new(false);

/// Toggle `error.detail` on internal error responses.
pub fn expose_internal_detail(enabled: bool) {
    EXPOSE_INTERNAL_DETAIL.store(enabled, Ordering::Relaxed);
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the JSON error envelope:
///
/// ```json
/// { "success": false, "error": { "message": "...", "code": "NOT_FOUND" } }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body failed its `validator` rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Body was not valid JSON for the target type.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Everything the client gets to see about an error.
#[derive(Debug)]
pub struct ErrorParts {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: None,
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_INTERNAL,
            GENERIC_INTERNAL_MESSAGE,
        )
    }
}

impl AppError {
    /// Classify the error into status, code and client-safe message.
    pub fn parts(&self) -> ErrorParts {
        match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Validation(errors) => ErrorParts {
                fields: Some(field_messages(errors)),
                ..ErrorParts::new(StatusCode::BAD_REQUEST, CODE_VALIDATION, "Validation failed")
            },
            AppError::Json(rejection) => ErrorParts::new(
                StatusCode::BAD_REQUEST,
                CODE_VALIDATION,
                rejection.body_text(),
            ),
            AppError::BadRequest(msg) => {
                ErrorParts::new(StatusCode::BAD_REQUEST, CODE_VALIDATION, msg.clone())
            }
            AppError::InternalError(_) => ErrorParts::internal(),
        }
    }

    /// Message safe to show a client.
    pub fn public_message(&self) -> String {
        self.parts().message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = self.parts();

        let mut error = json!({
            "message": parts.message,
            "code": parts.code,
        });
        if let Some(fields) = parts.fields {
            error["fields"] = json!(fields);
        }
        if parts.status.is_server_error() {
            tracing::error!(error = %self, "Unhandled error");
            if EXPOSE_INTERNAL_DETAIL.load(Ordering::Relaxed) {
                error["detail"] = json!(self.to_string());
            }
        }

        let body = json!({
            "success": false,
            "error": error,
        });

        (parts.status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> ErrorParts {
    match core {
        CoreError::NotFound { entity, id } => ErrorParts::new(
            StatusCode::NOT_FOUND,
            CODE_NOT_FOUND,
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, .. } => {
            ErrorParts::new(StatusCode::NOT_FOUND, CODE_NOT_FOUND, format!("{entity} not found"))
        }
        CoreError::Validation(msg) => {
            ErrorParts::new(StatusCode::BAD_REQUEST, CODE_VALIDATION, msg.clone())
        }
        CoreError::InvalidFields { message, fields } => ErrorParts {
            fields: Some(fields.clone()),
            ..ErrorParts::new(StatusCode::BAD_REQUEST, CODE_VALIDATION, message.clone())
        },
        CoreError::Conflict(msg) => ErrorParts::new(StatusCode::CONFLICT, CODE_CONFLICT, msg.clone()),
        CoreError::Unauthorized(msg) => {
            ErrorParts::new(StatusCode::UNAUTHORIZED, CODE_AUTHENTICATION, msg.clone())
        }
        CoreError::Forbidden(msg) => {
            ErrorParts::new(StatusCode::FORBIDDEN, CODE_AUTHORIZATION, msg.clone())
        }
        CoreError::Internal(_) => ErrorParts::internal(),
    }
}

/// Classify a sqlx error.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on constraints named `uq_*` map to 409.
/// - Check violations on constraints named `ck_*` map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, CODE_NOT_FOUND, "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23505") if constraint.starts_with("uq_") => ErrorParts::new(
                    StatusCode::CONFLICT,
                    CODE_CONFLICT,
                    conflict_message(constraint),
                ),
                Some("23514") if constraint.starts_with("ck_") => ErrorParts::new(
                    StatusCode::BAD_REQUEST,
                    CODE_VALIDATION,
                    format!("Value violates constraint: {constraint}"),
                ),
                _ => ErrorParts::internal(),
            }
        }
        _ => ErrorParts::internal(),
    }
}

fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_users_email" => "User with this email already exists".to_string(),
        "uq_habit_completions_habit_user_date" => {
            "Habit already completed for this date".to_string()
        }
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// First message per offending field.
fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value ({})", e.code),
                })
                .unwrap_or_else(|| "Invalid value".to_string());
            (field.to_string(), message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::ValidationError;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_uses_envelope() {
        let (status, body) = body_of(AppError::Core(CoreError::NotFound {
            entity: "Habit",
            id: 7,
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Habit with id 7 not found");
    }

    #[tokio::test]
    async fn auth_errors_map_to_401_and_403() {
        let (status, body) =
            body_of(CoreError::Unauthorized("Invalid or expired token".into()).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], CODE_AUTHENTICATION);

        let (status, body) = body_of(CoreError::Forbidden("nope".into()).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], CODE_AUTHORIZATION);
    }

    #[tokio::test]
    async fn validation_errors_list_fields() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("Name is required".into());
        errors.add("name", err);

        let (status, body) = body_of(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], CODE_VALIDATION);
        assert_eq!(body["error"]["fields"]["name"], "Name is required");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_detail() {
        let (status, body) =
            body_of(AppError::InternalError("password hasher exploded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], CODE_INTERNAL);
        assert_eq!(body["error"]["message"], GENERIC_INTERNAL_MESSAGE);
        assert!(body["error"].get("detail").is_none());
    }

    #[test]
    fn conflict_messages_are_friendly() {
        assert_eq!(
            conflict_message("uq_habit_completions_habit_user_date"),
            "Habit already completed for this date"
        );
        assert!(conflict_message("uq_other").contains("uq_other"));
    }

    #[test]
    fn row_not_found_is_404() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.parts().status, StatusCode::NOT_FOUND);
        assert_eq!(err.parts().code, CODE_NOT_FOUND);
    }
}
