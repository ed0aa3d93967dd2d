//! Extractors whose rejections use the API error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with malformed bodies reported as `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
