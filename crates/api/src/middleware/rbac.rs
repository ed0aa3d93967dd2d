//! Role checks layered on top of [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use habitual_core::error::CoreError;
use habitual_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Admits only callers whose token carries the `admin` role; anyone else
/// with a valid token gets 403, without a token 401.
pub struct RequireAdmin(pub AuthUser);

/// Reject `user` unless it has `role`.
pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role == role {
        Ok(())
    } else {
        tracing::debug!(user_id = user.user_id, required = role, "Role check failed");
        Err(CoreError::Forbidden("Insufficient permissions".into()).into())
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_role(&user, ROLE_ADMIN)?;
        Ok(Self(user))
    }
}
