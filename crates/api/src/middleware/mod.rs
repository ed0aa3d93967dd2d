//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller resolved from a Bearer access token.
//! - [`auth::MaybeAuthUser`] -- same, but absent instead of rejected.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.

pub mod auth;
pub mod rbac;
