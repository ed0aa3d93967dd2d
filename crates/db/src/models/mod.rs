//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create/update DTOs consumed by the matching repository

pub mod admin;
pub mod completion;
pub mod habit;
pub mod user;
