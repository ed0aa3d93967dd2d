//! Domain logic for the habit tracker.
//!
//! Nothing in this crate performs I/O. Repositories and handlers load rows
//! and hand them to the functions here, which keeps the streak and analytics
//! rules testable without a database.

pub mod analytics;
pub mod dates;
pub mod error;
pub mod habit;
pub mod pagination;
pub mod roles;
pub mod streak;
pub mod types;
