//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing, verification and strength rules.
//! - [`jwt`] -- access-token signing/validation and refresh-token helpers.

pub mod jwt;
pub mod password;
