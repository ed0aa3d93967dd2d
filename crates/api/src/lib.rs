//! HTTP, GraphQL and WebSocket surface of the habit tracker.
//!
//! The binary in `main.rs` and the integration tests both assemble the
//! app from these modules.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod graphql;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;
