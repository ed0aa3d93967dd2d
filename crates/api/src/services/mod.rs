//! Operations shared by more than one transport (REST, GraphQL, WebSocket).

pub mod analytics;
pub mod completion;
