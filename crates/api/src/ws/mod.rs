//! WebSocket real-time channel.
//!
//! Provides the per-user connection registry, the heartbeat task, the JSON
//! frame protocol, and the authenticated upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::{dispatch, ws_handler, WsAuth};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
