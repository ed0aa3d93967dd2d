//! Delivery of bus events to live sessions.
//!
//! The [`NotificationRouter`] subscribes to the event bus and forwards each
//! event to the WebSocket room of the user it belongs to.

pub mod router;

pub use router::NotificationRouter;
