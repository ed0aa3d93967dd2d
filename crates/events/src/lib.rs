//! Habit event bus and notification seam.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`HabitEvent`]: a mutation addressed to one user's live sessions.
//! - [`EventNotifier`]: the trait request handlers publish through, so a
//!   recorder can stand in for the bus in tests.

pub mod bus;
pub mod notifier;

pub use bus::{EventBus, HabitEvent, HabitEventKind};
pub use notifier::{EventNotifier, RecordingNotifier};
