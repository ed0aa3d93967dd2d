//! The seam between request handling and event fan-out.
//!
//! Handlers never talk to the bus directly; they receive a
//! `&dyn EventNotifier`. Delivery is fire-and-forget: `notify` cannot fail
//! and must not block.

use std::sync::Mutex;

use crate::bus::{EventBus, HabitEvent};

pub trait EventNotifier: Send + Sync {
    fn notify(&self, event: HabitEvent);
}

impl EventNotifier for EventBus {
    fn notify(&self, event: HabitEvent) {
        tracing::debug!(
            event = event.kind.name(),
            user_id = event.user_id,
            "Publishing habit event",
        );
        self.publish(event);
    }
}

/// Notifier that keeps every event in memory. Used by tests.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<HabitEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<HabitEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventNotifier for RecordingNotifier {
    fn notify(&self, event: HabitEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
