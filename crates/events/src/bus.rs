//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use habitual_core::types::DbId;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// HabitEvent
// ---------------------------------------------------------------------------

/// What happened. The wire name is given by [`HabitEventKind::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HabitEventKind {
    HabitCreated,
    HabitUpdated,
    HabitDeleted,
    HabitCompleted,
    HabitUncompleted,
    UserLoggedOut,
}

impl HabitEventKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::HabitCreated => "habit:created",
            Self::HabitUpdated => "habit:updated",
            Self::HabitDeleted => "habit:deleted",
            Self::HabitCompleted => "habit:completed",
            Self::HabitUncompleted => "habit:uncompleted",
            Self::UserLoggedOut => "user:logged_out",
        }
    }
}

/// A mutation scoped to the sessions of a single user.
#[derive(Debug, Clone, Serialize)]
pub struct HabitEvent {
    pub kind: HabitEventKind,

    /// Owner whose sessions receive the event.
    pub user_id: DbId,

    /// Event-specific JSON body (the habit, or `{habitId, date, streak}` ...).
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl HabitEvent {
    pub fn new(kind: HabitEventKind, user_id: DbId, payload: serde_json::Value) -> Self {
        Self {
            kind,
            user_id,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// A habit was created; `habit` is its serialized row, sent as
    /// `{ "habit": ... }`.
    pub fn habit_created(user_id: DbId, habit: serde_json::Value) -> Self {
        Self::new(
            HabitEventKind::HabitCreated,
            user_id,
            serde_json::json!({ "habit": habit }),
        )
    }

    pub fn habit_updated(user_id: DbId, habit: serde_json::Value) -> Self {
        Self::new(
            HabitEventKind::HabitUpdated,
            user_id,
            serde_json::json!({ "habit": habit }),
        )
    }

    pub fn habit_deleted(user_id: DbId, habit_id: DbId) -> Self {
        Self::new(
            HabitEventKind::HabitDeleted,
            user_id,
            serde_json::json!({ "habitId": habit_id }),
        )
    }

    pub fn habit_completed(user_id: DbId, habit_id: DbId, date: &str, streak: i32) -> Self {
        Self::new(
            HabitEventKind::HabitCompleted,
            user_id,
            serde_json::json!({ "habitId": habit_id, "date": date, "streak": streak }),
        )
    }

    pub fn habit_uncompleted(user_id: DbId, habit_id: DbId, date: &str) -> Self {
        Self::new(
            HabitEventKind::HabitUncompleted,
            user_id,
            serde_json::json!({ "habitId": habit_id, "date": date }),
        )
    }

    pub fn user_logged_out(user_id: DbId) -> Self {
        Self::new(
            HabitEventKind::UserLoggedOut,
            user_id,
            serde_json::json!({ "userId": user_id }),
        )
    }

    /// The payload with the event `timestamp` merged in (RFC 3339).
    ///
    /// Non-object payloads are wrapped as `{ "value": ..., "timestamp": ... }`.
    pub fn payload_with_timestamp(&self) -> serde_json::Value {
        let timestamp = serde_json::Value::String(self.timestamp.to_rfc3339());
        match &self.payload {
            serde_json::Value::Object(map) => {
                let mut map = map.clone();
                map.insert("timestamp".to_string(), timestamp);
                serde_json::Value::Object(map)
            }
            other => serde_json::json!({ "value": other, "timestamp": timestamp }),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`HabitEvent`].
///
/// ```rust
/// use habitual_events::bus::{EventBus, HabitEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(HabitEvent::habit_deleted(1, 42));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<HabitEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is silently dropped.
    pub fn publish(&self, event: HabitEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HabitEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
