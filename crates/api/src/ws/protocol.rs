//! JSON text frames exchanged over the socket: `{ "event": ..., "data": ... }`.

use axum::extract::ws::Message;
use chrono::Utc;
use habitual_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const CODE_COMPLETION: &str = "COMPLETION_ERROR";
pub const CODE_UNCOMPLETION: &str = "UNCOMPLETION_ERROR";

/// Events a client may send.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join:user-room")]
    JoinUserRoom(JoinUserRoom),
    #[serde(rename = "habit:complete")]
    Complete(CompleteHabit),
    #[serde(rename = "habit:uncomplete")]
    Uncomplete(UncompleteHabit),
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinUserRoom {
    pub user_id: DbId,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompleteHabit {
    pub habit_id: DbId,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UncompleteHabit {
    pub habit_id: DbId,
    pub date: String,
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A frame sent to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ServerFrame {
    pub event: String,
    pub data: serde_json::Value,
}

impl ServerFrame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>, code: &str) -> Self {
        Self::new(
            "error",
            json!({
                "message": message.into(),
                "code": code,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        )
    }

    pub fn joined(user_id: DbId) -> Self {
        Self::new(
            "joined:user-room",
            json!({ "userId": user_id, "timestamp": Utc::now().to_rfc3339() }),
        )
    }

    pub fn to_message(&self) -> Message {
        let text = serde_json::to_string(self).unwrap_or_default();
        Message::Text(text.into())
    }
}
