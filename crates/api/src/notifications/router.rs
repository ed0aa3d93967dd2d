use std::sync::Arc;

use habitual_events::HabitEvent;
use tokio::sync::broadcast;

use crate::ws::protocol::ServerFrame;
use crate::ws::WsManager;

/// Forwards [`HabitEvent`]s to the owning user's open sockets.
///
/// Delivery is best-effort: a user with no open sockets simply gets nothing.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<HabitEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.deliver(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Push one event to its user's room. Returns the number of sockets reached.
    pub async fn deliver(&self, event: &HabitEvent) -> usize {
        let frame = ServerFrame::new(event.kind.name(), event.payload_with_timestamp());
        let delivered = self
            .ws_manager
            .send_to_user(event.user_id, frame.to_message())
            .await;
        tracing::debug!(
            event = event.kind.name(),
            user_id = event.user_id,
            delivered,
            "Routed habit event"
        );
        delivered
    }
}
