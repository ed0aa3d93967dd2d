use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use habitual_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

pub struct WsConnection {
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Registry of open sockets, grouped by the authenticated user that owns
/// them (the "user room").
///
/// Constructed once at startup and shared as `Arc<WsManager>`.
pub struct WsManager {
    rooms: RwLock<HashMap<DbId, HashMap<String, WsConnection>>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection in `user_id`'s room.
    ///
    /// Returns the receiver the socket's sender task drains.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.rooms
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(conn_id, conn);
        rx
    }

    /// Drop a connection; empty rooms are removed.
    pub async fn remove(&self, conn_id: &str, user_id: DbId) {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get_mut(&user_id) {
            if let Some(conn) = room.remove(conn_id) {
                tracing::debug!(
                    conn_id,
                    user_id,
                    open_secs = (chrono::Utc::now() - conn.connected_at).num_seconds(),
                    "Connection removed from room",
                );
            }
            if room.is_empty() {
                rooms.remove(&user_id);
            }
        }
    }

    /// Send to every socket of one user. Returns how many were reached.
    ///
    /// Closed channels are skipped; their sockets clean up on their own.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let rooms = self.rooms.read().await;
        let Some(room) = rooms.get(&user_id) else {
            return 0;
        };
        room.values()
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    /// Send to a single connection.
    pub async fn send_to(&self, user_id: DbId, conn_id: &str, message: Message) -> bool {
        self.rooms
            .read()
            .await
            .get(&user_id)
            .and_then(|room| room.get(conn_id))
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    pub async fn connection_count(&self) -> usize {
        self.rooms.read().await.values().map(HashMap::len).sum()
    }

    pub async fn user_connection_count(&self, user_id: DbId) -> usize {
        self.rooms
            .read()
            .await
            .get(&user_id)
            .map_or(0, HashMap::len)
    }

    /// Send Close to every socket and forget them all.
    pub async fn shutdown_all(&self) {
        let mut rooms = self.rooms.write().await;
        let mut count = 0;
        for conn in rooms.values().flat_map(HashMap::values) {
            let _ = conn.sender.send(Message::Close(None));
            count += 1;
        }
        rooms.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    pub async fn ping_all(&self) {
        let rooms = self.rooms.read().await;
        for conn in rooms.values().flat_map(HashMap::values) {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(msg: &str) -> Message {
        Message::Text(msg.to_string().into())
    }

    #[tokio::test]
    async fn send_to_user_reaches_only_that_room() {
        let manager = WsManager::new();
        let mut a1 = manager.add("a1".into(), 1).await;
        let mut a2 = manager.add("a2".into(), 1).await;
        let mut b1 = manager.add("b1".into(), 2).await;

        assert_eq!(manager.send_to_user(1, text("hi")).await, 2);
        assert_eq!(a1.recv().await, Some(text("hi")));
        assert_eq!(a2.recv().await, Some(text("hi")));
        assert!(b1.try_recv().is_err());

        assert_eq!(manager.send_to_user(99, text("nobody")).await, 0);
    }

    #[tokio::test]
    async fn remove_drops_empty_rooms() {
        let manager = WsManager::new();
        let _rx1 = manager.add("c1".into(), 5).await;
        let _rx2 = manager.add("c2".into(), 5).await;
        assert_eq!(manager.user_connection_count(5).await, 2);

        manager.remove("c1", 5).await;
        assert_eq!(manager.user_connection_count(5).await, 1);
        manager.remove("c2", 5).await;
        assert_eq!(manager.connection_count().await, 0);

        // Removing an unknown connection is a no-op.
        manager.remove("c3", 5).await;
    }

    #[tokio::test]
    async fn send_to_targets_one_connection() {
        let manager = WsManager::new();
        let mut first = manager.add("first".into(), 1).await;
        let mut second = manager.add("second".into(), 1).await;

        assert!(manager.send_to(1, "second", text("only you")).await);
        assert_eq!(second.recv().await, Some(text("only you")));
        assert!(first.try_recv().is_err());
        assert!(!manager.send_to(1, "missing", text("lost")).await);
    }

    #[tokio::test]
    async fn shutdown_all_sends_close_and_clears() {
        let manager = WsManager::new();
        let mut rx = manager.add("x".into(), 1).await;

        manager.shutdown_all().await;

        assert_eq!(rx.recv().await, Some(Message::Close(None)));
        assert_eq!(manager.connection_count().await, 0);
    }
}
