use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

/// How often every open socket is pinged.
pub const PING_PERIOD: Duration = Duration::from_secs(30);

/// Ping all sockets every [`PING_PERIOD`] until the handle is aborted.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PING_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let open = ws_manager.connection_count().await;
            if open == 0 {
                continue;
            }
            tracing::trace!(open, "Heartbeat ping");
            ws_manager.ping_all().await;
        }
    })
}
