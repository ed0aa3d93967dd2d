use std::sync::Arc;

use habitual_db::DbPool;
use habitual_events::EventBus;

use crate::config::ServerConfig;
use crate::graphql::AnalyticsSchema;
use crate::ws::WsManager;

/// Handed to every handler through `State<AppState>`; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Open realtime sockets, keyed by user.
    pub ws_manager: Arc<WsManager>,
    /// Handlers publish habit and session events here.
    pub event_bus: Arc<EventBus>,
    pub graphql: AnalyticsSchema,
}
