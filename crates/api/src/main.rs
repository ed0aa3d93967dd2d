use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use habitual_api::config::ServerConfig;
use habitual_api::notifications::NotificationRouter;
use habitual_api::router::build_app_router;
use habitual_api::state::AppState;
use habitual_api::ws::{start_heartbeat, WsManager};
use habitual_api::{error, graphql};
use habitual_events::EventBus;

const DEFAULT_LOG_FILTER: &str = "habitual_api=debug,habitual_db=info,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    error::expose_internal_detail(!config.environment.is_production());
    tracing::info!(
        host = %config.host,
        port = config.port,
        environment = ?config.environment,
        "Configuration loaded"
    );

    let pool = connect_database().await;

    let ws_manager = Arc::new(WsManager::new());
    let heartbeat = start_heartbeat(Arc::clone(&ws_manager));

    let event_bus = Arc::new(EventBus::default());
    let mut notifications =
        tokio::spawn(NotificationRouter::new(Arc::clone(&ws_manager)).run(event_bus.subscribe()));

    let state = AppState {
        graphql: graphql::build_schema(pool.clone()),
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };

    let ip: IpAddr = config
        .host
        .parse()
        .unwrap_or_else(|e| panic!("HOST '{}' is not an IP address: {e}", config.host));
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, build_app_router(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!(
        open_sockets = ws_manager.connection_count().await,
        "Listener closed, draining realtime connections"
    );
    ws_manager.shutdown_all().await;

    // The router loop ends once the last bus handle is dropped; socket
    // tasks holding state clones are gone after shutdown_all.
    drop(event_bus);
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    stop_task("notification router", &mut notifications, grace).await;
    heartbeat.abort();

    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Pool, connectivity probe and migrations. Any failure aborts startup.
async fn connect_database() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = habitual_db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    habitual_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    habitual_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready, migrations applied");
    pool
}

/// Wait up to `grace` for a background task, then abort it.
async fn stop_task(name: &str, handle: &mut JoinHandle<()>, grace: Duration) {
    if tokio::time::timeout(grace, &mut *handle).await.is_err() {
        tracing::warn!(task = name, "Task did not stop in time, aborting");
        handle.abort();
    }
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
