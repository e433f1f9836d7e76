use portal_session::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    routes::RouteTable,
    session::{SessionManager, SessionManagerState},
    storage::{FileSessionStore, SessionStoreState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Composition root: configuration, logging, the session store and manager, the
/// route table, then the HTTP shell.
#[tokio::main]
async fn main() {
    // 1. Configuration
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging. RUST_LOG wins over the defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_session=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal shell starting in {:?} mode", config.env);

    // 3. Session store and manager. One manager for the whole process.
    let store = Arc::new(FileSessionStore::new(config.session_dir.clone())) as SessionStoreState;
    let sessions: SessionManagerState =
        Arc::new(SessionManager::with_key(store, config.session_key.clone()));

    tracing::info!(dir = ?config.session_dir, key = %config.session_key, "Session store ready");

    // 4. Route table. An overlapping table is a build defect, so refuse to start.
    let routes = Arc::new(
        RouteTable::standard().expect("FATAL: Route table is misconfigured (overlapping trees)."),
    );

    let app_state = AppState {
        sessions: sessions.clone(),
        routes,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: Failed to bind PORTAL_BIND_ADDR.");

    tracing::info!("Listening on {}", config.bind_addr);

    // 5. Restore the persisted session in the background. Until it finishes,
    // every gate defers and navigations answer with a placeholder.
    tokio::spawn(async move {
        let state = sessions.initialize().await;
        tracing::info!(
            authenticated = state.is_authenticated,
            "Session initialization complete"
        );
    });

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
