use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

mod app;
mod http;

use tempo_core::config::TempoConfig;
use tempo_engine::{HttpEffectHandler, Poller};
use tempo_store::{ScheduleStore, SqliteScheduleStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tempo_gateway=info,tempo_engine=info,tower_http=debug".into()
            }),
        )
        .init();

    // load config: explicit path > TEMPO_CONFIG env > ./tempo.toml
    let config_path = std::env::var("TEMPO_CONFIG").ok();
    let config = TempoConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        TempoConfig::default()
    });

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    // one connection per subsystem so the engine's polling queries never
    // contend with CRUD traffic on a shared handle
    let gateway_conn = rusqlite::Connection::open(&db_path)?;
    gateway_conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store: Arc<dyn ScheduleStore> = Arc::new(SqliteScheduleStore::new(gateway_conn)?);

    let engine_store: Arc<dyn ScheduleStore> =
        Arc::new(SqliteScheduleStore::new(rusqlite::Connection::open(&db_path)?)?);
    let effect_handler = Arc::new(HttpEffectHandler::new(&config.effect)?);
    let poller = Poller::new(&config.engine, engine_store, effect_handler);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(poller.run(shutdown_rx));

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let state = Arc::new(app::AppState::new(config, store));
    let router = app::build_router(state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    // stop the engine loop; in-flight units finish on the runtime
    let _ = shutdown_tx.send(true);
    let _ = engine_task.await;
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
