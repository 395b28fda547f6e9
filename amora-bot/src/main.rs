use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use amora_shared::clients::transport::{ChatTransport, HttpTransport};

mod config;
mod handlers;
mod matching;
mod models;
mod notify;
mod routes;
mod sessions;
mod storage;
#[cfg(test)]
mod testutil;

use config::AppConfig;
use sessions::SessionStore;
use storage::{MemoryStore, ProfileStore, ReasonStore, ReportStore};

pub struct AppState {
    pub config: AppConfig,
    pub profiles: Arc<dyn ProfileStore>,
    pub reports: Arc<dyn ReportStore>,
    pub reasons: Arc<dyn ReasonStore>,
    pub sessions: SessionStore,
    pub transport: Arc<dyn ChatTransport>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-bot");

    let config = AppConfig::load()?;
    let port = config.port;

    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(HttpTransport::new(&config.transport_api_url));

    let state = Arc::new(AppState {
        config,
        profiles: store.clone(),
        reports: store.clone(),
        reasons: store,
        sessions: SessionStore::new(),
        transport,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/webhook", post(routes::webhook::receive_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-bot starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
