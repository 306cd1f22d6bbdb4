//! # roomrunnerd — roomrunner daemon
//!
//! Composition root that wires all adapters together and starts the
//! server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the room configuration store, webhook transport, and
//!   executor registry (adapters)
//! - Construct the room manager, injecting adapters via port traits
//! - Drive the 1-second timer tick across all active rooms
//! - Drain the room event bus into the log (observability sink)
//! - Build the axum router, bind to a TCP port, and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use roomrunner_adapter_config_json::JsonRoomConfigStore;
use roomrunner_adapter_http_axum::router;
use roomrunner_adapter_http_axum::state::AppState;
use roomrunner_adapter_webhook_reqwest::ReqwestWebhookTransport;
use roomrunner_engine::event_bus::InProcessEventBus;
use roomrunner_engine::executor::ExecutorRegistry;
use roomrunner_engine::manager::RoomManager;
use roomrunner_engine::ports::WebhookTransport;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Event bus + observability sink
    let bus = Arc::new(InProcessEventBus::new(256));
    let mut sink = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = sink.recv().await {
            tracing::debug!(event = ?event, "room event");
        }
    });

    // Adapters
    let transport: Arc<dyn WebhookTransport> = Arc::new(ReqwestWebhookTransport::new());
    let executors = Arc::new(ExecutorRegistry::standard(transport));
    let config_store = JsonRoomConfigStore::new(config.rooms.dir.clone());

    // Room manager + timer tick
    let manager = Arc::new(RoomManager::new(config_store, executors, Arc::clone(&bus)));
    {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                manager.tick_all().await;
            }
        });
    }

    // HTTP
    let state = AppState::new(manager);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(addr = %bind_addr, "roomrunnerd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
}
