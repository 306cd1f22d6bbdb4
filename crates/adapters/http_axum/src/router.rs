//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the API under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<CS, P>(state: AppState<CS, P>) -> Router
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
