//! Shared application state for axum handlers.

use std::sync::Arc;

use roomrunner_engine::manager::RoomManager;
use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

/// Application state shared across all axum handlers.
///
/// Generic over the config store and event publisher to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` is cloned.
pub struct AppState<CS, P> {
    /// Room lifecycle and write routing.
    pub manager: Arc<RoomManager<CS, P>>,
}

impl<CS, P> Clone for AppState<CS, P> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<CS, P> AppState<CS, P>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    /// Create a new application state around a shared room manager.
    pub fn new(manager: Arc<RoomManager<CS, P>>) -> Self {
        Self { manager }
    }
}
