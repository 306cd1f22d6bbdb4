//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod rooms;
#[allow(clippy::missing_errors_doc)]
pub mod timer;
#[allow(clippy::missing_errors_doc)]
pub mod triggers;
#[allow(clippy::missing_errors_doc)]
pub mod variables;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};

use roomrunner_domain::error::NotFoundError;
use roomrunner_domain::id::RoomId;
use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<CS, P>() -> Router<AppState<CS, P>>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    Router::new()
        // Rooms
        .route("/rooms", get(rooms::list::<CS, P>))
        .route("/rooms/{id}/activate", post(rooms::activate::<CS, P>))
        .route("/rooms/{id}/deactivate", post(rooms::deactivate::<CS, P>))
        // Variables
        .route(
            "/rooms/{id}/variables",
            get(variables::list::<CS, P>).post(variables::create::<CS, P>),
        )
        .route(
            "/rooms/{id}/variables/{name}",
            post(variables::set::<CS, P>).delete(variables::delete::<CS, P>),
        )
        // Triggers
        .route(
            "/rooms/{id}/triggers",
            get(triggers::list::<CS, P>).put(triggers::update::<CS, P>),
        )
        // Timer
        .route("/rooms/{id}/timer", post(timer::apply::<CS, P>))
}

/// Parse a room id path segment; an unparseable id can never name a room.
pub(crate) fn parse_room_id(raw: &str) -> Result<RoomId, ApiError> {
    RoomId::from_str(raw).map_err(|_| {
        ApiError::from(roomrunner_domain::error::EngineError::NotFound(
            NotFoundError {
                entity: "Room",
                id: raw.to_string(),
            },
        ))
    })
}
