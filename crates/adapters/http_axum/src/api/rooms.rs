//! JSON REST handlers for room lifecycle.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use roomrunner_domain::room::RoomConfig;
use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

use crate::api::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/rooms`
pub async fn list<CS, P>(
    State(state): State<AppState<CS, P>>,
) -> Result<Json<Vec<RoomConfig>>, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let rooms = state.manager.list_rooms().await?;
    Ok(Json(rooms))
}

/// `POST /api/rooms/:id/activate`
pub async fn activate<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    state.manager.activate_room(room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/rooms/:id/deactivate`
pub async fn deactivate<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    state.manager.deactivate_room(room_id)?;
    Ok(StatusCode::NO_CONTENT)
}
