//! JSON REST handlers for trigger persistence (editor write-back).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use roomrunner_domain::trigger::Trigger;
use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

use crate::api::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/rooms/:id/triggers`
pub async fn list<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Trigger>>, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    let triggers = state.manager.triggers(room_id).await?;
    Ok(Json(triggers))
}

/// `PUT /api/rooms/:id/triggers`
pub async fn update<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
    Json(triggers): Json<Vec<Trigger>>,
) -> Result<StatusCode, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    state.manager.update_triggers(room_id, triggers).await?;
    Ok(StatusCode::NO_CONTENT)
}
