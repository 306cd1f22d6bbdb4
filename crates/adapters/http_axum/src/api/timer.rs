//! JSON REST handler for the room timer.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use roomrunner_domain::timer::TimerCommand;
use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

use crate::api::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Response for a timer command.
#[derive(Serialize)]
pub struct TimerResponse {
    /// Whether the command changed the timer. Invalid transitions are
    /// no-ops, not errors.
    pub changed: bool,
}

/// `POST /api/rooms/:id/timer`
pub async fn apply<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
    Json(command): Json<TimerCommand>,
) -> Result<Json<TimerResponse>, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    let changed = state.manager.apply_timer_command(room_id, &command).await?;
    Ok(Json(TimerResponse { changed }))
}
