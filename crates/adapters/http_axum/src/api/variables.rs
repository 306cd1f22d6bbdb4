//! JSON REST handlers for room variables.
//!
//! The write endpoint is the puzzle-facing API: writes carry
//! [`WriteOrigin::Api`] and run the full dispatch pass before the
//! response is produced, so a `ValidationError` comes back synchronously
//! as a 400.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use roomrunner_domain::error::NotFoundError;
use roomrunner_domain::event::WriteOrigin;
use roomrunner_domain::variable::Variable;
use roomrunner_engine::ports::{EventPublisher, RoomConfigStore};

use crate::api::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for writing a variable.
#[derive(Deserialize)]
pub struct SetVariableRequest {
    pub value: serde_json::Value,
}

/// `GET /api/rooms/:id/variables`
pub async fn list<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Variable>>, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    let variables = state.manager.variables(room_id)?;
    Ok(Json(variables))
}

/// `POST /api/rooms/:id/variables`
pub async fn create<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path(id): Path<String>,
    Json(variable): Json<Variable>,
) -> Result<StatusCode, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    state.manager.engine(room_id)?.create_variable(variable)?;
    Ok(StatusCode::CREATED)
}

/// `POST /api/rooms/:id/variables/:name`
pub async fn set<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path((id, name)): Path<(String, String)>,
    Json(req): Json<SetVariableRequest>,
) -> Result<Json<Variable>, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    state
        .manager
        .write(room_id, &name, &req.value, WriteOrigin::Api)
        .await?;
    let variable = state
        .manager
        .engine(room_id)?
        .variable(&name)
        .ok_or_else(|| {
            ApiError::from(roomrunner_domain::error::EngineError::NotFound(
                NotFoundError {
                    entity: "Variable",
                    id: name.clone(),
                },
            ))
        })?;
    Ok(Json(variable))
}

/// `DELETE /api/rooms/:id/variables/:name`
pub async fn delete<CS, P>(
    State(state): State<AppState<CS, P>>,
    Path((id, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    CS: RoomConfigStore + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let room_id = parse_room_id(&id)?;
    state.manager.engine(room_id)?.remove_variable(&name)?;
    Ok(StatusCode::NO_CONTENT)
}
