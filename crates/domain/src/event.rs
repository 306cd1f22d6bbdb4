//! Events — immutable records of what happened inside a room.
//!
//! A [`ChangeEvent`] is produced for every accepted variable write. The
//! engine publishes them, together with broadcast [`Effect`]s and
//! [`Diagnostic`]s, as [`RoomEvent`]s on the room event bus.

use serde::{Deserialize, Serialize};

use crate::id::{RoomId, TriggerId};
use crate::time::Timestamp;
use crate::trigger::ActionKind;
use crate::variable::VarValue;

/// Who caused a variable write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOrigin {
    /// The operator console.
    Operator,
    /// The puzzle-facing HTTP API.
    Api,
    /// A `set_variable` action inside a dispatch cascade.
    Trigger,
    /// The room timer subsystem.
    Timer,
}

impl std::fmt::Display for WriteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Operator => "operator",
            Self::Api => "api",
            Self::Trigger => "trigger",
            Self::Timer => "timer",
        };
        f.write_str(name)
    }
}

/// An accepted variable write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub room_id: RoomId,
    pub variable_name: String,
    pub old_value: VarValue,
    pub new_value: VarValue,
    pub caused_by: WriteOrigin,
    /// Cascade counter; `0` for externally caused writes.
    pub depth: u8,
    pub at: Timestamp,
}

/// A broadcast effect delivered to connected display clients.
///
/// Fire-and-forget: having no connected recipient is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    PlaySound {
        sound: String,
        volume: Option<f32>,
    },
    ShowMedia {
        media: String,
        duration_secs: Option<u64>,
    },
    ShowMessage {
        message: String,
        duration_secs: Option<u64>,
    },
}

/// A diagnostic surfaced to the observability sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The cascade depth guard tripped; the offending event was dropped.
    CascadeLimitExceeded {
        room_id: RoomId,
        variable_name: String,
        depth: u8,
    },
    /// A trigger or action definition was malformed and quarantined.
    Configuration {
        room_id: RoomId,
        trigger_id: Option<TriggerId>,
        message: String,
    },
    /// An action's side effect failed at runtime.
    Execution {
        room_id: RoomId,
        trigger_id: TriggerId,
        action: ActionKind,
        message: String,
    },
}

/// Everything a room publishes on its event bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RoomEvent {
    /// A variable's value changed.
    VariableChanged(ChangeEvent),
    /// An enabled trigger's condition matched and its actions ran.
    TriggerFired {
        room_id: RoomId,
        trigger_id: TriggerId,
        trigger_name: String,
    },
    /// A broadcast effect for display clients.
    Effect { room_id: RoomId, effect: Effect },
    /// A diagnostic for the observability sink.
    Diagnostic(Diagnostic),
}
