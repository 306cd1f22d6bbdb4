//! Room configuration — the persisted JSON document a room is activated
//! from.
//!
//! The external editor writes these documents; the engine only reads
//! them at activation and writes them back when an operator edits
//! triggers. Parsing is lenient on purpose: a single malformed variable
//! or trigger entry is quarantined with a [`ConfigurationError`] instead
//! of rejecting the whole room.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::id::RoomId;
use crate::trigger::Trigger;
use crate::variable::Variable;

/// Persisted configuration for one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl RoomConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            variables: Vec::new(),
            triggers: Vec::new(),
        }
    }

    /// Parse a raw JSON document, quarantining malformed entries.
    ///
    /// Each variable and trigger entry is deserialized individually;
    /// entries that fail schema validation are dropped and reported as
    /// [`ConfigurationError`]s so one bad editor export never takes a
    /// room offline.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] only when the
    /// document's envelope (`id`, `name`) is itself unreadable.
    pub fn parse(
        value: serde_json::Value,
    ) -> Result<(Self, Vec<ConfigurationError>), serde_json::Error> {
        #[derive(Deserialize)]
        struct RawRoomConfig {
            id: RoomId,
            name: String,
            #[serde(default)]
            variables: Vec<serde_json::Value>,
            #[serde(default)]
            triggers: Vec<serde_json::Value>,
        }

        let raw: RawRoomConfig = serde_json::from_value(value)?;
        let mut quarantined = Vec::new();

        let mut variables = Vec::with_capacity(raw.variables.len());
        for entry in raw.variables {
            match serde_json::from_value::<Variable>(entry)
                .map_err(|err| err.to_string())
                .and_then(|var| {
                    var.validate().map_err(|err| err.to_string())?;
                    Ok(var)
                }) {
                Ok(variable) => variables.push(variable),
                Err(detail) => {
                    quarantined.push(ConfigurationError::MalformedVariable { detail });
                }
            }
        }

        let mut triggers = Vec::with_capacity(raw.triggers.len());
        for entry in raw.triggers {
            match serde_json::from_value::<Trigger>(entry)
                .map_err(|err| err.to_string())
                .and_then(|trigger| {
                    trigger.validate().map_err(|err| err.to_string())?;
                    Ok(trigger)
                }) {
                Ok(trigger) => triggers.push(trigger),
                Err(detail) => {
                    quarantined.push(ConfigurationError::MalformedTrigger { detail });
                }
            }
        }

        Ok((
            Self {
                id: raw.id,
                name: raw.name,
                variables,
                triggers,
            },
            quarantined,
        ))
    }
}
