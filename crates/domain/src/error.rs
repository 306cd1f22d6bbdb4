//! Common error types used across the workspace.
//!
//! Each failure class gets its own typed enum; [`EngineError`] is the
//! workspace-wide umbrella that layers convert into via `#[from]`.

use crate::trigger::{ActionKind, Operator};
use crate::variable::VarType;

/// Top-level error for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A value did not fit a variable's declared type, or a domain
    /// invariant was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A trigger or action definition is malformed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// An action's side effect failed after retries.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A referenced room or resource does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Persistence of room configuration failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A value does not satisfy a variable's declared type or a domain invariant.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A name field was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A trigger was defined without any actions.
    #[error("trigger must have at least one action")]
    NoActions,

    /// A variable with this name already exists in the room.
    #[error("variable `{name}` already exists")]
    DuplicateVariable { name: String },

    /// The named variable does not exist in the room.
    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    /// The variable is a system variable and cannot be written through
    /// this path.
    #[error("variable `{name}` is read-only")]
    ReadOnlyVariable { name: String },

    /// The raw value cannot be coerced into the declared type.
    #[error("value {value} is not coercible to {expected}")]
    NotCoercible {
        expected: VarType,
        value: serde_json::Value,
    },

    /// A variable's stored value does not match its declared type.
    #[error("declared type {expected} does not match value of type {actual}")]
    TypeMismatch { expected: VarType, actual: VarType },
}

/// A persisted trigger or action definition is malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A variable entry in a room configuration failed to deserialize.
    #[error("malformed variable definition: {detail}")]
    MalformedVariable { detail: String },

    /// A trigger entry in a room configuration failed to deserialize or
    /// violated a structural invariant.
    #[error("malformed trigger definition: {detail}")]
    MalformedTrigger { detail: String },

    /// The operator cannot apply to variables of this type.
    #[error("operator {operator} cannot apply to {var_type} variables")]
    InvalidOperator {
        operator: Operator,
        var_type: VarType,
    },

    /// The comparand cannot be coerced into the watched variable's type.
    #[error("comparand {comparand} is not coercible to {var_type}")]
    IncoercibleComparand {
        var_type: VarType,
        comparand: serde_json::Value,
    },

    /// A trigger references a variable that does not exist in the room.
    #[error("unknown variable `{variable}`")]
    UnknownVariable { variable: String },

    /// A `set_variable` action targets a variable that triggers may not
    /// write.
    #[error("variable `{variable}` cannot be written by triggers")]
    ReadOnlyTarget { variable: String },

    /// No executor is registered for this action type.
    #[error("no executor registered for `{kind}` actions")]
    UnregisteredAction { kind: ActionKind },

    /// An action's type-specific configuration is invalid.
    #[error("invalid `{kind}` configuration: {detail}")]
    InvalidActionConfig { kind: ActionKind, detail: String },
}

/// An action's side effect failed.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The webhook endpoint could not be reached, or the call timed out.
    #[error("webhook {url} failed: {reason}")]
    WebhookFailed { url: String, reason: String },

    /// The webhook endpoint answered with a non-success status.
    #[error("webhook {url} returned status {status}")]
    WebhookStatus { url: String, status: u16 },
}

/// A referenced resource does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Human-readable kind, e.g. `"Room"`.
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}

/// Persistence failure while reading or writing room configuration.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("room configuration io failed")]
    Io(#[from] std::io::Error),

    /// (De)serialization failure.
    #[error("room configuration is not valid json")]
    Serde(#[from] serde_json::Error),
}
