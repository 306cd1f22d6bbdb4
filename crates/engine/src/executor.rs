//! Action executors — pluggable per-action-type behavior.
//!
//! Each action type is an independently registered [`ActionExecutor`].
//! The dispatcher looks executors up by [`ActionKind`] and applies the
//! [`ActionOutcome`]s they return; it never branches on action type tags
//! itself, so adding an action type means registering one new executor.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use roomrunner_domain::error::{ConfigurationError, ExecutionError};
use roomrunner_domain::event::Effect;
use roomrunner_domain::id::RoomId;
use roomrunner_domain::timer::TimerCommand;
use roomrunner_domain::trigger::{Action, ActionKind};

use crate::executors::broadcast::{PlaySoundExecutor, ShowMediaExecutor, ShowMessageExecutor};
use crate::executors::send_webhook::SendWebhookExecutor;
use crate::executors::set_variable::SetVariableExecutor;
use crate::executors::timer_control::TimerControlExecutor;
use crate::ports::WebhookTransport;

/// Per-dispatch context handed to executors.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    pub room_id: RoomId,
    /// Cascade depth of the event that fired the owning trigger.
    pub depth: u8,
}

/// What an executed action asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Publish a fire-and-forget effect for display clients.
    Broadcast(Effect),
    /// Write a variable, re-entering the dispatch cascade.
    Write {
        variable: String,
        value: serde_json::Value,
    },
    /// Apply a command to the room timer.
    Timer(TimerCommand),
}

/// One action type's validate/execute behavior.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Check an action's type-specific configuration at load time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for configs that could never
    /// execute successfully.
    fn validate(&self, action: &Action) -> Result<(), ConfigurationError>;

    /// Execute the action, returning the outcomes for the dispatcher to
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the side effect failed after any
    /// retries. Errors never abort sibling actions.
    async fn execute(
        &self,
        action: &Action,
        ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError>;
}

/// Map from action type tag to its executor.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<ActionKind, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in executor registered.
    #[must_use]
    pub fn standard(webhook: Arc<dyn WebhookTransport>) -> Self {
        let mut registry = Self::new();
        registry.register(ActionKind::PlaySound, Arc::new(PlaySoundExecutor));
        registry.register(ActionKind::ShowMedia, Arc::new(ShowMediaExecutor));
        registry.register(ActionKind::ShowMessage, Arc::new(ShowMessageExecutor));
        registry.register(ActionKind::SetVariable, Arc::new(SetVariableExecutor));
        registry.register(ActionKind::TimerControl, Arc::new(TimerControlExecutor));
        registry.register(
            ActionKind::SendWebhook,
            Arc::new(SendWebhookExecutor::new(webhook)),
        );
        registry
    }

    /// Register (or replace) the executor for an action type.
    pub fn register(&mut self, kind: ActionKind, executor: Arc<dyn ActionExecutor>) {
        self.executors.insert(kind, executor);
    }

    /// Look up the executor for an action type.
    #[must_use]
    pub fn get(&self, kind: ActionKind) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(&kind).cloned()
    }

    /// Validate an action against its registered executor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnregisteredAction`] when no
    /// executor handles the action's type, or the executor's own
    /// validation error.
    pub fn validate(&self, action: &Action) -> Result<(), ConfigurationError> {
        let kind = action.kind();
        let executor = self
            .executors
            .get(&kind)
            .ok_or(ConfigurationError::UnregisteredAction { kind })?;
        executor.validate(action)
    }
}
