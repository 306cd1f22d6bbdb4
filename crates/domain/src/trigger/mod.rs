//! Trigger — watched-variable + condition + ordered action-list rules.
//!
//! Triggers let a room react to variable changes without operator
//! intervention. Each trigger watches exactly one variable, carries a
//! [`Condition`] evaluated against the new value, and one or more
//! [`Action`]s executed in array order when the condition holds.

mod action;
mod condition;

pub use action::{Action, ActionKind};
pub use condition::{Condition, Operator};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::TriggerId;

/// A rule that reacts to variable changes by executing actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default)]
    pub id: TriggerId,
    pub name: String,
    pub watched_variable: String,
    pub condition: Condition,
    pub actions: Vec<Action>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Trigger {
    /// Create a builder for constructing a [`Trigger`].
    #[must_use]
    pub fn builder() -> TriggerBuilder {
        TriggerBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when:
    /// - `name` or `watched_variable` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.watched_variable.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions);
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Trigger`].
#[derive(Debug, Default)]
pub struct TriggerBuilder {
    id: Option<TriggerId>,
    name: Option<String>,
    watched_variable: Option<String>,
    condition: Option<Condition>,
    actions: Vec<Action>,
    enabled: Option<bool>,
}

impl TriggerBuilder {
    #[must_use]
    pub fn id(mut self, id: TriggerId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn watched_variable(mut self, variable: impl Into<String>) -> Self {
        self.watched_variable = Some(variable.into());
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Consume the builder, validate, and return a [`Trigger`].
    ///
    /// The condition defaults to [`Operator::Changed`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if required fields are missing or empty.
    pub fn build(self) -> Result<Trigger, ValidationError> {
        let trigger = Trigger {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            watched_variable: self.watched_variable.unwrap_or_default(),
            condition: self.condition.unwrap_or(Condition {
                operator: Operator::Changed,
                comparand: serde_json::Value::Null,
            }),
            actions: self.actions,
            enabled: self.enabled.unwrap_or(true),
        };
        trigger.validate()?;
        Ok(trigger)
    }
}
