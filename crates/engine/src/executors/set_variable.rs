//! Executor for `set_variable` actions.
//!
//! The executor itself only shapes the write request; the dispatcher
//! applies it through the variable store so the resulting change event
//! re-enters the cascade depth-first with `depth + 1`.

use async_trait::async_trait;

use roomrunner_domain::error::{ConfigurationError, ExecutionError};
use roomrunner_domain::trigger::{Action, ActionKind};

use crate::executor::{ActionContext, ActionExecutor, ActionOutcome};

/// Requests a cascading variable write.
pub struct SetVariableExecutor;

#[async_trait]
impl ActionExecutor for SetVariableExecutor {
    fn validate(&self, action: &Action) -> Result<(), ConfigurationError> {
        if let Action::SetVariable { variable, .. } = action {
            if variable.is_empty() {
                return Err(ConfigurationError::InvalidActionConfig {
                    kind: ActionKind::SetVariable,
                    detail: "target variable name is empty".to_string(),
                });
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        action: &Action,
        _ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError> {
        let Action::SetVariable { variable, value } = action else {
            return Ok(Vec::new());
        };
        Ok(vec![ActionOutcome::Write {
            variable: variable.clone(),
            value: value.clone(),
        }])
    }
}
