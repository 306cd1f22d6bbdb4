//! Executor for `timer_control` actions.
//!
//! Commands are handed back to the dispatcher, which applies them to the
//! room timer. Invalid transitions are no-ops there, not errors here.

use async_trait::async_trait;

use roomrunner_domain::error::{ConfigurationError, ExecutionError};
use roomrunner_domain::trigger::Action;

use crate::executor::{ActionContext, ActionExecutor, ActionOutcome};

/// Requests a room timer transition.
pub struct TimerControlExecutor;

#[async_trait]
impl ActionExecutor for TimerControlExecutor {
    fn validate(&self, _action: &Action) -> Result<(), ConfigurationError> {
        // The command payload is fully typed; every shape that parses is
        // applicable (invalid transitions no-op at runtime).
        Ok(())
    }

    async fn execute(
        &self,
        action: &Action,
        _ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError> {
        let Action::TimerControl { command } = action else {
            return Ok(Vec::new());
        };
        Ok(vec![ActionOutcome::Timer(command.clone())])
    }
}
