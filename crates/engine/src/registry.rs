//! Trigger registry — ordered, load-time-validated trigger rules.
//!
//! The registry preserves definition order, which is also dispatch
//! order. Every trigger is vetted against the room's variables and the
//! executor registry when loaded; entries that could never fire
//! correctly are quarantined instead of admitted, so dispatch never has
//! to defend against malformed rules.

use roomrunner_domain::error::ConfigurationError;
use roomrunner_domain::id::TriggerId;
use roomrunner_domain::trigger::{Action, Trigger};

use crate::executor::ExecutorRegistry;
use crate::store::VariableStore;

/// A trigger rejected at load time, with the reason.
#[derive(Debug)]
pub struct QuarantinedTrigger {
    pub id: TriggerId,
    pub name: String,
    pub error: ConfigurationError,
}

/// Ordered collection of vetted triggers for one room.
#[derive(Default)]
pub struct TriggerRegistry {
    triggers: Vec<Trigger>,
}

impl TriggerRegistry {
    /// Load triggers in definition order, quarantining malformed entries.
    #[must_use]
    pub fn load(
        triggers: Vec<Trigger>,
        store: &VariableStore,
        executors: &ExecutorRegistry,
    ) -> (Self, Vec<QuarantinedTrigger>) {
        let mut admitted = Vec::with_capacity(triggers.len());
        let mut quarantined = Vec::new();

        for trigger in triggers {
            match vet(&trigger, store, executors) {
                Ok(()) => admitted.push(trigger),
                Err(error) => quarantined.push(QuarantinedTrigger {
                    id: trigger.id,
                    name: trigger.name,
                    error,
                }),
            }
        }

        (Self { triggers: admitted }, quarantined)
    }

    /// Enabled triggers watching `variable`, in definition order.
    pub fn matching<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a Trigger> {
        self.triggers
            .iter()
            .filter(move |t| t.enabled && t.watched_variable == variable)
    }

    /// Every admitted trigger, in definition order.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// Full load-time validation of one trigger.
fn vet(
    trigger: &Trigger,
    store: &VariableStore,
    executors: &ExecutorRegistry,
) -> Result<(), ConfigurationError> {
    trigger
        .validate()
        .map_err(|err| ConfigurationError::MalformedTrigger {
            detail: err.to_string(),
        })?;

    let Some(watched) = store.get(&trigger.watched_variable) else {
        return Err(ConfigurationError::UnknownVariable {
            variable: trigger.watched_variable.clone(),
        });
    };
    trigger.condition.validate_for(watched.var_type)?;

    for action in &trigger.actions {
        executors.validate(action)?;
        // Ownership check: triggers may only write existing custom
        // variables, never system variables.
        if let Action::SetVariable { variable, .. } = action {
            match store.get(variable) {
                None => {
                    return Err(ConfigurationError::UnknownVariable {
                        variable: variable.clone(),
                    });
                }
                Some(target) if target.system => {
                    return Err(ConfigurationError::ReadOnlyTarget {
                        variable: variable.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}
