//! Variable store — the single source of truth for one room's state.
//!
//! All writes funnel through [`VariableStore::set`], which coerces the
//! raw value against the variable's declared type, deduplicates writes
//! that don't change the value, bumps the version, and emits exactly one
//! [`ChangeEvent`] per accepted change. The interior mutex only guards
//! map access; whole-pass write ordering is enforced one level up by the
//! room engine's write lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use roomrunner_domain::error::ValidationError;
use roomrunner_domain::event::{ChangeEvent, WriteOrigin};
use roomrunner_domain::id::RoomId;
use roomrunner_domain::time::now;
use roomrunner_domain::timer::{TIMER_REMAINING, TIMER_STATE};
use roomrunner_domain::variable::{VarType, VarValue, Variable};

/// Typed, versioned variable map for one room.
pub struct VariableStore {
    room_id: RoomId,
    vars: Mutex<HashMap<String, Variable>>,
}

impl VariableStore {
    /// Create a store pre-seeded with the room's system variables.
    #[must_use]
    pub fn new(room_id: RoomId) -> Self {
        let mut vars = HashMap::new();
        for variable in system_variables() {
            vars.insert(variable.name.clone(), variable);
        }
        Self {
            room_id,
            vars: Mutex::new(vars),
        }
    }

    /// The room this store belongs to.
    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Look up a variable by name, returning a cloned snapshot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Variable> {
        self.lock().get(name).cloned()
    }

    /// Snapshot of every variable, sorted by name for stable output.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Variable> {
        let mut all: Vec<Variable> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Register a new custom variable.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the variable fails its own
    /// invariants, claims the `system` flag, or the name is taken.
    pub fn insert(&self, variable: Variable) -> Result<(), ValidationError> {
        variable.validate()?;
        if variable.system {
            return Err(ValidationError::ReadOnlyVariable {
                name: variable.name,
            });
        }
        let mut vars = self.lock();
        if vars.contains_key(&variable.name) {
            return Err(ValidationError::DuplicateVariable {
                name: variable.name,
            });
        }
        vars.insert(variable.name.clone(), variable);
        Ok(())
    }

    /// Remove a custom variable.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownVariable`] when no such variable
    /// exists, or [`ValidationError::ReadOnlyVariable`] for system
    /// variables.
    pub fn remove(&self, name: &str) -> Result<(), ValidationError> {
        let mut vars = self.lock();
        let Some(variable) = vars.get(name) else {
            return Err(ValidationError::UnknownVariable {
                name: name.to_string(),
            });
        };
        if variable.system {
            return Err(ValidationError::ReadOnlyVariable {
                name: name.to_string(),
            });
        }
        vars.remove(name);
        Ok(())
    }

    /// Write a variable.
    ///
    /// The raw value is coerced against the declared type. A write that
    /// leaves the value unchanged is a no-op returning `Ok(None)`;
    /// otherwise the version is bumped and exactly one [`ChangeEvent`]
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownVariable`] for names that don't
    /// exist, [`ValidationError::ReadOnlyVariable`] when anything but the
    /// timer subsystem writes a system variable, or
    /// [`ValidationError::NotCoercible`] when the value does not fit the
    /// declared type.
    pub fn set(
        &self,
        name: &str,
        raw: &serde_json::Value,
        caused_by: WriteOrigin,
        depth: u8,
    ) -> Result<Option<ChangeEvent>, ValidationError> {
        let mut vars = self.lock();
        let Some(variable) = vars.get_mut(name) else {
            return Err(ValidationError::UnknownVariable {
                name: name.to_string(),
            });
        };
        if variable.system && caused_by != WriteOrigin::Timer {
            return Err(ValidationError::ReadOnlyVariable {
                name: name.to_string(),
            });
        }

        let coerced = VarValue::coerce(raw, variable.var_type)?;
        if coerced == variable.value {
            return Ok(None);
        }

        let old_value = std::mem::replace(&mut variable.value, coerced.clone());
        variable.version += 1;

        Ok(Some(ChangeEvent {
            room_id: self.room_id,
            variable_name: name.to_string(),
            old_value,
            new_value: coerced,
            caused_by,
            depth,
            at: now(),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Variable>> {
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The read-only variables every room starts with.
fn system_variables() -> Vec<Variable> {
    vec![
        Variable {
            name: TIMER_STATE.to_string(),
            var_type: VarType::String,
            value: VarValue::String("stopped".to_string()),
            system: true,
            version: 0,
        },
        Variable {
            name: TIMER_REMAINING.to_string(),
            var_type: VarType::Number,
            value: VarValue::Number(0.0),
            system: true,
            version: 0,
        },
    ]
}
