//! Variable — a named, typed piece of room state.
//!
//! Variables are the single source of truth a room's triggers react to.
//! Each carries a declared [`VarType`], a current [`VarValue`], and a
//! monotonic `version` bumped on every accepted write. System variables
//! (the room timer's state and remaining seconds) are maintained by the
//! timer subsystem and are read-only for every other write path.

mod value;

pub use value::{VarType, VarValue};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A named, typed piece of room state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
    pub value: VarValue,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub version: u64,
}

impl Variable {
    /// Create a builder for constructing a [`Variable`].
    #[must_use]
    pub fn builder() -> VariableBuilder {
        VariableBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is empty, or
    /// [`ValidationError::TypeMismatch`] when the stored value does not
    /// inhabit the declared type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.value.var_type() != self.var_type {
            return Err(ValidationError::TypeMismatch {
                expected: self.var_type,
                actual: self.value.var_type(),
            });
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Variable`].
#[derive(Debug, Default)]
pub struct VariableBuilder {
    name: Option<String>,
    var_type: Option<VarType>,
    value: Option<VarValue>,
    system: bool,
}

impl VariableBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn var_type(mut self, var_type: VarType) -> Self {
        self.var_type = Some(var_type);
        self
    }

    #[must_use]
    pub fn value(mut self, value: VarValue) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    /// Consume the builder, validate, and return a [`Variable`].
    ///
    /// The declared type defaults to the type of the provided value; a
    /// missing value defaults to an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if required fields are missing or the
    /// value does not match the declared type.
    pub fn build(self) -> Result<Variable, ValidationError> {
        let value = self.value.unwrap_or_else(|| VarValue::String(String::new()));
        let variable = Variable {
            name: self.name.unwrap_or_default(),
            var_type: self.var_type.unwrap_or_else(|| value.var_type()),
            value,
            system: self.system,
            version: 0,
        };
        variable.validate()?;
        Ok(variable)
    }
}
