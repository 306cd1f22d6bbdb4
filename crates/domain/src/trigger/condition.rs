//! Condition — the predicate a change event must satisfy for a trigger
//! to fire.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::variable::{VarType, VarValue};

/// Comparison operator applied between a variable's new value and the
/// condition's comparand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    /// Fires on any accepted write, ignoring the comparand.
    Changed,
}

impl Operator {
    /// Whether this operator is meaningful for variables of `ty`.
    ///
    /// Invalid pairings are a [`ConfigurationError`] at load time and
    /// evaluate to `false` at runtime.
    #[must_use]
    pub fn valid_for(self, ty: VarType) -> bool {
        match self {
            Self::Changed | Self::Equals | Self::NotEquals => true,
            Self::GreaterThan
            | Self::LessThan
            | Self::GreaterThanOrEqual
            | Self::LessThanOrEqual => matches!(ty, VarType::Number),
            Self::Contains => matches!(ty, VarType::String | VarType::Array),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThanOrEqual => "less_than_or_equal",
            Self::Contains => "contains",
            Self::Changed => "changed",
        };
        f.write_str(name)
    }
}

/// A predicate evaluated against the new value of a watched variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: Operator,
    /// Typed literal to compare against. Ignored by [`Operator::Changed`].
    #[serde(default)]
    pub comparand: serde_json::Value,
}

impl Condition {
    /// Check this condition against a variable's declared type.
    ///
    /// Called when triggers are loaded so malformed definitions are
    /// quarantined up front instead of failing silently on every event.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOperator`] for an operator
    /// that cannot apply to the type, or
    /// [`ConfigurationError::IncoercibleComparand`] when the comparand
    /// cannot represent the type.
    pub fn validate_for(&self, ty: VarType) -> Result<(), ConfigurationError> {
        if !self.operator.valid_for(ty) {
            return Err(ConfigurationError::InvalidOperator {
                operator: self.operator,
                var_type: ty,
            });
        }
        if matches!(self.operator, Operator::Changed) {
            return Ok(());
        }
        // Array membership compares the comparand against individual
        // elements, so any JSON literal is acceptable there.
        if matches!(self.operator, Operator::Contains) && ty == VarType::Array {
            return Ok(());
        }
        VarValue::coerce(&self.comparand, ty)
            .map(|_| ())
            .map_err(|_| ConfigurationError::IncoercibleComparand {
                var_type: ty,
                comparand: self.comparand.clone(),
            })
    }

    /// Evaluate this condition against a variable's new value.
    ///
    /// Pure and infallible: an operator that does not apply to the
    /// value's type, or a comparand that cannot be coerced into it,
    /// evaluates to `false` — never a panic.
    #[must_use]
    pub fn evaluate(&self, value: &VarValue) -> bool {
        if matches!(self.operator, Operator::Changed) {
            return true;
        }
        if !self.operator.valid_for(value.var_type()) {
            return false;
        }
        match value {
            VarValue::Number(lhs) => {
                let Ok(VarValue::Number(rhs)) = VarValue::coerce(&self.comparand, VarType::Number)
                else {
                    return false;
                };
                match self.operator {
                    Operator::Equals => (*lhs - rhs).abs() < f64::EPSILON,
                    Operator::NotEquals => (*lhs - rhs).abs() >= f64::EPSILON,
                    Operator::GreaterThan => *lhs > rhs,
                    Operator::LessThan => *lhs < rhs,
                    Operator::GreaterThanOrEqual => *lhs >= rhs,
                    Operator::LessThanOrEqual => *lhs <= rhs,
                    _ => false,
                }
            }
            VarValue::String(lhs) => {
                let Ok(VarValue::String(rhs)) = VarValue::coerce(&self.comparand, VarType::String)
                else {
                    return false;
                };
                match self.operator {
                    Operator::Equals => *lhs == rhs,
                    Operator::NotEquals => *lhs != rhs,
                    Operator::Contains => lhs.contains(&rhs),
                    _ => false,
                }
            }
            VarValue::Bool(lhs) => {
                let Ok(VarValue::Bool(rhs)) = VarValue::coerce(&self.comparand, VarType::Boolean)
                else {
                    return false;
                };
                match self.operator {
                    Operator::Equals => *lhs == rhs,
                    Operator::NotEquals => *lhs != rhs,
                    _ => false,
                }
            }
            VarValue::Array(items) => match self.operator {
                Operator::Contains => items.contains(&self.comparand),
                Operator::Equals => self.comparand.as_array().is_some_and(|rhs| rhs == items),
                Operator::NotEquals => self.comparand.as_array().is_some_and(|rhs| rhs != items),
                _ => false,
            },
            VarValue::Object(map) => match self.operator {
                Operator::Equals => self.comparand.as_object().is_some_and(|rhs| rhs == map),
                Operator::NotEquals => self.comparand.as_object().is_some_and(|rhs| rhs != map),
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operator {
            Operator::Changed => f.write_str("changed"),
            op => write!(f, "{op}({})", self.comparand),
        }
    }
}
