//! Typed variable values and coercion from raw JSON.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The declared type of a [`Variable`](crate::variable::Variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// A single typed variable value.
///
/// Serialized untagged so the persisted form is plain JSON
/// (`true`, `21.5`, `"open"`, `[…]`, `{…}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<serde_json::Value>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl VarValue {
    /// The [`VarType`] this value inhabits.
    #[must_use]
    pub fn var_type(&self) -> VarType {
        match self {
            Self::Bool(_) => VarType::Boolean,
            Self::Number(_) => VarType::Number,
            Self::String(_) => VarType::String,
            Self::Array(_) => VarType::Array,
            Self::Object(_) => VarType::Object,
        }
    }

    /// Coerce a raw JSON value into a typed value of the declared type.
    ///
    /// Coercion is intentionally forgiving at the edges operators touch:
    /// numeric strings become numbers, `"true"`/`"false"` become booleans,
    /// and scalars stringify for `string` variables. Arrays and objects
    /// must arrive in their native JSON shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotCoercible`] when the raw value cannot
    /// represent the declared type.
    pub fn coerce(raw: &serde_json::Value, ty: VarType) -> Result<Self, ValidationError> {
        let not_coercible = || ValidationError::NotCoercible {
            expected: ty,
            value: raw.clone(),
        };

        match ty {
            VarType::String => match raw {
                serde_json::Value::String(s) => Ok(Self::String(s.clone())),
                serde_json::Value::Number(n) => Ok(Self::String(n.to_string())),
                serde_json::Value::Bool(b) => Ok(Self::String(b.to_string())),
                _ => Err(not_coercible()),
            },
            VarType::Number => match raw {
                serde_json::Value::Number(n) => {
                    n.as_f64().map(Self::Number).ok_or_else(not_coercible)
                }
                serde_json::Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Self::Number)
                    .map_err(|_| not_coercible()),
                _ => Err(not_coercible()),
            },
            VarType::Boolean => match raw {
                serde_json::Value::Bool(b) => Ok(Self::Bool(*b)),
                serde_json::Value::String(s) => match s.as_str() {
                    "true" => Ok(Self::Bool(true)),
                    "false" => Ok(Self::Bool(false)),
                    _ => Err(not_coercible()),
                },
                _ => Err(not_coercible()),
            },
            VarType::Array => raw
                .as_array()
                .cloned()
                .map(Self::Array)
                .ok_or_else(not_coercible),
            VarType::Object => raw
                .as_object()
                .cloned()
                .map(Self::Object)
                .ok_or_else(not_coercible),
        }
    }

    /// Render the value back as plain JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.clone()),
            Self::Object(map) => serde_json::Value::Object(map.clone()),
        }
    }
}

impl std::fmt::Display for VarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
