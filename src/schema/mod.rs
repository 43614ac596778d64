//! 参数绑定：按声明的 JSON Schema 校验原始参数并解码为强类型参数。
//!
//! Schema binder.
//!
//! Each tool declares its argument shape as a Rust type deriving
//! [`schemars::JsonSchema`]. The generated schema is advertised in
//! `tools/list` and compiled once with `jsonschema`; every invocation is
//! checked against it before being decoded with serde. Failure is a value
//! ([`ValidationFailure`]), never a panic, and no provider call is made.

pub mod arguments;

pub use arguments::{ForecastArgs, GeocodeArgs, RouteArgs, StaticMapArgs};

use crate::{Error, ErrorContext, Result};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// One reason an argument object was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    Missing { field: String },
    WrongType { field: String, expected: String },
    NotAnObject { found: String },
    Invalid { field: String, message: String },
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::Missing { field } => {
                write!(f, "missing required argument '{}'", field)
            }
            FieldViolation::WrongType { field, expected } => {
                write!(f, "argument '{}' must be a {}", field, expected)
            }
            FieldViolation::NotAnObject { found } => {
                write!(f, "arguments must be an object, got {}", found)
            }
            FieldViolation::Invalid { field, message } if field.is_empty() => {
                write!(f, "{}", message)
            }
            FieldViolation::Invalid { field, message } => {
                write!(f, "argument '{}': {}", field, message)
            }
        }
    }
}

/// All violations found for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid arguments for tool '{tool}': {}", render_violations(.violations))]
pub struct ValidationFailure {
    pub tool: String,
    pub violations: Vec<FieldViolation>,
}

fn render_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationFailure {
    pub fn is_missing(&self, field: &str) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, FieldViolation::Missing { field: f } if f == field))
    }
}

/// Compiled argument schema for one tool.
pub struct ArgumentShape {
    schema: Value,
    compiled: JSONSchema,
}

impl fmt::Debug for ArgumentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentShape")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ArgumentShape {
    /// Shape generated from the argument type's `JsonSchema` derive.
    pub fn of<T: JsonSchema>() -> Result<Self> {
        let root = schemars::schema_for!(T);
        let schema = serde_json::to_value(&root)?;
        Self::from_schema(schema)
    }

    pub fn from_schema(schema: Value) -> Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("failed to compile argument schema: {}", e),
                    ErrorContext::new().with_source("schema_binder"),
                )
            })?;
        Ok(Self { schema, compiled })
    }

    /// The JSON Schema advertised as the tool's `inputSchema`.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate without decoding.
    pub fn check(&self, tool: &str, raw: &Value) -> std::result::Result<(), ValidationFailure> {
        if !raw.is_object() {
            return Err(ValidationFailure {
                tool: tool.to_string(),
                violations: vec![FieldViolation::NotAnObject {
                    found: json_type_name(raw).to_string(),
                }],
            });
        }

        let violations: Vec<FieldViolation> = match self.compiled.validate(raw) {
            Ok(()) => return Ok(()),
            Err(errors) => errors.map(|e| self.violation(&e)).collect(),
        };
        Err(ValidationFailure {
            tool: tool.to_string(),
            violations,
        })
    }

    /// Validate and decode into the tool's typed arguments.
    pub fn bind<T: DeserializeOwned>(
        &self,
        tool: &str,
        raw: &Value,
    ) -> std::result::Result<T, ValidationFailure> {
        self.check(tool, raw)?;
        serde_json::from_value(raw.clone()).map_err(|e| ValidationFailure {
            tool: tool.to_string(),
            violations: vec![FieldViolation::Invalid {
                field: String::new(),
                message: e.to_string(),
            }],
        })
    }

    fn violation(&self, err: &jsonschema::ValidationError<'_>) -> FieldViolation {
        let path = err.instance_path.to_string();
        let field = path.trim_start_matches('/').to_string();
        match &err.kind {
            ValidationErrorKind::Required { property } => FieldViolation::Missing {
                field: property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string()),
            },
            ValidationErrorKind::Type { .. } => FieldViolation::WrongType {
                expected: self.declared_type(&field),
                field,
            },
            _ => FieldViolation::Invalid {
                field,
                message: err.to_string(),
            },
        }
    }

    fn declared_type(&self, field: &str) -> String {
        self.schema
            .pointer(&format!("/properties/{}/type", field))
            .and_then(Value::as_str)
            .unwrap_or("valid value")
            .to_string()
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
