//! Parameter error types.
//!
//! Every error names the offending parameter so the caller can act on it
//! without re-deriving which argument was wrong.

use serde_json::Value;
use skyledger_core::ParamType;
use std::fmt;

/// Error type for parameter validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamError {
    /// The kind of parameter error.
    pub kind: ParamErrorKind,
    /// Parameter (or metric/resource) the error is about.
    pub param: String,
    /// Human-readable error message.
    pub message: String,
}

impl ParamError {
    /// Create a new parameter error.
    pub fn new(kind: ParamErrorKind, param: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a missing required parameter error.
    pub fn missing_param(name: &str) -> Self {
        Self::new(
            ParamErrorKind::MissingParam,
            name,
            format!("Parameter '{}' is required", name),
        )
    }

    /// Create a type mismatch error.
    pub fn invalid_type(name: &str, expected: ParamType, got: &Value) -> Self {
        Self::new(
            ParamErrorKind::InvalidType,
            name,
            format!(
                "Parameter '{}' expects a {} value, got {}",
                name, expected, got
            ),
        )
    }

    /// Create a lower-bound violation error.
    pub fn below_minimum(name: &str, value: i64, minimum: i64) -> Self {
        Self::new(
            ParamErrorKind::BelowMinimum,
            name,
            format!(
                "Parameter '{}' must be at least {}, got {}",
                name, minimum, value
            ),
        )
    }

    /// Create an invalid value error for values of the right type but wrong shape.
    pub fn invalid_value(name: &str, reason: &str) -> Self {
        Self::new(
            ParamErrorKind::InvalidValue,
            name,
            format!("Parameter '{}' is invalid: {}", name, reason),
        )
    }

    /// Create an unregistered metric error.
    pub fn unknown_metric(resource: &str, metric: &str) -> Self {
        Self::new(
            ParamErrorKind::UnknownMetric,
            metric,
            format!("bad metric {} for resource {}", metric, resource),
        )
    }

    /// Create an unregistered resource error.
    pub fn unknown_resource(resource: &str) -> Self {
        Self::new(
            ParamErrorKind::UnknownResource,
            resource,
            format!("Resource '{}' is not registered", resource),
        )
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParamError {}

/// Categories of parameter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamErrorKind {
    /// A required parameter was not supplied.
    MissingParam,
    /// A parameter could not be coerced to its declared type.
    InvalidType,
    /// An integer parameter is below its declared minimum.
    BelowMinimum,
    /// A parameter has the right type but an unusable value.
    InvalidValue,
    /// A requested metric is not in the resource's catalog.
    UnknownMetric,
    /// The requested resource is not registered.
    UnknownResource,
}
