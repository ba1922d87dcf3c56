//! Coercion of raw argument values to their declared parameter types.

use crate::error::ParamError;
use serde_json::Value;
use skyledger_core::{ParamSpec, ParamType};

/// Coerce `value` to the type declared by `spec`.
pub fn coerce(spec: &ParamSpec, value: &Value) -> Result<Value, ParamError> {
    let name = spec.name.as_str();
    match spec.kind {
        ParamType::String => coerce_string(name, value),
        ParamType::Int => {
            let n = coerce_int(name, value)?;
            if let Some(minimum) = spec.minimum {
                if n < minimum {
                    return Err(ParamError::below_minimum(name, n, minimum));
                }
            }
            Ok(Value::from(n))
        }
        ParamType::Bool => coerce_bool(name, value).map(Value::Bool),
        ParamType::Slice => coerce_slice(name, value),
    }
}

fn coerce_string(name: &str, value: &Value) -> Result<Value, ParamError> {
    match scalar_to_string(value) {
        Some(s) => Ok(Value::String(s)),
        None => Err(ParamError::invalid_type(name, ParamType::String, value)),
    }
}

fn coerce_int(name: &str, value: &Value) -> Result<i64, ParamError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ParamError::invalid_type(name, ParamType::Int, value))
}

fn coerce_bool(name: &str, value: &Value) -> Result<bool, ParamError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| ParamError::invalid_type(name, ParamType::Bool, value))
}

fn coerce_slice(name: &str, value: &Value) -> Result<Value, ParamError> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(s) = scalar_to_string(item) else {
                    return Err(ParamError::invalid_type(name, ParamType::Slice, value));
                };
                out.push(Value::String(s.trim().to_string()));
            }
            Ok(Value::Array(out))
        }
        // "a, b, c" as passed on a command line
        Value::String(s) => Ok(Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
        )),
        _ => Err(ParamError::invalid_type(name, ParamType::Slice, value)),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
