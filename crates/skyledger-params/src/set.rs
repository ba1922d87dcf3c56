//! Validated parameter sets.

use crate::error::ParamError;
use serde::Serialize;
use serde_json::{Map, Value};
use skyledger_core::ParamType;

/// Arguments after defaulting and coercion.
///
/// Only produced by [`crate::ParamValidator`], so every declared parameter that
/// has a value is already of its declared type. Undeclared keys are kept as
/// supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: Map<String, Value>,
}

impl ParameterSet {
    pub(crate) fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// Overwrite one value. Callers keep it of the declared type.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// String parameter. Fails when absent.
    pub fn str(&self, name: &str) -> Result<&str, ParamError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| ParamError::invalid_type(name, ParamType::String, value))
    }

    /// String parameter, `None` when absent or empty.
    pub fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn int(&self, name: &str) -> Result<i64, ParamError> {
        let value = self.require(name)?;
        value
            .as_i64()
            .ok_or_else(|| ParamError::invalid_type(name, ParamType::Int, value))
    }

    pub fn bool(&self, name: &str) -> Result<bool, ParamError> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| ParamError::invalid_type(name, ParamType::Bool, value))
    }

    pub fn slice(&self, name: &str) -> Result<Vec<String>, ParamError> {
        let value = self.require(name)?;
        let items = value
            .as_array()
            .ok_or_else(|| ParamError::invalid_type(name, ParamType::Slice, value))?;
        Ok(items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect())
    }

    fn require(&self, name: &str) -> Result<&Value, ParamError> {
        self.values
            .get(name)
            .ok_or_else(|| ParamError::missing_param(name))
    }
}
