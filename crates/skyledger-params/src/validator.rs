//! Validation of caller arguments against a resource's parameter schema.
//!
//! Validation is performed parameter by parameter, in declared order:
//!
//! 1. **Missing + required** - fails with `MissingParam`
//! 2. **Missing + optional** - filled with the declared default, if any
//! 3. **Present** - coerced to the declared type
//!
//! Keys the schema does not declare pass through unmodified. The first
//! failure aborts validation; no partial set is returned.

use crate::coerce::coerce;
use crate::error::ParamError;
use crate::set::ParameterSet;
use serde_json::{Map, Value};
use skyledger_core::ParameterSchema;

/// Validates raw arguments against a [`ParameterSchema`].
pub struct ParamValidator<'a> {
    /// The schema to validate against.
    schema: &'a ParameterSchema,
}

impl<'a> ParamValidator<'a> {
    /// Create a new validator for a schema.
    pub fn new(schema: &'a ParameterSchema) -> Self {
        Self { schema }
    }

    /// Validate and normalize `raw`.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<ParameterSet, ParamError> {
        let mut values = raw.clone();

        for spec in self.schema.params() {
            // JSON null is treated the same as an absent key
            let supplied = raw.get(&spec.name).filter(|v| !v.is_null());

            match (supplied, &spec.default) {
                (Some(value), _) => {
                    let coerced = coerce(spec, value)?;
                    values.insert(spec.name.clone(), coerced);
                }
                (None, _) if spec.required => {
                    return Err(ParamError::missing_param(&spec.name));
                }
                (None, Some(default)) => {
                    let coerced = coerce(spec, default)?;
                    values.insert(spec.name.clone(), coerced);
                }
                (None, None) => {
                    values.remove(&spec.name);
                }
            }
        }

        tracing::trace!(params = values.len(), "parameters validated");
        Ok(ParameterSet::from_map(values))
    }
}

/// Validate `raw` against `schema`.
pub fn validate(raw: &Map<String, Value>, schema: &ParameterSchema) -> Result<ParameterSet, ParamError> {
    ParamValidator::new(schema).validate(raw)
}
