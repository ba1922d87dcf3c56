//! Declarative schemas shared by every resource.
//!
//! A resource declares two schemas once:
//! - a [`ParameterSchema`] describing the arguments a caller may pass, and
//! - a [`RecordSchema`] describing the canonical record it emits.
//!
//! Both are immutable after construction and are only ever read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// PARAMETERS
// =============================================================================

/// Type of a caller-supplied parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Int,
    Bool,
    Slice,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => write!(f, "string"),
            ParamType::Int => write!(f, "int"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Slice => write!(f, "slice"),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Value used when an optional parameter is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Lower bound for `Int` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            required: true,
            kind,
            default: None,
            minimum: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

/// Ordered set of parameters declared by a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl ParameterSchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append the parameters of `other` that this schema does not already declare.
    pub fn merged_with(mut self, other: &ParameterSchema) -> Self {
        for param in &other.params {
            if !self.contains(&param.name) {
                self.params.push(param.clone());
            }
        }
        self
    }
}

// =============================================================================
// CANONICAL RECORDS
// =============================================================================

/// Attribute names carried by every canonical record regardless of kind.
pub const ENVELOPE_ATTRIBUTES: &[&str] = &[
    "Deleted",
    "CloudType",
    "AccountId",
    "RegionId",
    "Index",
    "Checksum",
    "Extra",
];

/// Type of a canonical record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Int,
    Float,
    Bool,
    Map,
    List,
}

impl AttrType {
    /// Value an attribute takes when the vendor did not supply it.
    pub fn zero_value(self) -> Value {
        match self {
            AttrType::String => Value::String(String::new()),
            AttrType::Int => Value::from(0i64),
            AttrType::Float => Value::from(0.0f64),
            AttrType::Bool => Value::Bool(false),
            AttrType::Map => Value::Object(serde_json::Map::new()),
            AttrType::List => Value::Array(Vec::new()),
        }
    }
}

/// One first-class attribute of a canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: AttrType,
    /// Must be non-empty on every emitted record.
    pub required: bool,
    /// Part of the record's identity; excluded from the checksum.
    pub identity: bool,
}

impl AttributeSpec {
    pub const fn new(name: &'static str, kind: AttrType) -> Self {
        Self {
            name,
            kind,
            required: false,
            identity: false,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, AttrType::String)
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn identity(self) -> Self {
        Self {
            identity: true,
            ..self
        }
    }
}

/// Fixed attribute list of one canonical record kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecordSchema {
    /// Record kind, e.g. `Server`. Part of every record's identity.
    pub kind: &'static str,
    /// Whether records carry a `RegionId` in their envelope.
    pub regional: bool,
    pub attributes: &'static [AttributeSpec],
}

impl RecordSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether `name` is a declared attribute of this record kind,
    /// either first-class or part of the envelope.
    pub fn declares(&self, name: &str) -> bool {
        if name == "RegionId" && !self.regional {
            return self.attribute(name).is_some();
        }
        ENVELOPE_ATTRIBUTES.contains(&name) || self.attribute(name).is_some()
    }

    /// All declared names: envelope first, then attributes in declared order.
    pub fn declared_names(&self) -> Vec<&'static str> {
        ENVELOPE_ATTRIBUTES
            .iter()
            .copied()
            .filter(|n| *n != "RegionId" || self.regional)
            .chain(self.attributes.iter().map(|a| a.name))
            .collect()
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| a.required)
    }

    pub fn identity_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| a.identity)
    }

    pub fn content_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| !a.identity)
    }
}
