//! Canonical record mapping.
//!
//! Per-resource mapping functions only translate vendor fields into
//! attributes. Everything shared by all record kinds happens here: envelope
//! fields, zero-filling, Index, Checksum and the required-field check.

use crate::error::SyncError;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use skyledger_core::{CanonicalRecord, RecordSchema};
use skyledger_params::ParameterSet;

/// Per-resource translation of one raw vendor item.
pub type MapFn = fn(&Value, &MapContext<'_>) -> Result<MappedItem, SyncError>;

/// What a mapping function may need besides the raw item.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub cloud_type: &'a str,
    pub account_id: &'a str,
    /// Set for regional record kinds.
    pub region_id: Option<&'a str>,
    pub params: &'a ParameterSet,
}

/// Output of a mapping function: first-class attributes plus vendor detail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedItem {
    pub attributes: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl MappedItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a first-class attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Set a vendor detail kept under `Extra`.
    pub fn extra(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }
}

/// Finalizes mapped items into canonical records of one kind.
pub struct RecordMapper<'a> {
    schema: &'a RecordSchema,
    resource: &'a str,
}

impl<'a> RecordMapper<'a> {
    pub fn new(schema: &'a RecordSchema, resource: &'a str) -> Self {
        Self { schema, resource }
    }

    /// Map one raw vendor item with `map`, then finalize it.
    pub fn map(
        &self,
        raw: &Value,
        ctx: &MapContext<'_>,
        map: MapFn,
    ) -> Result<CanonicalRecord, SyncError> {
        let item = map(raw, ctx)?;
        self.finalize(item, ctx)
    }

    /// Build the canonical record for `item`.
    ///
    /// Fails with a mapping error naming the first declared mandatory
    /// attribute left empty.
    pub fn finalize(
        &self,
        item: MappedItem,
        ctx: &MapContext<'_>,
    ) -> Result<CanonicalRecord, SyncError> {
        let MappedItem {
            mut attributes,
            mut extra,
        } = item;

        let mut declared = Map::new();
        for spec in self.schema.attributes {
            let value = attributes
                .remove(spec.name)
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| spec.kind.zero_value());
            declared.insert(spec.name.to_string(), value);
        }
        if !attributes.is_empty() {
            tracing::warn!(
                resource = self.resource,
                fields = ?attributes.keys().collect::<Vec<_>>(),
                "undeclared attributes moved to Extra"
            );
            extra.extend(attributes);
        }

        let mut record = CanonicalRecord {
            deleted: false,
            cloud_type: ctx.cloud_type.to_string(),
            account_id: ctx.account_id.to_string(),
            region_id: if self.schema.regional {
                Some(ctx.region_id.unwrap_or_default().to_string())
            } else {
                None
            },
            index: String::new(),
            checksum: String::new(),
            extra,
            attributes: declared,
        };
        record.index = record_index(self.schema, &record);
        record.checksum = record_checksum(self.schema, &record);

        check_required(self.schema, &record)
            .map_err(|field| SyncError::empty_field(self.resource, field))?;
        Ok(record)
    }
}

/// Stable merge key of a record.
///
/// Hash of the JSON array of `[name, value]` pairs for `CloudType`,
/// `AccountId`, `Kind`, `RegionId` when regional, then the identity
/// attributes in declared order.
pub fn record_index(schema: &RecordSchema, record: &CanonicalRecord) -> String {
    let mut pairs = vec![
        json!(["CloudType", record.cloud_type]),
        json!(["AccountId", record.account_id]),
        json!(["Kind", schema.kind]),
    ];
    if let Some(region) = &record.region_id {
        pairs.push(json!(["RegionId", region]));
    }
    for spec in schema.identity_attributes() {
        let value = scalarish_to_string(record.attributes.get(spec.name)).unwrap_or_default();
        pairs.push(json!([spec.name, value]));
    }
    hex_digest(Value::Array(pairs).to_string().as_bytes())
}

/// Content hash of a record: every non-identity attribute, then `Extra`.
pub fn record_checksum(schema: &RecordSchema, record: &CanonicalRecord) -> String {
    let mut hasher = Sha256::new();
    for spec in schema.content_attributes() {
        let value = record.attributes.get(spec.name).unwrap_or(&Value::Null);
        hasher.update(spec.name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.to_string().as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"Extra=");
    hasher.update(Value::Object(record.extra.clone()).to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First declared mandatory attribute whose value is empty.
pub fn check_required(schema: &RecordSchema, record: &CanonicalRecord) -> Result<(), &'static str> {
    match schema
        .required_attributes()
        .find(|spec| is_empty(record.attributes.get(spec.name)))
    {
        Some(spec) => Err(spec.name),
        None => Ok(()),
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub(crate) fn scalarish_to_string(v: Option<&Value>) -> Option<String> {
    let v = v?;
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
