//! Shared types for the Skyledger resource synchronization crates.
//!
//! The orchestrator calls a resource with a parameter map and a credential and
//! gets back a [`Replay`]: the next cursor, the query descriptor scoping the
//! batch, and the canonical records of one page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// Configuration types shared across all Skyledger crates
pub mod config;
pub mod schema;

pub use config::{
    ConfigError, CredentialConfig, GatewayConfig, LoggingConfig, SkyledgerConfig, SyncConfig,
};
pub use schema::{
    AttrType, AttributeSpec, ENVELOPE_ATTRIBUTES, ParamSpec, ParamType, ParameterSchema,
    RecordSchema,
};

/// Opaque pagination token. Empty means the chain is exhausted.
pub type Cursor = String;

/// Scoping attributes naming which subset of records a batch is authoritative for.
pub type QueryDescriptor = BTreeMap<String, Value>;

/// Vendor credential. Consumed to build a gateway, never persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub account_id: String,
}

impl Credential {
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            account_id: account_id.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Normalized representation of one vendor resource instance.
///
/// Serializes as a single flat object: the envelope fields followed by the
/// kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanonicalRecord {
    pub deleted: bool,
    pub cloud_type: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    /// Stable merge key.
    pub index: String,
    /// Content hash used to detect no-op updates.
    pub checksum: String,
    /// Vendor detail not promoted to first-class attributes.
    #[serde(default)]
    pub extra: Map<String, Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl CanonicalRecord {
    /// Look up an attribute by its declared name, envelope included.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "Deleted" => Some(Value::Bool(self.deleted)),
            "CloudType" => Some(Value::String(self.cloud_type.clone())),
            "AccountId" => Some(Value::String(self.account_id.clone())),
            "RegionId" => self.region_id.clone().map(Value::String),
            "Index" => Some(Value::String(self.index.clone())),
            "Checksum" => Some(Value::String(self.checksum.clone())),
            "Extra" => Some(Value::Object(self.extra.clone())),
            other => self.attributes.get(other).cloned(),
        }
    }

    /// String attribute, or `""` when absent or not a string.
    pub fn get_str(&self, name: &str) -> &str {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Response envelope returned to the orchestrator for every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Replay {
    /// Cursor for the next call. Always present; empty once exhausted.
    pub next: Cursor,
    pub query: QueryDescriptor,
    pub result: Vec<CanonicalRecord>,
}

impl Replay {
    /// Whether the cursor chain this replay belongs to is exhausted.
    pub fn is_terminal(&self) -> bool {
        self.next.is_empty()
    }
}
