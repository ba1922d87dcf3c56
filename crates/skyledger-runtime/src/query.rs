//! Query descriptors scoping each batch.
//!
//! The orchestrator treats a replay's query descriptor as the set of records
//! the batch is authoritative for, so every key must name an attribute of the
//! record kind.

use crate::error::SyncError;
use serde_json::Value;
use skyledger_core::{QueryDescriptor, RecordSchema};

/// Builds and checks query descriptors for one resource.
pub struct QueryKeyContract<'a> {
    schema: &'a RecordSchema,
    resource: &'a str,
}

impl<'a> QueryKeyContract<'a> {
    pub fn new(schema: &'a RecordSchema, resource: &'a str) -> Self {
        Self { schema, resource }
    }

    /// `CloudType` and `AccountId` plus the resource's scoping extras.
    pub fn build(
        &self,
        cloud_type: &str,
        account_id: &str,
        extras: Vec<(&'static str, Value)>,
    ) -> Result<QueryDescriptor, SyncError> {
        let mut query = QueryDescriptor::new();
        query.insert("CloudType".to_string(), Value::from(cloud_type));
        query.insert("AccountId".to_string(), Value::from(account_id));
        for (key, value) in extras {
            query.insert(key.to_string(), value);
        }
        self.check(&query)?;
        Ok(query)
    }

    /// Fails on the first key that is not a declared attribute.
    pub fn check(&self, query: &QueryDescriptor) -> Result<(), SyncError> {
        match query.keys().find(|key| !self.schema.declares(key)) {
            Some(key) => Err(SyncError::query_key(self.resource, self.schema.kind, key)),
            None => Ok(()),
        }
    }
}
