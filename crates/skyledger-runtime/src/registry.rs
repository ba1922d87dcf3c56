//! Resource registry.
//!
//! Every resource the engine can call is described once, up front, by a
//! [`ResourceDescriptor`]. The registry is immutable once built and shared
//! behind an `Arc`.

use crate::adapter::{Endpoint, GatewayFactory};
use crate::cursor::Pagination;
use crate::error::{RegistryError, SyncError};
use crate::mapper::MapFn;
use crate::metric::MetricCatalog;
use crate::query::QueryKeyContract;
use serde_json::{Map, Value};
use skyledger_core::{
    CanonicalRecord, ParamSpec, ParamType, ParameterSchema, QueryDescriptor, RecordSchema,
};
use skyledger_params::{ParamError, ParameterSet};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Page size used when the caller does not pass `limit`.
pub const DEFAULT_LIMIT: i64 = 50;

/// Vendor request arguments derived from validated parameters.
pub type FilterFn = fn(&ParameterSet) -> Result<Map<String, Value>, ParamError>;

/// Query descriptor keys beyond `CloudType` and `AccountId`.
pub type ScopeFn = fn(&ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError>;

/// Normalizes validated parameters once per call, before scope, filter and
/// mapping see them.
pub type PrepareFn = fn(ParameterSet) -> Result<ParameterSet, ParamError>;

/// Extra detail copied from a parent record onto its metric records.
pub type DetailFn = fn(&CanonicalRecord) -> Map<String, Value>;

/// A resource read page by page from one vendor action.
#[derive(Clone)]
pub struct PagedSpec {
    pub endpoint: Endpoint,
    pub pagination: Pagination,
    pub filter: FilterFn,
    pub map: MapFn,
}

/// A resource derived from the records of a paged parent.
#[derive(Clone)]
pub struct MetricSpec {
    pub parent: &'static str,
    pub endpoint: Endpoint,
    pub catalog: &'static MetricCatalog,
    pub detail: DetailFn,
}

#[derive(Clone)]
pub enum ResourceKind {
    Paged(PagedSpec),
    Metric(MetricSpec),
}

/// Everything the engine needs to serve one resource.
#[derive(Clone)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: ParameterSchema,
    pub record: &'static RecordSchema,
    pub scope: ScopeFn,
    pub prepare: Option<PrepareFn>,
    pub kind: ResourceKind,
    pub gateway: Arc<dyn GatewayFactory>,
}

impl ResourceDescriptor {
    /// Validated parameters after the resource's own normalization.
    pub fn prepared(&self, params: ParameterSet) -> Result<ParameterSet, SyncError> {
        match self.prepare {
            Some(prepare) => prepare(params).map_err(|e| SyncError::parameter(self.name, e)),
            None => Ok(params),
        }
    }

    /// Query descriptor for a call with `params`.
    pub fn query(
        &self,
        cloud_type: &str,
        account_id: &str,
        params: &ParameterSet,
    ) -> Result<QueryDescriptor, SyncError> {
        let extras = (self.scope)(params).map_err(|e| SyncError::parameter(self.name, e))?;
        QueryKeyContract::new(self.record, self.name).build(cloud_type, account_id, extras)
    }

    pub fn endpoint(&self) -> Endpoint {
        match &self.kind {
            ResourceKind::Paged(spec) => spec.endpoint,
            ResourceKind::Metric(spec) => spec.endpoint,
        }
    }

    /// Pagination style, `None` for metric resources.
    pub fn pagination(&self) -> Option<Pagination> {
        match &self.kind {
            ResourceKind::Paged(spec) => Some(spec.pagination),
            ResourceKind::Metric(_) => None,
        }
    }

    pub fn metric_catalog(&self) -> Option<&'static MetricCatalog> {
        match &self.kind {
            ResourceKind::Paged(_) => None,
            ResourceKind::Metric(spec) => Some(spec.catalog),
        }
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint())
            .field("record", &self.record.kind)
            .finish_non_exhaustive()
    }
}

/// `limit` and `marker` for a paged resource.
pub fn paging_params(pagination: Pagination) -> Vec<ParamSpec> {
    vec![
        ParamSpec::optional("limit", ParamType::Int)
            .with_default(DEFAULT_LIMIT)
            .with_minimum(1),
        ParamSpec::optional("marker", ParamType::String).with_default(pagination.initial_marker()),
    ]
}

/// Filter with no request arguments.
pub fn no_filter(_params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    Ok(Map::new())
}

/// Scope of regional resources: `RegionId` from the `region` parameter.
pub fn region_scope(params: &ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError> {
    Ok(vec![("RegionId", Value::from(params.str("region")?))])
}

/// Name → descriptor table for one cloud.
#[derive(Debug)]
pub struct ResourceRegistry {
    cloud_type: String,
    resources: BTreeMap<&'static str, ResourceDescriptor>,
}

impl ResourceRegistry {
    pub fn new(cloud_type: impl Into<String>) -> Self {
        Self {
            cloud_type: cloud_type.into(),
            resources: BTreeMap::new(),
        }
    }

    pub fn cloud_type(&self) -> &str {
        &self.cloud_type
    }

    /// Add a resource. Metric resources must be registered after their parent.
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<(), RegistryError> {
        let name = descriptor.name;
        if self.resources.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        let needed: &[&str] = match &descriptor.kind {
            ResourceKind::Paged(_) => &["limit", "marker"],
            ResourceKind::Metric(spec) => {
                match self.resources.get(spec.parent).map(|p| &p.kind) {
                    None => {
                        return Err(RegistryError::UnknownParent {
                            resource: name.to_string(),
                            parent: spec.parent.to_string(),
                        });
                    }
                    Some(ResourceKind::Metric(_)) => {
                        return Err(RegistryError::ParentNotPaged {
                            resource: name.to_string(),
                            parent: spec.parent.to_string(),
                        });
                    }
                    Some(ResourceKind::Paged(_)) => {}
                }
                &["metric_names", "period"]
            }
        };
        if let Some(param) = needed.iter().find(|p| !descriptor.params.contains(p)) {
            return Err(RegistryError::MissingParam {
                resource: name.to_string(),
                param: param.to_string(),
            });
        }

        tracing::debug!(resource = name, endpoint = %descriptor.endpoint(), "registered resource");
        self.resources.insert(name, descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
