//! Alibaba Cloud resources for Skyledger.
//!
//! Each module describes a family of resources: the parameters they accept,
//! the vendor action they read, and how a raw vendor item becomes a canonical
//! record. [`registry`] assembles all of them around one gateway factory.

pub mod billing;
pub mod compute;
pub mod metrics;
pub mod network;
pub mod storage;
pub mod util;

use serde_json::{Map, Value};
use skyledger_core::{ParamSpec, ParamType, ParameterSchema};
use skyledger_params::{ParamError, ParameterSet};
use skyledger_runtime::registry::paging_params;
use skyledger_runtime::{GatewayFactory, Pagination, RegistryError, ResourceRegistry};
use std::sync::Arc;

/// Cloud type stamped on every record and query descriptor.
pub const CLOUD_TYPE: &str = "aliyun";

/// Registry of every Alibaba Cloud resource, served through `gateway`.
pub fn registry(gateway: Arc<dyn GatewayFactory>) -> Result<ResourceRegistry, RegistryError> {
    let mut registry = ResourceRegistry::new(CLOUD_TYPE);

    let descriptors = compute::descriptors(&gateway)
        .into_iter()
        .chain(storage::descriptors(&gateway))
        .chain(network::descriptors(&gateway))
        .chain(billing::descriptors(&gateway));
    for descriptor in descriptors {
        registry.register(descriptor)?;
    }
    // metric resources inherit their parents' parameters
    for descriptor in metrics::descriptors(&gateway, &registry) {
        registry.register(descriptor)?;
    }

    tracing::debug!(resources = registry.len(), "aliyun registry ready");
    Ok(registry)
}

/// `region`, then `extra`, then `limit`/`marker`.
pub(crate) fn regional_params(extra: Vec<ParamSpec>) -> ParameterSchema {
    let mut params = vec![ParamSpec::required("region", ParamType::String)];
    params.extend(extra);
    params.extend(paging_params(Pagination::PageNumber));
    ParameterSchema::new(params)
}

/// Request arguments shared by all regional actions.
pub(crate) fn region_filter(params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    let mut filter = Map::new();
    filter.insert("RegionId".to_string(), params.str("region")?.into());
    Ok(filter)
}
