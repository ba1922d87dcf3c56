//! Resource call engine.
//!
//! One call is one request/response cycle: validate the arguments, fetch one
//! vendor page, map every item, advance the cursor, assemble the replay. Any
//! failure aborts the whole call.

use crate::adapter::{PageRequest, PageSelector};
use crate::cursor;
use crate::error::SyncError;
use crate::mapper::{MapContext, RecordMapper};
use crate::metric::{self, METRIC_RECORD};
use crate::registry::{MetricSpec, PagedSpec, ResourceDescriptor, ResourceKind, ResourceRegistry};
use crate::replay;
use serde_json::{Map, Value};
use skyledger_core::{CanonicalRecord, Credential, Replay};
use skyledger_params::{ParamError, ParamValidator, ParameterSet};
use std::collections::HashMap;
use std::sync::Arc;

/// Serves resource calls from a registry.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    registry: Arc<ResourceRegistry>,
}

impl SyncEngine {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Fetch one page of `resource`.
    #[tracing::instrument(
        skip(self, args, credential),
        fields(call_id = %uuid::Uuid::new_v4(), account = %credential.account_id)
    )]
    pub async fn call(
        &self,
        resource: &str,
        args: &Map<String, Value>,
        credential: &Credential,
    ) -> Result<Replay, SyncError> {
        let result = self.dispatch(resource, args, credential).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "call aborted");
        }
        result
    }

    async fn dispatch(
        &self,
        resource: &str,
        args: &Map<String, Value>,
        credential: &Credential,
    ) -> Result<Replay, SyncError> {
        let descriptor = self.registry.get(resource).ok_or_else(|| {
            SyncError::parameter(resource, ParamError::unknown_resource(resource))
        })?;
        let params = ParamValidator::new(&descriptor.params)
            .validate(args)
            .map_err(|e| SyncError::parameter(resource, e))?;
        let params = descriptor.prepared(params)?;

        match &descriptor.kind {
            ResourceKind::Paged(spec) => self.fetch_page(descriptor, spec, &params, credential).await,
            ResourceKind::Metric(spec) => {
                self.fetch_metrics(descriptor, spec, &params, credential)
                    .await
            }
        }
    }

    async fn fetch_page(
        &self,
        descriptor: &ResourceDescriptor,
        spec: &PagedSpec,
        params: &ParameterSet,
        credential: &Credential,
    ) -> Result<Replay, SyncError> {
        let name = descriptor.name;
        let cloud_type = self.registry.cloud_type();
        let query = descriptor.query(cloud_type, &credential.account_id, params)?;

        let marker = params.str("marker").map_err(|e| SyncError::parameter(name, e))?;
        let Some(page) = cursor::start(spec.pagination, name, marker)? else {
            tracing::debug!(resource = name, "empty marker, nothing to fetch");
            return Ok(replay::exhausted(name, query));
        };
        let page_size = page_size(name, params)?;
        let filter = (spec.filter)(params).map_err(|e| SyncError::parameter(name, e))?;

        let gateway = descriptor
            .gateway
            .connect(credential, &spec.endpoint)
            .map_err(|e| SyncError::vendor(name, spec.endpoint.action, format!("{:#}", e)))?;
        let request = PageRequest {
            action: spec.endpoint.action.to_string(),
            filter,
            page: page.clone(),
            page_size,
        };
        tracing::debug!(resource = name, endpoint = %spec.endpoint, page = ?request.page, page_size, "vendor request");
        let response = gateway
            .fetch(&request)
            .await
            .map_err(|e| SyncError::vendor(name, spec.endpoint.action, format!("{:#}", e)))?;
        if !response.success {
            return Err(SyncError::vendor(name, spec.endpoint.action, response.message));
        }
        let items = response
            .items
            .ok_or_else(|| SyncError::contract(name, "items"))?;

        let region = params.non_empty_str("region");
        let ctx = MapContext {
            cloud_type,
            account_id: &credential.account_id,
            region_id: region,
            params,
        };
        let mapper = RecordMapper::new(descriptor.record, name);
        let records = items
            .iter()
            .map(|raw| mapper.map(raw, &ctx, spec.map))
            .collect::<Result<Vec<_>, _>>()?;

        let next = match page {
            PageSelector::Number(n) => {
                let total = response
                    .total
                    .ok_or_else(|| SyncError::contract(name, "TotalCount"))?;
                cursor::advance_page(name, n, page_size, total)?
            }
            PageSelector::Token(_) => cursor::advance_token(response.next_token),
            PageSelector::Unpaged => String::new(),
        };

        Ok(replay::assemble(name, next, query, records))
    }

    async fn fetch_metrics(
        &self,
        descriptor: &ResourceDescriptor,
        spec: &MetricSpec,
        params: &ParameterSet,
        credential: &Credential,
    ) -> Result<Replay, SyncError> {
        let name = descriptor.name;
        let names = params
            .slice("metric_names")
            .map_err(|e| SyncError::parameter(name, e))?;
        let definitions = spec
            .catalog
            .resolve(name, &names)
            .map_err(|e| SyncError::parameter(name, e))?;

        let cloud_type = self.registry.cloud_type();
        let query = descriptor.query(cloud_type, &credential.account_id, params)?;

        let parent = self
            .registry
            .get(spec.parent)
            .ok_or_else(|| SyncError::parameter(spec.parent, ParamError::unknown_resource(spec.parent)))?;
        let ResourceKind::Paged(parent_spec) = &parent.kind else {
            return Err(SyncError::contract(name, "paged parent"));
        };
        let parent_params = ParamValidator::new(&parent.params)
            .validate(params.as_map())
            .map_err(|e| SyncError::parameter(parent.name, e))?;
        let parent_params = parent.prepared(parent_params)?;
        let parent_page = self
            .fetch_page(parent, parent_spec, &parent_params, credential)
            .await?;

        if parent_page.result.is_empty() {
            return Ok(replay::assemble(name, parent_page.next, query, Vec::new()));
        }

        let instances: HashMap<&str, &CanonicalRecord> = parent_page
            .result
            .iter()
            .map(|r| (r.get_str("ProviderId"), r))
            .collect();
        let dimensions = metric::dimensions(parent_page.result.iter().map(|r| r.get_str("ProviderId")));
        let period = params.int("period").map_err(|e| SyncError::parameter(name, e))?;

        let gateway = descriptor
            .gateway
            .connect(credential, &spec.endpoint)
            .map_err(|e| SyncError::vendor(name, spec.endpoint.action, format!("{:#}", e)))?;
        let ctx = MapContext {
            cloud_type,
            account_id: &credential.account_id,
            region_id: params.non_empty_str("region"),
            params,
        };
        let mapper = RecordMapper::new(&METRIC_RECORD, name);

        let mut records = Vec::new();
        for definition in definitions {
            let mut filter = Map::new();
            filter.insert("Namespace".to_string(), spec.catalog.namespace.into());
            filter.insert("MetricName".to_string(), definition.name.into());
            filter.insert("Period".to_string(), period.to_string().into());
            filter.insert("Dimensions".to_string(), dimensions.clone().into());
            let request = PageRequest {
                action: spec.endpoint.action.to_string(),
                filter,
                page: PageSelector::Unpaged,
                page_size: 0,
            };

            tracing::debug!(resource = name, metric = definition.name, instances = instances.len(), "metric request");
            let response = gateway
                .fetch(&request)
                .await
                .map_err(|e| SyncError::vendor(name, spec.endpoint.action, format!("{:#}", e)))?;
            if !response.success {
                return Err(SyncError::vendor(name, spec.endpoint.action, response.message));
            }
            let points = response
                .items
                .ok_or_else(|| SyncError::contract(name, "Datapoints"))?;

            for point in &points {
                let instance_id = point.get("instanceId").and_then(Value::as_str).unwrap_or_default();
                let mut detail = instances
                    .get(instance_id)
                    .map(|record| (spec.detail)(record))
                    .unwrap_or_default();
                if let Some(region) = ctx.region_id {
                    detail.insert("Region".to_string(), region.into());
                }
                for item in metric::expand_datapoint(definition, point, &detail) {
                    records.push(mapper.finalize(item, &ctx)?);
                }
            }
        }

        Ok(replay::assemble(name, parent_page.next, query, records))
    }
}

fn page_size(resource: &str, params: &ParameterSet) -> Result<u32, SyncError> {
    let limit = params
        .int("limit")
        .map_err(|e| SyncError::parameter(resource, e))?;
    u32::try_from(limit)
        .map_err(|_| SyncError::parameter(resource, ParamError::invalid_value("limit", "out of range")))
}
