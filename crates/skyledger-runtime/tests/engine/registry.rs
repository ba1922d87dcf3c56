//! Registry assembly.

use crate::common::{ScriptedGateway, registry, widget_pages, widget_params};
use skyledger_core::{AttributeSpec, ParameterSchema, RecordSchema};
use skyledger_runtime::registry::no_filter;
use skyledger_runtime::{
    Endpoint, METRIC_RECORD, MapContext, MappedItem, MetricCatalog, MetricSpec, PagedSpec,
    Pagination, RegistryError, ResourceDescriptor, ResourceKind, ResourceRegistry, SyncError,
};
use std::sync::Arc;

static THING: RecordSchema = RecordSchema {
    kind: "Thing",
    regional: false,
    attributes: &[AttributeSpec::string("ProviderId").required().identity()],
};

static EMPTY_CATALOG: MetricCatalog = MetricCatalog {
    namespace: "none",
    metrics: &[],
};

fn map_thing(_raw: &serde_json::Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    Ok(MappedItem::new())
}

fn thing(name: &'static str, params: ParameterSchema) -> ResourceDescriptor {
    ResourceDescriptor {
        name,
        description: "",
        params,
        record: &THING,
        scope: |_| Ok(Vec::new()),
        prepare: None,
        kind: ResourceKind::Paged(PagedSpec {
            endpoint: Endpoint::new("test", "DescribeThings"),
            pagination: Pagination::PageNumber,
            filter: no_filter,
            map: map_thing,
        }),
        gateway: Arc::new(skyledger_runtime::RecordedGatewayFactory::new("unused")),
    }
}

#[test]
fn test_registry_lists_resources_in_name_order() {
    let registry = registry(ScriptedGateway::new(widget_pages(0)));
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, vec!["Ledger", "Widget", "WidgetMetric"]);
    assert_eq!(registry.cloud_type(), "testcloud");
    assert!(registry.get("WidgetMetric").unwrap().metric_catalog().is_some());
    assert_eq!(
        registry.get("Ledger").unwrap().pagination(),
        Some(Pagination::Token)
    );
}

#[test]
fn test_duplicate_rejected() {
    let mut registry = ResourceRegistry::new("testcloud");
    registry.register(thing("Thing", widget_params())).unwrap();
    let err = registry.register(thing("Thing", widget_params())).unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate(name) if name == "Thing"));
}

#[test]
fn test_paged_resource_needs_paging_params() {
    let mut registry = ResourceRegistry::new("testcloud");
    let err = registry
        .register(thing("Thing", ParameterSchema::default()))
        .unwrap_err();
    assert!(matches!(err, RegistryError::MissingParam { ref param, .. } if param == "limit"));
}

#[test]
fn test_metric_parent_must_exist() {
    let mut registry = ResourceRegistry::new("testcloud");
    let err = registry
        .register(ResourceDescriptor {
            name: "ThingMetric",
            description: "",
            params: widget_params(),
            record: &METRIC_RECORD,
            scope: |_| Ok(Vec::new()),
            prepare: None,
            kind: ResourceKind::Metric(MetricSpec {
                parent: "Thing",
                endpoint: Endpoint::new("metrics", "DescribeMetricLast"),
                catalog: &EMPTY_CATALOG,
                detail: |_| serde_json::Map::new(),
            }),
            gateway: Arc::new(skyledger_runtime::RecordedGatewayFactory::new("unused")),
        })
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownParent { .. }));
}
