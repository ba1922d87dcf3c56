//! Shared test infrastructure for engine tests.
//!
//! This module provides:
//! - A scripted in-memory vendor gateway that counts requests
//! - A small registry of test resources (paged, token-paged and metric)
//! - Helpers for building call arguments

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use skyledger_core::{
    AttributeSpec, CanonicalRecord, Credential, ParamSpec, ParamType, ParameterSchema,
    RecordSchema,
};
use skyledger_params::{ParamError, ParameterSet};
use skyledger_runtime::metric::metric_params;
use skyledger_runtime::registry::{no_filter, paging_params, region_scope};
use skyledger_runtime::{
    Endpoint, GatewayFactory, METRIC_RECORD, MapContext, MappedItem, MetricCatalog,
    MetricDefinition, MetricSpec, PageRequest, PageSelector, PagedSpec, Pagination,
    ResourceDescriptor, ResourceKind, ResourceRegistry, Statistic, SyncEngine, SyncError,
    VendorGateway, VendorPage,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// SCRIPTED GATEWAY
// =============================================================================

type Responder = Box<dyn Fn(&PageRequest) -> VendorPage + Send + Sync>;

pub struct ScriptedGateway {
    calls: AtomicUsize,
    requests: Mutex<Vec<PageRequest>>,
    respond: Responder,
}

impl ScriptedGateway {
    pub fn new(respond: impl Fn(&PageRequest) -> VendorPage + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VendorGateway for ScriptedGateway {
    async fn fetch(&self, request: &PageRequest) -> anyhow::Result<VendorPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok((self.respond)(request))
    }
}

struct ScriptedFactory(Arc<ScriptedGateway>);

impl GatewayFactory for ScriptedFactory {
    fn connect(
        &self,
        _credential: &Credential,
        _endpoint: &Endpoint,
    ) -> anyhow::Result<Arc<dyn VendorGateway>> {
        let gateway: Arc<dyn VendorGateway> = self.0.clone();
        Ok(gateway)
    }
}

// =============================================================================
// VENDOR DATA
// =============================================================================

pub const WIDGET_ACTION: &str = "DescribeWidgets";
pub const LEDGER_ACTION: &str = "DescribeLedger";
pub const METRIC_ACTION: &str = "DescribeMetricLast";

/// `total` widgets served page by page.
pub fn widget_pages(total: usize) -> impl Fn(&PageRequest) -> VendorPage + Send + Sync + 'static {
    move |request| match (request.action.as_str(), &request.page) {
        (WIDGET_ACTION, PageSelector::Number(n)) => {
            let size = request.page_size as usize;
            let start = (*n as usize - 1) * size;
            let items = (start..total.min(start + size))
                .map(|i| json!({"WidgetId": format!("w-{}", i), "WidgetName": format!("widget {}", i)}))
                .collect();
            VendorPage::ok(items).with_total(total as i64)
        }
        (METRIC_ACTION, PageSelector::Unpaged) => {
            let dims: Vec<Value> =
                serde_json::from_str(request.filter["Dimensions"].as_str().unwrap()).unwrap();
            let points = dims
                .iter()
                .map(|d| json!({"instanceId": d["instanceId"], "timestamp": 1700000000000i64, "Average": 1.5, "Maximum": 3}))
                .collect();
            VendorPage::ok(points)
        }
        other => panic!("unexpected request {:?}", other),
    }
}

/// Ledger entries served three per token, ending after `total`.
pub fn ledger_tokens(total: usize) -> impl Fn(&PageRequest) -> VendorPage + Send + Sync + 'static {
    move |request| {
        let PageSelector::Token(token) = &request.page else {
            panic!("ledger is token paged");
        };
        let offset: usize = if token.is_empty() { 0 } else { token.trim_start_matches("tok-").parse().unwrap() };
        let end = total.min(offset + request.page_size as usize);
        let items = (offset..end)
            .map(|i| json!({"EntryId": format!("e-{}", i), "Amount": i}))
            .collect();
        let page = VendorPage::ok(items);
        if end < total {
            page.with_next_token(format!("tok-{}", end))
        } else {
            page
        }
    }
}

// =============================================================================
// TEST RESOURCES
// =============================================================================

static WIDGET: RecordSchema = RecordSchema {
    kind: "Widget",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
    ],
};

static LEDGER: RecordSchema = RecordSchema {
    kind: "LedgerEntry",
    regional: false,
    attributes: &[
        AttributeSpec::string("EntryId").required().identity(),
        AttributeSpec::new("Amount", skyledger_core::AttrType::Int),
    ],
};

static CATALOG: MetricCatalog = MetricCatalog {
    namespace: "test_widgets",
    metrics: &[
        MetricDefinition::new("Load", "%", &[Statistic::Average, Statistic::Maximum]),
        MetricDefinition::new("Traffic", "bit/s", &[Statistic::Value]).with_dimension("ip"),
    ],
};

fn map_widget(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", raw["WidgetId"].clone())
        .set("Name", raw["WidgetName"].clone());
    Ok(item)
}

fn map_entry(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("EntryId", raw["EntryId"].clone())
        .set("Amount", raw["Amount"].clone());
    Ok(item)
}

fn region_filter(params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    let mut filter = Map::new();
    filter.insert("RegionId".to_string(), params.str("region")?.into());
    Ok(filter)
}

fn normalize_region(mut params: ParameterSet) -> Result<ParameterSet, ParamError> {
    let region = params.str("region")?.trim().to_lowercase();
    params.insert("region", region);
    Ok(params)
}

fn no_scope(_params: &ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError> {
    Ok(Vec::new())
}

fn widget_detail(record: &CanonicalRecord) -> Map<String, Value> {
    let mut detail = Map::new();
    detail.insert("InstanceName".to_string(), record.get_str("Name").into());
    detail
}

pub fn widget_params() -> ParameterSchema {
    let mut params = vec![ParamSpec::required("region", ParamType::String)];
    params.extend(paging_params(Pagination::PageNumber));
    ParameterSchema::new(params)
}

/// Registry of `Widget`, `WidgetMetric` and `Ledger`, all served by `gateway`.
pub fn registry(gateway: Arc<ScriptedGateway>) -> ResourceRegistry {
    let factory: Arc<dyn GatewayFactory> = Arc::new(ScriptedFactory(gateway));
    let mut registry = ResourceRegistry::new("testcloud");

    registry
        .register(ResourceDescriptor {
            name: "Widget",
            description: "test widgets",
            params: widget_params(),
            record: &WIDGET,
            scope: region_scope,
            prepare: Some(normalize_region),
            kind: ResourceKind::Paged(PagedSpec {
                endpoint: Endpoint::new("test", WIDGET_ACTION),
                pagination: Pagination::PageNumber,
                filter: region_filter,
                map: map_widget,
            }),
            gateway: factory.clone(),
        })
        .unwrap();

    registry
        .register(ResourceDescriptor {
            name: "WidgetMetric",
            description: "latest widget metrics",
            params: ParameterSchema::new(metric_params()).merged_with(&widget_params()),
            record: &METRIC_RECORD,
            scope: region_scope,
            prepare: None,
            kind: ResourceKind::Metric(MetricSpec {
                parent: "Widget",
                endpoint: Endpoint::new("metrics", METRIC_ACTION),
                catalog: &CATALOG,
                detail: widget_detail,
            }),
            gateway: factory.clone(),
        })
        .unwrap();

    registry
        .register(ResourceDescriptor {
            name: "Ledger",
            description: "token paged ledger",
            params: ParameterSchema::new(paging_params(Pagination::Token)),
            record: &LEDGER,
            scope: no_scope,
            prepare: None,
            kind: ResourceKind::Paged(PagedSpec {
                endpoint: Endpoint::new("test", LEDGER_ACTION),
                pagination: Pagination::Token,
                filter: no_filter,
                map: map_entry,
            }),
            gateway: factory,
        })
        .unwrap();

    registry
}

pub fn engine(gateway: Arc<ScriptedGateway>) -> SyncEngine {
    SyncEngine::new(Arc::new(registry(gateway)))
}

pub fn credential() -> Credential {
    Credential::new("AKID", "secret", "1001")
}

pub fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}
