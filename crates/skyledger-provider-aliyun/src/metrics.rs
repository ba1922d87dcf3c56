//! CloudMonitor metrics of ECS instances and EIPs.

use crate::compute::SERVER;
use crate::network::FLOATING_IP;
use crate::util::detail;
use serde_json::{Map, Value};
use skyledger_core::{CanonicalRecord, ParameterSchema, RecordSchema};
use skyledger_runtime::metric::metric_params;
use skyledger_runtime::registry::region_scope;
use skyledger_runtime::Statistic::{Average, Maximum, Minimum, Sum, Value as Latest};
use skyledger_runtime::{
    DetailFn, Endpoint, GatewayFactory, METRIC_RECORD, MetricCatalog, MetricDefinition,
    MetricSpec, ResourceDescriptor, ResourceKind, ResourceRegistry, Statistic,
};
use std::sync::Arc;

pub const METRIC_ENDPOINT: Endpoint = Endpoint::new("metrics", "DescribeMetricLast");

const AVG_MIN_MAX: &[Statistic] = &[Average, Minimum, Maximum];
const AVG_MIN_MAX_SUM: &[Statistic] = &[Average, Minimum, Maximum, Sum];

pub static ECS_CATALOG: MetricCatalog = MetricCatalog {
    namespace: "acs_ecs_dashboard",
    metrics: &[
        MetricDefinition::new("AdvanceCredit", "Count", AVG_MIN_MAX),
        MetricDefinition::new("BurstCredit", "Count", AVG_MIN_MAX),
        MetricDefinition::new("CPUUtilization", "%", AVG_MIN_MAX),
        MetricDefinition::new("DiskReadBPS", "Byte/s", AVG_MIN_MAX),
        MetricDefinition::new("DiskReadIOPS", "Count/Second", AVG_MIN_MAX),
        MetricDefinition::new("DiskWriteBPS", "Byte/s", AVG_MIN_MAX),
        MetricDefinition::new("DiskWriteIOPS", "Count/Second", AVG_MIN_MAX),
        MetricDefinition::new("InternetIn", "Byte", AVG_MIN_MAX_SUM),
        MetricDefinition::new("InternetInRate", "bit/s", AVG_MIN_MAX),
        MetricDefinition::new("InternetOut", "Byte", AVG_MIN_MAX_SUM),
        MetricDefinition::new("InternetOutRate", "bit/s", AVG_MIN_MAX),
        MetricDefinition::new("InternetOutRate_Percent", "%", &[Average]),
        MetricDefinition::new("IntranetIn", "Byte", AVG_MIN_MAX_SUM),
        MetricDefinition::new("IntranetInRate", "bit/s", AVG_MIN_MAX),
        MetricDefinition::new("IntranetOut", "Byte", AVG_MIN_MAX_SUM),
        MetricDefinition::new("IntranetOutRate", "bit/s", AVG_MIN_MAX),
        MetricDefinition::new("NotpaidSurplusCredit", "Count", AVG_MIN_MAX),
        MetricDefinition::new("TotalCredit", "Count", AVG_MIN_MAX),
        MetricDefinition::new("VPC_PublicIP_InternetInRate", "bit/s", AVG_MIN_MAX)
            .with_dimension("ip"),
        MetricDefinition::new("VPC_PublicIP_InternetOutRate", "bit/s", AVG_MIN_MAX)
            .with_dimension("ip"),
        MetricDefinition::new("VPC_PublicIP_InternetOutRate_Percent", "%", &[Average])
            .with_dimension("ip"),
        MetricDefinition::new("aep_bw_read", "MB/s", &[Average]).with_dimension("aepName"),
        MetricDefinition::new("aep_bw_write", "MB/s", &[Average]).with_dimension("aepName"),
        MetricDefinition::new("aep_iops_read", "Count", &[Average]).with_dimension("aepName"),
        MetricDefinition::new("aep_iops_write", "Count", &[Average]).with_dimension("aepName"),
        MetricDefinition::new("concurrentConnections", "Count", &[Maximum]),
        MetricDefinition::new("eip_InternetInRate", "bit/s", &[Latest]),
        MetricDefinition::new("eip_InternetOutRate", "bit/s", &[Latest]),
    ],
};

pub static EIP_CATALOG: MetricCatalog = MetricCatalog {
    namespace: "acs_vpc_eip",
    metrics: &[
        MetricDefinition::new("net.rx", "Byte", AVG_MIN_MAX_SUM),
        MetricDefinition::new("net.tx", "Byte", AVG_MIN_MAX_SUM),
        MetricDefinition::new("net.rxPkgs", "Count", AVG_MIN_MAX_SUM),
        MetricDefinition::new("net.txPkgs", "Count", AVG_MIN_MAX_SUM),
        MetricDefinition::new("net_rx.rate", "bit/s", &[Latest]),
        MetricDefinition::new("net_tx.rate", "bit/s", &[Latest]),
        MetricDefinition::new("net_rxPkgs.rate", "Packets/Second", &[Latest]),
        MetricDefinition::new("net_txPkgs.rate", "Packets/Second", &[Latest]),
        MetricDefinition::new("out_ratelimit_drop_speed", "Packets/Second", &[Average]),
        MetricDefinition::new("net_in.rate_percentage", "%", AVG_MIN_MAX),
        MetricDefinition::new("net_out.rate_percentage", "%", AVG_MIN_MAX),
    ],
};

/// Metric resources. Their parents must already be in `registry`.
pub fn descriptors(
    gateway: &Arc<dyn GatewayFactory>,
    registry: &ResourceRegistry,
) -> Vec<ResourceDescriptor> {
    let metric = |name: &'static str,
                  description: &'static str,
                  parent: &'static RecordSchema,
                  catalog: &'static MetricCatalog,
                  detail: DetailFn| {
        // parents that failed to register surface as UnknownParent on register
        let parent_params = registry
            .get(parent.kind)
            .map(|d| d.params.clone())
            .unwrap_or_default();
        ResourceDescriptor {
            name,
            description,
            params: ParameterSchema::new(metric_params()).merged_with(&parent_params),
            record: &METRIC_RECORD,
            scope: region_scope,
            prepare: None,
            kind: ResourceKind::Metric(MetricSpec {
                parent: parent.kind,
                endpoint: METRIC_ENDPOINT,
                catalog,
                detail,
            }),
            gateway: gateway.clone(),
        }
    };

    vec![
        metric(
            "ServerMetric",
            "latest CloudMonitor datapoints of a page of ECS instances",
            &SERVER,
            &ECS_CATALOG,
            server_detail as DetailFn,
        ),
        metric(
            "FloatingIpMetric",
            "latest CloudMonitor datapoints of a page of EIPs",
            &FLOATING_IP,
            &EIP_CATALOG,
            floating_ip_detail as DetailFn,
        ),
    ]
}

fn server_detail(server: &CanonicalRecord) -> Map<String, Value> {
    detail([
        ("InstanceName", server.get_str("Name").into()),
        ("PrimaryNicIp", server.get_str("PrimaryNicIp").into()),
        ("PrimaryNicFloatingIp", server.get_str("PrimaryNicFloatingIp").into()),
    ])
}

fn floating_ip_detail(eip: &CanonicalRecord) -> Map<String, Value> {
    detail([
        ("IpAddr", eip.get_str("IpAddr").into()),
        ("Bandwidth", eip.get_str("Bandwidth").into()),
    ])
}
