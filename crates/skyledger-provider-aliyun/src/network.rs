//! VPC networking: networks, subnets, interfaces, security groups, EIPs.

use crate::util::{detail, int, tags, text};
use crate::{region_filter, regional_params};
use serde_json::{Map, Value};
use skyledger_core::{AttributeSpec, ParamSpec, ParamType, RecordSchema};
use skyledger_params::{ParamError, ParameterSet};
use skyledger_runtime::registry::region_scope;
use skyledger_runtime::{
    Endpoint, FilterFn, GatewayFactory, MapFn, MapContext, MappedItem, PagedSpec, Pagination,
    ResourceDescriptor, ResourceKind, ScopeFn, SyncError,
};
use std::sync::Arc;

pub const NETWORK_ENDPOINT: Endpoint = Endpoint::new("vpc", "DescribeVpcs");
pub const SUBNET_ENDPOINT: Endpoint = Endpoint::new("vpc", "DescribeVSwitches");
pub const NIC_ENDPOINT: Endpoint = Endpoint::new("ecs", "DescribeNetworkInterfaces");
pub const SECURITY_GROUP_ENDPOINT: Endpoint = Endpoint::new("ecs", "DescribeSecurityGroups");
pub const FLOATING_IP_ENDPOINT: Endpoint = Endpoint::new("vpc", "DescribeEipAddresses");

pub static NETWORK: RecordSchema = RecordSchema {
    kind: "Network",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("Type"),
        AttributeSpec::string("Status"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("Description"),
        AttributeSpec::string("CIDR"),
    ],
};

pub static SUBNET: RecordSchema = RecordSchema {
    kind: "Subnet",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("CIDR"),
        AttributeSpec::string("Status"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("Description"),
        AttributeSpec::string("NetworkId"),
    ],
};

pub static NIC: RecordSchema = RecordSchema {
    kind: "Nic",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("CIDR"),
        AttributeSpec::string("Status"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("Description"),
        AttributeSpec::string("NetworkId"),
        AttributeSpec::string("SubnetId"),
        AttributeSpec::string("Tags"),
        AttributeSpec::string("InstanceId"),
    ],
};

pub static SECURITY_GROUP: RecordSchema = RecordSchema {
    kind: "SecurityGroup",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("Description"),
        AttributeSpec::string("Tags"),
    ],
};

pub static FLOATING_IP: RecordSchema = RecordSchema {
    kind: "FloatingIp",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("IpAddr").required(),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("ExpiredTime"),
        AttributeSpec::string("Bandwidth"),
        AttributeSpec::string("BindResourceId"),
        AttributeSpec::string("BindResourceType"),
    ],
};

pub fn descriptors(gateway: &Arc<dyn GatewayFactory>) -> Vec<ResourceDescriptor> {
    let network_param = ParamSpec::optional("network", ParamType::String);
    let subnet_param = ParamSpec::optional("subnet", ParamType::String);

    vec![
        paged(
            gateway,
            ("Network", "VPCs"),
            Vec::new(),
            &NETWORK,
            NETWORK_ENDPOINT,
            (region_scope, region_filter, map_network),
        ),
        paged(
            gateway,
            ("Subnet", "VSwitches, optionally of one VPC"),
            vec![network_param],
            &SUBNET,
            SUBNET_ENDPOINT,
            (subnet_scope, subnet_filter, map_subnet),
        ),
        paged(
            gateway,
            ("Nic", "elastic network interfaces, optionally of one VSwitch"),
            vec![subnet_param],
            &NIC,
            NIC_ENDPOINT,
            (nic_scope, nic_filter, map_nic),
        ),
        paged(
            gateway,
            ("SecurityGroup", "ECS security groups"),
            Vec::new(),
            &SECURITY_GROUP,
            SECURITY_GROUP_ENDPOINT,
            (region_scope, region_filter, map_security_group),
        ),
        paged(
            gateway,
            ("FloatingIp", "elastic IP addresses"),
            Vec::new(),
            &FLOATING_IP,
            FLOATING_IP_ENDPOINT,
            (region_scope, region_filter, map_floating_ip),
        ),
    ]
}

fn paged(
    gateway: &Arc<dyn GatewayFactory>,
    (name, description): (&'static str, &'static str),
    extra: Vec<ParamSpec>,
    record: &'static RecordSchema,
    endpoint: Endpoint,
    (scope, filter, map): (ScopeFn, FilterFn, MapFn),
) -> ResourceDescriptor {
    ResourceDescriptor {
        name,
        description,
        params: regional_params(extra),
        record,
        scope,
        prepare: None,
        kind: ResourceKind::Paged(PagedSpec {
            endpoint,
            pagination: Pagination::PageNumber,
            filter,
            map,
        }),
        gateway: gateway.clone(),
    }
}

/// Region filter plus `vendor_key` when `param` is set and non-empty.
fn narrowed(
    params: &ParameterSet,
    param: &str,
    vendor_key: &str,
) -> Result<Map<String, Value>, ParamError> {
    let mut filter = region_filter(params)?;
    if let Some(value) = params.non_empty_str(param) {
        filter.insert(vendor_key.to_string(), value.into());
    }
    Ok(filter)
}

/// Region scope plus `attribute` when `param` narrows the request.
fn narrowed_scope(
    params: &ParameterSet,
    param: &str,
    attribute: &'static str,
) -> Result<Vec<(&'static str, Value)>, ParamError> {
    let mut scope = region_scope(params)?;
    if let Some(value) = params.non_empty_str(param) {
        scope.push((attribute, value.into()));
    }
    Ok(scope)
}

fn subnet_scope(params: &ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError> {
    narrowed_scope(params, "network", "NetworkId")
}

fn nic_scope(params: &ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError> {
    narrowed_scope(params, "subnet", "SubnetId")
}

fn subnet_filter(params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    narrowed(params, "network", "VpcId")
}

fn nic_filter(params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    narrowed(params, "subnet", "VSwitchId")
}

fn map_network(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/VpcId"))
        .set("Name", text(raw, "/VpcName"))
        .set("Type", "vpc")
        .set("Status", text(raw, "/Status"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("Description", text(raw, "/Description"))
        .set("CIDR", text(raw, "/CidrBlock"));
    item.extra = detail([("VRouterId", text(raw, "/VRouterId").into())]);
    Ok(item)
}

fn map_subnet(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/VSwitchId"))
        .set("Name", text(raw, "/VSwitchName"))
        .set("CIDR", text(raw, "/CidrBlock"))
        .set("Status", text(raw, "/Status"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("Description", text(raw, "/Description"))
        .set("NetworkId", text(raw, "/VpcId"));
    item.extra = detail([
        ("ZoneId", text(raw, "/ZoneId").into()),
        ("ResourceGroupId", text(raw, "/ResourceGroupId").into()),
    ]);
    Ok(item)
}

fn map_nic(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/NetworkInterfaceId"))
        .set("Name", text(raw, "/NetworkInterfaceName"))
        .set("CIDR", text(raw, "/PrivateIpAddress"))
        .set("Status", text(raw, "/Status"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("Description", text(raw, "/Description"))
        .set("NetworkId", text(raw, "/VpcId"))
        .set("SubnetId", text(raw, "/VSwitchId"))
        .set("Tags", tags(raw, "/Tags"))
        .set("InstanceId", text(raw, "/InstanceId"));
    item.extra = detail([
        ("ZoneId", text(raw, "/ZoneId").into()),
        ("ResourceGroupId", text(raw, "/ResourceGroupId").into()),
        ("Type", text(raw, "/Type").into()),
        ("MacAddress", text(raw, "/MacAddress").into()),
    ]);
    let floating = text(raw, "/AssociatedPublicIp/PublicIpAddress");
    if !floating.is_empty() {
        item.extra("FloatingIp", floating);
    }
    Ok(item)
}

fn map_security_group(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/SecurityGroupId"))
        .set("Name", text(raw, "/SecurityGroupName"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("Description", text(raw, "/Description"))
        .set("Tags", tags(raw, "/Tags"));
    item.extra = detail([
        ("ResourceGroupId", text(raw, "/ResourceGroupId").into()),
        ("EcsCount", int(raw, "/EcsCount").into()),
        ("VpcId", text(raw, "/VpcId").into()),
        ("SecurityGroupType", text(raw, "/SecurityGroupType").into()),
    ]);
    Ok(item)
}

fn map_floating_ip(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/AllocationId"))
        .set("IpAddr", text(raw, "/IpAddress"))
        .set("CreateTime", text(raw, "/AllocationTime"))
        .set("ExpiredTime", text(raw, "/ExpiredTime"))
        .set("Bandwidth", text(raw, "/Bandwidth"))
        .set("BindResourceId", text(raw, "/InstanceId"))
        .set("BindResourceType", text(raw, "/InstanceType"));
    item.extra = detail([("ChargeType", text(raw, "/ChargeType").into())]);
    Ok(item)
}
