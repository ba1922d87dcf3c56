//! ECS instances and images.

use crate::util::{detail, flag, int, list, object, strings, tags, text};
use crate::{region_filter, regional_params};
use serde_json::{Map, Value, json};
use skyledger_core::{AttrType, AttributeSpec, ParamSpec, ParamType, RecordSchema};
use skyledger_params::{ParamError, ParameterSet};
use skyledger_runtime::registry::region_scope;
use skyledger_runtime::{
    Endpoint, GatewayFactory, MapContext, MappedItem, PagedSpec, Pagination, ResourceDescriptor,
    ResourceKind, SyncError,
};
use std::sync::Arc;

pub const SERVER_ENDPOINT: Endpoint = Endpoint::new("ecs", "DescribeInstances");
pub const IMAGE_ENDPOINT: Endpoint = Endpoint::new("ecs", "DescribeImages");

pub static SERVER: RecordSchema = RecordSchema {
    kind: "Server",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("ExpireTime"),
        AttributeSpec::string("Status"),
        AttributeSpec::string("PayMode"),
        AttributeSpec::new("AutoRenew", AttrType::Bool),
        AttributeSpec::string("FlavorId"),
        AttributeSpec::string("FlavorName"),
        AttributeSpec::new("FlavorRam", AttrType::Int),
        AttributeSpec::new("FlavorVCPU", AttrType::Int),
        AttributeSpec::new("FlavorExtra", AttrType::Map),
        AttributeSpec::string("ImageId"),
        AttributeSpec::string("ImageName"),
        AttributeSpec::string("ImageOsType"),
        AttributeSpec::new("ImageExtra", AttrType::Map),
        AttributeSpec::string("PrimaryNetworkId"),
        AttributeSpec::string("PrimarySubnetId"),
        AttributeSpec::string("PrimaryNicIp"),
        AttributeSpec::string("PrimaryNicFloatingIp"),
        AttributeSpec::new("SecondaryNics", AttrType::Map),
        AttributeSpec::new("SecurityGroups", AttrType::Map),
        AttributeSpec::string("Tags"),
    ],
};

pub static IMAGE: RecordSchema = RecordSchema {
    kind: "Image",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("OSType"),
        AttributeSpec::string("Status"),
        AttributeSpec::string("Tags"),
        AttributeSpec::new("Size", AttrType::Int),
        AttributeSpec::string("Description"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("OwnerAlias"),
    ],
};

pub fn descriptors(gateway: &Arc<dyn GatewayFactory>) -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            name: "Server",
            description: "ECS instances",
            params: regional_params(Vec::new()),
            record: &SERVER,
            scope: region_scope,
            prepare: None,
            kind: ResourceKind::Paged(PagedSpec {
                endpoint: SERVER_ENDPOINT,
                pagination: Pagination::PageNumber,
                filter: region_filter,
                map: map_server,
            }),
            gateway: gateway.clone(),
        },
        ResourceDescriptor {
            name: "Image",
            description: "ECS images visible to the account",
            params: regional_params(vec![
                ParamSpec::optional("image_owner", ParamType::String).with_default("self"),
            ]),
            record: &IMAGE,
            scope: image_scope,
            prepare: None,
            kind: ResourceKind::Paged(PagedSpec {
                endpoint: IMAGE_ENDPOINT,
                pagination: Pagination::PageNumber,
                filter: image_filter,
                map: map_image,
            }),
            gateway: gateway.clone(),
        },
    ]
}

fn map_server(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/InstanceId"))
        .set("Name", text(raw, "/InstanceName"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("ExpireTime", text(raw, "/ExpiredTime"))
        .set("Status", text(raw, "/Status"))
        .set("PayMode", text(raw, "/InstanceChargeType"))
        .set("AutoRenew", false)
        .set("FlavorId", text(raw, "/InstanceType"))
        .set("FlavorName", text(raw, "/InstanceType"))
        .set("FlavorRam", int(raw, "/Memory"))
        .set("FlavorVCPU", int(raw, "/Cpu"))
        .set(
            "FlavorExtra",
            json!({
                "CPUOptions": object(raw, "/CpuOptions"),
                "GPUAmount": int(raw, "/GPUAmount"),
                "GPUSpec": text(raw, "/GPUSpec"),
            }),
        )
        .set("ImageId", text(raw, "/ImageId"))
        .set("ImageName", text(raw, "/ImageId"))
        .set("ImageOsType", text(raw, "/OSType"))
        .set(
            "ImageExtra",
            json!({
                "ImageOsName": text(raw, "/OSName"),
                "ImageOsNameEn": text(raw, "/OSNameEn"),
            }),
        )
        .set("PrimaryNetworkId", text(raw, "/VpcAttributes/VpcId"))
        .set("PrimarySubnetId", text(raw, "/VpcAttributes/VSwitchId"))
        .set(
            "PrimaryNicIp",
            strings(raw, "/VpcAttributes/PrivateIpAddress/IpAddress").join(", "),
        )
        .set("PrimaryNicFloatingIp", floating_ip(raw))
        .set("SecondaryNics", secondary_nics(raw))
        .set("SecurityGroups", security_groups(raw))
        .set("Tags", tags(raw, "/Tags"));

    item.extra = detail([
        ("StoppedMode", text(raw, "/StoppedMode").into()),
        ("DeletionProtection", flag(raw, "/DeletionProtection").into()),
        ("InternetChargeType", text(raw, "/InternetChargeType").into()),
        ("AutoReleaseTime", text(raw, "/AutoReleaseTime").into()),
        ("InstanceTypeFamily", text(raw, "/InstanceTypeFamily").into()),
        ("ZoneId", text(raw, "/ZoneId").into()),
        ("ResourceGroup", text(raw, "/ResourceGroupId").into()),
    ]);
    Ok(item)
}

/// Public IP when assigned, else the bound EIP.
fn floating_ip(raw: &Value) -> String {
    let public = strings(raw, "/PublicIpAddress/IpAddress").concat();
    if public.is_empty() {
        text(raw, "/EipAddress/IpAddress")
    } else {
        public
    }
}

/// Non-primary interfaces: interface id → primary IP.
fn secondary_nics(raw: &Value) -> Map<String, Value> {
    list(raw, "/NetworkInterfaces/NetworkInterface")
        .iter()
        .filter(|nic| text(nic, "/Type") != "Primary")
        .map(|nic| {
            (
                text(nic, "/NetworkInterfaceId"),
                Value::from(text(nic, "/PrimaryIpAddress")),
            )
        })
        .collect()
}

fn security_groups(raw: &Value) -> Map<String, Value> {
    strings(raw, "/SecurityGroupIds/SecurityGroupId")
        .into_iter()
        .map(|id| (id.clone(), Value::from(id)))
        .collect()
}

/// An empty `image_owner` lists images of every owner.
fn image_filter(params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    let mut filter = region_filter(params)?;
    if let Some(owner) = params.non_empty_str("image_owner") {
        filter.insert("ImageOwnerAlias".to_string(), owner.into());
    }
    Ok(filter)
}

fn image_scope(params: &ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError> {
    let mut scope = region_scope(params)?;
    if let Some(owner) = params.non_empty_str("image_owner") {
        scope.push(("OwnerAlias", owner.into()));
    }
    Ok(scope)
}

fn map_image(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/ImageId"))
        .set("Name", text(raw, "/ImageName"))
        .set("OSType", text(raw, "/OSType"))
        .set("Status", text(raw, "/Status"))
        .set("Tags", tags(raw, "/Tags"))
        .set("Size", int(raw, "/Size"))
        .set("Description", text(raw, "/Description"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("OwnerAlias", text(raw, "/ImageOwnerAlias"));

    item.extra = detail([
        ("ImageFamily", text(raw, "/ImageFamily").into()),
        ("ResourceGroupId", text(raw, "/ResourceGroupId").into()),
        ("ProductCode", text(raw, "/ProductCode").into()),
        ("OSName", text(raw, "/OSName").into()),
        ("OSNameEn", text(raw, "/OSNameEn").into()),
        ("ImageVersion", text(raw, "/ImageVersion").into()),
        ("Platform", text(raw, "/Platform").into()),
    ]);
    Ok(item)
}
