//! ECS block storage.

use crate::util::{detail, flag, int, list, tags, text};
use crate::{region_filter, regional_params};
use serde_json::{Value, json};
use skyledger_core::{AttrType, AttributeSpec, RecordSchema};
use skyledger_runtime::registry::region_scope;
use skyledger_runtime::{
    Endpoint, GatewayFactory, MapContext, MappedItem, PagedSpec, Pagination, ResourceDescriptor,
    ResourceKind, SyncError,
};
use std::sync::Arc;

pub const DISK_ENDPOINT: Endpoint = Endpoint::new("ecs", "DescribeDisks");

pub static DISK: RecordSchema = RecordSchema {
    kind: "Disk",
    regional: true,
    attributes: &[
        AttributeSpec::string("ProviderId").required().identity(),
        AttributeSpec::string("Name"),
        AttributeSpec::string("CreateTime"),
        AttributeSpec::string("Status"),
        AttributeSpec::new("Size", AttrType::Int),
        AttributeSpec::string("Type"),
        AttributeSpec::string("AttachedServer"),
        AttributeSpec::string("Category"),
        AttributeSpec::string("ExpiredTime"),
        AttributeSpec::string("Description"),
        AttributeSpec::string("Tags"),
        AttributeSpec::new("Attachments", AttrType::List),
    ],
};

pub fn descriptors(gateway: &Arc<dyn GatewayFactory>) -> Vec<ResourceDescriptor> {
    vec![ResourceDescriptor {
        name: "Disk",
        description: "ECS cloud disks",
        params: regional_params(Vec::new()),
        record: &DISK,
        scope: region_scope,
        prepare: None,
        kind: ResourceKind::Paged(PagedSpec {
            endpoint: DISK_ENDPOINT,
            pagination: Pagination::PageNumber,
            filter: region_filter,
            map: map_disk,
        }),
        gateway: gateway.clone(),
    }]
}

fn map_disk(raw: &Value, _ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let attachments: Vec<Value> = list(raw, "/Attachments/Attachment")
        .iter()
        .map(|att| {
            json!({
                "InstanceId": text(att, "/InstanceId"),
                "AttachedTime": text(att, "/AttachedTime"),
                "Device": text(att, "/Device"),
            })
        })
        .collect();

    let mut item = MappedItem::new();
    item.set("ProviderId", text(raw, "/DiskId"))
        .set("Name", text(raw, "/DiskName"))
        .set("CreateTime", text(raw, "/CreationTime"))
        .set("Status", text(raw, "/Status"))
        .set("Size", int(raw, "/Size"))
        .set("Type", text(raw, "/Type"))
        .set("AttachedServer", text(raw, "/InstanceId"))
        .set("Category", text(raw, "/Category"))
        .set("ExpiredTime", text(raw, "/ExpiredTime"))
        .set("Description", text(raw, "/Description"))
        .set("Tags", tags(raw, "/Tags"))
        .set("Attachments", attachments);

    item.extra = detail([
        ("ResourceGroupId", text(raw, "/ResourceGroupId").into()),
        ("Encrypted", flag(raw, "/Encrypted").into()),
        ("DeleteAutoSnapshot", flag(raw, "/DeleteAutoSnapshot").into()),
        ("MultiAttach", text(raw, "/MultiAttach").into()),
        ("ImageId", text(raw, "/ImageId").into()),
        ("ZoneId", text(raw, "/ZoneId").into()),
        ("Device", text(raw, "/Device").into()),
        ("SourceSnapshotId", text(raw, "/SourceSnapshotId").into()),
    ]);
    Ok(item)
}
