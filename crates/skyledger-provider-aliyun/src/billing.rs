//! BSS instance bills.

use crate::util::{detail, float, text};
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use skyledger_core::{AttrType, AttributeSpec, ParamSpec, ParamType, ParameterSchema, RecordSchema};
use skyledger_params::{ParamError, ParameterSet};
use skyledger_runtime::registry::paging_params;
use skyledger_runtime::{
    Endpoint, GatewayFactory, MapContext, MappedItem, PagedSpec, Pagination, ResourceDescriptor,
    ResourceKind, SyncError,
};
use std::sync::Arc;

pub const BILL_ENDPOINT: Endpoint = Endpoint::new("business", "DescribeInstanceBill");

/// `billing_cycle` value meaning the current month.
pub const CURRENT_CYCLE: &str = "current";

pub static INSTANCE_BILL: RecordSchema = RecordSchema {
    kind: "InstanceBill",
    regional: false,
    attributes: &[
        AttributeSpec::string("Region"),
        AttributeSpec::string("InstanceId").required().identity(),
        AttributeSpec::string("InstanceName"),
        AttributeSpec::string("BillingCycle").required().identity(),
        AttributeSpec::string("BillingDate").identity(),
        AttributeSpec::string("SubscriptionType"),
        AttributeSpec::string("ProductCode").identity(),
        AttributeSpec::string("ProductName"),
        AttributeSpec::string("ItemAction").identity(),
        AttributeSpec::new("PretaxGrossAmount", AttrType::Float),
        AttributeSpec::new("PretaxAmount", AttrType::Float),
        AttributeSpec::new("DeductionAmount", AttrType::Float),
        AttributeSpec::string("Tags"),
    ],
};

pub fn descriptors(gateway: &Arc<dyn GatewayFactory>) -> Vec<ResourceDescriptor> {
    let mut params = vec![
        ParamSpec::required("billing_cycle", ParamType::String),
        ParamSpec::optional("is_hide_zero_charge", ParamType::Bool).with_default(false),
        ParamSpec::optional("subscription_type", ParamType::String).with_default(""),
    ];
    params.extend(paging_params(Pagination::Token));

    vec![ResourceDescriptor {
        name: "InstanceBill",
        description: "per-instance bill lines of one billing cycle",
        params: ParameterSchema::new(params),
        record: &INSTANCE_BILL,
        scope: bill_scope,
        prepare: Some(prepare_bill),
        kind: ResourceKind::Paged(PagedSpec {
            endpoint: BILL_ENDPOINT,
            pagination: Pagination::Token,
            filter: bill_filter,
            map: map_bill,
        }),
        gateway: gateway.clone(),
    }]
}

/// Resolve a `billing_cycle` argument to `YYYY-MM`.
///
/// `current` is the month of `today`; anything else must already be a valid
/// `YYYY-MM`.
pub fn resolve_cycle(raw: &str, today: NaiveDate) -> Result<String, ParamError> {
    let cycle = raw.trim();
    if cycle == CURRENT_CYCLE {
        return Ok(today.format("%Y-%m").to_string());
    }
    let well_formed = cycle.len() == 7
        && NaiveDate::parse_from_str(&format!("{cycle}-01"), "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(ParamError::invalid_value(
            "billing_cycle",
            "expected YYYY-MM or \"current\"",
        ));
    }
    Ok(cycle.to_string())
}

/// Pins `billing_cycle` to one month for the whole call.
fn prepare_bill(mut params: ParameterSet) -> Result<ParameterSet, ParamError> {
    let cycle = resolve_cycle(params.str("billing_cycle")?, Local::now().date_naive())?;
    params.insert("billing_cycle", cycle);
    Ok(params)
}

fn bill_scope(params: &ParameterSet) -> Result<Vec<(&'static str, Value)>, ParamError> {
    Ok(vec![("BillingCycle", params.str("billing_cycle")?.into())])
}

fn bill_filter(params: &ParameterSet) -> Result<Map<String, Value>, ParamError> {
    let mut filter = Map::new();
    filter.insert(
        "BillingCycle".to_string(),
        params.str("billing_cycle")?.into(),
    );
    filter.insert(
        "IsHideZeroCharge".to_string(),
        params.bool("is_hide_zero_charge")?.into(),
    );
    if let Some(subscription) = params.non_empty_str("subscription_type") {
        filter.insert("SubscriptionType".to_string(), subscription.into());
    }
    Ok(filter)
}

fn map_bill(raw: &Value, ctx: &MapContext<'_>) -> Result<MappedItem, SyncError> {
    let cycle = ctx
        .params
        .str("billing_cycle")
        .map_err(|e| SyncError::parameter(INSTANCE_BILL.kind, e))?;
    let gross = float(raw, "/PretaxGrossAmount");
    let pretax = float(raw, "/PretaxAmount");

    let mut item = MappedItem::new();
    item.set("Region", text(raw, "/Region"))
        .set("InstanceId", text(raw, "/InstanceID"))
        .set("InstanceName", text(raw, "/NickName"))
        .set("BillingCycle", cycle)
        .set("BillingDate", text(raw, "/BillingDate"))
        .set("SubscriptionType", text(raw, "/SubscriptionType"))
        .set("ProductCode", text(raw, "/ProductCode"))
        .set("ProductName", text(raw, "/ProductName"))
        .set("ItemAction", text(raw, "/Item"))
        .set("PretaxGrossAmount", gross)
        .set("PretaxAmount", pretax)
        .set("DeductionAmount", gross - pretax)
        .set("Tags", text(raw, "/Tag"));

    item.extra = detail([
        ("InstanceConfig", text(raw, "/InstanceConfig").into()),
        ("InstanceSpec", text(raw, "/InstanceSpec").into()),
        ("DeductedByCashCoupons", float(raw, "/DeductedByCashCoupons").into()),
        ("DeductedByPrepaidCard", float(raw, "/DeductedByPrepaidCard").into()),
        ("DeductedByCoupons", float(raw, "/DeductedByCoupons").into()),
        ("DeductedByResourcePackage", text(raw, "/DeductedByResourcePackage").into()),
        ("OutstandingAmount", float(raw, "/OutstandingAmount").into()),
        ("ResourceGroup", text(raw, "/ResourceGroup").into()),
        ("Zone", text(raw, "/Zone").into()),
        ("Currency", text(raw, "/Currency").into()),
    ]);
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skyledger_params::ParamValidator;
    use skyledger_runtime::RecordMapper;

    fn params(args: Value) -> ParameterSet {
        let gateway: Arc<dyn GatewayFactory> =
            Arc::new(skyledger_runtime::RecordedGatewayFactory::new("unused"));
        let descriptor = descriptors(&gateway).remove(0);
        ParamValidator::new(&descriptor.params)
            .validate(args.as_object().unwrap())
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_cycle_is_month_of_today() {
        assert_eq!(resolve_cycle("current", day(2024, 1, 31)).unwrap(), "2024-01");
        assert_eq!(resolve_cycle(" current ", day(2024, 2, 1)).unwrap(), "2024-02");
        assert_eq!(resolve_cycle("2023-11", day(2024, 2, 1)).unwrap(), "2023-11");
    }

    #[test]
    fn test_billing_cycle_rejects_malformed() {
        for bad in ["2024-13", "2024-1", "24-01", "March", ""] {
            let err = resolve_cycle(bad, day(2024, 1, 31)).unwrap_err();
            assert_eq!(err.param, "billing_cycle", "{bad}");
        }
        let err = prepare_bill(params(json!({"billing_cycle": "2024-13"}))).unwrap_err();
        assert_eq!(err.param, "billing_cycle");
    }

    #[test]
    fn test_prepared_cycle_is_shared_by_scope_filter_and_records() {
        let prepared = prepare_bill(params(json!({"billing_cycle": "current"}))).unwrap();
        let cycle = prepared.str("billing_cycle").unwrap().to_string();
        assert_ne!(cycle, CURRENT_CYCLE);
        assert!(resolve_cycle(&cycle, day(2000, 1, 1)).is_ok());

        assert_eq!(bill_scope(&prepared).unwrap(), vec![("BillingCycle", json!(cycle))]);
        assert_eq!(bill_filter(&prepared).unwrap()["BillingCycle"], json!(cycle));

        let ctx = MapContext {
            cloud_type: crate::CLOUD_TYPE,
            account_id: "1001",
            region_id: None,
            params: &prepared,
        };
        let raw = json!({"InstanceID": "i-1", "Item": "PayAsYouGoBill"});
        let record = RecordMapper::new(&INSTANCE_BILL, "InstanceBill")
            .map(&raw, &ctx, map_bill)
            .unwrap();
        assert_eq!(record.get_str("BillingCycle"), cycle);
    }

    #[test]
    fn test_filter_omits_empty_subscription() {
        let filter = bill_filter(&params(json!({"billing_cycle": "2024-02"}))).unwrap();
        assert_eq!(filter["BillingCycle"], json!("2024-02"));
        assert_eq!(filter["IsHideZeroCharge"], json!(false));
        assert!(!filter.contains_key("SubscriptionType"));

        let filter = bill_filter(&params(
            json!({"billing_cycle": "2024-02", "subscription_type": "PayAsYouGo"}),
        ))
        .unwrap();
        assert_eq!(filter["SubscriptionType"], json!("PayAsYouGo"));
    }

    #[test]
    fn test_deduction_amount() {
        let params = params(json!({"billing_cycle": "2024-02"}));
        let ctx = MapContext {
            cloud_type: crate::CLOUD_TYPE,
            account_id: "1001",
            region_id: None,
            params: &params,
        };
        let raw = json!({
            "InstanceID": "i-1",
            "BillingDate": "2024-02-03",
            "ProductCode": "ecs",
            "Item": "PayAsYouGoBill",
            "PretaxGrossAmount": 12.5,
            "PretaxAmount": 10.0,
            "Currency": "CNY"
        });
        let record = RecordMapper::new(&INSTANCE_BILL, "InstanceBill")
            .map(&raw, &ctx, map_bill)
            .unwrap();
        assert_eq!(record.get_str("BillingCycle"), "2024-02");
        assert_eq!(record.attributes["DeductionAmount"], json!(2.5));
        assert_eq!(record.get_str("ItemAction"), "PayAsYouGoBill");
        assert_eq!(record.extra["Currency"], json!("CNY"));
        assert!(record.region_id.is_none());
    }
}
