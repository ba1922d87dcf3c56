//! Paged resource calls.

use crate::common::{
    ScriptedGateway, WIDGET_ACTION, args, credential, engine, ledger_tokens, widget_pages,
};
use serde_json::json;
use skyledger_params::ParamErrorKind;
use skyledger_runtime::{PageSelector, SyncError, VendorPage};

#[tokio::test]
async fn test_page_number_chain_walks_to_terminal() {
    let gateway = ScriptedGateway::new(widget_pages(120));
    let engine = engine(gateway.clone());

    let mut cursors = vec!["1".to_string()];
    let mut seen = 0;
    loop {
        let marker = cursors.last().unwrap().clone();
        let replay = engine
            .call(
                "Widget",
                &args(json!({"region": "cn-hangzhou", "marker": marker})),
                &credential(),
            )
            .await
            .unwrap();
        seen += replay.result.len();
        cursors.push(replay.next.clone());
        if replay.is_terminal() {
            break;
        }
    }

    assert_eq!(cursors, vec!["1", "2", "3", ""]);
    assert_eq!(seen, 120);
    assert_eq!(gateway.calls(), 3);
}

#[tokio::test]
async fn test_default_marker_and_limit() {
    let gateway = ScriptedGateway::new(widget_pages(10));
    let replay = engine(gateway.clone())
        .call("Widget", &args(json!({"region": "cn-hangzhou"})), &credential())
        .await
        .unwrap();

    assert_eq!(replay.next, "");
    assert_eq!(replay.result.len(), 10);
    let request = &gateway.requests()[0];
    assert_eq!(request.action, WIDGET_ACTION);
    assert_eq!(request.page, PageSelector::Number(1));
    assert_eq!(request.page_size, 50);
    assert_eq!(request.filter["RegionId"], json!("cn-hangzhou"));
}

#[tokio::test]
async fn test_records_carry_envelope_and_query() {
    let gateway = ScriptedGateway::new(widget_pages(2));
    let replay = engine(gateway)
        .call("Widget", &args(json!({"region": "cn-beijing"})), &credential())
        .await
        .unwrap();

    assert_eq!(replay.query["CloudType"], json!("testcloud"));
    assert_eq!(replay.query["AccountId"], json!("1001"));
    assert_eq!(replay.query["RegionId"], json!("cn-beijing"));

    let record = &replay.result[0];
    assert_eq!(record.cloud_type, "testcloud");
    assert_eq!(record.account_id, "1001");
    assert_eq!(record.region_id.as_deref(), Some("cn-beijing"));
    assert_eq!(record.get_str("ProviderId"), "w-0");
    assert!(!record.deleted);
}

#[tokio::test]
async fn test_prepared_params_feed_query_request_and_records() {
    let gateway = ScriptedGateway::new(widget_pages(1));
    let replay = engine(gateway.clone())
        .call("Widget", &args(json!({"region": " CN-Beijing "})), &credential())
        .await
        .unwrap();

    assert_eq!(replay.query["RegionId"], json!("cn-beijing"));
    assert_eq!(gateway.requests()[0].filter["RegionId"], json!("cn-beijing"));
    assert_eq!(replay.result[0].region_id.as_deref(), Some("cn-beijing"));
}

#[tokio::test]
async fn test_reissued_cursor_is_idempotent() {
    let gateway = ScriptedGateway::new(widget_pages(120));
    let engine = engine(gateway);
    let call_args = args(json!({"region": "cn-hangzhou", "marker": "2"}));

    let first = engine.call("Widget", &call_args, &credential()).await.unwrap();
    let second = engine.call("Widget", &call_args, &credential()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.next, "3");
}

#[tokio::test]
async fn test_empty_marker_makes_no_vendor_call() {
    let gateway = ScriptedGateway::new(widget_pages(120));
    let replay = engine(gateway.clone())
        .call(
            "Widget",
            &args(json!({"region": "cn-hangzhou", "marker": ""})),
            &credential(),
        )
        .await
        .unwrap();

    assert!(replay.is_terminal());
    assert!(replay.result.is_empty());
    assert_eq!(replay.query["RegionId"], json!("cn-hangzhou"));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_bad_marker_is_parse_error() {
    let gateway = ScriptedGateway::new(widget_pages(120));
    let err = engine(gateway.clone())
        .call(
            "Widget",
            &args(json!({"region": "cn-hangzhou", "marker": "abc"})),
            &credential(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Parse { ref marker, .. } if marker == "abc"));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let gateway = ScriptedGateway::new(widget_pages(1));
    let err = engine(gateway.clone())
        .call("Widget", &args(json!({})), &credential())
        .await
        .unwrap_err();

    match err {
        SyncError::Parameter { resource, source } => {
            assert_eq!(resource, "Widget");
            assert_eq!(source.kind, ParamErrorKind::MissingParam);
            assert_eq!(source.param, "region");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_unknown_resource() {
    let gateway = ScriptedGateway::new(widget_pages(1));
    let err = engine(gateway)
        .call("Gadget", &args(json!({})), &credential())
        .await
        .unwrap_err();
    let SyncError::Parameter { source, .. } = err else {
        panic!("expected parameter error");
    };
    assert_eq!(source.kind, ParamErrorKind::UnknownResource);
}

#[tokio::test]
async fn test_vendor_failure_returns_message() {
    let gateway = ScriptedGateway::new(|_| VendorPage::failed("InvalidAccessKeyId.NotFound"));
    let err = engine(gateway)
        .call("Widget", &args(json!({"region": "cn-hangzhou"})), &credential())
        .await
        .unwrap_err();

    match err {
        SyncError::Vendor { message, action, .. } => {
            assert_eq!(message, "InvalidAccessKeyId.NotFound");
            assert_eq!(action, WIDGET_ACTION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_item_section_is_contract_error() {
    let gateway = ScriptedGateway::new(|_| VendorPage {
        success: true,
        total: Some(3),
        ..Default::default()
    });
    let err = engine(gateway)
        .call("Widget", &args(json!({"region": "cn-hangzhou"})), &credential())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Contract { ref section, .. } if section == "items"));
}

#[tokio::test]
async fn test_missing_total_is_contract_error() {
    let gateway = ScriptedGateway::new(|_| VendorPage::ok(vec![json!({"WidgetId": "w-1"})]));
    let err = engine(gateway)
        .call("Widget", &args(json!({"region": "cn-hangzhou"})), &credential())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Contract { ref section, .. } if section == "TotalCount"));
}

#[tokio::test]
async fn test_largest_page_number_and_limit_end_the_chain() {
    let gateway = ScriptedGateway::new(|_| VendorPage::ok(Vec::new()).with_total(10));
    let replay = engine(gateway.clone())
        .call(
            "Widget",
            &args(json!({"region": "cn-hangzhou", "marker": "4294967295", "limit": 4294967295i64})),
            &credential(),
        )
        .await
        .unwrap();

    assert!(replay.is_terminal());
    let request = &gateway.requests()[0];
    assert_eq!(request.page, PageSelector::Number(u32::MAX));
    assert_eq!(request.page_size, u32::MAX);
}

#[tokio::test]
async fn test_page_number_past_largest_marker_is_parse_error() {
    let gateway = ScriptedGateway::new(|_| VendorPage::ok(Vec::new()).with_total(i64::MAX));
    let err = engine(gateway)
        .call(
            "Widget",
            &args(json!({"region": "cn-hangzhou", "marker": "4294967295", "limit": 1})),
            &credential(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Parse { ref marker, .. } if marker == "4294967295"));
}

#[tokio::test]
async fn test_one_bad_record_aborts_the_page() {
    let gateway = ScriptedGateway::new(|_| {
        VendorPage::ok(vec![
            json!({"WidgetId": "w-1", "WidgetName": "ok"}),
            json!({"WidgetName": "orphan"}),
        ])
        .with_total(2)
    });
    let err = engine(gateway)
        .call("Widget", &args(json!({"region": "cn-hangzhou"})), &credential())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "mapping error for Widget: Value[ProviderId] should not be empty"
    );
}

#[tokio::test]
async fn test_token_chain_follows_vendor_tokens() {
    let gateway = ScriptedGateway::new(ledger_tokens(7));
    let engine = engine(gateway.clone());

    let mut marker = String::new();
    let mut cursors = Vec::new();
    let mut entries = 0;
    loop {
        let replay = engine
            .call("Ledger", &args(json!({"marker": marker, "limit": 3})), &credential())
            .await
            .unwrap();
        entries += replay.result.len();
        cursors.push(replay.next.clone());
        assert!(!replay.query.contains_key("RegionId"));
        if replay.is_terminal() {
            break;
        }
        marker = replay.next;
    }

    assert_eq!(cursors, vec!["tok-3", "tok-6", ""]);
    assert_eq!(entries, 7);
    assert_eq!(gateway.requests()[0].page, PageSelector::Token(String::new()));
}
