//! Metric sub-resource calls.

use crate::common::{METRIC_ACTION, ScriptedGateway, args, credential, engine, widget_pages};
use serde_json::json;
use skyledger_params::ParamErrorKind;
use skyledger_runtime::{PageSelector, SyncError};

#[tokio::test]
async fn test_metrics_expand_per_statistic() {
    let gateway = ScriptedGateway::new(widget_pages(2));
    let replay = engine(gateway.clone())
        .call(
            "WidgetMetric",
            &args(json!({"region": "cn-hangzhou", "metric_names": ["Load", "Traffic"]})),
            &credential(),
        )
        .await
        .unwrap();

    // one parent page plus one request per metric
    assert_eq!(gateway.calls(), 3);
    // 2 instances x (2 Load stats + 1 Traffic stat)
    assert_eq!(replay.result.len(), 6);
    assert_eq!(replay.next, "");

    let names: Vec<&str> = replay.result.iter().map(|r| r.get_str("Name")).collect();
    assert!(names.contains(&"Load.Average"));
    assert!(names.contains(&"Load.Maximum"));
    assert!(names.contains(&"Traffic.Value/ip"));

    let load = replay
        .result
        .iter()
        .find(|r| r.get_str("Name") == "Load.Average" && r.get_str("InstanceId") == "w-1")
        .unwrap();
    assert_eq!(load.get_str("Value"), "1.5");
    assert_eq!(load.get_str("Unit"), "%");
    assert_eq!(load.extra["InstanceName"], json!("widget 1"));
    assert_eq!(load.extra["Region"], json!("cn-hangzhou"));

    let traffic = replay
        .result
        .iter()
        .find(|r| r.get_str("Name") == "Traffic.Value/ip")
        .unwrap();
    assert_eq!(traffic.get_str("Value"), "");
}

#[tokio::test]
async fn test_metric_request_shape() {
    let gateway = ScriptedGateway::new(widget_pages(2));
    engine(gateway.clone())
        .call(
            "WidgetMetric",
            &args(json!({"region": "cn-hangzhou", "metric_names": "Load", "period": "300"})),
            &credential(),
        )
        .await
        .unwrap();

    let requests = gateway.requests();
    let metric = requests.iter().find(|r| r.action == METRIC_ACTION).unwrap();
    assert_eq!(metric.page, PageSelector::Unpaged);
    assert_eq!(metric.filter["Namespace"], json!("test_widgets"));
    assert_eq!(metric.filter["MetricName"], json!("Load"));
    assert_eq!(metric.filter["Period"], json!("300"));
    assert_eq!(
        metric.filter["Dimensions"],
        json!(r#"[{"instanceId":"w-0"},{"instanceId":"w-1"}]"#)
    );
}

#[tokio::test]
async fn test_metric_chain_follows_parent_cursor() {
    let gateway = ScriptedGateway::new(widget_pages(120));
    let replay = engine(gateway)
        .call(
            "WidgetMetric",
            &args(json!({"region": "cn-hangzhou", "metric_names": ["Load"], "marker": "2"})),
            &credential(),
        )
        .await
        .unwrap();

    assert_eq!(replay.next, "3");
    assert_eq!(replay.result.len(), 100);
    assert_eq!(replay.query["RegionId"], json!("cn-hangzhou"));
}

#[tokio::test]
async fn test_unknown_metric_rejected_before_any_request() {
    let gateway = ScriptedGateway::new(widget_pages(2));
    let err = engine(gateway.clone())
        .call(
            "WidgetMetric",
            &args(json!({"region": "cn-hangzhou", "metric_names": ["Load", "Humidity"]})),
            &credential(),
        )
        .await
        .unwrap_err();

    match err {
        SyncError::Parameter { source, .. } => {
            assert_eq!(source.kind, ParamErrorKind::UnknownMetric);
            assert_eq!(source.param, "Humidity");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_empty_parent_page_skips_metric_requests() {
    let gateway = ScriptedGateway::new(widget_pages(0));
    let replay = engine(gateway.clone())
        .call(
            "WidgetMetric",
            &args(json!({"region": "cn-hangzhou", "metric_names": ["Load"]})),
            &credential(),
        )
        .await
        .unwrap();

    assert!(replay.result.is_empty());
    assert!(replay.is_terminal());
    assert_eq!(gateway.calls(), 1);
}
