//! Metric sub-resources.
//!
//! A metric resource rides on a paged parent: the parent page is fetched
//! first, then the latest datapoint of every requested metric is read for the
//! instances on that page. Metric names are checked against a static catalog
//! before anything touches the network.

use crate::mapper::MappedItem;
use serde::Serialize;
use serde_json::{Map, Value, json};
use skyledger_core::{AttrType, AttributeSpec, ParamSpec, ParamType, RecordSchema};
use skyledger_params::ParamError;
use std::fmt;

/// Aggregation reported for a metric datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Statistic {
    Average,
    Minimum,
    Maximum,
    Sum,
    Value,
}

impl Statistic {
    /// Key of this statistic in a datapoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::Sum => "Sum",
            Statistic::Value => "Value",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub statistics: &'static [Statistic],
    pub unit: &'static str,
    /// Extra dimension the vendor splits the series by, e.g. `ip`.
    pub extra_dimension: Option<&'static str>,
}

impl MetricDefinition {
    pub const fn new(
        name: &'static str,
        unit: &'static str,
        statistics: &'static [Statistic],
    ) -> Self {
        Self {
            name,
            statistics,
            unit,
            extra_dimension: None,
        }
    }

    pub const fn with_dimension(self, dimension: &'static str) -> Self {
        Self {
            extra_dimension: Some(dimension),
            ..self
        }
    }

    /// Record name of one statistic: `<metric>.<stat>[/<dimension>]`.
    pub fn series_name(&self, statistic: Statistic) -> String {
        match self.extra_dimension {
            Some(dimension) => format!("{}.{}/{}", self.name, statistic, dimension),
            None => format!("{}.{}", self.name, statistic),
        }
    }
}

/// Metrics available in one vendor namespace.
#[derive(Debug, Serialize)]
pub struct MetricCatalog {
    pub namespace: &'static str,
    pub metrics: &'static [MetricDefinition],
}

impl MetricCatalog {
    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Look up every requested name, failing on the first unregistered one.
    pub fn resolve(
        &self,
        resource: &str,
        names: &[String],
    ) -> Result<Vec<&MetricDefinition>, ParamError> {
        if names.is_empty() {
            return Err(ParamError::invalid_value(
                "metric_names",
                "at least one metric is required",
            ));
        }
        names
            .iter()
            .map(|name| {
                let name = name.trim();
                self.get(name)
                    .ok_or_else(|| ParamError::unknown_metric(resource, name))
            })
            .collect()
    }
}

/// Canonical record of one metric series value.
pub static METRIC_RECORD: RecordSchema = RecordSchema {
    kind: "Metric",
    regional: true,
    attributes: &[
        AttributeSpec::string("InstanceId").required().identity(),
        AttributeSpec::string("Name").required().identity(),
        AttributeSpec::new("MetricTime", AttrType::Float).identity(),
        AttributeSpec::string("Value"),
        AttributeSpec::string("Unit"),
    ],
};

/// Parameters every metric resource adds to its parent's.
pub fn metric_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::required("metric_names", ParamType::Slice),
        ParamSpec::optional("period", ParamType::Int)
            .with_default(60)
            .with_minimum(1),
    ]
}

/// Vendor dimension filter selecting `instance_ids`.
pub fn dimensions<'a>(instance_ids: impl IntoIterator<Item = &'a str>) -> String {
    let dims: Vec<Value> = instance_ids
        .into_iter()
        .map(|id| json!({ "instanceId": id }))
        .collect();
    Value::Array(dims).to_string()
}

/// Expand one datapoint into one item per catalog statistic.
///
/// `detail` is the parent-specific Extra for the instance the point belongs
/// to, empty when the parent page does not contain it.
pub fn expand_datapoint(
    definition: &MetricDefinition,
    point: &Value,
    detail: &Map<String, Value>,
) -> Vec<MappedItem> {
    let instance_id = point.get("instanceId").cloned().unwrap_or(Value::Null);
    let timestamp = point.get("timestamp").cloned().unwrap_or(Value::Null);

    definition
        .statistics
        .iter()
        .map(|stat| {
            let value = match point.get(stat.as_str()) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            let mut item = MappedItem::new();
            item.set("InstanceId", instance_id.clone())
                .set("Name", definition.series_name(*stat))
                .set("MetricTime", timestamp.clone())
                .set("Value", value)
                .set("Unit", definition.unit);
            item.extra = detail.clone();
            item
        })
        .collect()
}
