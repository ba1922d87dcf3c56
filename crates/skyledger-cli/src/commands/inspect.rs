//! Registry introspection commands.
//!
//! `skyledger resources` - List resources and their parameters.
//! `skyledger describe` - Parameters, record attributes and query keys of one resource.
//! `skyledger metrics` - Metric catalog of a metric resource.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use skyledger_core::{ParamSpec, ParameterSchema};
use skyledger_params::ParamValidator;
use skyledger_runtime::{ResourceDescriptor, ResourceKind, SyncEngine};

/// Account id shown in query descriptors previewed without a credential.
const PREVIEW_ACCOUNT: &str = "<account>";

pub fn resources(engine: &SyncEngine) -> Result<()> {
    let registry = engine.registry();
    println!("Resources for {} ({}):", registry.cloud_type(), registry.len());
    for descriptor in registry.iter() {
        println!("  {} [{}]", descriptor.name, descriptor.endpoint());
        println!("    {}", descriptor.description);
        println!("    params: {}", param_summary(&descriptor.params));
    }
    Ok(())
}

pub fn describe(engine: &SyncEngine, resource: &str, args: &Map<String, Value>) -> Result<()> {
    let descriptor = lookup(engine, resource)?;
    let registry = engine.registry();

    println!("{} ({})", descriptor.name, descriptor.description);
    println!("  endpoint: {}", descriptor.endpoint());
    match &descriptor.kind {
        ResourceKind::Paged(spec) => println!("  pagination: {:?}", spec.pagination),
        ResourceKind::Metric(spec) => println!("  parent: {}", spec.parent),
    }

    println!("\nParameters:");
    for spec in descriptor.params.params() {
        println!("  {}", describe_param(spec));
    }

    let record = descriptor.record;
    println!(
        "\nRecord {} ({}):",
        record.kind,
        if record.regional { "regional" } else { "global" }
    );
    for attr in record.attributes {
        let mut flags = Vec::new();
        if attr.required {
            flags.push("required");
        }
        if attr.identity {
            flags.push("identity");
        }
        if flags.is_empty() {
            println!("  {:<24} {:?}", attr.name, attr.kind);
        } else {
            println!("  {:<24} {:?} ({})", attr.name, attr.kind, flags.join(", "));
        }
    }

    // query extras depend on the arguments, so preview them when they validate
    let params = ParamValidator::new(&descriptor.params).validate(args);
    match params {
        Ok(params) => {
            let params = descriptor.prepared(params)?;
            let query = descriptor
                .query(registry.cloud_type(), PREVIEW_ACCOUNT, &params)
                .context("Failed to build query descriptor")?;
            println!("\nQuery: {}", serde_json::to_string(&query)?);
        }
        Err(err) => println!("\nQuery: pass --arg to preview ({})", err),
    }
    Ok(())
}

pub fn metrics(engine: &SyncEngine, resource: &str) -> Result<()> {
    let descriptor = lookup(engine, resource)?;
    let Some(catalog) = descriptor.metric_catalog() else {
        bail!("{} is not a metric resource", resource);
    };

    println!(
        "{} metrics in {} ({}):",
        descriptor.name,
        catalog.namespace,
        catalog.metrics.len()
    );
    for metric in catalog.metrics {
        let stats: Vec<&str> = metric.statistics.iter().map(|s| s.as_str()).collect();
        print!("  {:<40} {:<16} {}", metric.name, metric.unit, stats.join(","));
        match metric.extra_dimension {
            Some(dim) => println!(" [by {}]", dim),
            None => println!(),
        }
    }
    Ok(())
}

fn lookup<'a>(engine: &'a SyncEngine, resource: &str) -> Result<&'a ResourceDescriptor> {
    match engine.registry().get(resource) {
        Some(descriptor) => Ok(descriptor),
        None => bail!(
            "unknown resource {} (known: {})",
            resource,
            engine.registry().names().collect::<Vec<_>>().join(", ")
        ),
    }
}

fn param_summary(params: &ParameterSchema) -> String {
    params
        .params()
        .iter()
        .map(|p| {
            if p.required {
                format!("{}*", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_param(spec: &ParamSpec) -> String {
    let mut line = format!("{:<20} {}", spec.name, spec.kind);
    if spec.required {
        line.push_str(" required");
    }
    if let Some(default) = &spec.default {
        line.push_str(&format!(" default={}", default));
    }
    if let Some(minimum) = spec.minimum {
        line.push_str(&format!(" min={}", minimum));
    }
    line
}
