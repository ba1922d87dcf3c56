//! CLI command implementations.

pub mod call;
pub mod inspect;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::{Map, Value};
use skyledger_core::Credential;
use skyledger_core::config::SkyledgerConfig;
use skyledger_runtime::{
    Endpoint, GatewayFactory, RecordedGatewayFactory, SyncEngine, VendorGateway,
};
use std::sync::Arc;

/// Resource arguments shared by `call`, `sync` and `describe`.
#[derive(Args, Debug, Default)]
pub struct CallArgs {
    /// Argument as key=value, repeatable
    #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub pairs: Vec<(String, String)>,

    /// Arguments as a JSON object; --arg entries override its keys
    #[arg(long = "args-json", value_name = "JSON")]
    pub json: Option<String>,
}

impl CallArgs {
    /// Merge `--args-json` and `--arg` into one argument map.
    pub fn collect(&self) -> Result<Map<String, Value>> {
        let mut args = match &self.json {
            Some(raw) => match serde_json::from_str(raw).context("--args-json is not valid JSON")? {
                Value::Object(map) => map,
                other => bail!("--args-json must be a JSON object, got {}", other),
            },
            None => Map::new(),
        };
        for (key, value) in &self.pairs {
            args.insert(key.clone(), Value::String(value.clone()));
        }
        Ok(args)
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {:?}", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Engine over the Alibaba Cloud registry, using the configured gateway.
pub fn engine(config: &SkyledgerConfig) -> Result<SyncEngine> {
    let gateway: Arc<dyn GatewayFactory> = match &config.gateway.fixtures_dir {
        Some(dir) => Arc::new(RecordedGatewayFactory::new(dir)),
        None => Arc::new(Unconfigured),
    };
    let registry = skyledger_provider_aliyun::registry(gateway)
        .context("Failed to build the resource registry")?;
    Ok(SyncEngine::new(Arc::new(registry)))
}

/// Gateway used when no vendor transport is configured.
#[derive(Debug)]
struct Unconfigured;

impl GatewayFactory for Unconfigured {
    fn connect(
        &self,
        _credential: &Credential,
        endpoint: &Endpoint,
    ) -> anyhow::Result<Arc<dyn VendorGateway>> {
        bail!("no gateway configured for {}, set gateway.fixtures_dir", endpoint)
    }
}
