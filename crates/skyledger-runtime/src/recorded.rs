//! Gateway serving recorded vendor responses from disk.
//!
//! Each API action reads `<root>/<Action>.json`, which holds either a bare
//! array of items or `{"success": bool, "message": str, "items": [...]}`.
//! Items are filtered by the request's filter keys and then paginated the way
//! the request asks for.

use crate::adapter::{Endpoint, GatewayFactory, PageRequest, PageSelector, VendorGateway, VendorPage};
use crate::mapper::scalarish_to_string;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use skyledger_core::Credential;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Recording {
    Items(Vec<Value>),
    Envelope {
        #[serde(default = "default_success")]
        success: bool,
        #[serde(default)]
        message: String,
        #[serde(default)]
        items: Option<Vec<Value>>,
    },
}

fn default_success() -> bool {
    true
}

/// Serves every endpoint from one fixtures directory.
#[derive(Debug, Clone)]
pub struct RecordedGatewayFactory {
    root: PathBuf,
}

impl RecordedGatewayFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl GatewayFactory for RecordedGatewayFactory {
    fn connect(
        &self,
        _credential: &Credential,
        endpoint: &Endpoint,
    ) -> anyhow::Result<Arc<dyn VendorGateway>> {
        tracing::trace!(endpoint = %endpoint, root = %self.root.display(), "recorded gateway");
        Ok(Arc::new(RecordedGateway {
            root: self.root.clone(),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RecordedGateway {
    root: PathBuf,
}

impl RecordedGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn load(&self, action: &str) -> anyhow::Result<Recording> {
        let path = self.root.join(format!("{}.json", action));
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("no recorded response for {} at {}", action, path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse recorded response {}", path.display()))
    }
}

#[async_trait]
impl VendorGateway for RecordedGateway {
    async fn fetch(&self, request: &PageRequest) -> anyhow::Result<VendorPage> {
        let (success, message, items) = match self.load(&request.action).await? {
            Recording::Items(items) => (true, String::new(), Some(items)),
            Recording::Envelope {
                success,
                message,
                items,
            } => (success, message, items),
        };
        if !success {
            return Ok(VendorPage::failed(message));
        }
        let Some(items) = items else {
            return Ok(VendorPage {
                success: true,
                message,
                ..Default::default()
            });
        };

        let matching: Vec<Value> = items
            .into_iter()
            .filter(|item| matches_filter(item, request))
            .collect();
        let total = matching.len();
        let size = request.page_size as usize;

        let page = match &request.page {
            PageSelector::Number(n) => {
                let start = (*n as usize).saturating_sub(1).saturating_mul(size);
                let chunk = matching.into_iter().skip(start).take(size).collect();
                VendorPage::ok(chunk).with_total(total as i64)
            }
            PageSelector::Token(token) => {
                let offset = if token.is_empty() {
                    0
                } else {
                    token
                        .parse::<usize>()
                        .with_context(|| format!("unknown continuation token {:?}", token))?
                };
                let end = offset.saturating_add(size).min(total);
                let chunk = matching.into_iter().skip(offset).take(size).collect();
                let page = VendorPage::ok(chunk);
                if end < total {
                    page.with_next_token(end.to_string())
                } else {
                    page
                }
            }
            PageSelector::Unpaged => VendorPage::ok(matching).with_total(total as i64),
        };
        Ok(VendorPage { message, ..page })
    }
}

/// Keep items whose fields agree with every filter key they carry.
fn matches_filter(item: &Value, request: &PageRequest) -> bool {
    request.filter.iter().all(|(key, wanted)| match item.get(key) {
        Some(actual) => scalarish_to_string(Some(actual)) == scalarish_to_string(Some(wanted)),
        None => true,
    })
}
