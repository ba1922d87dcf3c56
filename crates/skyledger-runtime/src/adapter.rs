//! Vendor gateway contract.
//!
//! A gateway performs exactly one vendor request per [`VendorGateway::fetch`].
//! How it talks to the vendor (SDK, recorded fixtures, test stub) is its own
//! business; the engine only sees [`VendorPage`]s.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use skyledger_core::Credential;
use std::fmt;
use std::sync::Arc;

/// Vendor service and API action a resource is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Service host prefix, e.g. `ecs`.
    pub host: &'static str,
    /// API action, e.g. `DescribeInstances`.
    pub action: &'static str,
}

impl Endpoint {
    pub const fn new(host: &'static str, action: &'static str) -> Self {
        Self { host, action }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.action)
    }
}

/// Which page a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelector {
    /// 1-based page number.
    Number(u32),
    /// Vendor continuation token. Empty asks for the first page.
    Token(String),
    /// The action is not paginated.
    Unpaged,
}

/// One vendor request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub action: String,
    /// Request arguments other than pagination.
    pub filter: Map<String, Value>,
    pub page: PageSelector,
    pub page_size: u32,
}

/// One vendor response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorPage {
    /// `None` when the response has no item section at all.
    pub items: Option<Vec<Value>>,
    /// Total item count, for page-number pagination.
    pub total: Option<i64>,
    /// Continuation token, for token pagination.
    pub next_token: Option<String>,
    pub success: bool,
    pub message: String,
}

impl VendorPage {
    /// A successful page holding `items`.
    pub fn ok(items: Vec<Value>) -> Self {
        Self {
            items: Some(items),
            success: true,
            ..Default::default()
        }
    }

    /// A response the vendor flagged as failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }
}

#[async_trait]
pub trait VendorGateway: Send + Sync {
    /// Perform one vendor request.
    async fn fetch(&self, request: &PageRequest) -> anyhow::Result<VendorPage>;
}

/// Builds gateways for a credential and endpoint.
pub trait GatewayFactory: Send + Sync {
    fn connect(
        &self,
        credential: &Credential,
        endpoint: &Endpoint,
    ) -> anyhow::Result<Arc<dyn VendorGateway>>;
}
