//! Skyledger sync runtime.
//!
//! Turns a resource call into one vendor page of canonical records:
//!
//! ```text
//! ParamValidator → VendorGateway → RecordMapper → QueryKeyContract → cursor → Replay
//! ```
//!
//! Resources are described by a [`ResourceRegistry`]; [`SyncEngine`] serves
//! calls against it.

pub mod adapter;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod metric;
pub mod query;
pub mod recorded;
pub mod registry;
pub mod replay;

pub use adapter::{Endpoint, GatewayFactory, PageRequest, PageSelector, VendorGateway, VendorPage};
pub use cursor::Pagination;
pub use engine::SyncEngine;
pub use error::{RegistryError, SyncError};
pub use mapper::{MapContext, MapFn, MappedItem, RecordMapper};
pub use metric::{METRIC_RECORD, MetricCatalog, MetricDefinition, Statistic};
pub use query::QueryKeyContract;
pub use recorded::{RecordedGateway, RecordedGatewayFactory};
pub use registry::{
    DEFAULT_LIMIT, DetailFn, FilterFn, MetricSpec, PagedSpec, PrepareFn, ResourceDescriptor,
    ResourceKind, ResourceRegistry, ScopeFn,
};
