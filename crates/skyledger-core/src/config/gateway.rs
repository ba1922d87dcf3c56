//! Vendor gateway configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the vendor gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Directory of recorded vendor responses, one `<Action>.json` per API action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures_dir: Option<PathBuf>,
}
