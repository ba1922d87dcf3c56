//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Tracing settings. `RUST_LOG` overrides `filter` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, e.g. `info` or `skyledger_runtime=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Whether to emit ANSI colors.
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            ansi: true,
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
