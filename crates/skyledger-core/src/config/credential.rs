//! Vendor credential configuration.
//!
//! Secrets never live in the config file. The file names the environment
//! variables that hold them, the same way upstream connection strings are
//! referenced by variable name rather than stored inline.

use super::ConfigError;
use crate::Credential;
use serde::{Deserialize, Serialize};

/// Where to find the vendor credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Vendor account id. Takes precedence over `account_id_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Environment variable containing the account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id_env: Option<String>,

    /// Environment variable containing the access key id.
    #[serde(default = "default_secret_id_env")]
    pub secret_id_env: String,

    /// Environment variable containing the access key secret.
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            account_id_env: None,
            secret_id_env: default_secret_id_env(),
            secret_key_env: default_secret_key_env(),
        }
    }
}

impl CredentialConfig {
    /// Resolve the credential from the process environment.
    pub fn resolve(&self) -> Result<Credential, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve the credential using `lookup` for environment variables.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Credential, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_id = lookup(&self.secret_id_env).ok_or_else(|| {
            ConfigError::Config(format!(
                "environment variable {} is not set",
                self.secret_id_env
            ))
        })?;
        let secret_key = lookup(&self.secret_key_env).ok_or_else(|| {
            ConfigError::Config(format!(
                "environment variable {} is not set",
                self.secret_key_env
            ))
        })?;

        let account_id = match (&self.account_id, &self.account_id_env) {
            (Some(id), _) => id.clone(),
            (None, Some(var)) => lookup(var).ok_or_else(|| {
                ConfigError::Config(format!("environment variable {} is not set", var))
            })?,
            (None, None) => {
                return Err(ConfigError::Config(
                    "credential.account_id or credential.account_id_env is required".to_string(),
                ));
            }
        };

        Ok(Credential {
            secret_id,
            secret_key,
            account_id,
        })
    }
}

fn default_secret_id_env() -> String {
    "ALIYUN_ACCESS_KEY_ID".to_string()
}

fn default_secret_key_env() -> String {
    "ALIYUN_ACCESS_KEY_SECRET".to_string()
}
