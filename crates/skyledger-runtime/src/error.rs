//! Error types for the sync runtime.

use skyledger_params::ParamError;
use thiserror::Error;

/// Errors that terminate a single resource call.
///
/// No partial replay is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Caller arguments failed validation, or a metric name is not registered.
    #[error("invalid parameters for {resource}: {source}")]
    Parameter {
        resource: String,
        #[source]
        source: ParamError,
    },

    /// The incoming cursor could not be parsed.
    #[error("bad page number[marker] info for {resource}: {marker:?}")]
    Parse { resource: String, marker: String },

    /// The vendor reported failure, or the transport failed.
    #[error("vendor request {action} for {resource} failed: {message}")]
    Vendor {
        resource: String,
        action: String,
        message: String,
    },

    /// A record or query descriptor does not satisfy the canonical schema.
    #[error("mapping error for {resource}: {message}")]
    Mapping {
        resource: String,
        field: String,
        message: String,
    },

    /// The vendor response lacks a section the resource depends on.
    #[error("bad response for {resource}: missing {section}")]
    Contract { resource: String, section: String },
}

impl SyncError {
    pub fn parameter(resource: &str, source: ParamError) -> Self {
        Self::Parameter {
            resource: resource.to_string(),
            source,
        }
    }

    pub fn parse(resource: &str, marker: &str) -> Self {
        Self::Parse {
            resource: resource.to_string(),
            marker: marker.to_string(),
        }
    }

    pub fn vendor(resource: &str, action: &str, message: impl Into<String>) -> Self {
        Self::Vendor {
            resource: resource.to_string(),
            action: action.to_string(),
            message: message.into(),
        }
    }

    /// A mandatory attribute is empty on a mapped record.
    pub fn empty_field(resource: &str, field: &str) -> Self {
        Self::Mapping {
            resource: resource.to_string(),
            field: field.to_string(),
            message: format!("Value[{}] should not be empty", field),
        }
    }

    /// A query descriptor key is not an attribute of the record kind.
    pub fn query_key(resource: &str, kind: &str, key: &str) -> Self {
        Self::Mapping {
            resource: resource.to_string(),
            field: key.to_string(),
            message: format!("query key {} is not an attribute of {}", key, kind),
        }
    }

    pub fn contract(resource: &str, section: &str) -> Self {
        Self::Contract {
            resource: resource.to_string(),
            section: section.to_string(),
        }
    }

    /// Resource the failing call was made for.
    pub fn resource(&self) -> &str {
        match self {
            Self::Parameter { resource, .. }
            | Self::Parse { resource, .. }
            | Self::Vendor { resource, .. }
            | Self::Mapping { resource, .. }
            | Self::Contract { resource, .. } => resource,
        }
    }
}

/// Errors raised while assembling a [`crate::ResourceRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("resource {0} is registered twice")]
    Duplicate(String),

    #[error("resource {resource} does not declare parameter {param}")]
    MissingParam { resource: String, param: String },

    #[error("metric resource {resource} refers to unknown parent {parent}")]
    UnknownParent { resource: String, parent: String },

    #[error("metric resource {resource} needs a paged parent, {parent} is not one")]
    ParentNotPaged { resource: String, parent: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_message() {
        let err = SyncError::empty_field("Server", "ProviderId");
        assert_eq!(
            err.to_string(),
            "mapping error for Server: Value[ProviderId] should not be empty"
        );
        assert_eq!(err.resource(), "Server");
    }

    #[test]
    fn test_parameter_error_keeps_source() {
        let err = SyncError::parameter("Server", ParamError::missing_param("region"));
        assert!(err.to_string().contains("Parameter 'region' is required"));
        let SyncError::Parameter { source, .. } = err else {
            panic!("expected parameter error");
        };
        assert_eq!(source.param, "region");
    }
}
