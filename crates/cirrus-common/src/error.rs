//! Error types for cirrus
//!
//! Validation of user input never produces these errors: it returns a
//! [`FieldErrorList`](crate::field::FieldErrorList) instead. The variants
//! below describe fatal conditions of the expansion pipeline, each carrying
//! enough context to identify what was missing or which oracle failed.

use thiserror::Error;

use crate::field::FieldErrorList;

/// Main error type for cirrus operations
#[derive(Debug, Error)]
pub enum Error {
    /// Aggregated field validation failures
    #[error("validation error: {message}")]
    Validation {
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "networks.workers")
        field: Option<String>,
    },

    /// A resource required by the expansion is absent from the infrastructure status
    #[error("{kind} with purpose {purpose:?} not found")]
    NotFound {
        /// Kind of resource (e.g., "subnet", "availability set")
        kind: String,
        /// Purpose tag that was looked up
        purpose: String,
    },

    /// Machine image could not be resolved
    #[error("machine image {name}@{version}: {message}")]
    Image {
        /// Image name
        name: String,
        /// Image version
        version: String,
        /// Description of what failed
        message: String,
    },

    /// Cloud credentials are missing or malformed
    #[error("credentials error: {message}")]
    Credentials {
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Rendering sink rejected the machine classes
    #[error("apply error [{chart}]: {message}")]
    Apply {
        /// Chart that was applied
        chart: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Collapse a non-empty field error list into a single validation error
    ///
    /// Returns `None` for an empty list. The first error's field is kept as the
    /// primary field; all details are joined in list order.
    pub fn from_field_errors(errors: &FieldErrorList) -> Option<Self> {
        let first = errors.first()?;
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Some(Self::Validation {
            message,
            field: (!first.field.is_empty()).then(|| first.field.clone()),
        })
    }

    /// Create a not-found error for a resource looked up by purpose
    pub fn not_found(kind: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            purpose: purpose.into(),
        }
    }

    /// Create a machine image resolution error
    pub fn image(
        name: impl Into<String>,
        version: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Image {
            name: name.into(),
            version: version.into(),
            message: msg.into(),
        }
    }

    /// Create a credentials error with the given message
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials {
            message: msg.into(),
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an apply error for the given chart
    pub fn apply(chart: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Apply {
            chart: chart.into(),
            message: msg.into(),
        }
    }

    /// Whether re-running the operation can succeed once the underlying
    /// condition is corrected (e.g., the network layer is re-provisioned)
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Serialization { .. } | Self::Validation { .. })
    }
}
