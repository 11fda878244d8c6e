//! Field-path tagged validation errors
//!
//! Validation accumulates [`FieldError`]s into an ordered [`FieldErrorList`]
//! rather than failing fast. Each error names the configuration field it
//! concerns using dot/bracket notation (`networks.natGateway.ipAddresses[0]`);
//! cross-field errors with no single owning field use an empty path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered list of validation errors; empty means valid
pub type FieldErrorList = Vec<FieldError>;

/// Address of a field inside a nested configuration
///
/// An empty path renders as the empty string, so children of the root
/// render without a leading dot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    rendered: String,
}

impl FieldPath {
    /// The empty root path
    pub fn root() -> Self {
        Self::default()
    }

    /// A path with a single top-level element
    pub fn new(name: &str) -> Self {
        Self::root().child(name)
    }

    /// Append a named child element
    pub fn child(&self, name: &str) -> Self {
        let rendered = if self.rendered.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.rendered, name)
        };
        Self { rendered }
    }

    /// Append a list index
    pub fn index(&self, index: usize) -> Self {
        Self {
            rendered: format!("{}[{}]", self.rendered, index),
        }
    }

    /// Whether this is the root path
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// The rendered path
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Severity of a field error
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorType {
    /// The value is malformed or not allowed
    Invalid,
    /// The value is well-formed but the requested transition is not allowed
    Forbidden,
}

impl fmt::Display for FieldErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "Invalid value"),
            Self::Forbidden => write!(f, "Forbidden"),
        }
    }
}

/// A single validation failure
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Severity
    #[serde(rename = "type")]
    pub error_type: FieldErrorType,
    /// Field path, empty for cross-field errors
    pub field: String,
    /// The offending value, when it renders meaningfully as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_value: Option<String>,
    /// Human-readable explanation
    pub detail: String,
}

impl FieldError {
    /// An "invalid" error on `path`
    pub fn invalid(path: &FieldPath, bad_value: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            error_type: FieldErrorType::Invalid,
            field: path.to_string(),
            bad_value: bad_value.map(str::to_string),
            detail: detail.into(),
        }
    }

    /// A "forbidden" error on `path`
    pub fn forbidden(path: &FieldPath, detail: impl Into<String>) -> Self {
        Self {
            error_type: FieldErrorType::Forbidden,
            field: path.to_string(),
            bad_value: None,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.field.is_empty() {
            write!(f, "{}: ", self.field)?;
        }
        match &self.bad_value {
            Some(value) => write!(f, "{}: {:?}: {}", self.error_type, value, self.detail),
            None => write!(f, "{}: {}", self.error_type, self.detail),
        }
    }
}
