//! Common types for cirrus: infrastructure API types, field errors, credentials and utilities

#![deny(missing_docs)]

pub mod credentials;
pub mod crd;
pub mod error;
pub mod field;
pub mod hash;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
