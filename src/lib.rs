//! Cirrus - validation and machine expansion for Azure worker pools
//!
//! Cirrus checks user-declared Azure infrastructure configurations and turns
//! worker pools into machine deployments and machine classes for the machine
//! controller.
//!
//! # Crates
//!
//! - [`common`] - API types, field errors, credentials, hashing and tracing setup
//! - [`validation`] - CIDR checks and infrastructure config validation
//! - [`machines`] - expansion of worker pools and the worker delegate

#![deny(missing_docs)]

pub use cirrus_common as common;
pub use cirrus_machines as machines;
pub use cirrus_validation as validation;

pub use cirrus_common::field::{FieldError, FieldErrorList, FieldErrorType, FieldPath};
pub use cirrus_common::{Error, Result};
pub use cirrus_machines::{generate_machine_config, MachineConfig, WorkerDelegate};
pub use cirrus_validation::{
    validate_infrastructure_config, validate_infrastructure_config_update,
};
