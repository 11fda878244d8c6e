//! Validation of Azure infrastructure configurations
//!
//! Both entry points accumulate every problem they find into a
//! [`FieldErrorList`] instead of stopping at the first one. Callers that need a
//! single fatal error can collapse the list with [`ensure_valid`].

#![deny(missing_docs)]

pub mod cidr;
mod infrastructure;

pub use infrastructure::{validate_infrastructure_config, validate_infrastructure_config_update};

use cirrus_common::field::FieldErrorList;
use cirrus_common::{Error, Result};

/// Turn a non-empty error list into [`Error::Validation`]
pub fn ensure_valid(errors: FieldErrorList) -> Result<()> {
    match Error::from_field_errors(&errors) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
