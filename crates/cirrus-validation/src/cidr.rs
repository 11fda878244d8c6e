//! CIDR parsing and containment checks producing field errors
//!
//! A [`Cidr`] remembers the literal string and the field it came from so that
//! every error it produces is attributed to the right field. Containment is
//! decided on the network address of the inner range, so `10.0.0.1/32` is a
//! subset of `10.0.0.0/8`.

use cirrus_common::field::{FieldError, FieldErrorList, FieldPath};
use ipnet::IpNet;

/// A CIDR string bound to the field it was read from
#[derive(Clone, Debug)]
pub struct Cidr {
    raw: String,
    path: FieldPath,
    net: Option<IpNet>,
}

impl Cidr {
    /// Parse `raw`; a malformed value is kept and reported by [`Cidr::validate_parse`]
    pub fn new(raw: &str, path: FieldPath) -> Self {
        Self {
            raw: raw.to_string(),
            net: raw.parse().ok(),
            path,
        }
    }

    /// Whether the input parsed as a CIDR
    pub fn is_valid(&self) -> bool {
        self.net.is_some()
    }

    /// Reject input that is not a CIDR
    pub fn validate_parse(&self) -> FieldErrorList {
        if self.is_valid() {
            return Vec::new();
        }
        vec![FieldError::invalid(
            &self.path,
            Some(&self.raw),
            format!("invalid CIDR address: {}", self.raw),
        )]
    }

    /// Reject valid CIDRs with host bits set (`10.0.0.3/8` instead of `10.0.0.0/8`)
    ///
    /// Unparseable input is left to [`Cidr::validate_parse`].
    pub fn validate_canonical(&self) -> FieldErrorList {
        match self.net {
            Some(net) if net.trunc().to_string() != self.raw => vec![FieldError::invalid(
                &self.path,
                Some(&self.raw),
                "must be valid canonical CIDR",
            )],
            _ => Vec::new(),
        }
    }

    /// Require each valid candidate to lie within this range
    ///
    /// Errors are attributed to the candidate's field.
    pub fn validate_subset(&self, candidates: &[&Cidr]) -> FieldErrorList {
        let Some(outer) = self.net else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter_map(|candidate| candidate.net.map(|inner| (candidate, inner)))
            .filter(|(_, inner)| !outer.contains(&inner.network()))
            .map(|(candidate, _)| {
                FieldError::invalid(
                    &candidate.path,
                    Some(&candidate.raw),
                    format!("must be a subset of {:?} ({:?})", self.path.as_str(), self.raw),
                )
            })
            .collect()
    }

    /// Require each valid candidate to lie outside this range
    ///
    /// Errors are attributed to the candidate's field.
    pub fn validate_not_subset(&self, candidates: &[&Cidr]) -> FieldErrorList {
        let Some(outer) = self.net else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter_map(|candidate| candidate.net.map(|inner| (candidate, inner)))
            .filter(|(_, inner)| outer.contains(&inner.network()))
            .map(|(candidate, _)| {
                FieldError::invalid(
                    &candidate.path,
                    Some(&candidate.raw),
                    format!(
                        "must not be a subset of {:?} ({:?})",
                        self.path.as_str(),
                        self.raw
                    ),
                )
            })
            .collect()
    }
}
