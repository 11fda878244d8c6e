//! OS disk sizing

use cirrus_common::{Error, Result};

/// Converts a declared volume size into gigabytes
#[cfg_attr(test, mockall::automock)]
pub trait DiskSizer: Send + Sync {
    /// Size in GB for a quantity string like `"50Gi"`
    fn disk_size(&self, size: &str) -> Result<i32>;
}

/// Reads the first run of decimal digits and ignores everything around it
#[derive(Clone, Copy, Debug, Default)]
pub struct DigitRunSizer;

impl DiskSizer for DigitRunSizer {
    fn disk_size(&self, size: &str) -> Result<i32> {
        let digits = size
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .unwrap_or_default();
        digits
            .parse()
            .map_err(|_| Error::validation(format!("invalid volume size {size:?}")))
    }
}
