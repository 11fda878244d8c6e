//! Spreading pool sizes and rollout budgets over availability zones

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Splits pool-level values into per-zone shares
#[cfg_attr(test, mockall::automock)]
pub trait ZoneDistributor: Send + Sync {
    /// Share of `value` for the zone at `index` out of `zone_count` zones
    fn distribute_over_zones(&self, index: usize, value: i32, zone_count: usize) -> i32;

    /// Share of an absolute count or percentage for the zone at `index`
    ///
    /// `total` is the pool-level value the percentage refers to.
    fn distribute_positive_int_or_percent(
        &self,
        index: usize,
        value: &IntOrString,
        zone_count: usize,
        total: i32,
    ) -> IntOrString;
}

/// Even split where the first `value % zone_count` zones take one extra
///
/// Percentages are scaled by the zone's share of `total` so that the
/// absolute budget stays roughly the same after splitting.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDistributor;

impl DefaultDistributor {
    fn distribute_percent(index: usize, percent: &str, zone_count: usize, total: i32) -> String {
        let Some(Ok(value)) = percent.strip_suffix('%').map(str::parse::<i64>) else {
            return percent.to_string();
        };
        if total == 0 {
            return percent.to_string();
        }

        let share = i64::from(DefaultDistributor.distribute_over_zones(index, total, zone_count));
        let scaled = i64::try_from(zone_count)
            .ok()
            .and_then(|zones| share.checked_mul(value)?.checked_mul(zones))
            .and_then(|product| product.checked_div(i64::from(total)));
        match scaled {
            Some(scaled) => format!("{scaled}%"),
            None => percent.to_string(),
        }
    }
}

impl ZoneDistributor for DefaultDistributor {
    fn distribute_over_zones(&self, index: usize, value: i32, zone_count: usize) -> i32 {
        let Ok(zones) = i32::try_from(zone_count) else {
            return 0;
        };
        if zones == 0 {
            return 0;
        }
        let extra = usize::try_from(value % zones).is_ok_and(|rest| index < rest);
        value / zones + i32::from(extra)
    }

    fn distribute_positive_int_or_percent(
        &self,
        index: usize,
        value: &IntOrString,
        zone_count: usize,
        total: i32,
    ) -> IntOrString {
        match value {
            IntOrString::Int(count) => {
                IntOrString::Int(self.distribute_over_zones(index, *count, zone_count))
            }
            IntOrString::String(percent) => IntOrString::String(Self::distribute_percent(
                index, percent, zone_count, total,
            )),
        }
    }
}
