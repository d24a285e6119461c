use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzers::bucket::BucketMap;
use crate::analyzers::types::DayHourMap;
use crate::analyzers::utility::{mean, pct};

/// Mean `min_delay` per bucket of a map built from non-zero-delay records.
///
/// Buckets holding a non-finite delay are skipped with a warning; the
/// remaining buckets are still reduced.
pub fn average_delay(buckets: &BucketMap<'_>) -> DayHourMap<f64> {
    let mut averages = DayHourMap::new();

    for (day, hour, bucket) in buckets.iter() {
        let delays: Vec<f64> = bucket.iter().map(|r| r.min_delay).collect();

        if delays.iter().any(|d| !d.is_finite()) {
            warn!(%day, hour, records = delays.len(), "Malformed delay in bucket, skipping");
            continue;
        }

        averages.insert(day, hour, mean(&delays));
    }

    averages
}

/// Percentage of each day's non-zero delays that fall in each hour.
///
/// `buckets` is built from the full record set; non-zero delays are counted
/// per bucket here. Each day's percentages sum to 100 over its observed
/// hours, or are all 0 when the day has no non-zero delay. Non-finite delays
/// are left out of both the hour count and the day total, matching
/// [`average_delay`].
pub fn nonzero_frequency(buckets: &BucketMap<'_>) -> DayHourMap<f64> {
    let mut frequency = DayHourMap::new();

    for (&day, hours) in buckets.iter_days() {
        let mut counts: Vec<(u8, usize)> = Vec::with_capacity(hours.len());
        for (&hour, bucket) in hours {
            let malformed = bucket.iter().filter(|r| !r.min_delay.is_finite()).count();
            if malformed > 0 {
                warn!(%day, hour, malformed, "Malformed delay in bucket, not counted");
            }
            let delayed = bucket
                .iter()
                .filter(|r| r.is_delayed() && r.min_delay.is_finite())
                .count();
            counts.push((hour, delayed));
        }
        let day_total: usize = counts.iter().map(|&(_, count)| count).sum();

        if day_total == 0 {
            debug!(%day, "No non-zero delays recorded for day");
        }

        for (hour, count) in counts {
            frequency.insert(day, hour, pct(count, day_total));
        }
    }

    frequency
}

/// Row counts of a bucket by delay category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub zero: usize,
    pub non_zero: usize,
}

/// Per (day, hour) counts of zero and non-zero delay records.
pub fn breakdown(buckets: &BucketMap<'_>) -> DayHourMap<CategoryCounts> {
    let mut counts = DayHourMap::new();

    for (day, hour, bucket) in buckets.iter() {
        let non_zero = bucket.iter().filter(|r| r.is_delayed()).count();
        counts.insert(
            day,
            hour,
            CategoryCounts {
                zero: bucket.len() - non_zero,
                non_zero,
            },
        );
    }

    counts
}
