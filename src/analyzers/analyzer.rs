use serde::Serialize;
use tracing::info;

use crate::analyzers::aggregate::{average_delay, nonzero_frequency};
use crate::analyzers::bucket::bucketize;
use crate::analyzers::filter::partition_by_delay;
use crate::analyzers::types::{DayHourMap, HourRange};
use crate::record::RecordSet;

/// Result of one pipeline run over a merged record set.
#[derive(Debug, Serialize)]
pub struct DelayReport {
    pub total_records: usize,
    pub zero_delay_records: usize,
    pub non_zero_delay_records: usize,
    pub excluded_hours: Option<HourRange>,
    /// Mean delay in minutes per (day, hour), over non-zero delays.
    pub average_delay: DayHourMap<f64>,
    /// Share of the day's non-zero delays falling in each hour, in percent.
    pub frequency: DayHourMap<f64>,
}

/// Runs filter, bucketing and both reductions over `records`.
///
/// `exclude` applies to both bucketings; the partition sizes always count
/// the whole record set.
#[tracing::instrument(skip_all, fields(records = records.len(), exclude = ?exclude))]
pub fn analyze(records: &RecordSet, exclude: Option<HourRange>) -> DelayReport {
    let partition = partition_by_delay(records);
    let zero_delay_records = partition.zero.len();
    let non_zero_delay_records = partition.non_zero.len();

    let average_delay = average_delay(&bucketize(partition.non_zero, exclude));
    let frequency = nonzero_frequency(&bucketize(records, exclude));

    info!(
        zero_delay_records,
        non_zero_delay_records,
        average_buckets = average_delay.len(),
        frequency_buckets = frequency.len(),
        "Delay analysis complete"
    );

    DelayReport {
        total_records: records.len(),
        zero_delay_records,
        non_zero_delay_records,
        excluded_hours: exclude,
        average_delay,
        frequency,
    }
}
