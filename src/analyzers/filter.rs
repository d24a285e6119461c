use crate::record::DelayRecord;

/// Records split by whether they carry a delay. Order within each side
/// follows the input.
#[derive(Debug, Default)]
pub struct DelayPartition<'a> {
    pub zero: Vec<&'a DelayRecord>,
    pub non_zero: Vec<&'a DelayRecord>,
}

/// Splits records into zero-delay and non-zero-delay partitions. Every
/// record lands in exactly one side.
pub fn partition_by_delay<'a, I>(records: I) -> DelayPartition<'a>
where
    I: IntoIterator<Item = &'a DelayRecord>,
{
    let (non_zero, zero): (Vec<_>, Vec<_>) = records.into_iter().partition(|r| r.is_delayed());
    DelayPartition { zero, non_zero }
}
