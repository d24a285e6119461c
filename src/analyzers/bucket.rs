use tracing::debug;

use crate::analyzers::types::{DayHourMap, HourRange};
use crate::record::DelayRecord;

/// Records sharing one (day, hour) key, borrowed from their record set.
pub type Bucket<'a> = Vec<&'a DelayRecord>;

/// Sparse `day -> hour -> bucket` grouping.
pub type BucketMap<'a> = DayHourMap<Bucket<'a>>;

/// Groups records by their reported day and the hour of their timestamp.
///
/// Records whose hour falls inside `exclude` are dropped entirely and
/// contribute to no bucket.
pub fn bucketize<'a, I>(records: I, exclude: Option<HourRange>) -> BucketMap<'a>
where
    I: IntoIterator<Item = &'a DelayRecord>,
{
    let mut buckets = BucketMap::new();
    let mut excluded = 0usize;

    for record in records {
        let hour = record.hour();
        if exclude.is_some_and(|range| range.contains(hour)) {
            excluded += 1;
            continue;
        }
        buckets.entry_or_default(record.day, hour).push(record);
    }

    debug!(buckets = buckets.len(), excluded, "Bucketized records");
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Day, RecordSet};
    use chrono::{NaiveDate, Weekday};

    fn record(weekday: Weekday, hour: u32, delay: f64) -> DelayRecord {
        let ts = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap();
        DelayRecord::new(Day::from(weekday), ts, delay)
    }

    #[test]
    fn test_bucketize_groups_by_day_and_hour() {
        let records = RecordSet::new(vec![
            record(Weekday::Mon, 8, 5.0),
            record(Weekday::Mon, 8, 0.0),
            record(Weekday::Mon, 9, 15.0),
            record(Weekday::Fri, 8, 2.0),
        ]);
        let buckets = bucketize(&records, None);

        let mon = Day::from(Weekday::Mon);
        let fri = Day::from(Weekday::Fri);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets.get(mon, 8).map(Vec::len), Some(2));
        assert_eq!(buckets.get(mon, 9).map(Vec::len), Some(1));
        assert_eq!(buckets.get(fri, 8).map(Vec::len), Some(1));
        assert!(buckets.get(Day::from(Weekday::Tue), 8).is_none());
    }

    #[test]
    fn test_day_is_taken_from_record_not_timestamp() {
        // 2023-01-02 is a Monday; the record claims Sunday.
        let records = RecordSet::new(vec![record(Weekday::Sun, 1, 4.0)]);
        let buckets = bucketize(&records, None);

        assert!(buckets.get(Day::from(Weekday::Sun), 1).is_some());
        assert!(buckets.hours(Day::from(Weekday::Mon)).is_none());
    }

    #[test]
    fn test_excluded_hours_are_dropped() {
        let records = RecordSet::new(vec![
            record(Weekday::Mon, 2, 1.0),
            record(Weekday::Mon, 3, 1.0),
            record(Weekday::Mon, 4, 0.0),
            record(Weekday::Mon, 5, 1.0),
            record(Weekday::Mon, 6, 1.0),
        ]);
        let range = HourRange::new(3, 5).unwrap();
        let buckets = bucketize(&records, Some(range));

        let hours: Vec<u8> = buckets.iter().map(|(_, h, _)| h).collect();
        assert_eq!(hours, vec![2, 6]);
    }

    #[test]
    fn test_fully_excluded_day_has_no_key() {
        let records = RecordSet::new(vec![record(Weekday::Wed, 4, 3.0)]);
        let buckets = bucketize(&records, Some(HourRange::new(3, 5).unwrap()));
        assert!(buckets.is_empty());
    }
}
