use chrono::{NaiveDate, Weekday};
use delay_rater::analyzers::aggregate::{average_delay, nonzero_frequency};
use delay_rater::analyzers::bucket::bucketize;
use delay_rater::analyzers::filter::partition_by_delay;
use delay_rater::analyzers::types::HourRange;
use delay_rater::output::DenseTable;
use delay_rater::record::{Day, DelayRecord, RecordSet};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_record() -> impl Strategy<Value = DelayRecord> {
    let delay = prop_oneof![Just(0.0), (1u32..120).prop_map(f64::from)];
    (0usize..7, 0u32..24, 0u32..60, delay).prop_map(|(day, hour, minute, delay)| {
        let ts = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        DelayRecord::new(Day::ALL[day], ts, delay)
    })
}

fn arb_records() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec(arb_record(), 0..60).prop_map(RecordSet::new)
}

fn arb_range() -> impl Strategy<Value = Option<HourRange>> {
    prop::option::of((0u8..24, 0u8..24).prop_map(|(a, b)| {
        HourRange::new(a.min(b), a.max(b)).unwrap()
    }))
}

proptest! {
    #[test]
    fn test_partition_is_complete(records in arb_records()) {
        let partition = partition_by_delay(&records);

        prop_assert_eq!(partition.zero.len() + partition.non_zero.len(), records.len());
        prop_assert!(partition.zero.iter().all(|r| r.min_delay == 0.0));
        prop_assert!(partition.non_zero.iter().all(|r| r.min_delay != 0.0));
    }

    #[test]
    fn test_bucket_membership_and_exclusion(records in arb_records(), range in arb_range()) {
        let buckets = bucketize(&records, range);

        let mut bucketed = 0;
        for (day, hour, bucket) in buckets.iter() {
            prop_assert!(!bucket.is_empty());
            prop_assert!(range.is_none_or(|r| !r.contains(hour)));
            for record in bucket {
                prop_assert_eq!(record.day, day);
                prop_assert_eq!(record.hour(), hour);
            }
            bucketed += bucket.len();
        }

        let kept = records
            .iter()
            .filter(|r| range.is_none_or(|range| !range.contains(r.hour())))
            .count();
        prop_assert_eq!(bucketed, kept);
    }

    #[test]
    fn test_average_is_bucket_mean(records in arb_records()) {
        let partition = partition_by_delay(&records);
        let buckets = bucketize(partition.non_zero, None);
        let averages = average_delay(&buckets);

        prop_assert_eq!(averages.len(), buckets.len());
        for (day, hour, bucket) in buckets.iter() {
            let expected = bucket.iter().map(|r| r.min_delay).sum::<f64>() / bucket.len() as f64;
            let actual = *averages.get(day, hour).unwrap();
            prop_assert!((actual - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_frequency_sums_to_100_or_is_zero(records in arb_records(), range in arb_range()) {
        let buckets = bucketize(&records, range);
        let frequency = nonzero_frequency(&buckets);

        let mut delayed_per_day: BTreeMap<Day, usize> = BTreeMap::new();
        for (day, _, bucket) in buckets.iter() {
            *delayed_per_day.entry(day).or_default() +=
                bucket.iter().filter(|r| r.is_delayed()).count();
        }

        for (day, hours) in frequency.iter_days() {
            let total: f64 = hours.values().sum();
            if delayed_per_day[day] > 0 {
                prop_assert!((total - 100.0).abs() < 1e-6, "{} sums to {}", day, total);
            } else {
                prop_assert!(hours.values().all(|&v| v == 0.0));
            }
        }
    }

    #[test]
    fn test_dense_table_shape(records in arb_records()) {
        let frequency = nonzero_frequency(&bucketize(&records, None));
        let table = DenseTable::from_map(&frequency);

        prop_assert_eq!(table.rows().len(), 24);
        for (idx, row) in table.rows().iter().enumerate() {
            prop_assert_eq!(row.hour as usize, idx);
            for (col, &day) in table.columns().iter().enumerate() {
                let expected = frequency.get(day, row.hour).copied().unwrap_or(0.0);
                prop_assert_eq!(row.values[col], expected);
            }
        }
    }
}

#[test]
fn test_day_all_is_monday_first() {
    assert_eq!(Day::ALL[0].weekday(), Weekday::Mon);
    assert_eq!(Day::ALL[6].weekday(), Weekday::Sun);
}
