//! Delay event records and the ordered record sets built from them.

use anyhow::{Result, anyhow};
use chrono::{NaiveDateTime, Timelike, Weekday};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Day of the week a delay was reported on.
///
/// Wraps [`chrono::Weekday`] to give a Monday → Sunday ordering and
/// full-name display ("Monday" rather than chrono's "Mon").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Day(Weekday);

impl Day {
    pub const ALL: [Day; 7] = [
        Day(Weekday::Mon),
        Day(Weekday::Tue),
        Day(Weekday::Wed),
        Day(Weekday::Thu),
        Day(Weekday::Fri),
        Day(Weekday::Sat),
        Day(Weekday::Sun),
    ];

    pub fn weekday(self) -> Weekday {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day(weekday)
    }
}

impl Ord for Day {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .num_days_from_monday()
            .cmp(&other.0.num_days_from_monday())
    }
}

impl PartialOrd for Day {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = anyhow::Error;

    /// Accepts weekday names case-insensitively ("Monday", "monday", "MON").
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<Weekday>()
            .map(Day)
            .map_err(|_| anyhow!("unrecognized weekday '{}'", s.trim()))
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One observed delay event.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayRecord {
    /// Weekday as reported by the source, not recomputed from `timestamp`.
    pub day: Day,
    /// Naive local date and time of the event.
    pub timestamp: NaiveDateTime,
    /// Delay in minutes. Zero means the event caused no delay.
    pub min_delay: f64,
}

impl DelayRecord {
    pub fn new(day: Day, timestamp: NaiveDateTime, min_delay: f64) -> Self {
        Self {
            day,
            timestamp,
            min_delay,
        }
    }

    /// Hour of day (0..=23) taken from the naive timestamp.
    pub fn hour(&self) -> u8 {
        self.timestamp.hour() as u8
    }

    /// True for a non-zero delay.
    pub fn is_delayed(&self) -> bool {
        self.min_delay != 0.0
    }
}

/// An ordered sequence of delay records, possibly merged from several sources.
///
/// Duplicates are kept: repeated rows are repeated delay events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<DelayRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<DelayRecord>) -> Self {
        Self { records }
    }

    /// Concatenates record sets in the order given, without deduplication.
    pub fn merge<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = RecordSet>,
    {
        let mut records = Vec::new();
        for set in sets {
            records.extend(set.records);
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DelayRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[DelayRecord] {
        &self.records
    }
}

impl From<Vec<DelayRecord>> for RecordSet {
    fn from(records: Vec<DelayRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<DelayRecord> for RecordSet {
    fn from_iter<T: IntoIterator<Item = DelayRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a DelayRecord;
    type IntoIter = std::slice::Iter<'a, DelayRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
