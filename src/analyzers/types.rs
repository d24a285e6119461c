//! Data types used by the aggregation pipeline.

use anyhow::{Result, anyhow, ensure};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use crate::record::Day;

/// Number of hour rows in an exported table.
pub const HOURS_PER_DAY: u8 = 24;

/// Sparse two-level mapping `day -> hour -> T`.
///
/// A day is present only if some value was inserted for it, and an hour only
/// if a value was inserted for that (day, hour). Levels are created on first
/// insertion and never removed, so no empty day level can exist. Iteration is
/// Monday → Sunday, then by ascending hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DayHourMap<T> {
    days: BTreeMap<Day, BTreeMap<u8, T>>,
}

impl<T> Default for DayHourMap<T> {
    fn default() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }
}

impl<T> DayHourMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for (day, hour), creating both levels if needed.
    pub fn entry_or_default(&mut self, day: Day, hour: u8) -> &mut T
    where
        T: Default,
    {
        debug_assert!(hour < HOURS_PER_DAY, "hour {hour} out of range");
        self.days.entry(day).or_default().entry(hour).or_default()
    }

    pub fn insert(&mut self, day: Day, hour: u8, value: T) -> Option<T> {
        debug_assert!(hour < HOURS_PER_DAY, "hour {hour} out of range");
        self.days.entry(day).or_default().insert(hour, value)
    }

    pub fn get(&self, day: Day, hour: u8) -> Option<&T> {
        self.days.get(&day)?.get(&hour)
    }

    /// Hour entries recorded for `day`.
    pub fn hours(&self, day: Day) -> Option<&BTreeMap<u8, T>> {
        self.days.get(&day)
    }

    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    pub fn iter_days(&self) -> btree_map::Iter<'_, Day, BTreeMap<u8, T>> {
        self.days.iter()
    }

    /// Flat iteration over every (day, hour, value) entry.
    pub fn iter(&self) -> impl Iterator<Item = (Day, u8, &T)> + '_ {
        self.days.iter().flat_map(|(&day, hours)| {
            hours.iter().map(move |(&hour, value)| (day, hour, value))
        })
    }

    /// Number of (day, hour) entries.
    pub fn len(&self) -> usize {
        self.days.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Inclusive range of hours, e.g. `3-5` covers 3:00 through 5:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourRange {
    start: u8,
    end: u8,
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Result<Self> {
        ensure!(
            end < HOURS_PER_DAY,
            "hour {end} is outside 0-{}",
            HOURS_PER_DAY - 1
        );
        ensure!(start <= end, "hour range {start}-{end} is reversed");
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn contains(&self, hour: u8) -> bool {
        (self.start..=self.end).contains(&hour)
    }
}

impl FromStr for HourRange {
    type Err = anyhow::Error;

    /// Parses `"lo-hi"` or a single hour `"h"`.
    fn from_str(s: &str) -> Result<Self> {
        let parse_hour = |h: &str| {
            h.trim()
                .parse::<u8>()
                .map_err(|_| anyhow!("invalid hour '{}' in range '{s}'", h.trim()))
        };

        match s.split_once('-') {
            Some((lo, hi)) => Self::new(parse_hour(lo)?, parse_hour(hi)?),
            None => {
                let hour = parse_hour(s)?;
                Self::new(hour, hour)
            }
        }
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_map_creates_levels_on_demand() {
        let mut map: DayHourMap<Vec<u32>> = DayHourMap::new();
        assert!(map.is_empty());

        let tue = Day::from(Weekday::Tue);
        map.entry_or_default(tue, 7).push(1);
        map.entry_or_default(tue, 7).push(2);

        assert_eq!(map.get(tue, 7), Some(&vec![1, 2]));
        assert_eq!(map.get(tue, 8), None);
        assert_eq!(map.get(Day::from(Weekday::Mon), 7), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_map_iterates_in_week_then_hour_order() {
        let mut map = DayHourMap::new();
        map.insert(Day::from(Weekday::Sun), 1, 1.0);
        map.insert(Day::from(Weekday::Mon), 9, 2.0);
        map.insert(Day::from(Weekday::Mon), 3, 3.0);

        let keys: Vec<(String, u8)> = map.iter().map(|(d, h, _)| (d.to_string(), h)).collect();
        assert_eq!(
            keys,
            vec![
                ("Monday".to_string(), 3),
                ("Monday".to_string(), 9),
                ("Sunday".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_map_serializes_as_nested_object() {
        let mut map = DayHourMap::new();
        map.insert(Day::from(Weekday::Mon), 8, 5.0);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "Monday": { "8": 5.0 } }));
    }

    #[test]
    fn test_hour_range_parsing() {
        let range: HourRange = "3-5".parse().unwrap();
        assert_eq!((range.start(), range.end()), (3, 5));
        assert!(range.contains(3));
        assert!(range.contains(5));
        assert!(!range.contains(2));
        assert!(!range.contains(6));

        let single: HourRange = "4".parse().unwrap();
        assert!(single.contains(4));
        assert!(!single.contains(5));
        assert_eq!(range.to_string(), "3-5");
    }

    #[test]
    fn test_hour_range_rejects_invalid_bounds() {
        assert!("5-3".parse::<HourRange>().is_err());
        assert!("22-24".parse::<HourRange>().is_err());
        assert!("a-3".parse::<HourRange>().is_err());
    }
}
