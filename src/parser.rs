//! CSV parser for transit delay logs.
//!
//! Each source is a CSV file with at least `Day`, `Time` and `Min Delay`
//! columns, as published in the TTC subway and bus delay datasets. Extra
//! columns are ignored. An optional `Date` column supplies the date when
//! `Time` only carries a time of day.

use anyhow::{Context, Result, anyhow, bail, ensure};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::record::{DelayRecord, RecordSet};

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Day", "Time", "Min Delay"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%b-%y"];

/// What to do with a data row that cannot be turned into a [`DelayRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Fail the whole source on the first malformed row.
    #[default]
    Reject,
    /// Log the row and leave it out.
    Skip,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Day")]
    day: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Min Delay")]
    min_delay: String,
    #[serde(rename = "Date", default)]
    date: Option<String>,
}

/// Parses raw CSV bytes into a [`RecordSet`], keeping row order.
///
/// # Errors
///
/// Returns an error if a required column is missing, or, under
/// [`RowPolicy::Reject`], if any data row is malformed. Row numbers in
/// error messages count data rows from 1.
pub fn parse_records(bytes: &[u8], policy: RowPolicy) -> Result<RecordSet> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("missing required column '{column}'");
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row_number = idx + 1;
        let parsed = result
            .map_err(anyhow::Error::from)
            .and_then(to_record)
            .with_context(|| format!("malformed row {row_number}"));

        match parsed {
            Ok(record) => records.push(record),
            Err(e) if policy == RowPolicy::Skip => {
                warn!(row = row_number, error = %format!("{e:#}"), "Skipping malformed row");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(rows = records.len(), skipped, "Parsed delay records");
    if skipped > 0 {
        warn!(skipped, "Malformed rows were skipped");
    }

    Ok(RecordSet::new(records))
}

fn to_record(raw: RawRow) -> Result<DelayRecord> {
    let day = raw.day.parse()?;
    let timestamp = parse_timestamp(&raw.time, raw.date.as_deref())?;
    let min_delay = parse_delay(&raw.min_delay)?;
    Ok(DelayRecord::new(day, timestamp, min_delay))
}

fn parse_delay(value: &str) -> Result<f64> {
    let delay: f64 = value
        .parse()
        .with_context(|| format!("invalid Min Delay '{value}'"))?;
    ensure!(
        delay.is_finite() && delay >= 0.0,
        "Min Delay must be a non-negative number, got '{value}'"
    );
    Ok(delay)
}

/// Parses `time` as a full timestamp, or as a time of day joined to `date`.
pub fn parse_timestamp(time: &str, date: Option<&str>) -> Result<NaiveDateTime> {
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
    {
        return Ok(ts);
    }

    let time_of_day = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
        .ok_or_else(|| anyhow!("unrecognized Time '{time}'"))?;

    let date = date
        .filter(|d| !d.is_empty())
        .ok_or_else(|| anyhow!("Time '{time}' has no date and the row has no Date"))?;
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .ok_or_else(|| anyhow!("unrecognized Date '{date}'"))?;

    Ok(date.and_time(time_of_day))
}
