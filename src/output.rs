//! Output formatting and persistence for delay statistics.
//!
//! Supports dense CSV tables, textual summaries, and JSON.

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::aggregate::CategoryCounts;
use crate::analyzers::types::{DayHourMap, HOURS_PER_DAY};
use crate::record::Day;

/// Header of the hour index column.
pub const HOUR_COLUMN: &str = "Hour";

/// One hour row of a [`DenseTable`]; `values` follow the table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseRow {
    pub hour: u8,
    pub values: Vec<f64>,
}

/// Gap-free `hour x day` grid: rows for hours 0..=23 in order, one column
/// per day present in the source map. Missing (day, hour) cells hold 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTable {
    columns: Vec<Day>,
    rows: Vec<DenseRow>,
}

impl DenseTable {
    pub fn from_map(map: &DayHourMap<f64>) -> Self {
        let columns: Vec<Day> = map.days().collect();

        let rows = (0..HOURS_PER_DAY)
            .map(|hour| DenseRow {
                hour,
                values: columns
                    .iter()
                    .map(|&day| map.get(day, hour).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Day] {
        &self.columns
    }

    pub fn rows(&self) -> &[DenseRow] {
        &self.rows
    }

    /// Cell for (hour, day), or `None` if `day` is not a column or `hour`
    /// is not a row.
    pub fn value(&self, hour: u8, day: Day) -> Option<f64> {
        let col = self.columns.iter().position(|&d| d == day)?;
        self.rows.get(usize::from(hour))?.values.get(col).copied()
    }
}

/// Writes a [`DenseTable`] as CSV, replacing any existing file.
///
/// The first column is the hour index, followed by one column per day.
pub fn write_table(path: impl AsRef<Path>, table: &DenseTable) -> Result<()> {
    let path = path.as_ref();
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec![HOUR_COLUMN.to_string()];
    header.extend(table.columns.iter().map(Day::to_string));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.hour.to_string()];
        record.extend(row.values.iter().map(f64::to_string));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!(path = %path.display(), columns = table.columns.len(), "Wrote table");
    Ok(())
}

/// Paths of the average-delay and frequency tables for a run, named after
/// `prefix` (e.g. `subway`).
pub fn report_paths(dir: impl AsRef<Path>, prefix: &str) -> (PathBuf, PathBuf) {
    let dir = dir.as_ref();
    (
        dir.join(format!("{prefix}_average_delay.csv")),
        dir.join(format!("{prefix}_nonzero_delay_frequency.csv")),
    )
}

pub fn write_average_summary<W: Write>(out: &mut W, averages: &DayHourMap<f64>) -> Result<()> {
    for (day, hour, avg) in averages.iter() {
        writeln!(out, "{day}, {hour}:00 - Average Delay: {avg:.2} minutes")?;
    }
    Ok(())
}

pub fn write_frequency_summary<W: Write>(out: &mut W, frequency: &DayHourMap<f64>) -> Result<()> {
    for (day, hour, pct) in frequency.iter() {
        writeln!(out, "{day}, {hour}:00 - Frequency of Non-zero Delay: {pct:.2}%")?;
    }
    Ok(())
}

/// Lists the row count of every non-empty (day, hour, delay category) group.
pub fn write_breakdown<W: Write>(out: &mut W, counts: &DayHourMap<CategoryCounts>) -> Result<()> {
    for (day, hour, c) in counts.iter() {
        for (category, rows) in [("Non-Zero Delay", c.non_zero), ("Zero Delay", c.zero)] {
            if rows > 0 {
                writeln!(out, "Size of {day} at {hour}:00 with {category}: {rows} rows")?;
            }
        }
    }
    Ok(())
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}
