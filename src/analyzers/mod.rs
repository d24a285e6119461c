//! Delay bucketing and aggregation.
//!
//! Records are split by delay, grouped by (day, hour) with an optional hour
//! exclusion window, and reduced to a mean delay and a non-zero-delay
//! frequency per bucket. Results stay sparse here; the output module makes
//! them dense.

pub mod aggregate;
pub mod analyzer;
pub mod bucket;
pub mod filter;
pub mod types;
pub mod utility;
