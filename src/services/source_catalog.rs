//! Named delay data sources.
//!
//! The built-in catalog covers the TTC subway delay datasets. A JSON file
//! can add or override entries:
//! ```json
//! {
//!   "subway-2024": "https://example.org/ttc-subway-delay-data-2024.csv",
//!   "bus-2024": "data/ttc-bus-delay-data-2024.csv"
//! }
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;

const TTC_CSV_BASE: &str = "https://raw.githubusercontent.com/rjeong1530/TTC-Data-analysis/main/csv";

const BUILTIN_YEARS: [u16; 4] = [2021, 2022, 2023, 2024];

/// Maps source names to URLs or file paths.
pub struct SourceCatalog {
    entries: BTreeMap<String, String>,
}

impl SourceCatalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN_YEARS
            .iter()
            .map(|year| {
                (
                    format!("subway-{year}"),
                    format!("{TTC_CSV_BASE}/ttc-subway-delay-data-{year}.csv"),
                )
            })
            .collect();
        Self { entries }
    }

    /// Adds the entries of the JSON object at `path`, replacing same-named ones.
    pub fn extend_from_file(&mut self, path: &str) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source catalog {path}"))?;
        let extra: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("invalid source catalog {path}"))?;
        self.entries.extend(extra);
        Ok(())
    }

    /// Returns the location for a catalog name, or `source` itself when it
    /// is not a known name.
    pub fn resolve<'a>(&'a self, source: &'a str) -> &'a str {
        self.entries.get(source).map(String::as_str).unwrap_or(source)
    }

    /// Iterates over all `(name, location)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_builtin_resolves_subway_years() {
        let catalog = SourceCatalog::builtin();
        assert!(catalog.resolve("subway-2023").ends_with("ttc-subway-delay-data-2023.csv"));
        assert_eq!(catalog.iter().count(), 4);
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let catalog = SourceCatalog::builtin();
        assert_eq!(catalog.resolve("data/local.csv"), "data/local.csv");
    }

    #[test]
    fn test_extend_from_file_overrides() {
        let path = env::temp_dir().join("delay_rater_test_catalog.json");
        fs::write(
            &path,
            r#"{"subway-2023": "mirror/2023.csv", "bus-2024": "bus.csv"}"#,
        )
        .unwrap();

        let mut catalog = SourceCatalog::builtin();
        catalog.extend_from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(catalog.resolve("subway-2023"), "mirror/2023.csv");
        assert_eq!(catalog.resolve("bus-2024"), "bus.csv");
        assert_eq!(catalog.iter().count(), 5);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_extend_from_missing_file_fails() {
        let mut catalog = SourceCatalog::builtin();
        assert!(catalog.extend_from_file("/nonexistent/catalog.json").is_err());
    }
}
