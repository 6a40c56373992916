//! File-extension filter gating every transfer

use regex::Regex;

use crate::models::error::TransferError;

/// Matches object names ending in a literal `.<extension>`, case-sensitive
/// to match the backends' object naming. An empty extension yields a filter
/// that deterministically matches nothing.
pub struct ExtensionFilter {
    pattern: Option<Regex>,
}

impl ExtensionFilter {
    pub fn new(extension: &str) -> Result<Self, TransferError> {
        let extension = extension.trim();
        if extension.is_empty() {
            return Ok(Self { pattern: None });
        }

        // Escaped and anchored: the extension is a literal suffix, not a
        // wildcard, and ".csv" in the middle of a name must not match.
        let pattern = Regex::new(&format!(r".*\.{}$", regex::escape(extension)))
            .map_err(|e| TransferError::ConfigError(format!("invalid file extension: {}", e)))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_names_ending_with_dot_extension() {
        let filter = ExtensionFilter::new("csv").unwrap();
        assert!(filter.matches("report.csv"));
        assert!(filter.matches("exports/2024/report.csv"));
        assert!(filter.matches("weird.name.csv"));
    }

    #[test]
    fn rejects_other_extensions_and_embedded_matches() {
        let filter = ExtensionFilter::new("csv").unwrap();
        assert!(!filter.matches("notes.txt"));
        assert!(!filter.matches("report.csv.bak"));
        assert!(!filter.matches("csv"));
        assert!(!filter.matches("reportcsv"));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let filter = ExtensionFilter::new("csv").unwrap();
        assert!(!filter.matches("REPORT.CSV"));
        assert!(filter.matches("REPORT.csv"));
    }

    #[test]
    fn empty_extension_matches_nothing() {
        let filter = ExtensionFilter::new("").unwrap();
        assert!(!filter.matches("report.csv"));
        assert!(!filter.matches(""));

        let blank = ExtensionFilter::new("   ").unwrap();
        assert!(!blank.matches("report.csv"));
    }

    #[test]
    fn regex_metacharacters_in_extension_are_literal() {
        let filter = ExtensionFilter::new("c+v").unwrap();
        assert!(filter.matches("file.c+v"));
        assert!(!filter.matches("file.ccv"));
    }
}
