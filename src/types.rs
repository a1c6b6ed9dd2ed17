//! # Common Types
//!
//! This module contains the types shared by extraction, loading, charting and
//! reporting: the per-commit metric row and the date token used to name
//! report files.

use chrono::NaiveDateTime;
use std::fmt;

/// Timestamp layout of a date token once the timezone suffix is removed.
pub const DATE_TOKEN_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A filesystem-safe token derived from a commit timestamp.
///
/// Tokens name the report pair of a commit (`scc_<token>.json` and
/// `scc_<token>_summary.txt`) and double as the extraction cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateToken(String);

impl DateToken {
    /// Build a token from a git date such as `2024-01-08 10:00:00 +0100`.
    pub fn from_commit_date(raw: &str) -> Self {
        let token = raw
            .trim()
            .replace(' ', "_")
            .replace([':', '/', '.'], "-");
        Self(token)
    }

    /// Recover the token from a JSON report file name (`scc_<token>.json`).
    pub fn from_report_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".json")?;
        let token = stem.strip_prefix("scc_").unwrap_or(stem);
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token without a trailing `_+HHMM` / `_-HHMM` offset.
    pub fn without_offset(&self) -> &str {
        let mut base = self.0.as_str();
        if let Some(idx) = base.find("_+") {
            base = &base[..idx];
        }
        if let Some(idx) = base.find("_-") {
            base = &base[..idx];
        }
        base
    }

    /// Parse the naive commit timestamp, ignoring the timezone offset.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.without_offset(), DATE_TOKEN_FORMAT).ok()
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metrics for one analysed commit, rebuilt from its report pair on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    /// Commit timestamp (naive, offset stripped)
    pub date: NaiveDateTime,
    /// Number of files in the target language
    pub files: i64,
    /// Lines of code in the target language
    pub code: i64,
    /// scc complexity score for the target language
    pub complexity: i64,
    /// Estimated cost to develop, in dollars
    pub cost: i64,
    /// Estimated schedule effort, in months
    pub effort: f64,
    /// Estimated people required
    pub people: f64,
    /// Bytes processed by scc
    pub bytes_processed: i64,
}

impl MetricRow {
    /// A row with every metric at zero.
    pub fn empty(date: NaiveDateTime) -> Self {
        Self {
            date,
            files: 0,
            code: 0,
            complexity: 0,
            cost: 0,
            effort: 0.0,
            people: 0.0,
            bytes_processed: 0,
        }
    }
}

/// A raw metric column of [`MetricRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Code,
    Complexity,
    Files,
    Cost,
    Effort,
    People,
    Bytes,
}

impl Metric {
    /// Column order used by the correlation matrix and the normalized overlay.
    pub const ALL: [Metric; 7] = [
        Metric::Code,
        Metric::Complexity,
        Metric::Files,
        Metric::Cost,
        Metric::Effort,
        Metric::People,
        Metric::Bytes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Code => "code",
            Metric::Complexity => "complexity",
            Metric::Files => "files",
            Metric::Cost => "cost",
            Metric::Effort => "effort",
            Metric::People => "people",
            Metric::Bytes => "bytes",
        }
    }

    pub fn value(self, row: &MetricRow) -> f64 {
        match self {
            Metric::Code => row.code as f64,
            Metric::Complexity => row.complexity as f64,
            Metric::Files => row.files as f64,
            Metric::Cost => row.cost as f64,
            Metric::Effort => row.effort,
            Metric::People => row.people,
            Metric::Bytes => row.bytes_processed as f64,
        }
    }

    pub fn series(self, rows: &[MetricRow]) -> Vec<f64> {
        rows.iter().map(|row| self.value(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_from_commit_date() {
        let token = DateToken::from_commit_date("2024-01-08 10:00:00 +0100\n");
        assert_eq!(token.as_str(), "2024-01-08_10-00-00_+0100");

        let token = DateToken::from_commit_date("2024/01/08 10:00:00.5");
        assert_eq!(token.as_str(), "2024-01-08_10-00-00-5");
    }

    #[test]
    fn test_token_from_report_name() {
        let token = DateToken::from_report_name("scc_2024-01-08_10-00-00_+0100.json").unwrap();
        assert_eq!(token.as_str(), "2024-01-08_10-00-00_+0100");
        assert!(DateToken::from_report_name("scc_2024-01-08_10-00-00_summary.txt").is_none());
        assert!(DateToken::from_report_name("scc_.json").is_none());
    }

    #[test]
    fn test_offset_suffix_is_ignored() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        for name in [
            "scc_2024-03-01_09-00-00.json",
            "scc_2024-03-01_09-00-00_+0200.json",
            "scc_2024-03-01_09-00-00_-0500.json",
        ] {
            let token = DateToken::from_report_name(name).unwrap();
            assert_eq!(token.timestamp(), Some(expected), "{name}");
        }
    }

    #[test]
    fn test_unparseable_token() {
        let token = DateToken::from_report_name("scc_latest.json").unwrap();
        assert_eq!(token.timestamp(), None);
    }
}
