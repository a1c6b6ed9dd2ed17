use chrono::NaiveDateTime;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::cache::ReportCache;
use super::scc::{parse_languages, SccEstimates};
use crate::app::config::Config;
use crate::error::Result;
use crate::types::{DateToken, MetricRow};

/// Rebuilds the metric table from the report directory.
pub struct MetricsLoader {
    cache: ReportCache,
    language: String,
}

impl MetricsLoader {
    pub fn new(report_dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            cache: ReportCache::new(report_dir),
            language: language.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.report_dir, &config.target_language)
    }

    /// Load every usable report, sorted by commit date with one row per date.
    ///
    /// Files whose name is not a date token are ignored. Reports that cannot
    /// be read or parsed are logged and skipped.
    pub fn load(&self) -> Result<Vec<MetricRow>> {
        if !self.cache.root().is_dir() {
            warn!("Report directory {} does not exist", self.cache.root().display());
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for path in self.cache.json_reports()? {
            let Some(date) = report_date(&path) else {
                debug!("Ignoring {}: not a dated report", path.display());
                continue;
            };

            match self.load_report(&path, date) {
                Ok(row) => {
                    debug!(
                        "{} | code: {}, complexity: {}, cost: ${}, effort: {}, people: {}",
                        row.date, row.code, row.complexity, row.cost, row.effort, row.people
                    );
                    rows.push(row);
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        rows.sort_by_key(|row| row.date);
        let before = rows.len();
        rows.dedup_by_key(|row| row.date);
        if rows.len() < before {
            warn!("Dropped {} reports sharing a commit date", before - rows.len());
        }
        Ok(rows)
    }

    fn load_report(&self, json_path: &Path, date: NaiveDateTime) -> Result<MetricRow> {
        let languages = parse_languages(&fs::read_to_string(json_path)?)?;
        let mut row = MetricRow::empty(date);

        if let Some(lang) = languages.iter().find(|l| l.name == self.language) {
            row.files = lang.count;
            row.code = lang.code;
            row.complexity = lang.complexity;
        }

        let summary_path = ReportCache::summary_for(json_path);
        if summary_path.exists() {
            let estimates = SccEstimates::parse(&fs::read_to_string(&summary_path)?);
            row.cost = estimates.cost;
            row.effort = estimates.effort;
            row.people = estimates.people;
            row.bytes_processed = estimates.bytes_processed;
        }

        Ok(row)
    }
}

fn report_date(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    DateToken::from_report_name(name)?.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn write_report(dir: &Path, token: &str, json: &str, summary: Option<&str>) {
        fs::write(dir.join(format!("scc_{token}.json")), json).unwrap();
        if let Some(summary) = summary {
            fs::write(dir.join(format!("scc_{token}_summary.txt")), summary).unwrap();
        }
    }

    #[test]
    fn test_load_sorted_rows() {
        let dir = TempDir::new().unwrap();
        write_report(
            dir.path(),
            "2024-01-08_10-00-00_+0100",
            r#"[{"Name": "Dart", "Count": 4, "Code": 150, "Complexity": 14}]"#,
            Some("Estimated Cost to Develop (organic) $2,500\nProcessed 1,024 bytes"),
        );
        write_report(
            dir.path(),
            "2024-01-01_10-00-00_-0500",
            r#"[{"Name": "Dart", "Count": 3, "Code": 100, "Complexity": 10}]"#,
            None,
        );

        let rows = MetricsLoader::new(dir.path(), "Dart").load().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, at(1, 10));
        assert_eq!(rows[0].code, 100);
        assert_eq!(rows[0].cost, 0);
        assert_eq!(rows[1].date, at(8, 10));
        assert_eq!(rows[1].files, 4);
        assert_eq!(rows[1].cost, 2_500);
        assert_eq!(rows[1].bytes_processed, 1_024);
    }

    #[test]
    fn test_corrupt_report_does_not_abort_load() {
        let dir = TempDir::new().unwrap();
        write_report(dir.path(), "2024-01-01_10-00-00", "{ truncated", None);
        write_report(dir.path(), "2024-01-02_10-00-00", r#"{"Name": "Dart"}"#, None);
        write_report(
            dir.path(),
            "2024-01-03_10-00-00",
            r#"[{"Name": "Dart", "Count": 1, "Code": 7, "Complexity": 1}]"#,
            None,
        );

        let rows = MetricsLoader::new(dir.path(), "Dart").load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, at(3, 10));
        assert_eq!(rows[0].code, 7);
    }

    #[test]
    fn test_missing_language_yields_zeroes() {
        let dir = TempDir::new().unwrap();
        write_report(
            dir.path(),
            "2024-01-01_10-00-00",
            r#"[{"Name": "Rust", "Count": 9, "Code": 900, "Complexity": 90}]"#,
            None,
        );

        let rows = MetricsLoader::new(dir.path(), "Dart").load().unwrap();
        assert_eq!(rows, vec![MetricRow::empty(at(1, 10))]);
    }

    #[test]
    fn test_undated_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_report(dir.path(), "latest", "[]", None);
        fs::write(dir.path().join("README.txt"), "notes").unwrap();

        let rows = MetricsLoader::new(dir.path(), "Dart").load().unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_same_date_is_loaded_once() {
        let dir = TempDir::new().unwrap();
        write_report(dir.path(), "2024-01-01_10-00-00_+0100", "[]", None);
        write_report(dir.path(), "2024-01-01_10-00-00_+0200", "[]", None);

        let rows = MetricsLoader::new(dir.path(), "Dart").load().unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let rows = MetricsLoader::new(dir.path().join("absent"), "Dart")
            .load()
            .unwrap();
        assert!(rows.is_empty());
    }
}
