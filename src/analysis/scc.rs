//! Adapter around the `scc` counting tool.
//!
//! Everything that knows about scc's command line or its output formats
//! lives here: running it, reading the per-language JSON report and scraping
//! the COCOMO estimates out of the plain-text summary.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::app::config::Config;
use crate::error::{Error, Result};

/// Output mode requested from the counting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Something that can count a checked-out tree and write a report.
pub trait CodeCounter: Send + Sync {
    /// Count the tree at `workdir`, writing the tool output to `out`.
    fn count(&self, workdir: &Path, format: OutputFormat, out: &Path) -> Result<()>;
}

/// Runs the real `scc` binary.
#[derive(Debug, Clone)]
pub struct SccCounter {
    program: String,
    target: String,
}

impl SccCounter {
    pub fn new(program: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            target: target.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.scc_binary, &config.scc_target_dir)
    }
}

impl CodeCounter for SccCounter {
    fn count(&self, workdir: &Path, format: OutputFormat, out: &Path) -> Result<()> {
        let output = File::create(out)?;
        let mut command = Command::new(&self.program);
        if format == OutputFormat::Json {
            command.args(["--format", "json"]);
        }
        command
            .arg(&self.target)
            .current_dir(workdir)
            .stdout(Stdio::from(output));

        debug!("running {:?} in {}", command, workdir.display());
        let status = command.status()?;
        if !status.success() {
            return Err(Error::ToolFailed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// One language entry of `scc --format json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageSummary {
    pub name: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub complexity: i64,
}

/// Parse a JSON report into its language entries.
pub fn parse_languages(text: &str) -> Result<Vec<LanguageSummary>> {
    Ok(serde_json::from_str(text)?)
}

static COST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Estimated Cost to Develop \(organic\) \$([0-9,]+)").expect("valid regex")
});
static EFFORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Estimated Schedule Effort \(organic\) ([0-9.]+)").expect("valid regex")
});
static PEOPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Estimated People Required \(organic\) ([0-9.]+)").expect("valid regex")
});
static BYTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Processed ([0-9,]+) bytes").expect("valid regex"));

/// COCOMO estimates and byte count scraped from the text summary.
///
/// Any line that does not match leaves its field at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SccEstimates {
    pub cost: i64,
    pub effort: f64,
    pub people: f64,
    pub bytes_processed: i64,
}

impl SccEstimates {
    pub fn parse(text: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };
        let integer = |raw: Option<String>| {
            raw.and_then(|v| v.replace(',', "").parse::<i64>().ok())
                .unwrap_or(0)
        };
        let float = |raw: Option<String>| raw.and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0);

        Self {
            cost: integer(capture(&COST_RE)),
            effort: float(capture(&EFFORT_RE)),
            people: float(capture(&PEOPLE_RE)),
            bytes_processed: integer(capture(&BYTES_RE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SUMMARY: &str = "\
───────────────────────────────────────────────────────────────────────────────
Language                 Files     Lines   Blanks  Comments     Code Complexity
───────────────────────────────────────────────────────────────────────────────
Dart                        42     5,210      610       214    4,386        311
───────────────────────────────────────────────────────────────────────────────
Total                       42     5,210      610       214    4,386        311
───────────────────────────────────────────────────────────────────────────────
Estimated Cost to Develop (organic) $127,853
Estimated Schedule Effort (organic) 6.43 months
Estimated People Required (organic) 1.77
───────────────────────────────────────────────────────────────────────────────
Processed 171,392 bytes, 0.171 megabytes (SI)
───────────────────────────────────────────────────────────────────────────────
";

    #[test]
    fn test_parse_estimates() {
        let estimates = SccEstimates::parse(SUMMARY);
        assert_eq!(
            estimates,
            SccEstimates {
                cost: 127_853,
                effort: 6.43,
                people: 1.77,
                bytes_processed: 171_392,
            }
        );
    }

    #[test]
    fn test_unmatched_lines_default_to_zero() {
        let estimates = SccEstimates::parse("Processed 12 bytes\nsomething else");
        assert_eq!(estimates.bytes_processed, 12);
        assert_eq!(estimates.cost, 0);
        assert_eq!(estimates.effort, 0.0);
        assert_eq!(estimates.people, 0.0);
    }

    #[test]
    fn test_parse_languages() {
        let json = r#"[
            {"Name": "Dart", "Bytes": 1000, "Code": 120, "Complexity": 9, "Count": 3, "Files": []},
            {"Name": "YAML", "Code": 10, "Count": 1}
        ]"#;
        let languages = parse_languages(json).unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].code, 120);
        assert_eq!(languages[1].complexity, 0);
        assert!(parse_languages("{\"Name\": \"Dart\"}").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.json");

        let counter = SccCounter::new("false", "lib/");
        let result = counter.count(dir.path(), OutputFormat::Json, &out);
        assert!(matches!(result, Err(Error::ToolFailed { .. })));

        let counter = SccCounter::new("scc-binary-that-does-not-exist", "lib/");
        let result = counter.count(dir.path(), OutputFormat::Text, &out);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
