use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::DateToken;

/// Paths of the report pair written for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// `scc --format json` output
    pub json: PathBuf,
    /// Plain `scc` output
    pub summary: PathBuf,
}

impl ReportPaths {
    /// Remove whatever part of the pair exists.
    pub fn discard(&self) {
        let _ = fs::remove_file(&self.json);
        let _ = fs::remove_file(&self.summary);
    }
}

/// Manages the report directory, which doubles as the extraction cache:
/// a commit whose JSON report exists is never analysed again.
pub struct ReportCache {
    root: PathBuf,
}

impl ReportCache {
    /// Create a cache manager for the given report directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the report directory if needed
    pub fn initialize(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Report pair for a date token
    pub fn paths(&self, token: &DateToken) -> ReportPaths {
        ReportPaths {
            json: self.root.join(format!("scc_{token}.json")),
            summary: self.root.join(format!("scc_{token}_summary.txt")),
        }
    }

    /// Whether the commit behind this token was already analysed
    pub fn contains(&self, token: &DateToken) -> bool {
        self.paths(token).json.exists()
    }

    /// Summary path belonging to a JSON report
    pub fn summary_for(json_path: &Path) -> PathBuf {
        let name = json_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".json"))
            .map(|stem| format!("{stem}_summary.txt"))
            .unwrap_or_else(|| "summary.txt".to_string());
        json_path.with_file_name(name)
    }

    /// All JSON reports in the directory, sorted by file name
    pub fn json_reports(&self) -> io::Result<Vec<PathBuf>> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_paths_follow_naming_scheme() {
        let cache = ReportCache::new("/reports");
        let token = DateToken::from_commit_date("2024-01-08 10:00:00 +0100");
        let paths = cache.paths(&token);

        assert_eq!(paths.json, PathBuf::from("/reports/scc_2024-01-08_10-00-00_+0100.json"));
        assert_eq!(
            paths.summary,
            PathBuf::from("/reports/scc_2024-01-08_10-00-00_+0100_summary.txt")
        );
        assert_eq!(ReportCache::summary_for(&paths.json), paths.summary);
    }

    #[test]
    fn test_contains_and_listing() {
        let dir = TempDir::new().unwrap();
        let cache = ReportCache::new(dir.path().join("reports"));
        cache.initialize().unwrap();

        let token = DateToken::from_commit_date("2024-01-01 10:00:00 +0000");
        assert!(!cache.contains(&token));

        let paths = cache.paths(&token);
        fs::write(&paths.json, "[]").unwrap();
        fs::write(&paths.summary, "").unwrap();
        fs::write(cache.root().join("notes.md"), "").unwrap();

        assert!(cache.contains(&token));
        assert_eq!(cache.json_reports().unwrap(), vec![paths.json.clone()]);

        paths.discard();
        assert!(!cache.contains(&token));
        assert!(!paths.summary.exists());
    }
}
