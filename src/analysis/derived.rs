//! Series computed from the metric table for charting.

use chrono::NaiveDateTime;
use statrs::statistics::Statistics;
use std::fmt;

use crate::types::{Metric, MetricRow};
use crate::utils::stats::{diff, median, pearson, percent_change, present, safe_ratio};

/// Per-row series derived from a table sorted by date.
///
/// Deltas are `None` on the first row. Ratios divide by one where the
/// denominator is zero so they are always defined.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub dates: Vec<NaiveDateTime>,
    pub code_change: Vec<Option<f64>>,
    pub files_change: Vec<Option<f64>>,
    pub complexity_change: Vec<Option<f64>>,
    pub bytes_change: Vec<Option<f64>>,
    pub complexity_per_line: Vec<f64>,
    pub bytes_per_file: Vec<f64>,
    pub lines_per_file: Vec<f64>,
    /// Whole days since the first row
    pub days_since_start: Vec<i64>,
    /// `code / (days_since_start + 1)`
    pub velocity: Vec<f64>,
    /// Cost growth relative to the first row, in percent (zero when the
    /// first cost is zero)
    pub total_cost_growth: Vec<f64>,
    /// Complexity per dollar of estimated cost
    pub efficiency: Vec<f64>,
    /// Code growth relative to the previous row, in percent
    pub growth_rate: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn compute(rows: &[MetricRow]) -> Self {
        let code = Metric::Code.series(rows);
        let files = Metric::Files.series(rows);
        let complexity = Metric::Complexity.series(rows);
        let bytes = Metric::Bytes.series(rows);
        let cost = Metric::Cost.series(rows);

        let ratio = |num: &[f64], den: &[f64]| -> Vec<f64> {
            num.iter().zip(den).map(|(n, d)| safe_ratio(*n, *d)).collect()
        };

        let start = rows.first().map(|row| row.date);
        let days_since_start: Vec<i64> = rows
            .iter()
            .map(|row| start.map_or(0, |s| (row.date - s).num_days()))
            .collect();
        let velocity = code
            .iter()
            .zip(&days_since_start)
            .map(|(c, days)| c / (*days as f64 + 1.0))
            .collect();

        let first_cost = cost.first().copied().unwrap_or(0.0);
        let total_cost_growth = cost
            .iter()
            .map(|c| {
                if first_cost > 0.0 {
                    (c - first_cost) / first_cost * 100.0
                } else {
                    0.0
                }
            })
            .collect();

        Self {
            dates: rows.iter().map(|row| row.date).collect(),
            code_change: diff(&code),
            files_change: diff(&files),
            complexity_change: diff(&complexity),
            bytes_change: diff(&bytes),
            complexity_per_line: ratio(&complexity, &code),
            bytes_per_file: ratio(&bytes, &files),
            lines_per_file: ratio(&code, &files),
            days_since_start,
            velocity,
            total_cost_growth,
            efficiency: ratio(&complexity, &cost),
            growth_rate: percent_change(&code),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Pairwise Pearson correlation of every column in [`Metric::ALL`].
pub fn correlation_matrix(rows: &[MetricRow]) -> [[f64; 7]; 7] {
    let columns: Vec<Vec<f64>> = Metric::ALL.iter().map(|m| m.series(rows)).collect();
    let mut matrix = [[f64::NAN; 7]; 7];
    for (i, a) in columns.iter().enumerate() {
        for (j, b) in columns.iter().enumerate() {
            matrix[i][j] = pearson(a, b);
        }
    }
    matrix
}

/// Distribution of per-commit code changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeStatistics {
    pub largest_addition: f64,
    pub largest_deletion: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, NaN with a single change
    pub std_dev: f64,
    pub commits_adding: usize,
    pub total_commits: usize,
}

impl ChangeStatistics {
    /// `None` when fewer than two rows exist, as there is no change to describe.
    pub fn compute(series: &DerivedSeries) -> Option<Self> {
        let changes = present(&series.code_change);
        if changes.is_empty() {
            return None;
        }
        Some(Self {
            largest_addition: Statistics::max(changes.iter()),
            largest_deletion: Statistics::min(changes.iter()),
            mean: changes.iter().mean(),
            median: median(&changes)?,
            std_dev: changes.iter().std_dev(),
            commits_adding: changes.iter().filter(|c| **c > 0.0).count(),
            total_commits: series.len(),
        })
    }

    pub fn adding_share(&self) -> f64 {
        if self.total_commits == 0 {
            0.0
        } else {
            self.commits_adding as f64 / self.total_commits as f64 * 100.0
        }
    }
}

impl fmt::Display for ChangeStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Change statistics:")?;
        writeln!(f, "├─ Largest addition: {:.0} lines", self.largest_addition)?;
        writeln!(f, "├─ Largest deletion: {:.0} lines", self.largest_deletion)?;
        writeln!(f, "├─ Mean change per commit: {:.1} lines", self.mean)?;
        writeln!(f, "├─ Median change: {:.1} lines", self.median)?;
        writeln!(f, "├─ Standard deviation: {:.1} lines", self.std_dev)?;
        write!(
            f,
            "└─ Commits adding code: {}/{} ({:.1}%)",
            self.commits_adding,
            self.total_commits,
            self.adding_share()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn row(day: u32, code: i64, files: i64, complexity: i64, cost: i64) -> MetricRow {
        let mut row = MetricRow::empty(
            NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        );
        row.code = code;
        row.files = files;
        row.complexity = complexity;
        row.cost = cost;
        row
    }

    #[test]
    fn test_first_delta_is_undefined() {
        let rows = vec![row(1, 0, 0, 0, 0), row(2, 120, 4, 12, 1000)];
        let series = DerivedSeries::compute(&rows);

        assert_eq!(series.code_change, vec![None, Some(120.0)]);
        assert_eq!(series.files_change, vec![None, Some(4.0)]);
        // zero denominators divide by one
        assert_eq!(series.complexity_per_line, vec![0.0, 0.1]);
        assert_eq!(series.lines_per_file, vec![0.0, 30.0]);
        assert_eq!(series.efficiency, vec![0.0, 0.012]);
        assert_eq!(series.growth_rate, vec![None, None]);
        assert_eq!(series.total_cost_growth, vec![0.0, 0.0]);
    }

    #[test]
    fn test_velocity_and_growth() {
        let rows = vec![row(1, 100, 2, 10, 200), row(5, 150, 3, 14, 300)];
        let series = DerivedSeries::compute(&rows);

        assert_eq!(series.days_since_start, vec![0, 4]);
        assert_eq!(series.velocity, vec![100.0, 30.0]);
        assert_eq!(series.growth_rate, vec![None, Some(50.0)]);
        assert_eq!(series.total_cost_growth, vec![0.0, 50.0]);
    }

    #[test]
    fn test_empty_table() {
        let series = DerivedSeries::compute(&[]);
        assert!(series.is_empty());
        assert!(ChangeStatistics::compute(&series).is_none());
    }

    #[test]
    fn test_change_statistics() {
        let rows = vec![
            row(1, 100, 1, 1, 0),
            row(2, 150, 1, 1, 0),
            row(3, 120, 1, 1, 0),
            row(4, 160, 1, 1, 0),
        ];
        let stats = ChangeStatistics::compute(&DerivedSeries::compute(&rows)).unwrap();

        assert_eq!(stats.largest_addition, 50.0);
        assert_eq!(stats.largest_deletion, -30.0);
        assert!((stats.mean - 20.0).abs() < 1e-9);
        assert_eq!(stats.median, 40.0);
        assert_eq!(stats.commits_adding, 2);
        assert_eq!(stats.total_commits, 4);
        assert!(stats.to_string().contains("2/4 (50.0%)"));
    }

    #[test]
    fn test_correlation_matrix() {
        let rows = vec![row(1, 100, 2, 10, 5), row(2, 200, 4, 20, 5), row(3, 300, 5, 35, 5)];
        let matrix = correlation_matrix(&rows);

        assert!((matrix[0][0] - 1.0).abs() < 1e-9);
        assert!(matrix[0][1] > 0.9);
        assert!((matrix[0][1] - matrix[1][0]).abs() < 1e-9);
        // constant cost column has no defined correlation
        assert!(matrix[0][3].is_nan());
    }
}
