//! Weekly summary of the metric table and the message posted with it.

use chrono::{Duration, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use std::fmt::Write;

use crate::types::MetricRow;

/// Length of the reporting window.
pub const WINDOW_DAYS: i64 = 7;

/// Weekly code growth above which the week counts as a record.
const RECORD_THRESHOLD: i64 = 100;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Tone of the report, chosen from the weekly code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Headline {
    Record,
    Refactoring,
    Stable,
}

impl Headline {
    pub fn from_code_change(code_change: i64) -> Self {
        if code_change > RECORD_THRESHOLD {
            Headline::Record
        } else if code_change < 0 {
            Headline::Refactoring
        } else {
            Headline::Stable
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Headline::Record => "🔥 **Record development week!**",
            Headline::Refactoring => "📉 **Refactoring or cleanup week!**",
            Headline::Stable => "📊 **Stable week**",
        }
    }
}

/// A value together with the commit date it was observed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extreme {
    pub value: i64,
    pub date: NaiveDateTime,
}

/// First row holding the largest (or smallest) key.
fn extreme(rows: &[MetricRow], values: &[i64], largest: bool) -> Option<Extreme> {
    let mut best: Option<(usize, i64)> = None;
    for (i, value) in values.iter().enumerate() {
        let better = match best {
            None => true,
            Some((_, current)) if largest => *value > current,
            Some((_, current)) => *value < current,
        };
        if better {
            best = Some((i, *value));
        }
    }
    best.map(|(i, value)| Extreme {
        value,
        date: rows[i].date,
    })
}

/// Commit-to-commit change over the whole table, zero for the first row.
fn changes(rows: &[MetricRow], field: impl Fn(&MetricRow) -> i64) -> Vec<i64> {
    let mut previous: Option<i64> = None;
    rows.iter()
        .map(|row| {
            let value = field(row);
            let change = previous.map_or(0, |p| value - p);
            previous = Some(value);
            change
        })
        .collect()
}

/// Largest single-commit movements over the whole history.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCommits {
    pub largest_addition: Extreme,
    pub largest_deletion: Extreme,
    pub largest_complexity: Extreme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
    /// Rows dated inside the window
    pub rows_in_window: usize,
    /// Latest row of the window, or of the table when the window is empty
    pub current: MetricRow,
    pub code_change: i64,
    pub files_change: i64,
    pub complexity_change: i64,
    pub cost_change: i64,
    pub max_code: Extreme,
    pub max_complexity: Extreme,
    pub top: TopCommits,
}

impl WeeklySummary {
    /// Summarise `rows` (sorted by date) for the week ending at `now`.
    /// `None` for an empty table.
    pub fn compute(rows: &[MetricRow], now: NaiveDateTime) -> Option<Self> {
        let latest = rows.last()?;
        let period_start = now - Duration::days(WINDOW_DAYS);
        let window: Vec<&MetricRow> = rows.iter().filter(|r| r.date >= period_start).collect();

        let delta = |field: fn(&MetricRow) -> i64| match (window.first(), window.last()) {
            (Some(first), Some(last)) if window.len() > 1 => field(last) - field(first),
            _ => 0,
        };

        let code: Vec<i64> = rows.iter().map(|r| r.code).collect();
        let complexity: Vec<i64> = rows.iter().map(|r| r.complexity).collect();
        let code_changes = changes(rows, |r| r.code);
        let complexity_changes = changes(rows, |r| r.complexity);

        Some(Self {
            period_start,
            period_end: now,
            rows_in_window: window.len(),
            current: window.last().copied().unwrap_or(latest).clone(),
            code_change: delta(|r| r.code),
            files_change: delta(|r| r.files),
            complexity_change: delta(|r| r.complexity),
            cost_change: delta(|r| r.cost),
            max_code: extreme(rows, &code, true)?,
            max_complexity: extreme(rows, &complexity, true)?,
            top: TopCommits {
                largest_addition: extreme(rows, &code_changes, true)?,
                largest_deletion: extreme(rows, &code_changes, false)?,
                largest_complexity: extreme(rows, &complexity_changes, true)?,
            },
        })
    }

    pub fn headline(&self) -> Headline {
        Headline::from_code_change(self.code_change)
    }

    /// Markdown body of the report embed.
    pub fn compose(&self, repo_url: Option<&str>, language: &str) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_message(&mut out, repo_url, language);
        out
    }

    fn write_message(
        &self,
        out: &mut String,
        repo_url: Option<&str>,
        language: &str,
    ) -> std::fmt::Result {
        write!(out, "{}", self.headline().text())?;
        if let Some(url) = repo_url.filter(|u| !u.is_empty()) {
            write!(out, "\n🔗 [View the analysed repository]({url})")?;
        }
        writeln!(out)?;
        writeln!(out)?;
        writeln!(
            out,
            "**Period:** {} → {}",
            self.period_start.format("%d/%m/%Y"),
            self.period_end.format("%d/%m/%Y")
        )?;
        writeln!(out)?;

        let c = &self.current;
        let files_label = format!("{language} files");
        let lines = [
            ("Lines of code", "", c.code, self.code_change, ("🟩", "🟥")),
            (files_label.as_str(), "", c.files, self.files_change, ("🟦", "🟥")),
            ("Complexity", "", c.complexity, self.complexity_change, ("🟪", "🟧")),
            ("Estimated cost", "$", c.cost, self.cost_change, ("💸", "💰")),
        ];
        for (label, prefix, value, change, (up, down)) in lines {
            let marker = if change > 0 { up } else { down };
            writeln!(
                out,
                "**{label}:** {prefix}{} {marker} ({} {})",
                format_thousands(value),
                format_signed(change),
                trend_arrow(change)
            )?;
        }

        writeln!(out)?;
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out)?;
        writeln!(out, "🏆 **Records**")?;
        writeln!(
            out,
            "• Max lines of code: {} ({})",
            format_thousands(self.max_code.value),
            self.max_code.date.format("%Y-%m-%d")
        )?;
        writeln!(
            out,
            "• Max complexity: {} ({})",
            format_thousands(self.max_complexity.value),
            self.max_complexity.date.format("%Y-%m-%d")
        )?;

        writeln!(out)?;
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out)?;
        writeln!(out, "📈 **Trends**")?;
        writeln!(out, "• Weekly growth: {} lines", format_signed(self.code_change))?;
        writeln!(out, "• Files created/removed: {}", format_signed(self.files_change))?;
        writeln!(
            out,
            "• Complexity added/removed: {}",
            format_signed(self.complexity_change)
        )?;

        writeln!(out)?;
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out)?;
        let top = &self.top;
        writeln!(out, "**Top commits:**")?;
        writeln!(
            out,
            "• ➕ {} lines on {}",
            format_thousands(top.largest_addition.value),
            top.largest_addition.date.format("%d/%m/%Y")
        )?;
        writeln!(
            out,
            "• ➖ {} lines on {}",
            format_thousands(top.largest_deletion.value),
            top.largest_deletion.date.format("%d/%m/%Y")
        )?;
        writeln!(
            out,
            "• 🟪 +{} complexity on {}",
            format_thousands(top.largest_complexity.value),
            top.largest_complexity.date.format("%d/%m/%Y")
        )?;
        writeln!(out)?;
        write!(out, "_Sent automatically by SCC Bot_")
    }
}

fn trend_arrow(change: i64) -> &'static str {
    match change.signum() {
        1 => "⬆️",
        -1 => "⬇️",
        _ => "➖",
    }
}

/// `1234567` as `1,234,567`.
pub fn format_thousands(value: i64) -> String {
    value.to_formatted_string(&Locale::en)
}

/// Thousands-separated with an explicit sign, zero included (`+0`).
pub fn format_signed(value: i64) -> String {
    if value < 0 {
        format_thousands(value)
    } else {
        format!("+{}", format_thousands(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn midnight(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn row(day: u32, code: i64, complexity: i64) -> MetricRow {
        let mut row = MetricRow::empty(at(day));
        row.code = code;
        row.complexity = complexity;
        row.files = code / 10;
        row.cost = code * 10;
        row
    }

    #[test]
    fn test_two_commit_week() {
        let rows = vec![row(1, 100, 10), row(8, 150, 14)];
        let summary = WeeklySummary::compute(&rows, midnight(8)).unwrap();

        assert_eq!(summary.rows_in_window, 2);
        assert_eq!(summary.code_change, 50);
        assert_eq!(summary.complexity_change, 4);
        assert_eq!(summary.headline(), Headline::Stable);

        let message = summary.compose(None, "Dart");
        assert!(message.starts_with("📊 **Stable week**"));
        assert!(message.contains("+50"));
        assert!(message.contains("+4"));
        assert!(message.contains("**Period:** 01/01/2024 → 08/01/2024"));
        assert!(message.contains("**Dart files:** 15"));
        assert!(!message.contains("🔗"));
    }

    #[test]
    fn test_headline_thresholds() {
        assert_eq!(Headline::from_code_change(250), Headline::Record);
        assert_eq!(Headline::from_code_change(101), Headline::Record);
        assert_eq!(Headline::from_code_change(100), Headline::Stable);
        assert_eq!(Headline::from_code_change(0), Headline::Stable);
        assert_eq!(Headline::from_code_change(-30), Headline::Refactoring);
    }

    #[test]
    fn test_single_row_window_has_no_deltas() {
        let rows = vec![row(1, 100, 10), row(20, 400, 30)];
        let summary = WeeklySummary::compute(&rows, midnight(21)).unwrap();

        assert_eq!(summary.rows_in_window, 1);
        assert_eq!(summary.code_change, 0);
        assert_eq!(summary.cost_change, 0);
        assert_eq!(summary.current.code, 400);
    }

    #[test]
    fn test_empty_window_uses_latest_row() {
        let rows = vec![row(1, 100, 10), row(2, 80, 12)];
        let summary = WeeklySummary::compute(&rows, midnight(31)).unwrap();

        assert_eq!(summary.rows_in_window, 0);
        assert_eq!(summary.current.code, 80);
        assert_eq!(summary.code_change, 0);
    }

    #[test]
    fn test_records_and_top_commits() {
        let rows = vec![
            row(1, 100, 10),
            row(2, 400, 12),
            row(3, 250, 30),
            row(4, 300, 31),
        ];
        let summary = WeeklySummary::compute(&rows, midnight(5)).unwrap();

        assert_eq!(summary.max_code, Extreme { value: 400, date: at(2) });
        assert_eq!(summary.max_complexity, Extreme { value: 31, date: at(4) });
        assert_eq!(summary.top.largest_addition, Extreme { value: 300, date: at(2) });
        assert_eq!(summary.top.largest_deletion, Extreme { value: -150, date: at(3) });
        assert_eq!(summary.top.largest_complexity, Extreme { value: 18, date: at(3) });
        assert_eq!(summary.code_change, 200);
        assert_eq!(summary.headline(), Headline::Record);

        let message = summary.compose(Some("https://example.com/repo.git"), "Dart");
        assert!(message.contains("[View the analysed repository](https://example.com/repo.git)"));
        assert!(message.contains("• ➖ -150 lines on 03/01/2024"));
        assert!(message.contains("• Max lines of code: 400 (2024-01-02)"));
    }

    #[test]
    fn test_refactoring_week() {
        let rows = vec![row(1, 100, 10), row(3, 70, 9)];
        let summary = WeeklySummary::compute(&rows, midnight(4)).unwrap();

        assert_eq!(summary.code_change, -30);
        assert_eq!(summary.headline(), Headline::Refactoring);
        assert!(summary.compose(None, "Dart").contains("(-30 ⬇️)"));
    }

    #[test]
    fn test_empty_table() {
        assert!(WeeklySummary::compute(&[], midnight(1)).is_none());
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-45_000), "-45,000");
        assert_eq!(format_signed(0), "+0");
        assert_eq!(format_signed(1_500), "+1,500");
        assert_eq!(format_signed(-30), "-30");
    }
}
