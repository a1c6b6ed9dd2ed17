//! The two charts attached to the weekly report.

use plotters::prelude::*;
use std::fs;
use std::path::PathBuf;

use super::chart::{index_label, value_range, ChartRenderer, Line, PlotError};
use super::styles::{REPORT_BLUE, REPORT_GREEN, REPORT_RED, REPORT_YELLOW};
use crate::error::{Error, Result};
use crate::types::{Metric, MetricRow};
use crate::utils::aggregation::label_stride;
use crate::utils::stats::diff;

pub const WEEKLY_MAIN: &str = "weekly_main.png";
pub const WEEKLY_CHANGES: &str = "weekly_changes.png";

const TARGET_LABELS: usize = 14;
const BAR_WIDTH: f64 = 0.4;

/// Files written by [`ChartRenderer::render_weekly`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyCharts {
    pub main: PathBuf,
    pub changes: PathBuf,
}

/// Per-commit change with the first row counted as zero.
pub fn changes_from_start(values: &[f64]) -> Vec<f64> {
    diff(values).into_iter().map(|v| v.unwrap_or(0.0)).collect()
}

impl ChartRenderer {
    /// Render the code/complexity evolution and the per-commit change bars
    /// over the whole table.
    pub fn render_weekly(&self, rows: &[MetricRow]) -> Result<WeeklyCharts> {
        fs::create_dir_all(self.out_dir())?;
        let mut written = Vec::with_capacity(2);

        self.draw_weekly(rows, &mut written)
            .map_err(|e| Error::Chart(e.to_string()))?;

        let mut written = written.into_iter();
        match (written.next(), written.next()) {
            (Some(main), Some(changes)) => Ok(WeeklyCharts { main, changes }),
            _ => Err(Error::Chart("weekly charts were not written".to_string())),
        }
    }

    fn draw_weekly(
        &self,
        rows: &[MetricRow],
        written: &mut Vec<PathBuf>,
    ) -> std::result::Result<(), PlotError> {
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        let code = Metric::Code.series(rows);
        let complexity = Metric::Complexity.series(rows);

        self.save(WEEKLY_MAIN, (1000, 500), written, |area| {
            self.draw_time_lines(
                area,
                "Code and complexity over time",
                "Value",
                &dates,
                &[
                    Line::new("Lines of code", &code, REPORT_BLUE),
                    Line::new("Complexity", &complexity, REPORT_RED),
                ],
            )
        })?;

        let code_change = changes_from_start(&code);
        let complexity_change = changes_from_start(&complexity);
        let labels: Vec<String> = dates.iter().map(|d| d.format("%m-%d").to_string()).collect();

        self.save(WEEKLY_CHANGES, (1200, 600), written, |area| {
            let n = rows.len();
            let y_range = value_range(
                code_change
                    .iter()
                    .chain(&complexity_change)
                    .copied()
                    .chain([0.0]),
            );
            let mut chart = self.build_chart(
                area,
                "Changes per commit (code and complexity)",
                -0.5..(n.max(1) as f64 - 0.5),
                y_range,
            )?;

            let stride = label_stride(n, TARGET_LABELS);
            let x_fmt = |x: &f64| index_label(*x, &labels, stride);
            self.configure_mesh(&mut chart, "Date", "Change", n.clamp(1, 200), &x_fmt)?;

            chart.draw_series(code_change.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                let color = if *v > 0.0 { REPORT_GREEN } else { REPORT_BLUE };
                Rectangle::new([(x - BAR_WIDTH, 0.0), (x, *v)], color.mix(0.8).filled())
            }))?;
            chart.draw_series(complexity_change.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                let color = if *v > 0.0 { REPORT_RED } else { REPORT_YELLOW };
                Rectangle::new([(x, 0.0), (x + BAR_WIDTH, *v)], color.mix(0.8).filled())
            }))?;

            // Legend entries only; nothing is drawn at these points.
            let legend = [
                ("Lines of code up", REPORT_GREEN),
                ("Lines of code down", REPORT_BLUE),
                ("Complexity up", REPORT_RED),
                ("Complexity down", REPORT_YELLOW),
            ];
            for (label, color) in legend {
                chart
                    .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                    .label(label)
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK.mix(0.4))
                .position(SeriesLabelPosition::UpperLeft)
                .draw()?;
            Ok(())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_changes_from_start() {
        assert_eq!(changes_from_start(&[100.0, 150.0, 120.0]), vec![0.0, 50.0, -30.0]);
        assert!(changes_from_start(&[]).is_empty());
    }
}
