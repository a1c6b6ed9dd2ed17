use chrono::{Duration, NaiveDateTime};
use log::{debug, info};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error as StdError;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::styles::{self, ChartStyle, ChartTheme};
use crate::analysis::derived::{correlation_matrix, DerivedSeries};
use crate::app::config::Config;
use crate::error::{Error, Result};
use crate::types::{Metric, MetricRow};
use crate::utils::aggregation::{label_stride, weekday_activity};
use crate::utils::stats::{cumulative_sum, histogram, linear_fit, normalize, present};

pub(crate) type PlotError = Box<dyn StdError + Send + Sync>;
pub(crate) type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
pub(crate) type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const RECENT_WINDOW: usize = 30;
const HISTOGRAM_BINS: usize = 20;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// A dated series drawn as a line with point markers. Missing values leave
/// a gap.
pub(crate) struct Line<'s> {
    pub label: &'s str,
    pub values: Vec<Option<f64>>,
    pub color: RGBColor,
}

impl<'s> Line<'s> {
    pub fn new(label: &'s str, values: &[f64], color: RGBColor) -> Self {
        Self {
            label,
            values: values.iter().copied().map(Some).collect(),
            color,
        }
    }

    pub fn sparse(label: &'s str, values: &[Option<f64>], color: RGBColor) -> Self {
        Self {
            label,
            values: values.to_vec(),
            color,
        }
    }
}

/// Maps commit dates to fractional days since the first commit.
pub(crate) struct TimeAxis {
    origin: Option<NaiveDateTime>,
    xs: Vec<f64>,
}

impl TimeAxis {
    pub fn new(dates: &[NaiveDateTime]) -> Self {
        let origin = dates.first().copied();
        let xs = dates
            .iter()
            .map(|d| origin.map_or(0.0, |o| (*d - o).num_seconds() as f64 / SECONDS_PER_DAY))
            .collect();
        Self { origin, xs }
    }

    pub fn range(&self) -> Range<f64> {
        let (lo, hi) = self
            .xs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(*x), hi.max(*x))
            });
        if !lo.is_finite() {
            return 0.0..1.0;
        }
        let pad = ((hi - lo) * 0.03).max(0.5);
        (lo - pad)..(hi + pad)
    }

    pub fn label(&self, x: f64) -> String {
        self.origin
            .map(|o| o + Duration::seconds((x * SECONDS_PER_DAY) as i64))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Finite bounds of the values with a little headroom. Flat or empty input
/// still yields a drawable range.
pub(crate) fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < f64::EPSILON {
        let pad = if lo.abs() > 1.0 { lo.abs() * 0.1 } else { 1.0 };
        return (lo - pad)..(hi + pad);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// K/M formatting for large numbers, two decimals for small ratios.
pub(crate) fn compact_number(y: f64) -> String {
    if y.abs() >= 1_000_000.0 {
        format!("{:.1}M", y / 1_000_000.0)
    } else if y.abs() >= 1_000.0 {
        format!("{:.1}K", y / 1_000.0)
    } else if y.abs() >= 10.0 || y == 0.0 {
        format!("{:.0}", y)
    } else {
        format!("{:.2}", y)
    }
}

/// Runs of consecutive present values as chart points.
fn segments(xs: &[f64], values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (x, value) in xs.iter().zip(values) {
        match value {
            Some(y) if y.is_finite() => current.push((*x, *y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Index label formatter: only integer positions that fall on the stride.
pub(crate) fn index_label(x: f64, labels: &[String], stride: usize) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    let idx = idx as usize;
    if idx % stride.max(1) != 0 {
        return String::new();
    }
    labels.get(idx).cloned().unwrap_or_default()
}

/// Renders the chart catalogue for a metric table into one directory.
pub struct ChartRenderer {
    out_dir: PathBuf,
    pub(crate) theme: ChartTheme,
    pub(crate) style: ChartStyle,
}

impl ChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            theme: ChartTheme::default(),
            style: ChartStyle::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.graph_dir)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render every chart for `rows` (sorted by date) and return the files
    /// written, in catalogue order.
    pub fn render_all(&self, rows: &[MetricRow]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)?;
        let series = DerivedSeries::compute(rows);
        let mut written = Vec::new();

        self.render_catalogue(rows, &series, &mut written)
            .map_err(|e| Error::Chart(e.to_string()))?;

        info!("Wrote {} charts to {}", written.len(), self.out_dir.display());
        Ok(written)
    }

    fn render_catalogue(
        &self,
        rows: &[MetricRow],
        series: &DerivedSeries,
        written: &mut Vec<PathBuf>,
    ) -> std::result::Result<(), PlotError> {
        let dates = &series.dates;

        let raw = [
            (Metric::Code, "Lines of code", "Lines of code", "lines_of_code.png", styles::BLUE),
            (Metric::Complexity, "Complexity", "Complexity", "complexity.png", styles::RED),
            (Metric::Files, "Number of files", "Files", "files_count.png", styles::PURPLE),
            (Metric::Cost, "Estimated cost ($)", "Cost ($)", "cost.png", styles::GREEN),
            (Metric::Effort, "Estimated effort (months)", "Effort (months)", "effort.png", styles::ORANGE),
            (Metric::People, "Estimated people", "People", "people.png", styles::GREY),
            (Metric::Bytes, "Bytes processed", "Bytes", "bytes.png", styles::BROWN),
        ];
        for (metric, title, y_desc, file, color) in raw {
            let values = metric.series(rows);
            self.save(file, (1000, 500), written, |area| {
                self.draw_time_lines(area, title, y_desc, dates, &[Line::new(metric.name(), &values, color)])
            })?;
        }

        let deltas = [
            (&series.code_change, "Lines of code changed per commit", "Lines added/removed", "code_changes.png"),
            (&series.files_change, "Files changed per commit", "Files added/removed", "files_changes.png"),
            (&series.complexity_change, "Complexity changed per commit", "Complexity added/removed", "complexity_changes.png"),
            (&series.bytes_change, "Bytes changed per commit", "Bytes added/removed", "bytes_changes.png"),
        ];
        for (values, title, y_desc, file) in deltas {
            self.save(file, (1200, 600), written, |area| {
                self.draw_signed_bars(area, title, y_desc, dates, values)
            })?;
        }

        let ratios = [
            (&series.complexity_per_line, "Complexity per line of code", "Complexity/line", "complexity_ratio.png", styles::DARK_RED),
            (&series.bytes_per_file, "Average file size", "Bytes/file", "file_size_avg.png", styles::DARK_ORANGE),
            (&series.lines_per_file, "Average lines per file", "Lines/file", "lines_per_file.png", styles::DARK_BLUE),
            (&series.velocity, "Development velocity", "Lines/day", "velocity.png", styles::DARK_GREEN),
        ];
        for (values, title, y_desc, file, color) in ratios {
            self.save(file, (1000, 500), written, |area| {
                self.draw_time_lines(area, title, y_desc, dates, &[Line::new(y_desc, values, color)])
            })?;
        }

        let pairs = [
            (Metric::Code, Metric::Complexity, "Code vs complexity", "Lines of code", "Complexity", "correlation_code_complexity.png"),
            (Metric::Files, Metric::Complexity, "Files vs complexity", "Files", "Complexity", "correlation_files_complexity.png"),
            (Metric::Code, Metric::Cost, "Code vs cost", "Lines of code", "Cost ($)", "correlation_code_cost.png"),
        ];
        for (x, y, title, x_desc, y_desc, file) in pairs {
            let xs = x.series(rows);
            let ys = y.series(rows);
            self.save(file, (800, 600), written, |area| {
                self.draw_scatter(area, title, x_desc, y_desc, &xs, &ys)
            })?;
        }

        self.save("advanced_comparisons.png", (1800, 1200), written, |area| {
            self.draw_advanced(area, rows, series)
        })?;
        self.save("temporal_analysis.png", (2100, 900), written, |area| {
            self.draw_temporal(area, rows, series)
        })?;
        self.save("correlation_matrix.png", (1500, 1200), written, |area| {
            self.draw_correlation_matrix(area, &correlation_matrix(rows))
        })?;
        self.save("combined_normalized.png", (1200, 600), written, |area| {
            self.draw_normalized(area, rows, dates)
        })?;

        Ok(())
    }

    /// Create one image, let `draw` fill it and record the path.
    pub(crate) fn save(
        &self,
        name: &str,
        size: (u32, u32),
        written: &mut Vec<PathBuf>,
        draw: impl FnOnce(&Area<'_>) -> std::result::Result<(), PlotError>,
    ) -> std::result::Result<(), PlotError> {
        let path = self.out_dir.join(name);
        {
            let root = BitMapBackend::new(&path, size).into_drawing_area();
            root.fill(&self.theme.background_color)?;
            draw(&root)?;
            root.present()?;
        }
        debug!("Wrote {}", path.display());
        written.push(path);
        Ok(())
    }

    fn font(&self, size: i32) -> TextStyle<'static> {
        ("sans-serif", size as f64)
            .into_font()
            .color(&self.theme.text_color)
    }

    pub(crate) fn build_chart<'a, 'b>(
        &self,
        area: &'a Area<'b>,
        title: &str,
        x: Range<f64>,
        y: Range<f64>,
    ) -> std::result::Result<Chart<'a, 'b>, PlotError> {
        let chart = ChartBuilder::on(area)
            .caption(title, self.font(self.style.caption_size))
            .margin(self.style.margin)
            .x_label_area_size(self.style.label_area_size)
            .y_label_area_size(self.style.label_area_size)
            .build_cartesian_2d(x, y)?;
        Ok(chart)
    }

    pub(crate) fn configure_mesh(
        &self,
        chart: &mut Chart<'_, '_>,
        x_desc: &str,
        y_desc: &str,
        x_labels: usize,
        x_fmt: &dyn Fn(&f64) -> String,
    ) -> std::result::Result<(), PlotError> {
        chart
            .configure_mesh()
            .light_line_style(TRANSPARENT)
            .bold_line_style(self.theme.grid_color)
            .axis_style(self.theme.axis_color)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(self.font(self.style.font_size))
            .axis_desc_style(self.font(self.style.font_size))
            .x_labels(x_labels)
            .y_labels(8)
            .x_label_formatter(x_fmt)
            .y_label_formatter(&|y| compact_number(*y))
            .draw()?;
        Ok(())
    }

    fn draw_legend<'a, 'b: 'a>(&self, chart: &mut Chart<'a, 'b>) -> std::result::Result<(), PlotError> {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .label_font(self.font(self.style.font_size))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
        Ok(())
    }

    /// Dated line chart with one line per entry of `lines`.
    pub(crate) fn draw_time_lines(
        &self,
        area: &Area<'_>,
        title: &str,
        y_desc: &str,
        dates: &[NaiveDateTime],
        lines: &[Line<'_>],
    ) -> std::result::Result<(), PlotError> {
        let axis = TimeAxis::new(dates);
        let y_range = value_range(lines.iter().flat_map(|l| l.values.iter().flatten().copied()));
        let mut chart = self.build_chart(area, title, axis.range(), y_range)?;

        let x_fmt = |x: &f64| axis.label(*x);
        self.configure_mesh(&mut chart, "Date", y_desc, 6, &x_fmt)?;

        for line in lines {
            let color = line.color;
            let width = self.style.line_width;
            for segment in segments(&axis.xs, &line.values) {
                chart.draw_series(LineSeries::new(segment, color.stroke_width(width)))?;
            }

            let marker = self.style.marker_size;
            let points: Vec<(f64, f64)> = segments(&axis.xs, &line.values).concat();
            chart
                .draw_series(points.into_iter().map(|p| Circle::new(p, marker, color.filled())))?
                .label(line.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));
        }

        if lines.len() > 1 {
            self.draw_legend(&mut chart)?;
        }
        Ok(())
    }

    /// One bar per commit, coloured by sign, missing values drawn flat.
    fn draw_signed_bars(
        &self,
        area: &Area<'_>,
        title: &str,
        y_desc: &str,
        dates: &[NaiveDateTime],
        values: &[Option<f64>],
    ) -> std::result::Result<(), PlotError> {
        let n = values.len();
        let heights: Vec<f64> = values.iter().map(|v| v.unwrap_or(0.0)).collect();
        let y_range = value_range(heights.iter().copied().chain([0.0]));
        let x_range = -0.5..(n.max(1) as f64 - 0.5);
        let mut chart = self.build_chart(area, title, x_range.clone(), y_range)?;

        let labels: Vec<String> = dates.iter().map(|d| d.format("%m-%d").to_string()).collect();
        let stride = label_stride(n, 20);
        let x_fmt = |x: &f64| index_label(*x, &labels, stride);
        self.configure_mesh(&mut chart, "Date", y_desc, n.clamp(1, 200), &x_fmt)?;

        chart.draw_series(heights.iter().enumerate().map(|(i, h)| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, *h)],
                styles::sign_color(*h).mix(0.7).filled(),
            )
        }))?;
        chart.draw_series(LineSeries::new(
            vec![(x_range.start, 0.0), (x_range.end, 0.0)],
            BLACK.mix(0.5),
        ))?;
        Ok(())
    }

    /// Scatter plot coloured by chronological order with a least-squares line.
    fn draw_scatter(
        &self,
        area: &Area<'_>,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        xs: &[f64],
        ys: &[f64],
    ) -> std::result::Result<(), PlotError> {
        let x_range = value_range(xs.iter().copied());
        let mut chart = self.build_chart(area, title, x_range.clone(), value_range(ys.iter().copied()))?;
        self.configure_mesh(&mut chart, x_desc, y_desc, 8, &|x| compact_number(*x))?;

        let last = xs.len().saturating_sub(1).max(1) as f64;
        let marker = self.style.marker_size + 2;
        chart.draw_series(xs.iter().zip(ys).enumerate().map(|(i, (x, y))| {
            let color = styles::sequential(i as f64 / last);
            Circle::new((*x, *y), marker, color.mix(0.7).filled())
        }))?;

        if let Some((slope, intercept)) = linear_fit(xs, ys) {
            let trend = [x_range.start, x_range.end].map(|x| (x, slope * x + intercept));
            chart.draw_series(LineSeries::new(
                trend,
                styles::RED.mix(0.8).stroke_width(self.style.line_width),
            ))?;
        }
        Ok(())
    }

    /// 2x2 panel: cumulative changes, change distribution, efficiency, growth rate.
    fn draw_advanced(
        &self,
        area: &Area<'_>,
        rows: &[MetricRow],
        series: &DerivedSeries,
    ) -> std::result::Result<(), PlotError> {
        let panels = area.split_evenly((2, 2));
        let dates = &series.dates;

        self.draw_time_lines(
            &panels[0],
            "Cumulative changes",
            "Cumulative change",
            dates,
            &[
                Line::sparse("Code", &cumulative_sum(&series.code_change), styles::BLUE),
                Line::sparse("Files", &cumulative_sum(&series.files_change), styles::PURPLE),
            ],
        )?;

        self.draw_histogram(&panels[1], &present(&series.code_change))?;

        self.draw_time_lines(
            &panels[2],
            "Efficiency (complexity/cost)",
            "Efficiency",
            dates,
            &[Line::new("Efficiency", &series.efficiency, styles::RED)],
        )?;

        self.draw_time_lines(
            &panels[3],
            "Code growth rate (%)",
            "Growth (%)",
            dates,
            &[Line::sparse("Growth", &series.growth_rate, styles::GREEN)],
        )?;

        debug!("Rendered advanced comparisons for {} rows", rows.len());
        Ok(())
    }

    fn draw_histogram(&self, area: &Area<'_>, values: &[f64]) -> std::result::Result<(), PlotError> {
        let bins = histogram(values, HISTOGRAM_BINS);
        let x_range = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => first.start..last.end,
            _ => 0.0..1.0,
        };
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        let mut chart = self.build_chart(
            area,
            "Code change distribution",
            x_range,
            0.0..(max_count as f64 * 1.1),
        )?;
        self.configure_mesh(&mut chart, "Lines added/removed", "Frequency", 8, &|x| compact_number(*x))?;

        chart.draw_series(bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.start, 0.0), (bin.end, bin.count as f64)],
                styles::BLUE.mix(0.7).filled(),
            )
        }))?;
        chart.draw_series(bins.iter().map(|bin| {
            Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], BLACK.stroke_width(1))
        }))?;
        Ok(())
    }

    /// Weekday activity next to the trend of the last thirty commits.
    fn draw_temporal(
        &self,
        area: &Area<'_>,
        rows: &[MetricRow],
        series: &DerivedSeries,
    ) -> std::result::Result<(), PlotError> {
        let panels = area.split_evenly((1, 2));

        let activity = weekday_activity(&series.dates, &series.code_change);
        let labels: Vec<String> = activity.iter().map(|(day, _)| day.to_string()).collect();
        let heights: Vec<f64> = activity.iter().map(|(_, total)| *total).collect();
        let mut chart = self.build_chart(
            &panels[0],
            "Activity by weekday",
            -0.5..(activity.len().max(1) as f64 - 0.5),
            value_range(heights.iter().copied().chain([0.0])),
        )?;
        let x_fmt = |x: &f64| index_label(*x, &labels, 1);
        self.configure_mesh(&mut chart, "Day", "Absolute change", activity.len().max(1), &x_fmt)?;
        chart.draw_series(heights.iter().enumerate().map(|(i, h)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *h)], styles::SKY_BLUE.filled())
        }))?;

        let title = format!("Trend of the last {RECENT_WINDOW} commits");
        if rows.len() >= RECENT_WINDOW {
            let recent = &rows[rows.len() - RECENT_WINDOW..];
            let dates: Vec<NaiveDateTime> = recent.iter().map(|r| r.date).collect();
            self.draw_time_lines(
                &panels[1],
                &title,
                "Value",
                &dates,
                &[
                    Line::new("Code", &Metric::Code.series(recent), styles::BLUE),
                    Line::new("Complexity", &Metric::Complexity.series(recent), styles::RED),
                ],
            )?;
        } else {
            self.draw_placeholder(
                &panels[1],
                &title,
                &["Not enough data", &format!("(< {RECENT_WINDOW} commits)")],
            )?;
        }
        Ok(())
    }

    fn draw_placeholder(
        &self,
        area: &Area<'_>,
        title: &str,
        lines: &[&str],
    ) -> std::result::Result<(), PlotError> {
        let inner = area.titled(title, self.font(self.style.caption_size))?;
        let (w, h) = inner.dim_in_pixel();
        let style = self
            .font(self.style.caption_size)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let line_height = self.style.caption_size + 8;
        let top = h as i32 / 2 - line_height * (lines.len() as i32 - 1) / 2;

        for (i, line) in lines.iter().enumerate() {
            inner.draw(&Text::new(
                line.to_string(),
                (w as i32 / 2, top + line_height * i as i32),
                style.clone(),
            ))?;
        }
        Ok(())
    }

    /// Annotated heatmap of [`correlation_matrix`] with a colour bar.
    fn draw_correlation_matrix(
        &self,
        area: &Area<'_>,
        matrix: &[[f64; 7]; 7],
    ) -> std::result::Result<(), PlotError> {
        let n = Metric::ALL.len();
        let names: Vec<String> = Metric::ALL.iter().map(|m| m.name().to_string()).collect();
        let (w, _) = area.dim_in_pixel();
        let (left, right) = area.split_horizontally(w as i32 - 140);

        let range = -0.5..(n as f64 - 0.5);
        let mut chart = self.build_chart(&left, "Metric correlation matrix", range.clone(), range)?;

        let x_names = names.clone();
        let x_fmt = move |x: &f64| index_label(*x, &x_names, 1);
        let y_fmt = |y: &f64| {
            // row 0 is drawn at the top
            let flipped = (n - 1) as f64 - *y;
            index_label(flipped, &names, 1)
        };
        chart
            .configure_mesh()
            .disable_mesh()
            .axis_style(self.theme.axis_color)
            .label_style(self.font(self.style.font_size))
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .draw()?;

        let cell = |i: usize, j: usize| {
            let x = j as f64;
            let y = (n - 1 - i) as f64;
            (x, y)
        };

        chart.draw_series((0..n).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| {
            let (x, y) = cell(i, j);
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                styles::diverging(matrix[i][j]).filled(),
            )
        }))?;

        chart.draw_series((0..n).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| {
            let value = matrix[i][j];
            let color = if value.abs() > 0.6 { WHITE } else { BLACK };
            let style = ("sans-serif", self.style.font_size as f64 + 3.0)
                .into_font()
                .color(&color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            Text::new(format!("{value:.2}"), cell(i, j), style)
        }))?;

        self.draw_color_bar(&right)
    }

    fn draw_color_bar(&self, area: &Area<'_>) -> std::result::Result<(), PlotError> {
        let mut bar = ChartBuilder::on(area)
            .margin_top(60)
            .margin_bottom(80)
            .margin_right(10)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..1.0, -1.0..1.0)?;
        bar.configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .y_labels(5)
            .y_desc("Correlation")
            .label_style(self.font(self.style.font_size))
            .axis_desc_style(self.font(self.style.font_size))
            .draw()?;

        const STEPS: usize = 100;
        bar.draw_series((0..STEPS).map(|k| {
            let lo = -1.0 + 2.0 * k as f64 / STEPS as f64;
            let hi = lo + 2.0 / STEPS as f64;
            Rectangle::new(
                [(0.0, lo), (1.0, hi)],
                styles::diverging((lo + hi) / 2.0).filled(),
            )
        }))?;
        Ok(())
    }

    /// Every metric with some variation, scaled to `[0, 1]` on one chart.
    fn draw_normalized(
        &self,
        area: &Area<'_>,
        rows: &[MetricRow],
        dates: &[NaiveDateTime],
    ) -> std::result::Result<(), PlotError> {
        let palette = [
            (Metric::Code, "Code", styles::BLUE),
            (Metric::Complexity, "Complexity", styles::RED),
            (Metric::Cost, "Cost", styles::GREEN),
            (Metric::Effort, "Effort", styles::ORANGE),
            (Metric::People, "People", styles::GREY),
            (Metric::Files, "Files", styles::PURPLE),
            (Metric::Bytes, "Bytes", styles::BROWN),
        ];
        let lines: Vec<Line<'_>> = palette
            .iter()
            .filter_map(|(metric, label, color)| {
                normalize(&metric.series(rows)).map(|values| Line::new(label, &values, *color))
            })
            .collect();

        self.draw_time_lines(
            area,
            "Normalized evolution of indicators",
            "Normalized value (0-1)",
            dates,
            &lines,
        )
    }
}

/// Render the catalogue on the blocking thread pool.
pub async fn render_charts_async(
    renderer: ChartRenderer,
    rows: Vec<MetricRow>,
) -> Result<Vec<PathBuf>> {
    tokio::task::spawn_blocking(move || renderer.render_all(&rows))
        .await
        .map_err(|e| Error::Chart(e.to_string()))?
}
