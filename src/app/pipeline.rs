//! Entry points behind each command. Stages run one after the other.

use chrono::NaiveDateTime;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use super::config::{Config, ConfigStore, Prompter};
use crate::analysis::derived::{ChangeStatistics, DerivedSeries};
use crate::analysis::git::{extract_history_async, ExtractionSummary, HistoryExtractor};
use crate::analysis::metrics::MetricsLoader;
use crate::analysis::scc::{CodeCounter, SccCounter};
use crate::error::{Error, Result};
use crate::plotting::{render_charts_async, ChartRenderer};
use crate::report::{ReportOutcome, WeeklyReporter};

/// Charts written by [`plot`] and the change statistics of the table.
#[derive(Debug)]
pub struct PlotOutput {
    pub charts: Vec<PathBuf>,
    pub statistics: Option<ChangeStatistics>,
}

/// Complete and persist the configuration, asking for whatever is missing.
pub fn setup(store: &ConfigStore, prompter: &mut dyn Prompter) -> Result<Config> {
    let config = store.load_interactive(prompter)?;
    info!(
        "Configuration ready: {} ({}) -> {}",
        config.repo_url,
        config.branch,
        config.report_dir.display()
    );
    Ok(config)
}

/// Extract the branch history with the configured scc binary.
pub async fn extract(config: &Config) -> Result<ExtractionSummary> {
    let counter: Arc<dyn CodeCounter> = Arc::new(SccCounter::from_config(config));
    extract_with(config, counter).await
}

/// Extract the branch history with any counting tool.
pub async fn extract_with(config: &Config, counter: Arc<dyn CodeCounter>) -> Result<ExtractionSummary> {
    extract_history_async(HistoryExtractor::from_config(config, counter)).await
}

/// Render the chart catalogue from the report directory.
pub async fn plot(config: &Config) -> Result<PlotOutput> {
    let rows = MetricsLoader::from_config(config).load()?;
    if rows.is_empty() {
        return Err(Error::NoData(config.report_dir.clone()));
    }
    info!("Loaded {} commits", rows.len());

    let statistics = ChangeStatistics::compute(&DerivedSeries::compute(&rows));
    let charts = render_charts_async(ChartRenderer::from_config(config), rows).await?;

    Ok(PlotOutput { charts, statistics })
}

/// Build and send the weekly report.
pub async fn report(config: &Config, now: NaiveDateTime) -> Result<ReportOutcome> {
    WeeklyReporter::from_config(config).run(now).await
}

/// Unattended run: refresh the reports, then send the weekly report.
pub async fn cron(config: &Config, now: NaiveDateTime) -> Result<(ExtractionSummary, ReportOutcome)> {
    let extraction = extract(config).await?;
    let outcome = report(config, now).await?;
    Ok((extraction, outcome))
}
