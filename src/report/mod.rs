//! # Weekly report
//!
//! Loads the metric table, renders the report charts and posts a summary of
//! the trailing week to a Discord webhook.

pub mod discord;
pub mod summary;

use chrono::NaiveDateTime;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::analysis::metrics::MetricsLoader;
use crate::app::config::Config;
use crate::error::{Error, Result};
use crate::plotting::{ChartRenderer, WeeklyCharts};
use crate::types::MetricRow;

pub use discord::{Attachment, CollectSink, DeliveryOutcome, DiscordWebhook, WebhookPayload, WebhookSink};
pub use summary::{Headline, WeeklySummary};

/// How a report run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Sent(Headline),
    /// No webhook is configured
    Skipped(Headline),
    /// The endpoint answered with a non-success status
    Rejected { status: u16, body: String },
}

pub struct WeeklyReporter {
    config: Config,
    sink: Option<Arc<dyn WebhookSink>>,
}

impl WeeklyReporter {
    /// Reporter posting to the configured webhook, if any.
    pub fn from_config(config: &Config) -> Self {
        let sink = config
            .webhook_url
            .as_deref()
            .map(|url| Arc::new(DiscordWebhook::new(url)) as Arc<dyn WebhookSink>);
        Self {
            config: config.clone(),
            sink,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn WebhookSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build and deliver the report for the week ending at `now`.
    ///
    /// Fails with [`Error::NoData`] before anything is rendered when the
    /// report directory holds no usable report.
    pub async fn run(&self, now: NaiveDateTime) -> Result<ReportOutcome> {
        let rows = MetricsLoader::from_config(&self.config).load()?;
        if rows.is_empty() {
            return Err(Error::NoData(self.config.report_dir.clone()));
        }

        let charts = self.render(rows.clone()).await?;

        let summary = WeeklySummary::compute(&rows, now)
            .ok_or_else(|| Error::NoData(self.config.report_dir.clone()))?;
        let headline = summary.headline();
        info!(
            "Week {:?}: {} rows in window, code {:+}, complexity {:+}",
            headline, summary.rows_in_window, summary.code_change, summary.complexity_change
        );

        let Some(sink) = &self.sink else {
            info!("No webhook configured, report not sent");
            return Ok(ReportOutcome::Skipped(headline));
        };

        let message = summary.compose(Some(self.config.repo_url.as_str()), &self.config.target_language);
        let attachment = read_attachment(&charts.changes).await?;
        let payload = WebhookPayload::weekly(message, &attachment.file_name, now);

        match sink.deliver(&payload, attachment).await? {
            DeliveryOutcome::Delivered => {
                info!("Report delivered");
                Ok(ReportOutcome::Sent(headline))
            }
            DeliveryOutcome::Rejected { status, body } => {
                warn!("Webhook rejected the report: {status} {body}");
                Ok(ReportOutcome::Rejected { status, body })
            }
        }
    }

    /// Catalogue (when enabled) and weekly charts, off the async runtime.
    async fn render(&self, rows: Vec<MetricRow>) -> Result<WeeklyCharts> {
        let graph_dir = self.config.graph_dir.clone();
        let catalogue = self.config.auto_generate_graphs;

        tokio::task::spawn_blocking(move || {
            let renderer = ChartRenderer::new(graph_dir);
            if catalogue {
                renderer.render_all(&rows)?;
            }
            renderer.render_weekly(&rows)
        })
        .await
        .map_err(|e| Error::Chart(e.to_string()))?
    }
}

async fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::plotting::WEEKLY_CHANGES.to_string());
    Ok(Attachment { file_name, bytes })
}
