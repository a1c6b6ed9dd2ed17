//! # SCC History Library
//!
//! `sccstats` follows a repository's history through the eyes of
//! [scc](https://github.com/boyter/scc). Every commit of a branch is checked
//! out and counted once, the resulting reports are turned into a metric
//! table, and the table feeds a chart catalogue and a weekly Discord report.
//!
//! ## Features
//!
//! - Per-commit scc reports, cached by commit date
//! - Metric table with cost, effort and people estimates
//! - Derived series: deltas, ratios, velocity, growth
//! - PNG chart catalogue and weekly report charts
//! - Weekly summary posted to a Discord webhook
//!
//! ## Example
//!
//! ```no_run
//! use sccstats::{ChartRenderer, ConfigStore, MetricsLoader};
//!
//! # fn main() -> sccstats::Result<()> {
//! let config = ConfigStore::new("scc_config.json").load_strict()?;
//! let rows = MetricsLoader::from_config(&config).load()?;
//! let charts = ChartRenderer::from_config(&config).render_all(&rows)?;
//! println!("{} charts written", charts.len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod app;
pub mod error;
pub mod plotting;
pub mod report;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{HistoryExtractor, MetricsLoader};
pub use app::{Config, ConfigStore};
pub use error::{Error, Result};
pub use plotting::ChartRenderer;
pub use report::WeeklyReporter;
pub use types::{DateToken, MetricRow};
