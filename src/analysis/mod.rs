pub mod cache;
pub mod derived;
pub mod git;
pub mod metrics;
pub mod scc;


pub use cache::ReportCache;
pub use derived::{ChangeStatistics, DerivedSeries};
pub use git::{extract_history_async, ExtractionSummary, HistoryExtractor};
pub use metrics::MetricsLoader;
pub use scc::{CodeCounter, SccCounter};
