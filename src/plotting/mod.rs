pub mod chart;
pub mod styles;
pub mod weekly;


pub use chart::{render_charts_async, ChartRenderer};
pub use weekly::{WeeklyCharts, WEEKLY_CHANGES, WEEKLY_MAIN};
