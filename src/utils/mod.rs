pub mod aggregation;
pub mod stats;
