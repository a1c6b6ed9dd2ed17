pub mod config;
pub mod pipeline;

pub use config::{Config, ConfigStore, Prompter, StdinPrompter};
