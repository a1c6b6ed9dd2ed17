//! SCC history toolkit
//!
//! Extracts per-commit scc reports from a repository, charts them and posts a
//! weekly summary to Discord.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;

use sccstats::app::config::{ConfigStore, StdinPrompter, DEFAULT_CONFIG_FILE};
use sccstats::app::pipeline;
use sccstats::report::ReportOutcome;

#[derive(Parser)]
#[command(name = "sccstats")]
#[command(about = "Track scc metrics across a repository's history", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "PATH", global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or complete the configuration file
    Setup,
    /// Analyse every commit of the configured branch
    Extract {
        /// Fail on missing configuration instead of prompting
        #[arg(long)]
        headless: bool,
    },
    /// Render the chart catalogue
    Plot,
    /// Send the weekly report
    Report,
    /// Extract, then send the weekly report
    Cron,
}

fn print_outcome(outcome: &ReportOutcome) {
    match outcome {
        ReportOutcome::Sent(headline) => println!("✅ Report sent to Discord ({headline:?} week)"),
        ReportOutcome::Skipped(headline) => {
            println!("Report built ({headline:?} week), no webhook configured")
        }
        ReportOutcome::Rejected { status, body } => println!("Discord error: {status} {body}"),
    }
}

fn entrypoint() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let store = ConfigStore::new(&cli.config);

    let rt = Runtime::new().context("Failed to start the async runtime")?;
    rt.block_on(async {
        match cli.command {
            Commands::Setup => {
                let config = pipeline::setup(&store, &mut StdinPrompter)?;
                println!("{config:#?}");
            }
            Commands::Extract { headless } => {
                let config = if headless {
                    store.load_strict()?
                } else {
                    store.load_interactive(&mut StdinPrompter)?
                };
                let summary = pipeline::extract(&config)
                    .await
                    .context("History extraction failed")?;
                println!(
                    "✅ {} commits analysed, {} already present, {} date collisions",
                    summary.analysed, summary.skipped, summary.collisions
                );
            }
            Commands::Plot => {
                let config = store.load_strict()?;
                let output = pipeline::plot(&config).await.context("Chart rendering failed")?;
                println!("📈 {} charts written to {}", output.charts.len(), config.graph_dir.display());
                if let Some(statistics) = output.statistics {
                    println!("{statistics}");
                }
            }
            Commands::Report => {
                let config = store.load_strict()?;
                let outcome = pipeline::report(&config, Local::now().naive_local())
                    .await
                    .context("Weekly report failed")?;
                print_outcome(&outcome);
            }
            Commands::Cron => {
                let config = store.load_strict()?;
                let (summary, outcome) = pipeline::cron(&config, Local::now().naive_local())
                    .await
                    .context("Scheduled run failed")?;
                println!("{} commits analysed", summary.analysed);
                print_outcome(&outcome);
            }
        }
        Ok::<_, anyhow::Error>(())
    })
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}
