//! taskq-load - Load data files concurrently and report them in order
//!
//! Every file becomes one queued task. The report is printed once all
//! files are loaded, or the first failure is reported instead.

mod dataset;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dataset::{DataSet, LoadError, LoadFile};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{Table, Tabled};
use taskq_core::{Parallelism, QueueConfig, TaskQueue};
use tokio::task::LocalSet;
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "taskq-load")]
#[command(about = "Load data files through a bounded-parallelism queue", long_about = None)]
#[command(version)]
struct Cli {
    /// Files to load; the report keeps this order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Maximum concurrent loads (0 or "unbounded" for no limit)
    #[arg(short, long, env = "TASKQ_PARALLELISM")]
    parallelism: Option<Parallelism>,

    /// Count the first line of each file as a record
    #[arg(long)]
    no_header: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    queue: &'a str,
    parallelism: String,
    total_records: usize,
    files: &'a [DataSet],
}

impl<'a> Report<'a> {
    fn new(config: &'a QueueConfig, datasets: &'a [DataSet]) -> Self {
        Self {
            queue: &config.name,
            parallelism: config.parallelism.to_string(),
            total_records: datasets.iter().map(|d| d.records).sum(),
            files: datasets,
        }
    }
}

/// One table row per loaded file
#[derive(Tabled)]
struct DataSetRow {
    file: String,
    records: usize,
    bytes: usize,
}

impl From<&DataSet> for DataSetRow {
    fn from(data: &DataSet) -> Self {
        Self {
            file: data.path.display().to_string(),
            records: data.records,
            bytes: data.bytes,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init()?;
    let cli = Cli::parse();

    let mut config = QueueConfig::from_env().context("Invalid queue configuration")?;
    if let Some(parallelism) = cli.parallelism {
        config.parallelism = parallelism;
    }

    info!(
        queue = %config.name,
        parallelism = %config.parallelism,
        files = cli.paths.len(),
        "taskq-load v{} starting",
        VERSION
    );

    let header = !cli.no_header;
    let outcome = LocalSet::new()
        .run_until(load_all(&config, &cli.paths, header))
        .await
        .context("Load queue stopped before all files reported")?;
    let datasets = outcome.context("Failed to load data")?;

    if cli.json {
        let report = Report::new(&config, &datasets);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&datasets);
    }

    Ok(())
}

/// Queue one load per path and wait for the ordered outcome
async fn load_all(
    config: &QueueConfig,
    paths: &[PathBuf],
    header: bool,
) -> taskq_core::Result<std::result::Result<Vec<DataSet>, LoadError>> {
    let queue: TaskQueue<DataSet, LoadError> = TaskQueue::from_config(config);
    for path in paths {
        queue.defer_task(LoadFile::new(path, header));
    }
    queue.settled().await
}

fn print_table(datasets: &[DataSet]) {
    let rows: Vec<DataSetRow> = datasets.iter().map(DataSetRow::from).collect();
    println!("{}", Table::new(rows));

    let total: usize = datasets.iter().map(|d| d.records).sum();
    println!(
        "{} {} records in {} files",
        "✓".green(),
        total.to_string().bold(),
        datasets.len()
    );
}
