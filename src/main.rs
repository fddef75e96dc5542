//! This program downloads ngram usage time series from the Storywrangler
//! Twitter dataset, whose API is documented at
//! <https://gitlab.com/compstorylab/storywrangler>, and flattens them into a
//! single CSV table with one row per (ngram, date) pair.

mod config;
mod fetch;
mod languages;
mod output;
mod progress;
mod query;
mod table;
#[cfg(test)]
mod testing;

use crate::{
    config::{Config, DEFAULT_API_URL, DEFAULT_OUTPUT},
    progress::ProgressReport,
    query::{Metric, DEFAULT_LANGUAGE},
};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Download Storywrangler ngram usage time series into a CSV table
///
/// The output table has one row per ngram and date, with the columns reported
/// by the service plus an "ngram" column naming the term each row is about.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Ngrams whose usage should be downloaded
    ///
    /// Defaults to a list of COVID-19 related terms.
    terms: Vec<Ngram>,

    /// Storywrangler language code, e.g. "en"
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    language: Box<str>,

    /// Popularity measure to be reported
    #[arg(short, long, value_enum, default_value_t = Metric::Rank)]
    metric: Metric,

    /// Count retweets in addition to original tweets
    #[arg(long)]
    rt: bool,

    /// CSV file where the combined table should be written
    ///
    /// Any existing file at this location will be overwritten.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Base URL of the ngram API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: Box<str>,

    /// Give up on the API request after this many seconds
    ///
    /// By default, we wait for the service for as long as it takes.
    #[arg(long)]
    timeout: Option<u64>,

    /// Also write the time series of each ngram to its own CSV file in this
    /// directory
    #[arg(long)]
    split_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let config = Config::new(Args::parse());

    // Run the pipeline, then tell the user where the data went
    let report = ProgressReport::new();
    let table = run(&config, &report).await?;
    println!("{}", summary(&table, &config.output));
    Ok(())
}

/// Download, flatten and save the data
///
/// Nothing is written until the data has been fully downloaded and flattened,
/// so a failed run leaves any previous output untouched.
async fn run(config: &Config, report: &ProgressReport) -> Result<table::CombinedTable> {
    // Query the service
    let mut client = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        client = client.timeout(timeout);
    }
    let client = client.build().context("setting up the HTTP client")?;
    let response = fetch::fetch(&client, &config.url(), report).await?;

    // Flatten the time series of all ngrams
    let table = table::reshape(response.data, report)?;

    // Write down the results
    output::write_tables(&table, &config.output, config.split_dir.as_deref()).await?;
    Ok(table)
}

/// Final report of what was written where
fn summary(table: &table::CombinedTable, output: &Path) -> String {
    format!(
        "Wrote {} rows from {} ngrams to {}",
        table.rows().len(),
        table.num_ngrams(),
        output.display()
    )
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Case-sensitive ngram
pub type Ngram = Box<str>;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
