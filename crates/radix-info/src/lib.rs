//! # radix-info
//!
//! Command-line front end for `radix-metrics`.
//!
//! A single invocation queries the node once, writes
//! `<output_dir>/radix_info.prom` and exits. It is meant to be run
//! periodically (cron, systemd timer) next to a node-exporter textfile
//! collector.
//!
//! ```text
//! ┌────────────┐   HTTP/JSON   ┌────────────┐   radix_info.prom   ┌───────────────┐
//! │ Radix node │──────────────►│ radix-info │────────────────────►│ node-exporter │
//! └────────────┘               └────────────┘                     └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;

use anyhow::Context;
use radix_metrics::{harvest, HarvestConfig, HarvestReport, HttpFetcher};

pub use cli::Cli;

/// Runs one harvest against the node named in `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or any harvest stage
/// fails.
pub async fn run(config: &HarvestConfig) -> anyhow::Result<HarvestReport> {
    let fetcher = HttpFetcher::new(config.base_url.as_str(), config.timeout)
        .context("failed to build HTTP client")?;

    harvest(&fetcher, config)
        .await
        .with_context(|| format!("harvest from {} failed", fetcher.base_url()))
}
